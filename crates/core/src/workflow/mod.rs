//! The order workflow: submission intake, moderator decisions, and the
//! query command surface.

mod decision;
pub mod messages;
mod queries;
mod submission;

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::audit::AuditHandle;
use crate::auth::Caller;
use crate::chat::{AttachmentRef, ChatClient, ChatError};
use crate::config::Config;
use crate::order::{OrderError, OrderStatus, OrderStore};
use crate::receipt::{ReceiptError, ReceiptStore};

/// Error type for workflow operations.
///
/// Validation, authorization and guard errors are produced before any state
/// change. The carried strings are the user-facing refusal texts.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("{0}")]
    Validation(String),

    #[error("Caller lacks the moderator role")]
    Unauthorized,

    #[error("Order {0} not found")]
    NotFound(String),

    #[error("Only accepted orders can be closed (order {order_id} is {status})")]
    Guard {
        order_id: String,
        status: OrderStatus,
    },

    #[error(transparent)]
    Store(#[from] OrderError),

    #[error(transparent)]
    Chat(#[from] ChatError),

    #[error(transparent)]
    Receipt(#[from] ReceiptError),
}

/// The ids, bounds and delays the workflow operates with.
#[derive(Debug, Clone)]
pub struct WorkflowConfig {
    pub guild_id: String,
    pub receipts_channel_id: String,
    pub mod_channel_id: String,
    pub log_channel_id: Option<String>,
    pub orders_category_id: String,
    pub mod_role_id: String,
    pub command_prefix: String,
    /// Confidentiality delay before submission messages are deleted.
    pub cleanup_delay: Duration,
    pub reason_max_len: usize,
    pub list_limit: i64,
}

impl From<&Config> for WorkflowConfig {
    fn from(config: &Config) -> Self {
        Self {
            guild_id: config.chat.guild_id.clone(),
            receipts_channel_id: config.chat.receipts_channel_id.clone(),
            mod_channel_id: config.chat.mod_channel_id.clone(),
            log_channel_id: config.chat.log_channel_id.clone(),
            orders_category_id: config.chat.orders_category_id.clone(),
            mod_role_id: config.chat.mod_role_id.clone(),
            command_prefix: config.chat.command_prefix.clone(),
            cleanup_delay: Duration::from_secs(config.workflow.cleanup_delay_secs),
            reason_max_len: config.workflow.reason_max_len,
            list_limit: config.workflow.list_limit,
        }
    }
}

/// An inbound receipt submission, as carried by a `pago` command message.
#[derive(Debug, Clone)]
pub struct SubmissionRequest {
    pub channel_id: String,
    pub message_id: String,
    pub author: Caller,
    pub order_id: Option<String>,
    pub plan: Option<String>,
    pub note: Option<String>,
    pub attachments: Vec<AttachmentRef>,
}

/// Drives the payment-verification lifecycle against the injected
/// collaborators. All remote surfaces are trait objects so the whole flow can
/// run against mocks.
pub struct OrderWorkflow {
    store: Arc<dyn OrderStore>,
    chat: Arc<dyn ChatClient>,
    receipts: Arc<dyn ReceiptStore>,
    audit: AuditHandle,
    config: WorkflowConfig,
}

impl OrderWorkflow {
    pub fn new(
        store: Arc<dyn OrderStore>,
        chat: Arc<dyn ChatClient>,
        receipts: Arc<dyn ReceiptStore>,
        audit: AuditHandle,
        config: WorkflowConfig,
    ) -> Self {
        Self {
            store,
            chat,
            receipts,
            audit,
            config,
        }
    }

    pub fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    pub(crate) fn store(&self) -> &Arc<dyn OrderStore> {
        &self.store
    }

    pub(crate) fn chat(&self) -> &Arc<dyn ChatClient> {
        &self.chat
    }

    pub(crate) fn receipts(&self) -> &Arc<dyn ReceiptStore> {
        &self.receipts
    }

    pub(crate) fn audit(&self) -> &AuditHandle {
        &self.audit
    }

    pub(crate) fn is_moderator(&self, caller: &Caller) -> bool {
        caller.has_role(&self.config.mod_role_id)
    }
}
