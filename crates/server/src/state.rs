use std::sync::Arc;

use pagbot_core::audit::AuditStore;
use pagbot_core::{ChatClient, Config, OrderWorkflow, SanitizedConfig};

/// Shared application state
pub struct AppState {
    config: Config,
    workflow: Arc<OrderWorkflow>,
    chat: Arc<dyn ChatClient>,
    audit_store: Arc<dyn AuditStore>,
}

impl AppState {
    pub fn new(
        config: Config,
        workflow: Arc<OrderWorkflow>,
        chat: Arc<dyn ChatClient>,
        audit_store: Arc<dyn AuditStore>,
    ) -> Self {
        Self {
            config,
            workflow,
            chat,
            audit_store,
        }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn command_prefix(&self) -> &str {
        &self.config.chat.command_prefix
    }

    pub fn workflow(&self) -> &OrderWorkflow {
        &self.workflow
    }

    /// Chat client used by the dispatcher to deliver submission refusals.
    pub fn chat(&self) -> &Arc<dyn ChatClient> {
        &self.chat
    }

    pub fn audit_store(&self) -> &dyn AuditStore {
        self.audit_store.as_ref()
    }
}
