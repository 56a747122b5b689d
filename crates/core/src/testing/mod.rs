//! Testing utilities and mock implementations for lifecycle tests.
//!
//! This module provides mock implementations of all external service traits,
//! allowing the full submission-to-decision flow to run without real
//! infrastructure.
//!
//! # Example
//!
//! ```rust,ignore
//! use pagbot_core::testing::{MemoryOrderStore, MemoryReceiptStore, MockChatClient};
//!
//! let store = MemoryOrderStore::new();
//! let chat = MockChatClient::new();
//! let receipts = MemoryReceiptStore::new();
//!
//! // Configure mock behavior
//! store.set_counter(7).await;
//! chat.set_dm_suppressed("closed inbox").await;
//!
//! // Use in OrderWorkflow...
//! ```

mod memory_order_store;
mod memory_receipts;
mod mock_chat;

pub use memory_order_store::MemoryOrderStore;
pub use memory_receipts::MemoryReceiptStore;
pub use mock_chat::{MockChatClient, RecordedChatCall};

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::time::Duration;

    use crate::auth::Caller;
    use crate::chat::AttachmentRef;
    use crate::workflow::{SubmissionRequest, WorkflowConfig};

    /// Role id that [`test_workflow_config`] treats as the moderator role.
    pub const MOD_ROLE: &str = "500";

    /// Channel ids used by [`test_workflow_config`].
    pub const RECEIPTS_CHANNEL: &str = "100";
    pub const MOD_CHANNEL: &str = "200";
    pub const LOG_CHANNEL: &str = "300";

    /// Workflow configuration with fixed ids and short delays.
    pub fn test_workflow_config() -> WorkflowConfig {
        WorkflowConfig {
            guild_id: "guild-1".to_string(),
            receipts_channel_id: RECEIPTS_CHANNEL.to_string(),
            mod_channel_id: MOD_CHANNEL.to_string(),
            log_channel_id: Some(LOG_CHANNEL.to_string()),
            orders_category_id: "400".to_string(),
            mod_role_id: MOD_ROLE.to_string(),
            command_prefix: "!".to_string(),
            cleanup_delay: Duration::from_secs(3),
            reason_max_len: 500,
            list_limit: 10,
        }
    }

    /// A caller holding the moderator role.
    pub fn moderator(id: &str) -> Caller {
        Caller::new(id, format!("mod-{id}"), vec![MOD_ROLE.to_string()])
    }

    /// A caller with no roles.
    pub fn customer(id: &str) -> Caller {
        Caller::new(id, format!("user-{id}"), vec![])
    }

    /// An image attachment with a CDN-looking url.
    pub fn attachment(filename: &str) -> AttachmentRef {
        AttachmentRef {
            filename: filename.to_string(),
            url: format!("https://cdn.example/{filename}"),
        }
    }

    /// A complete, valid submission for the given customer and order id.
    pub fn submission(author: Caller, order_id: &str) -> SubmissionRequest {
        SubmissionRequest {
            channel_id: RECEIPTS_CHANNEL.to_string(),
            message_id: "submission-msg".to_string(),
            author,
            order_id: Some(order_id.to_string()),
            plan: Some("Starter".to_string()),
            note: None,
            attachments: vec![attachment("comprovante.png")],
        }
    }
}
