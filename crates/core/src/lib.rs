pub mod audit;
pub mod auth;
pub mod chat;
pub mod command;
pub mod config;
pub mod order;
pub mod receipt;
pub mod testing;
pub mod workflow;

pub use audit::{create_audit_system, AuditEvent, AuditHandle, AuditRecord, SqliteAuditStore};
pub use auth::Caller;
pub use chat::{ChatClient, ChatError, DecisionAction, DecisionContext, DiscordClient};
pub use command::{parse_command, Command};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, SanitizedConfig,
};
pub use order::{Order, OrderStatus, OrderStore, Plan, SupabaseOrderStore};
pub use receipt::{FsReceiptStore, ReceiptStore};
pub use workflow::{OrderWorkflow, SubmissionRequest, WorkflowConfig, WorkflowError};
