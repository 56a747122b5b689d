use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub chat: ChatConfig,
    pub store: StoreConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub receipts: ReceiptsConfig,
    #[serde(default)]
    pub workflow: WorkflowTuning,
    #[serde(default)]
    pub keepalive: Option<KeepaliveConfig>,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    "0.0.0.0".parse().unwrap()
}

fn default_port() -> u16 {
    8080
}

/// Chat platform configuration (bot credentials plus the channels,
/// category and role the workflow operates on)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChatConfig {
    /// Bot token for the chat platform REST API
    pub bot_token: String,
    /// Guild (server) the bot operates in
    pub guild_id: String,
    /// Channel where customers post receipts
    pub receipts_channel_id: String,
    /// Channel where moderators review decision cards
    pub mod_channel_id: String,
    /// Optional log channel for decision notifications
    #[serde(default)]
    pub log_channel_id: Option<String>,
    /// Category under which private order channels are created
    pub orders_category_id: String,
    /// Role required for approve/reject/close and privileged queries
    pub mod_role_id: String,
    /// Command prefix (default: "!")
    #[serde(default = "default_prefix")]
    pub command_prefix: String,
    /// Override the REST API base URL (for testing)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
}

fn default_prefix() -> String {
    "!".to_string()
}

/// Remote order store (PostgREST-style) configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreConfig {
    /// Base URL of the REST store (e.g., "https://xyz.supabase.co")
    pub url: String,
    /// Service API key
    pub api_key: String,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

fn default_timeout() -> u32 {
    30
}

/// Database configuration (local audit trail)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("pagbot.db")
}

/// Receipt file storage configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReceiptsConfig {
    #[serde(default = "default_receipts_dir")]
    pub dir: PathBuf,
}

impl Default for ReceiptsConfig {
    fn default() -> Self {
        Self {
            dir: default_receipts_dir(),
        }
    }
}

fn default_receipts_dir() -> PathBuf {
    PathBuf::from("comprovantes")
}

/// Workflow tuning knobs
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WorkflowTuning {
    /// Seconds to wait before deleting a submission and its acknowledgement
    #[serde(default = "default_cleanup_delay")]
    pub cleanup_delay_secs: u64,
    /// Maximum length of a rejection reason
    #[serde(default = "default_reason_max_len")]
    pub reason_max_len: usize,
    /// Maximum orders returned by the listing command
    #[serde(default = "default_list_limit")]
    pub list_limit: i64,
}

impl Default for WorkflowTuning {
    fn default() -> Self {
        Self {
            cleanup_delay_secs: default_cleanup_delay(),
            reason_max_len: default_reason_max_len(),
            list_limit: default_list_limit(),
        }
    }
}

fn default_cleanup_delay() -> u64 {
    3
}

fn default_reason_max_len() -> usize {
    500
}

fn default_list_limit() -> i64 {
    10
}

/// Keepalive ping configuration (for free-tier hosts that sleep idle services)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct KeepaliveConfig {
    /// URL to ping
    pub url: String,
    /// Seconds before the first ping (default: 60)
    #[serde(default = "default_keepalive_initial")]
    pub initial_delay_secs: u64,
    /// Seconds between pings (default: 300)
    #[serde(default = "default_keepalive_interval")]
    pub interval_secs: u64,
}

fn default_keepalive_initial() -> u64 {
    60
}

fn default_keepalive_interval() -> u64 {
    300
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub chat: SanitizedChatConfig,
    pub store: SanitizedStoreConfig,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub receipts: ReceiptsConfig,
    pub workflow: WorkflowTuning,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keepalive: Option<KeepaliveConfig>,
}

/// Sanitized chat config (bot token hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedChatConfig {
    pub bot_token_configured: bool,
    pub guild_id: String,
    pub receipts_channel_id: String,
    pub mod_channel_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_channel_id: Option<String>,
    pub orders_category_id: String,
    pub mod_role_id: String,
    pub command_prefix: String,
}

/// Sanitized store config (API key hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedStoreConfig {
    pub url: String,
    pub api_key_configured: bool,
    pub timeout_secs: u32,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            chat: SanitizedChatConfig {
                bot_token_configured: !config.chat.bot_token.is_empty(),
                guild_id: config.chat.guild_id.clone(),
                receipts_channel_id: config.chat.receipts_channel_id.clone(),
                mod_channel_id: config.chat.mod_channel_id.clone(),
                log_channel_id: config.chat.log_channel_id.clone(),
                orders_category_id: config.chat.orders_category_id.clone(),
                mod_role_id: config.chat.mod_role_id.clone(),
                command_prefix: config.chat.command_prefix.clone(),
            },
            store: SanitizedStoreConfig {
                url: config.store.url.clone(),
                api_key_configured: !config.store.api_key.is_empty(),
                timeout_secs: config.store.timeout_secs,
            },
            server: config.server.clone(),
            database: config.database.clone(),
            receipts: config.receipts.clone(),
            workflow: config.workflow.clone(),
            keepalive: config.keepalive.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_toml() -> &'static str {
        r#"
[chat]
bot_token = "token-123"
guild_id = "100"
receipts_channel_id = "200"
mod_channel_id = "300"
orders_category_id = "400"
mod_role_id = "500"

[store]
url = "https://example.supabase.co"
api_key = "secret-key"
"#
    }

    #[test]
    fn test_deserialize_minimal_config() {
        let config: Config = toml::from_str(minimal_toml()).unwrap();
        assert_eq!(config.chat.bot_token, "token-123");
        assert_eq!(config.chat.command_prefix, "!");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.store.timeout_secs, 30);
        assert_eq!(config.workflow.cleanup_delay_secs, 3);
        assert_eq!(config.workflow.reason_max_len, 500);
        assert_eq!(config.workflow.list_limit, 10);
        assert!(config.keepalive.is_none());
    }

    #[test]
    fn test_deserialize_missing_chat_fails() {
        let toml = r#"
[store]
url = "https://example.supabase.co"
api_key = "secret"
"#;
        let result: Result<Config, _> = toml::from_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let config: Config = toml::from_str(minimal_toml()).unwrap();
        assert_eq!(config.database.path.to_str().unwrap(), "pagbot.db");
        assert_eq!(config.receipts.dir.to_str().unwrap(), "comprovantes");
    }

    #[test]
    fn test_deserialize_with_keepalive() {
        let toml = format!(
            "{}\n[keepalive]\nurl = \"https://pagbot.example.com/\"\n",
            minimal_toml()
        );
        let config: Config = toml::from_str(&toml).unwrap();
        let keepalive = config.keepalive.unwrap();
        assert_eq!(keepalive.url, "https://pagbot.example.com/");
        assert_eq!(keepalive.initial_delay_secs, 60);
        assert_eq!(keepalive.interval_secs, 300);
    }

    #[test]
    fn test_sanitized_config_redacts_secrets() {
        let config: Config = toml::from_str(minimal_toml()).unwrap();
        let sanitized = SanitizedConfig::from(&config);

        assert!(sanitized.chat.bot_token_configured);
        assert!(sanitized.store.api_key_configured);

        let json = serde_json::to_string(&sanitized).unwrap();
        assert!(!json.contains("token-123"));
        assert!(!json.contains("secret-key"));
    }
}
