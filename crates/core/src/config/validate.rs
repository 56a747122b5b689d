use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Chat credentials and required ids are non-empty
/// - Store URL and API key are non-empty
/// - Rejection reason bound is positive
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    // Server validation
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    // Chat validation
    if config.chat.bot_token.is_empty() {
        return Err(ConfigError::ValidationError(
            "chat.bot_token cannot be empty".to_string(),
        ));
    }
    for (name, value) in [
        ("chat.guild_id", &config.chat.guild_id),
        ("chat.receipts_channel_id", &config.chat.receipts_channel_id),
        ("chat.mod_channel_id", &config.chat.mod_channel_id),
        ("chat.orders_category_id", &config.chat.orders_category_id),
        ("chat.mod_role_id", &config.chat.mod_role_id),
    ] {
        if value.is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "{} cannot be empty",
                name
            )));
        }
    }
    if config.chat.command_prefix.is_empty() {
        return Err(ConfigError::ValidationError(
            "chat.command_prefix cannot be empty".to_string(),
        ));
    }

    // Store validation
    if config.store.url.is_empty() {
        return Err(ConfigError::ValidationError(
            "store.url cannot be empty".to_string(),
        ));
    }
    if config.store.api_key.is_empty() {
        return Err(ConfigError::ValidationError(
            "store.api_key cannot be empty".to_string(),
        ));
    }

    // Workflow validation
    if config.workflow.reason_max_len == 0 {
        return Err(ConfigError::ValidationError(
            "workflow.reason_max_len cannot be 0".to_string(),
        ));
    }
    if config.workflow.list_limit <= 0 {
        return Err(ConfigError::ValidationError(
            "workflow.list_limit must be positive".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_config_from_str;

    fn valid_config() -> Config {
        load_config_from_str(
            r#"
[chat]
bot_token = "token"
guild_id = "100"
receipts_channel_id = "200"
mod_channel_id = "300"
orders_category_id = "400"
mod_role_id = "500"

[store]
url = "https://example.supabase.co"
api_key = "key"
"#,
        )
        .unwrap()
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(validate_config(&valid_config()).is_ok());
    }

    #[test]
    fn test_validate_port_zero_fails() {
        let mut config = valid_config();
        config.server.port = 0;
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_validate_empty_bot_token_fails() {
        let mut config = valid_config();
        config.chat.bot_token = String::new();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_empty_mod_role_fails() {
        let mut config = valid_config();
        config.chat.mod_role_id = String::new();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_empty_store_key_fails() {
        let mut config = valid_config();
        config.store.api_key = String::new();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_zero_reason_bound_fails() {
        let mut config = valid_config();
        config.workflow.reason_max_len = 0;
        assert!(validate_config(&config).is_err());
    }
}
