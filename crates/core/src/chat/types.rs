//! Chat platform value types and the client trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::order::Plan;

/// Embed colors (decimal RGB, matching the platform's palette).
pub mod color {
    pub const GREEN: u32 = 0x57F287;
    pub const RED: u32 = 0xED4245;
    pub const ORANGE: u32 = 0xE67E22;
    pub const BLUE: u32 = 0x3498DB;
    pub const GOLD: u32 = 0xF1C40F;
}

/// Error type for chat platform operations.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("Chat API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Failed to parse chat API response: {0}")]
    Parse(String),

    #[error("Malformed component id: {0}")]
    MalformedComponentId(String),
}

impl From<reqwest::Error> for ChatError {
    fn from(e: reqwest::Error) -> Self {
        ChatError::Network(e.to_string())
    }
}

/// A rich message embed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Embed {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<EmbedField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

/// A single name/value field inside an embed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub inline: bool,
}

impl Embed {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            description: None,
            color: None,
            fields: Vec::new(),
            image_url: None,
            footer: None,
            timestamp: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_color(mut self, color: u32) -> Self {
        self.color = Some(color);
        self
    }

    pub fn with_field(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
        inline: bool,
    ) -> Self {
        self.fields.push(EmbedField {
            name: name.into(),
            value: value.into(),
            inline,
        });
        self
    }

    pub fn with_image(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }

    pub fn with_footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = Some(footer.into());
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}

/// Visual style of an action button.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ButtonStyle {
    Primary,
    Success,
    Danger,
}

/// A clickable button attached to a message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActionButton {
    pub label: String,
    pub style: ButtonStyle,
    /// Opaque payload echoed back on click. Carries the full decision
    /// context so no state has to survive in-process between events.
    pub custom_id: String,
}

impl ActionButton {
    pub fn new(label: impl Into<String>, style: ButtonStyle, custom_id: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            style,
            custom_id: custom_id.into(),
        }
    }
}

/// Reference to an interaction being answered (button click or modal submit).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InteractionRef {
    pub id: String,
    pub token: String,
}

/// Reference to a posted message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRef {
    pub channel_id: String,
    pub message_id: String,
}

/// Reference to an attachment on an inbound message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AttachmentRef {
    pub filename: String,
    pub url: String,
}

/// Outcome of a best-effort direct message.
///
/// Suppression (closed DMs) is an expected outcome, never an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationResult {
    Delivered,
    Suppressed(String),
}

/// Which decision a moderator is taking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionAction {
    Approve,
    Reject,
}

impl DecisionAction {
    fn as_str(&self) -> &'static str {
        match self {
            DecisionAction::Approve => "aceito",
            DecisionAction::Reject => "negada",
        }
    }
}

/// Everything needed to act on a decision, carried inside the component
/// `custom_id` so button clicks and modal submits are self-contained.
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionContext {
    pub action: DecisionAction,
    pub order_id: String,
    pub user_id: String,
    pub plan: Plan,
    pub receipt_path: String,
}

/// Prefix distinguishing the rejection-reason modal from decision buttons.
const REASON_MODAL_PREFIX: &str = "motivo";

impl DecisionContext {
    pub fn new(
        action: DecisionAction,
        order_id: impl Into<String>,
        user_id: impl Into<String>,
        plan: Plan,
        receipt_path: impl Into<String>,
    ) -> Self {
        Self {
            action,
            order_id: order_id.into(),
            user_id: user_id.into(),
            plan,
            receipt_path: receipt_path.into(),
        }
    }

    /// Encode as a button `custom_id`.
    pub fn encode(&self) -> String {
        format!(
            "{}|{}|{}|{}|{}",
            self.action.as_str(),
            self.order_id,
            self.user_id,
            self.plan.as_str(),
            self.receipt_path
        )
    }

    /// Encode as the rejection-reason modal `custom_id`.
    pub fn encode_reason_modal(&self) -> String {
        format!(
            "{}|{}|{}|{}|{}",
            REASON_MODAL_PREFIX,
            self.order_id,
            self.user_id,
            self.plan.as_str(),
            self.receipt_path
        )
    }

    /// Decode a component `custom_id`. Returns the context and whether it
    /// came from the reason modal.
    pub fn decode(custom_id: &str) -> Result<(Self, bool), ChatError> {
        let mut parts = custom_id.splitn(5, '|');
        let tag = parts.next().unwrap_or_default();
        let (action, is_modal) = match tag {
            "aceito" => (DecisionAction::Approve, false),
            "negada" => (DecisionAction::Reject, false),
            REASON_MODAL_PREFIX => (DecisionAction::Reject, true),
            _ => {
                return Err(ChatError::MalformedComponentId(custom_id.to_string()));
            }
        };

        let order_id = parts.next();
        let user_id = parts.next();
        let plan = parts.next().and_then(Plan::parse);
        let receipt_path = parts.next();

        match (order_id, user_id, plan, receipt_path) {
            (Some(order_id), Some(user_id), Some(plan), Some(receipt_path)) => Ok((
                Self {
                    action,
                    order_id: order_id.to_string(),
                    user_id: user_id.to_string(),
                    plan,
                    receipt_path: receipt_path.to_string(),
                },
                is_modal,
            )),
            _ => Err(ChatError::MalformedComponentId(custom_id.to_string())),
        }
    }
}

/// Trait for the outbound chat platform surface.
///
/// Every operation the workflow performs against the platform goes through
/// here, so the workflow can be exercised against a mock.
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Post a message; returns the new message id.
    async fn send_message(
        &self,
        channel_id: &str,
        content: Option<&str>,
        embed: Option<Embed>,
        buttons: &[ActionButton],
    ) -> Result<String, ChatError>;

    /// Replace a message's embed. `clear_buttons` removes its components.
    async fn edit_message(
        &self,
        message: &MessageRef,
        embed: Embed,
        clear_buttons: bool,
    ) -> Result<(), ChatError>;

    /// Delete a message.
    async fn delete_message(&self, message: &MessageRef) -> Result<(), ChatError>;

    /// Send a direct message. Closed DMs are a suppressed outcome, not an
    /// error.
    async fn send_dm(&self, user_id: &str, embed: Embed) -> Result<NotificationResult, ChatError>;

    /// Create a private text channel under a category: @everyone denied,
    /// the given role and user allowed. Returns the new channel id.
    async fn create_private_channel(
        &self,
        guild_id: &str,
        category_id: &str,
        name: &str,
        allow_role_id: &str,
        allow_user_id: &str,
    ) -> Result<String, ChatError>;

    /// Rename a channel.
    async fn rename_channel(&self, channel_id: &str, name: &str) -> Result<(), ChatError>;

    /// Answer an interaction by opening a single-textarea modal.
    async fn open_reason_prompt(
        &self,
        interaction: &InteractionRef,
        custom_id: &str,
        title: &str,
        label: &str,
        max_length: u16,
    ) -> Result<(), ChatError>;

    /// Answer an interaction with an ephemeral message only the caller sees.
    async fn reply_ephemeral(
        &self,
        interaction: &InteractionRef,
        content: &str,
    ) -> Result<(), ChatError>;

    /// Download an attachment's bytes.
    async fn fetch_attachment(&self, url: &str) -> Result<Vec<u8>, ChatError>;

    /// Best-effort deletion of the bot's own recent messages in a channel.
    async fn purge_own_messages(&self, channel_id: &str, limit: u32) -> Result<(), ChatError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embed_builder() {
        let embed = Embed::new("title")
            .with_description("desc")
            .with_color(color::GREEN)
            .with_field("a", "b", true)
            .with_footer("foot");
        assert_eq!(embed.title.as_deref(), Some("title"));
        assert_eq!(embed.color, Some(color::GREEN));
        assert_eq!(embed.fields.len(), 1);
        assert!(embed.fields[0].inline);
    }

    #[test]
    fn test_decision_context_roundtrip_button() {
        let ctx = DecisionContext::new(
            DecisionAction::Approve,
            "1234",
            "42",
            Plan::Starter,
            "comprovantes/1234_42_1700000000.png",
        );
        let (decoded, is_modal) = DecisionContext::decode(&ctx.encode()).unwrap();
        assert_eq!(decoded, ctx);
        assert!(!is_modal);
    }

    #[test]
    fn test_decision_context_roundtrip_modal() {
        let ctx = DecisionContext::new(
            DecisionAction::Reject,
            "1234",
            "42",
            Plan::Professional,
            "comprovantes/x.png",
        );
        let (decoded, is_modal) = DecisionContext::decode(&ctx.encode_reason_modal()).unwrap();
        assert_eq!(decoded.order_id, "1234");
        assert_eq!(decoded.plan, Plan::Professional);
        assert!(is_modal);
    }

    #[test]
    fn test_decision_context_decode_rejects_garbage() {
        assert!(DecisionContext::decode("bogus|1|2|Starter|p").is_err());
        assert!(DecisionContext::decode("aceito|only-order-id").is_err());
        assert!(DecisionContext::decode("aceito|1|2|NotAPlan|p").is_err());
        assert!(DecisionContext::decode("").is_err());
    }
}
