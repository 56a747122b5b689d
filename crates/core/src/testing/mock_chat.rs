//! In-memory chat client for testing.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::chat::{
    ActionButton, ChatClient, ChatError, Embed, InteractionRef, MessageRef, NotificationResult,
};

/// One recorded [`ChatClient`] call.
#[derive(Debug, Clone)]
pub enum RecordedChatCall {
    SendMessage {
        channel_id: String,
        content: Option<String>,
        embed: Option<Embed>,
        buttons: Vec<ActionButton>,
        message_id: String,
    },
    EditMessage {
        channel_id: String,
        message_id: String,
        embed: Embed,
        cleared_buttons: bool,
    },
    DeleteMessage {
        channel_id: String,
        message_id: String,
    },
    SendDm {
        user_id: String,
        embed: Embed,
        result: NotificationResult,
    },
    CreatePrivateChannel {
        guild_id: String,
        category_id: String,
        name: String,
        allow_role_id: String,
        allow_user_id: String,
        channel_id: String,
    },
    RenameChannel {
        channel_id: String,
        name: String,
    },
    OpenReasonPrompt {
        interaction_id: String,
        custom_id: String,
        title: String,
        label: String,
        max_length: u16,
    },
    ReplyEphemeral {
        interaction_id: String,
        content: String,
    },
    FetchAttachment {
        url: String,
    },
    PurgeOwnMessages {
        channel_id: String,
        limit: u32,
    },
}

/// Mock implementation of the [`ChatClient`] trait.
///
/// Records every call for assertions and provides controllable behavior:
/// - Generated ids are deterministic (`msg-1`, `chan-1`, ...)
/// - `set_dm_suppressed` makes DMs report the closed-inbox outcome
/// - `set_dm_error` fails the next DM with a transport error
/// - `set_attachment_bytes` controls what downloads return
/// - `set_next_error` fails the next call
#[derive(Debug, Default)]
pub struct MockChatClient {
    calls: Arc<RwLock<Vec<RecordedChatCall>>>,
    next_id: Arc<RwLock<u64>>,
    dm_suppressed: Arc<RwLock<Option<String>>>,
    dm_error: Arc<RwLock<Option<ChatError>>>,
    attachment_bytes: Arc<RwLock<Vec<u8>>>,
    next_error: Arc<RwLock<Option<ChatError>>>,
}

impl MockChatClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all recorded calls, in order.
    pub async fn calls(&self) -> Vec<RecordedChatCall> {
        self.calls.read().await.clone()
    }

    /// Messages sent to the given channel.
    pub async fn messages_to(&self, channel_id: &str) -> Vec<RecordedChatCall> {
        self.calls
            .read()
            .await
            .iter()
            .filter(|call| {
                matches!(call, RecordedChatCall::SendMessage { channel_id: c, .. } if c == channel_id)
            })
            .cloned()
            .collect()
    }

    /// Contents of all ephemeral replies, in order.
    pub async fn ephemeral_replies(&self) -> Vec<String> {
        self.calls
            .read()
            .await
            .iter()
            .filter_map(|call| match call {
                RecordedChatCall::ReplyEphemeral { content, .. } => Some(content.clone()),
                _ => None,
            })
            .collect()
    }

    /// Report DMs as suppressed with the given reason.
    pub async fn set_dm_suppressed(&self, reason: impl Into<String>) {
        *self.dm_suppressed.write().await = Some(reason.into());
    }

    /// Fail the next `send_dm` with the given error.
    pub async fn set_dm_error(&self, error: ChatError) {
        *self.dm_error.write().await = Some(error);
    }

    /// Bytes returned by `fetch_attachment`.
    pub async fn set_attachment_bytes(&self, bytes: Vec<u8>) {
        *self.attachment_bytes.write().await = bytes;
    }

    /// Fail the next call with the given error.
    pub async fn set_next_error(&self, error: ChatError) {
        *self.next_error.write().await = Some(error);
    }

    async fn take_error(&self) -> Result<(), ChatError> {
        match self.next_error.write().await.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    async fn next_id(&self, prefix: &str) -> String {
        let mut id = self.next_id.write().await;
        *id += 1;
        format!("{prefix}-{id}")
    }

    async fn record(&self, call: RecordedChatCall) {
        self.calls.write().await.push(call);
    }
}

#[async_trait]
impl ChatClient for MockChatClient {
    async fn send_message(
        &self,
        channel_id: &str,
        content: Option<&str>,
        embed: Option<Embed>,
        buttons: &[ActionButton],
    ) -> Result<String, ChatError> {
        self.take_error().await?;

        let message_id = self.next_id("msg").await;
        self.record(RecordedChatCall::SendMessage {
            channel_id: channel_id.to_string(),
            content: content.map(str::to_string),
            embed,
            buttons: buttons.to_vec(),
            message_id: message_id.clone(),
        })
        .await;
        Ok(message_id)
    }

    async fn edit_message(
        &self,
        message: &MessageRef,
        embed: Embed,
        clear_buttons: bool,
    ) -> Result<(), ChatError> {
        self.take_error().await?;

        self.record(RecordedChatCall::EditMessage {
            channel_id: message.channel_id.clone(),
            message_id: message.message_id.clone(),
            embed,
            cleared_buttons: clear_buttons,
        })
        .await;
        Ok(())
    }

    async fn delete_message(&self, message: &MessageRef) -> Result<(), ChatError> {
        self.take_error().await?;

        self.record(RecordedChatCall::DeleteMessage {
            channel_id: message.channel_id.clone(),
            message_id: message.message_id.clone(),
        })
        .await;
        Ok(())
    }

    async fn send_dm(&self, user_id: &str, embed: Embed) -> Result<NotificationResult, ChatError> {
        self.take_error().await?;
        if let Some(error) = self.dm_error.write().await.take() {
            return Err(error);
        }

        let result = match self.dm_suppressed.read().await.clone() {
            Some(reason) => NotificationResult::Suppressed(reason),
            None => NotificationResult::Delivered,
        };
        self.record(RecordedChatCall::SendDm {
            user_id: user_id.to_string(),
            embed,
            result: result.clone(),
        })
        .await;
        Ok(result)
    }

    async fn create_private_channel(
        &self,
        guild_id: &str,
        category_id: &str,
        name: &str,
        allow_role_id: &str,
        allow_user_id: &str,
    ) -> Result<String, ChatError> {
        self.take_error().await?;

        let channel_id = self.next_id("chan").await;
        self.record(RecordedChatCall::CreatePrivateChannel {
            guild_id: guild_id.to_string(),
            category_id: category_id.to_string(),
            name: name.to_string(),
            allow_role_id: allow_role_id.to_string(),
            allow_user_id: allow_user_id.to_string(),
            channel_id: channel_id.clone(),
        })
        .await;
        Ok(channel_id)
    }

    async fn rename_channel(&self, channel_id: &str, name: &str) -> Result<(), ChatError> {
        self.take_error().await?;

        self.record(RecordedChatCall::RenameChannel {
            channel_id: channel_id.to_string(),
            name: name.to_string(),
        })
        .await;
        Ok(())
    }

    async fn open_reason_prompt(
        &self,
        interaction: &InteractionRef,
        custom_id: &str,
        title: &str,
        label: &str,
        max_length: u16,
    ) -> Result<(), ChatError> {
        self.take_error().await?;

        self.record(RecordedChatCall::OpenReasonPrompt {
            interaction_id: interaction.id.clone(),
            custom_id: custom_id.to_string(),
            title: title.to_string(),
            label: label.to_string(),
            max_length,
        })
        .await;
        Ok(())
    }

    async fn reply_ephemeral(
        &self,
        interaction: &InteractionRef,
        content: &str,
    ) -> Result<(), ChatError> {
        self.take_error().await?;

        self.record(RecordedChatCall::ReplyEphemeral {
            interaction_id: interaction.id.clone(),
            content: content.to_string(),
        })
        .await;
        Ok(())
    }

    async fn fetch_attachment(&self, url: &str) -> Result<Vec<u8>, ChatError> {
        self.take_error().await?;

        self.record(RecordedChatCall::FetchAttachment {
            url: url.to_string(),
        })
        .await;
        Ok(self.attachment_bytes.read().await.clone())
    }

    async fn purge_own_messages(&self, channel_id: &str, limit: u32) -> Result<(), ChatError> {
        self.take_error().await?;

        self.record(RecordedChatCall::PurgeOwnMessages {
            channel_id: channel_id.to_string(),
            limit,
        })
        .await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_records_sends_with_generated_ids() {
        let chat = MockChatClient::new();

        let first = chat.send_message("123", Some("oi"), None, &[]).await.unwrap();
        let second = chat.send_message("123", None, None, &[]).await.unwrap();
        assert_eq!(first, "msg-1");
        assert_eq!(second, "msg-2");
        assert_eq!(chat.messages_to("123").await.len(), 2);
    }

    #[tokio::test]
    async fn test_dm_suppression_knob() {
        let chat = MockChatClient::new();

        let delivered = chat.send_dm("42", Embed::new("x")).await.unwrap();
        assert_eq!(delivered, NotificationResult::Delivered);

        chat.set_dm_suppressed("closed inbox").await;
        let suppressed = chat.send_dm("42", Embed::new("x")).await.unwrap();
        assert_eq!(
            suppressed,
            NotificationResult::Suppressed("closed inbox".to_string())
        );
    }

    #[tokio::test]
    async fn test_next_error_fires_once() {
        let chat = MockChatClient::new();
        chat.set_next_error(ChatError::Network("boom".to_string())).await;

        assert!(chat.send_message("123", None, None, &[]).await.is_err());
        assert!(chat.send_message("123", None, None, &[]).await.is_ok());
        assert_eq!(chat.messages_to("123").await.len(), 1);
    }

    #[tokio::test]
    async fn test_dm_error_knob_only_affects_dms() {
        let chat = MockChatClient::new();
        chat.set_dm_error(ChatError::Network("boom".to_string())).await;

        assert!(chat.send_message("123", None, None, &[]).await.is_ok());
        assert!(chat.send_dm("42", Embed::new("x")).await.is_err());
        assert!(chat.send_dm("42", Embed::new("x")).await.is_ok());
    }

    #[tokio::test]
    async fn test_attachment_bytes_knob() {
        let chat = MockChatClient::new();
        chat.set_attachment_bytes(vec![1, 2, 3]).await;

        let bytes = chat.fetch_attachment("https://cdn.example/x.png").await.unwrap();
        assert_eq!(bytes, vec![1, 2, 3]);
    }
}
