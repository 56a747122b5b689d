//! Discord REST client implementing [`ChatClient`].
//!
//! Uses the plain HTTP API (v10). No gateway connection lives here; inbound
//! events arrive through the server's event endpoint.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::config::ChatConfig;

use super::types::{
    ActionButton, ButtonStyle, ChatClient, ChatError, Embed, InteractionRef, MessageRef,
    NotificationResult,
};

const DEFAULT_API_BASE: &str = "https://discord.com/api/v10";

/// Permission bits granted in private order channels: view channel, send
/// messages, read message history.
const CHANNEL_MEMBER_ALLOW: u64 = (1 << 10) | (1 << 11) | (1 << 16);
/// Bit denied to @everyone: view channel.
const VIEW_CHANNEL: u64 = 1 << 10;

pub struct DiscordClient {
    client: Client,
    base_url: String,
    token: String,
}

#[derive(Debug, Deserialize)]
struct IdResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct MessageRow {
    id: String,
    author: AuthorRow,
}

#[derive(Debug, Deserialize)]
struct AuthorRow {
    id: String,
}

impl DiscordClient {
    pub fn new(config: &ChatConfig) -> Result<Self, ChatError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        let base_url = config
            .api_base
            .as_deref()
            .unwrap_or(DEFAULT_API_BASE)
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            client,
            base_url,
            token: config.bot_token.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authed(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        req.header("Authorization", format!("Bot {}", self.token))
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, ChatError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ChatError::Api {
                status: status.as_u16(),
                message: body,
            });
        }
        Ok(response)
    }

    fn embed_json(embed: &Embed) -> Value {
        let mut out = json!({});
        if let Some(title) = &embed.title {
            out["title"] = json!(title);
        }
        if let Some(description) = &embed.description {
            out["description"] = json!(description);
        }
        if let Some(color) = embed.color {
            out["color"] = json!(color);
        }
        if !embed.fields.is_empty() {
            out["fields"] = embed
                .fields
                .iter()
                .map(|f| json!({ "name": f.name, "value": f.value, "inline": f.inline }))
                .collect();
        }
        if let Some(url) = &embed.image_url {
            out["image"] = json!({ "url": url });
        }
        if let Some(footer) = &embed.footer {
            out["footer"] = json!({ "text": footer });
        }
        if let Some(ts) = &embed.timestamp {
            out["timestamp"] = json!(ts.to_rfc3339());
        }
        out
    }

    fn button_row(buttons: &[ActionButton]) -> Value {
        let components: Vec<Value> = buttons
            .iter()
            .map(|b| {
                json!({
                    "type": 2,
                    "style": match b.style {
                        ButtonStyle::Primary => 1,
                        ButtonStyle::Success => 3,
                        ButtonStyle::Danger => 4,
                    },
                    "label": b.label,
                    "custom_id": b.custom_id,
                })
            })
            .collect();
        json!({ "type": 1, "components": components })
    }

    fn message_body(
        content: Option<&str>,
        embed: Option<&Embed>,
        buttons: &[ActionButton],
    ) -> Value {
        let mut body = json!({});
        if let Some(content) = content {
            body["content"] = json!(content);
        }
        if let Some(embed) = embed {
            body["embeds"] = json!([Self::embed_json(embed)]);
        }
        if !buttons.is_empty() {
            body["components"] = json!([Self::button_row(buttons)]);
        }
        body
    }

    async fn post_message(&self, channel_id: &str, body: &Value) -> Result<String, ChatError> {
        let response = self
            .authed(
                self.client
                    .post(self.url(&format!("/channels/{channel_id}/messages"))),
            )
            .json(body)
            .send()
            .await?;

        let response = Self::check(response).await?;
        let msg: IdResponse = response
            .json()
            .await
            .map_err(|e| ChatError::Parse(e.to_string()))?;
        Ok(msg.id)
    }

    async fn own_user_id(&self) -> Result<String, ChatError> {
        let response = self
            .authed(self.client.get(self.url("/users/@me")))
            .send()
            .await?;
        let response = Self::check(response).await?;
        let user: IdResponse = response
            .json()
            .await
            .map_err(|e| ChatError::Parse(e.to_string()))?;
        Ok(user.id)
    }
}

#[async_trait]
impl ChatClient for DiscordClient {
    async fn send_message(
        &self,
        channel_id: &str,
        content: Option<&str>,
        embed: Option<Embed>,
        buttons: &[ActionButton],
    ) -> Result<String, ChatError> {
        let body = Self::message_body(content, embed.as_ref(), buttons);
        self.post_message(channel_id, &body).await
    }

    async fn edit_message(
        &self,
        message: &MessageRef,
        embed: Embed,
        clear_buttons: bool,
    ) -> Result<(), ChatError> {
        let mut body = json!({ "embeds": [Self::embed_json(&embed)] });
        if clear_buttons {
            body["components"] = json!([]);
        }

        let response = self
            .authed(self.client.patch(self.url(&format!(
                "/channels/{}/messages/{}",
                message.channel_id, message.message_id
            ))))
            .json(&body)
            .send()
            .await?;

        Self::check(response).await?;
        Ok(())
    }

    async fn delete_message(&self, message: &MessageRef) -> Result<(), ChatError> {
        let response = self
            .authed(self.client.delete(self.url(&format!(
                "/channels/{}/messages/{}",
                message.channel_id, message.message_id
            ))))
            .send()
            .await?;

        Self::check(response).await?;
        Ok(())
    }

    async fn send_dm(&self, user_id: &str, embed: Embed) -> Result<NotificationResult, ChatError> {
        let response = self
            .authed(self.client.post(self.url("/users/@me/channels")))
            .json(&json!({ "recipient_id": user_id }))
            .send()
            .await?;
        let response = Self::check(response).await?;
        let dm: IdResponse = response
            .json()
            .await
            .map_err(|e| ChatError::Parse(e.to_string()))?;

        let body = Self::message_body(None, Some(&embed), &[]);
        match self.post_message(&dm.id, &body).await {
            Ok(_) => Ok(NotificationResult::Delivered),
            // 403 means the user closed their DMs, which is their right.
            Err(ChatError::Api { status: 403, message }) => {
                debug!("DM to {} suppressed: {}", user_id, message);
                Ok(NotificationResult::Suppressed(message))
            }
            Err(e) => Err(e),
        }
    }

    async fn create_private_channel(
        &self,
        guild_id: &str,
        category_id: &str,
        name: &str,
        allow_role_id: &str,
        allow_user_id: &str,
    ) -> Result<String, ChatError> {
        debug!("Creating private channel {} in guild {}", name, guild_id);

        // The @everyone role id equals the guild id.
        let body = json!({
            "name": name,
            "type": 0,
            "parent_id": category_id,
            "permission_overwrites": [
                { "id": guild_id, "type": 0, "deny": VIEW_CHANNEL.to_string() },
                { "id": allow_role_id, "type": 0, "allow": CHANNEL_MEMBER_ALLOW.to_string() },
                { "id": allow_user_id, "type": 1, "allow": CHANNEL_MEMBER_ALLOW.to_string() },
            ],
        });

        let response = self
            .authed(
                self.client
                    .post(self.url(&format!("/guilds/{guild_id}/channels"))),
            )
            .json(&body)
            .send()
            .await?;

        let response = Self::check(response).await?;
        let channel: IdResponse = response
            .json()
            .await
            .map_err(|e| ChatError::Parse(e.to_string()))?;
        Ok(channel.id)
    }

    async fn rename_channel(&self, channel_id: &str, name: &str) -> Result<(), ChatError> {
        let response = self
            .authed(self.client.patch(self.url(&format!("/channels/{channel_id}"))))
            .json(&json!({ "name": name }))
            .send()
            .await?;

        Self::check(response).await?;
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
        let body = json!({
            "type": 9,
            "data": {
                "custom_id": custom_id,
                "title": title,
                "components": [{
                    "type": 1,
                    "components": [{
                        "type": 4,
                        "custom_id": "motivo_texto",
                        "label": label,
                        "style": 2,
                        "max_length": max_length,
                        "required": true,
                    }],
                }],
            },
        });

        let response = self
            .client
            .post(self.url(&format!(
                "/interactions/{}/{}/callback",
                interaction.id, interaction.token
            )))
            .json(&body)
            .send()
            .await?;

        Self::check(response).await?;
        Ok(())
    }

    async fn reply_ephemeral(
        &self,
        interaction: &InteractionRef,
        content: &str,
    ) -> Result<(), ChatError> {
        let body = json!({
            "type": 4,
            "data": { "content": content, "flags": 64 },
        });

        let response = self
            .client
            .post(self.url(&format!(
                "/interactions/{}/{}/callback",
                interaction.id, interaction.token
            )))
            .json(&body)
            .send()
            .await?;

        Self::check(response).await?;
        Ok(())
    }

    async fn fetch_attachment(&self, url: &str) -> Result<Vec<u8>, ChatError> {
        let response = self.client.get(url).send().await?;
        let response = Self::check(response).await?;
        let bytes = response.bytes().await?;
        Ok(bytes.to_vec())
    }

    async fn purge_own_messages(&self, channel_id: &str, limit: u32) -> Result<(), ChatError> {
        let own_id = self.own_user_id().await?;

        let response = self
            .authed(self.client.get(self.url(&format!(
                "/channels/{channel_id}/messages?limit={limit}"
            ))))
            .send()
            .await?;
        let response = Self::check(response).await?;

        let messages: Vec<MessageRow> = response
            .json()
            .await
            .map_err(|e| ChatError::Parse(e.to_string()))?;

        for message in messages.iter().filter(|m| m.author.id == own_id) {
            let target = MessageRef {
                channel_id: channel_id.to_string(),
                message_id: message.id.clone(),
            };
            if let Err(e) = self.delete_message(&target).await {
                warn!("Failed to delete old message {}: {}", message.id, e);
            }
        }

        Ok(())
    }
}
