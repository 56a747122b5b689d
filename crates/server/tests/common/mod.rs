//! Common test utilities for driving the server in-process with mocks.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use pagbot_core::audit::AuditStore;
use pagbot_core::testing::{MemoryOrderStore, MemoryReceiptStore, MockChatClient};
use pagbot_core::{
    create_audit_system, load_config_from_str, OrderWorkflow, SqliteAuditStore, WorkflowConfig,
};
use pagbot_server::api::create_router;
use pagbot_server::state::AppState;

/// Channel and role ids used by [`test_config_toml`].
pub const RECEIPTS_CHANNEL: &str = "100";
pub const MOD_CHANNEL: &str = "200";
pub const MOD_ROLE: &str = "500";

fn test_config_toml() -> &'static str {
    r#"
[chat]
bot_token = "test-token"
guild_id = "guild-1"
receipts_channel_id = "100"
mod_channel_id = "200"
log_channel_id = "300"
orders_category_id = "400"
mod_role_id = "500"

[store]
url = "https://example.supabase.co"
api_key = "test-key"
"#
}

/// In-process server over mock collaborators.
pub struct TestServer {
    pub router: Router,
    pub store: Arc<MemoryOrderStore>,
    pub chat: Arc<MockChatClient>,
    pub receipts: Arc<MemoryReceiptStore>,
}

impl TestServer {
    pub fn new() -> Self {
        let config = load_config_from_str(test_config_toml()).unwrap();

        let store = Arc::new(MemoryOrderStore::new());
        let chat = Arc::new(MockChatClient::new());
        let receipts = Arc::new(MemoryReceiptStore::new());

        let audit_store: Arc<dyn AuditStore> = Arc::new(SqliteAuditStore::in_memory().unwrap());
        let (audit, writer) = create_audit_system(Arc::clone(&audit_store), 64);
        tokio::spawn(writer.run());

        let workflow = Arc::new(OrderWorkflow::new(
            store.clone(),
            chat.clone(),
            receipts.clone(),
            audit,
            WorkflowConfig::from(&config),
        ));

        let state = Arc::new(AppState::new(config, workflow, chat.clone(), audit_store));
        let router = create_router(state);

        Self {
            router,
            store,
            chat,
            receipts,
        }
    }

    pub async fn get(&self, path: &str) -> (StatusCode, Value) {
        let response = self
            .router
            .clone()
            .oneshot(
                Request::builder()
                    .uri(path)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        Self::parse(response).await
    }

    pub async fn get_text(&self, path: &str) -> (StatusCode, String) {
        let response = self
            .router
            .clone()
            .oneshot(
                Request::builder()
                    .uri(path)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    pub async fn post_event(&self, event: Value) -> (StatusCode, Value) {
        let response = self
            .router
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/events")
                    .header("content-type", "application/json")
                    .body(Body::from(event.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        Self::parse(response).await
    }

    async fn parse(response: axum::response::Response) -> (StatusCode, Value) {
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }
}

/// Author payload for a customer with no roles.
pub fn customer_author(id: &str) -> Value {
    json!({ "id": id, "display_name": format!("user-{id}"), "roles": [] })
}

/// Author payload for a moderator.
pub fn moderator_author(id: &str) -> Value {
    json!({ "id": id, "display_name": format!("mod-{id}"), "roles": [MOD_ROLE] })
}

/// A `message_command` event posted in the receipts channel.
pub fn pago_event(author: Value, content: &str) -> Value {
    json!({
        "type": "message_command",
        "channel_id": RECEIPTS_CHANNEL,
        "message_id": "msg-submission",
        "author": author,
        "content": content,
        "attachments": [
            { "filename": "comprovante.png", "url": "https://cdn.example/comprovante.png" }
        ],
    })
}

/// A `button_click` event on the decision card.
pub fn button_event(author: Value, custom_id: &str, card_message_id: &str) -> Value {
    json!({
        "type": "button_click",
        "custom_id": custom_id,
        "interaction_id": "interaction-1",
        "interaction_token": "token-1",
        "channel_id": MOD_CHANNEL,
        "message_id": card_message_id,
        "author": author,
    })
}

/// A `modal_submit` event carrying the rejection reason.
pub fn modal_event(author: Value, custom_id: &str, card_message_id: &str, value: &str) -> Value {
    json!({
        "type": "modal_submit",
        "custom_id": custom_id,
        "value": value,
        "interaction_id": "interaction-2",
        "interaction_token": "token-2",
        "channel_id": MOD_CHANNEL,
        "message_id": card_message_id,
        "author": author,
    })
}
