use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;
use pagbot_core::SanitizedConfig;

use crate::state::AppState;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Plain-text liveness line, what uptime monitors hit.
pub async fn root() -> &'static str {
    "✅ Bot de Pagamentos Unibot está rodando com sucesso!"
}

#[derive(Serialize)]
pub struct StatusResponse {
    pub status: String,
    pub bot: String,
    pub version: String,
}

pub async fn status() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "online".to_string(),
        bot: "Unibot Pagamentos".to_string(),
        version: VERSION.to_string(),
    })
}

pub async fn get_config(State(state): State<Arc<AppState>>) -> Json<SanitizedConfig> {
    Json(state.sanitized_config())
}
