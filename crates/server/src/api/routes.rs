use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::{audit, events, handlers};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Liveness endpoints, hit by uptime monitors and the keepalive ping
        .route("/", get(handlers::root))
        .route("/status", get(handlers::status))
        .route("/config", get(handlers::get_config))
        // Audit trail
        .route("/audit", get(audit::query_audit))
        // Inbound chat events from the gateway connector
        .route("/events", post(events::handle_event))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
