//! Read-only audit trail endpoint.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use pagbot_core::audit::AuditQuery;
use pagbot_core::AuditRecord;

use crate::state::AppState;

const MAX_LIMIT: i64 = 1000;
const DEFAULT_LIMIT: i64 = 100;

/// Query string accepted by `GET /audit`. Timestamps are RFC 3339.
#[derive(Debug, Deserialize)]
pub struct AuditQueryParams {
    pub order_id: Option<String>,
    pub event_type: Option<String>,
    pub user_id: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl AuditQueryParams {
    fn into_query(self) -> AuditQuery {
        AuditQuery {
            order_id: self.order_id,
            event_type: self.event_type,
            user_id: self.user_id,
            from: self.from,
            to: self.to,
            limit: self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT),
            offset: self.offset.unwrap_or(0).max(0),
        }
    }
}

/// One page of the trail plus the unpaged total.
#[derive(Debug, Serialize)]
pub struct AuditQueryResponse {
    pub events: Vec<AuditRecord>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

#[derive(Debug, Serialize)]
pub struct AuditErrorResponse {
    pub error: String,
}

pub async fn query_audit(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AuditQueryParams>,
) -> Result<Json<AuditQueryResponse>, (StatusCode, Json<AuditErrorResponse>)> {
    let query = params.into_query();

    let events = state.audit_store().query(&query).map_err(storage_error)?;
    let total = state.audit_store().count(&query).map_err(storage_error)?;

    Ok(Json(AuditQueryResponse {
        events,
        total,
        limit: query.limit,
        offset: query.offset,
    }))
}

fn storage_error(e: pagbot_core::audit::AuditError) -> (StatusCode, Json<AuditErrorResponse>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(AuditErrorResponse {
            error: format!("Audit query failed: {e}"),
        }),
    )
}
