use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Audit event types
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuditEvent {
    // System events
    ServiceStarted {
        version: String,
        config_hash: String,
    },
    ServiceStopped {
        reason: String,
    },

    // Submission lifecycle
    /// A receipt passed validation and its decision card was posted.
    ReceiptSubmitted {
        order_id: String,
        user_id: String,
        plan: String,
        receipt_path: String,
    },
    /// A submission was turned away before reaching moderators.
    SubmissionRefused {
        user_id: String,
        reason: String,
    },

    // Decision lifecycle
    OrderApproved {
        order_id: String,
        number: i64,
        user_id: String,
        moderator_id: String,
        channel_id: String,
        plan: String,
    },
    OrderRejected {
        order_id: String,
        user_id: String,
        moderator_id: String,
        reason: String,
        plan: String,
    },
    OrderClosed {
        order_id: String,
        number: i64,
        closed_by: String,
    },

    /// Someone without the moderator role tried a privileged action.
    AuthorizationRefused {
        user_id: String,
        action: String,
    },
}

impl AuditEvent {
    /// Returns the event type as a string for storage
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::ServiceStarted { .. } => "service_started",
            Self::ServiceStopped { .. } => "service_stopped",
            Self::ReceiptSubmitted { .. } => "receipt_submitted",
            Self::SubmissionRefused { .. } => "submission_refused",
            Self::OrderApproved { .. } => "order_approved",
            Self::OrderRejected { .. } => "order_rejected",
            Self::OrderClosed { .. } => "order_closed",
            Self::AuthorizationRefused { .. } => "authorization_refused",
        }
    }

    /// Extract order_id if this event is order-related
    pub fn order_id(&self) -> Option<&str> {
        match self {
            Self::ReceiptSubmitted { order_id, .. }
            | Self::OrderApproved { order_id, .. }
            | Self::OrderRejected { order_id, .. }
            | Self::OrderClosed { order_id, .. } => Some(order_id),
            _ => None,
        }
    }

    /// Extract the acting user, customer or moderator depending on the event
    pub fn user_id(&self) -> Option<&str> {
        match self {
            Self::ReceiptSubmitted { user_id, .. }
            | Self::SubmissionRefused { user_id, .. }
            | Self::AuthorizationRefused { user_id, .. } => Some(user_id),
            Self::OrderApproved { moderator_id, .. }
            | Self::OrderRejected { moderator_id, .. } => Some(moderator_id),
            Self::OrderClosed { closed_by, .. } => Some(closed_by),
            _ => None,
        }
    }
}

/// A stored audit record with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub event_type: String,
    pub order_id: Option<String>,
    pub user_id: Option<String>,
    pub data: AuditEvent,
}
