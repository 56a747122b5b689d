//! Core order data types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Subscription plan a customer pays for.
///
/// The wire string for `Professional` is the Portuguese "Profissional",
/// matching what the store and the customer-facing messages use.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Plan {
    #[serde(rename = "Starter")]
    Starter,
    #[serde(rename = "Profissional")]
    Professional,
}

impl Plan {
    /// Parse a plan from user input, case-insensitively.
    /// Accepts "starter", "professional" and the Portuguese "profissional".
    pub fn parse(input: &str) -> Option<Self> {
        match input.to_lowercase().as_str() {
            "starter" => Some(Plan::Starter),
            "professional" | "profissional" => Some(Plan::Professional),
            _ => None,
        }
    }

    /// Wire/display string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Plan::Starter => "Starter",
            Plan::Professional => "Profissional",
        }
    }
}

impl std::fmt::Display for Plan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decision state of an order.
///
/// A pending submission is never persisted; only decided orders get a row.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum OrderStatus {
    #[serde(rename = "aceito")]
    Accepted,
    #[serde(rename = "reprovado")]
    Rejected,
    #[serde(rename = "fechado")]
    Closed,
}

impl OrderStatus {
    /// Parse a status from user input, case-insensitively.
    pub fn parse(input: &str) -> Option<Self> {
        match input.to_lowercase().as_str() {
            "aceito" => Some(OrderStatus::Accepted),
            "reprovado" => Some(OrderStatus::Rejected),
            "fechado" => Some(OrderStatus::Closed),
            _ => None,
        }
    }

    /// Wire string, as stored in the `status` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Accepted => "aceito",
            OrderStatus::Rejected => "reprovado",
            OrderStatus::Closed => "fechado",
        }
    }

    /// Emoji used in customer-facing embeds.
    pub fn emoji(&self) -> &'static str {
        match self {
            OrderStatus::Accepted => "✅",
            OrderStatus::Rejected => "❌",
            OrderStatus::Closed => "🔒",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A decided order, as stored in the `pedidos` table.
///
/// Field names map to the store's column names via serde renames.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    /// Customer-supplied order identifier.
    #[serde(rename = "pedido_id")]
    pub order_id: String,

    /// Customer user id.
    #[serde(rename = "user_id")]
    pub user_id: String,

    /// Sequence number, assigned exactly once on approval. Rejected orders
    /// never have one.
    #[serde(rename = "pedido_number", default)]
    pub number: Option<i64>,

    #[serde(rename = "plano")]
    pub plan: Plan,

    pub status: OrderStatus,

    #[serde(rename = "moderador_id")]
    pub moderator_id: String,

    #[serde(rename = "moderador_nome")]
    pub moderator_name: String,

    /// Private order channel, created on approval.
    #[serde(rename = "canal_id", default, skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<String>,

    /// Local path of the stored receipt file.
    #[serde(rename = "comprovante_path")]
    pub receipt_path: String,

    /// Verbatim rejection reason, present only on rejected orders.
    #[serde(
        rename = "motivo_reprovacao",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub rejection_reason: Option<String>,

    /// When the decision was recorded.
    pub timestamp: DateTime<Utc>,

    #[serde(rename = "fechado_em", default, skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<DateTime<Utc>>,

    #[serde(
        rename = "fechado_por",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub closed_by: Option<String>,
}

/// Row to insert when a decision is made.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NewOrder {
    #[serde(rename = "pedido_id")]
    pub order_id: String,
    #[serde(rename = "user_id")]
    pub user_id: String,
    #[serde(rename = "pedido_number")]
    pub number: Option<i64>,
    #[serde(rename = "plano")]
    pub plan: Plan,
    pub status: OrderStatus,
    #[serde(rename = "moderador_id")]
    pub moderator_id: String,
    #[serde(rename = "moderador_nome")]
    pub moderator_name: String,
    #[serde(rename = "canal_id", skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<String>,
    #[serde(rename = "comprovante_path")]
    pub receipt_path: String,
    #[serde(rename = "motivo_reprovacao", skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl NewOrder {
    /// Row for an approved order: carries the assigned number and channel.
    #[allow(clippy::too_many_arguments)]
    pub fn accepted(
        order_id: impl Into<String>,
        user_id: impl Into<String>,
        number: i64,
        plan: Plan,
        moderator_id: impl Into<String>,
        moderator_name: impl Into<String>,
        channel_id: impl Into<String>,
        receipt_path: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            order_id: order_id.into(),
            user_id: user_id.into(),
            number: Some(number),
            plan,
            status: OrderStatus::Accepted,
            moderator_id: moderator_id.into(),
            moderator_name: moderator_name.into(),
            channel_id: Some(channel_id.into()),
            receipt_path: receipt_path.into(),
            rejection_reason: None,
            timestamp,
        }
    }

    /// Row for a rejected order: no number, no channel, verbatim reason.
    pub fn rejected(
        order_id: impl Into<String>,
        user_id: impl Into<String>,
        plan: Plan,
        moderator_id: impl Into<String>,
        moderator_name: impl Into<String>,
        reason: impl Into<String>,
        receipt_path: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            order_id: order_id.into(),
            user_id: user_id.into(),
            number: None,
            plan,
            status: OrderStatus::Rejected,
            moderator_id: moderator_id.into(),
            moderator_name: moderator_name.into(),
            channel_id: None,
            receipt_path: receipt_path.into(),
            rejection_reason: Some(reason.into()),
            timestamp,
        }
    }
}
