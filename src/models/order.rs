use serde::{Deserialize, Serialize};

/// Lifecycle state of a merchant order as far as payment is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Paid,
    Failed,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Paid => "paid",
            OrderStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(OrderStatus::Pending),
            "paid" => Some(OrderStatus::Paid),
            "failed" => Some(OrderStatus::Failed),
            _ => None,
        }
    }
}

/// A merchant order. Owned by the order subsystem; the return flow reads it
/// and mutates paid/failed state only through the reconciliation queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    /// Opaque key carried in pay/return URLs so an order URL cannot be
    /// guessed from the order id alone.
    pub order_key: String,
    pub status: OrderStatus,
    pub total_cents: i64,
    pub currency: String,
    /// Provider payment reference recorded when the order was first settled.
    pub payment_reference: Option<String>,
    /// Provider decline reason, kept for display and logging.
    pub failure_reason: Option<String>,
    pub created_at: i64,
    pub paid_at: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct CreateOrder {
    pub total_cents: i64,
    pub currency: String,
}
