use serde::{Deserialize, Serialize};

/// Correlates a provider payment reference with a local order.
/// Created at payment-initiation time; the return flow only reads it.
/// At most one mapping exists per payment reference, and absence is an
/// expected state (the payment never reached the provider).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentReferenceMapping {
    pub payment_reference: String,
    pub order_id: String,
    pub created_at: i64,
}
