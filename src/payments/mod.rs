mod ipay;

pub use ipay::IpayClient;

use async_trait::async_trait;

use crate::error::Result;

/// Outcome of a payment attempt as reported by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentState {
    /// Funds were captured; the order can be marked paid.
    Captured,
    /// The payment was declined, reversed, or refunded before return.
    Declined,
    /// The payment is still in flight (registered, authorized, in 3DS).
    Pending,
}

/// The provider's authoritative record of one payment attempt.
/// Retrieved per request and discarded; never persisted.
#[derive(Debug, Clone)]
pub struct PaymentStatusRecord {
    /// The provider payment reference this record describes. Must match the
    /// reference the callback carried.
    pub payment_reference: String,
    /// The merchant order number the provider has on file, if any.
    pub order_number: Option<String>,
    pub state: PaymentState,
    pub amount_cents: Option<i64>,
    pub currency: Option<String>,
    /// Human-readable decline reason from the provider.
    pub decline_reason: Option<String>,
}

/// Where authoritative payment status comes from. The production
/// implementation is [`IpayClient`]; tests inject a scripted double.
///
/// Failures of any kind (network, auth, unparseable response) surface as
/// `ReturnError::Provider`. No retries happen at this seam.
#[async_trait]
pub trait StatusSource: Send + Sync {
    async fn fetch_status(&self, payment_reference: &str) -> Result<PaymentStatusRecord>;
}
