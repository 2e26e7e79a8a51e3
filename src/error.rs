use thiserror::Error;

/// Everything that can go wrong while processing a payment return.
///
/// All variants are caught at the return handler boundary and converted into
/// a failure redirect; none of them escape to the transport layer.
#[derive(Error, Debug)]
pub enum ReturnError {
    /// The callback is missing a required parameter.
    #[error("Invalid return `{0}`")]
    Validation(&'static str),

    /// No payment-reference mapping (or no order behind it). This is an
    /// expected business state, not a storage fault.
    #[error("Could not find order data")]
    OrderNotFound,

    /// The persistence layer itself is unreachable or corrupt.
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// Could not even get a connection from the pool. Same user-facing
    /// class as `Storage`.
    #[error("Storage error: {0}")]
    Pool(#[from] r2d2::Error),

    /// The provider's status call failed (network, auth, or a response we
    /// could not make sense of).
    #[error("Payment provider error: {0}")]
    Provider(String),

    /// The status record is inconsistent with the order it claims to settle.
    #[error("Payment could not be reconciled: {0}")]
    Reconciliation(String),
}

impl ReturnError {
    /// The notice shown to the shopper on the page they are redirected to.
    ///
    /// Storage-class failures get a fixed generic message; everything else
    /// surfaces its own (non-sensitive) message.
    pub fn user_message(&self) -> String {
        match self {
            ReturnError::Storage(_) | ReturnError::Pool(_) => {
                "Cannot process payment data.".to_string()
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ReturnError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_failures_get_the_fixed_notice() {
        let err = ReturnError::Storage(rusqlite::Error::InvalidQuery);
        assert_eq!(err.user_message(), "Cannot process payment data.");
        assert!(
            !err.user_message().contains("query"),
            "must not leak the underlying storage detail"
        );
    }

    #[test]
    fn other_failures_surface_their_own_message() {
        assert_eq!(
            ReturnError::Validation("orderId").user_message(),
            "Invalid return `orderId`"
        );
        assert_eq!(
            ReturnError::OrderNotFound.user_message(),
            "Could not find order data"
        );
        assert_eq!(
            ReturnError::Provider("connection timed out".into()).user_message(),
            "Payment provider error: connection timed out"
        );
        assert_eq!(
            ReturnError::Reconciliation("reference mismatch".into()).user_message(),
            "Payment could not be reconciled: reference mismatch"
        );
    }
}
