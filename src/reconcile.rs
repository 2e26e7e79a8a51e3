//! Applies a provider status record to local order state, idempotently.

use rusqlite::Connection;

use crate::db::queries;
use crate::error::{ReturnError, Result};
use crate::models::{Order, OrderStatus};
use crate::payments::{PaymentState, PaymentStatusRecord};

/// What reconciliation decided, so the router can pick a destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Order is paid (either by this call or by an earlier one).
    Paid,
    /// Order is failed; carries the provider's decline reason.
    Failed(String),
    /// Payment still in flight; nothing was mutated.
    Pending,
}

/// Reconcile the provider's status record against the order.
///
/// Idempotent: the state transitions are compare-and-swap updates, so a
/// duplicate callback for the same payment reference re-observes the final
/// state instead of re-applying side effects.
pub fn reconcile(
    conn: &Connection,
    record: &PaymentStatusRecord,
    order: &Order,
    payment_reference: &str,
) -> Result<ReconcileOutcome> {
    if record.payment_reference != payment_reference {
        return Err(ReturnError::Reconciliation(format!(
            "status record is for payment `{}`, callback carried `{}`",
            record.payment_reference, payment_reference
        )));
    }

    // A stale callback can carry a reference from an older payment attempt
    // against the same order.
    if let Some(recorded) = order.payment_reference.as_deref() {
        if recorded != payment_reference {
            return Err(ReturnError::Reconciliation(format!(
                "order {} was settled under payment `{recorded}`, not `{payment_reference}`",
                order.id
            )));
        }
    }

    match record.state {
        PaymentState::Captured => {
            let marked = queries::mark_order_paid(conn, &order.id, payment_reference)?;
            if !marked {
                tracing::debug!(order_id = %order.id, "order already paid, no-op");
            }
            Ok(ReconcileOutcome::Paid)
        }
        PaymentState::Declined => {
            let reason = record
                .decline_reason
                .clone()
                .unwrap_or_else(|| "Payment was declined.".to_string());
            if order.status == OrderStatus::Paid {
                // Never demote a paid order on a late decline record.
                tracing::warn!(
                    order_id = %order.id,
                    "declined status for already-paid order, keeping paid state"
                );
                return Ok(ReconcileOutcome::Paid);
            }
            queries::mark_order_failed(conn, &order.id, &reason)?;
            Ok(ReconcileOutcome::Failed(reason))
        }
        PaymentState::Pending => Ok(ReconcileOutcome::Pending),
    }
}
