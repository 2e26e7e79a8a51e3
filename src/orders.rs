//! Order resolution: provider payment reference -> local order handle.

use rusqlite::Connection;

use crate::db::queries;
use crate::error::{ReturnError, Result};
use crate::models::Order;

/// Handle over a resolved order, carrying enough context to build the
/// order's own URLs without going back to the store.
pub struct OrderService {
    order: Order,
    checkout_url: String,
}

impl OrderService {
    pub fn order(&self) -> &Order {
        &self.order
    }

    /// The order's payment-retry page, used as the failure redirect target
    /// whenever the order is known.
    pub fn payment_url(&self) -> String {
        format!(
            "{}/order-pay/{}?key={}",
            self.checkout_url.trim_end_matches('/'),
            self.order.id,
            self.order.order_key
        )
    }
}

/// Resolve a provider payment reference to its local order.
///
/// A missing mapping and a missing order both come back as `OrderNotFound`;
/// a failing store propagates as a storage error, which is deliberately a
/// different class.
pub fn resolve(
    conn: &Connection,
    payment_reference: &str,
    checkout_url: &str,
) -> Result<OrderService> {
    let mapping = queries::find_payment_reference(conn, payment_reference)?
        .ok_or(ReturnError::OrderNotFound)?;

    let order =
        queries::get_order_by_id(conn, &mapping.order_id)?.ok_or(ReturnError::OrderNotFound)?;

    Ok(OrderService {
        order,
        checkout_url: checkout_url.to_string(),
    })
}
