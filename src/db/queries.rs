use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use crate::error::Result;
use crate::models::{CreateOrder, Order, OrderStatus, PaymentReferenceMapping};

fn now() -> i64 {
    Utc::now().timestamp()
}

fn gen_id() -> String {
    Uuid::new_v4().to_string()
}

const ORDER_COLS: &str = "id, order_key, status, total_cents, currency, \
     payment_reference, failure_reason, created_at, paid_at";

fn order_from_row(row: &Row<'_>) -> rusqlite::Result<Order> {
    let status: String = row.get(2)?;
    let status = OrderStatus::parse(&status).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            2,
            rusqlite::types::Type::Text,
            format!("unknown order status `{status}`").into(),
        )
    })?;
    Ok(Order {
        id: row.get(0)?,
        order_key: row.get(1)?,
        status,
        total_cents: row.get(3)?,
        currency: row.get(4)?,
        payment_reference: row.get(5)?,
        failure_reason: row.get(6)?,
        created_at: row.get(7)?,
        paid_at: row.get(8)?,
    })
}

pub fn create_order(conn: &Connection, input: &CreateOrder) -> Result<Order> {
    let id = gen_id();
    let order_key = gen_id();
    let created_at = now();
    conn.execute(
        "INSERT INTO orders (id, order_key, status, total_cents, currency, created_at)
         VALUES (?1, ?2, 'pending', ?3, ?4, ?5)",
        params![id, order_key, input.total_cents, input.currency, created_at],
    )?;
    Ok(Order {
        id,
        order_key,
        status: OrderStatus::Pending,
        total_cents: input.total_cents,
        currency: input.currency.clone(),
        payment_reference: None,
        failure_reason: None,
        created_at,
        paid_at: None,
    })
}

pub fn get_order_by_id(conn: &Connection, id: &str) -> Result<Option<Order>> {
    let order = conn
        .query_row(
            &format!("SELECT {ORDER_COLS} FROM orders WHERE id = ?1"),
            params![id],
            order_from_row,
        )
        .optional()?;
    Ok(order)
}

/// Record the mapping from a provider payment reference to a local order.
/// Called at payment-initiation time (and from seeding/tests); the return
/// flow itself never writes here.
pub fn create_payment_reference(
    conn: &Connection,
    payment_reference: &str,
    order_id: &str,
) -> Result<PaymentReferenceMapping> {
    let created_at = now();
    conn.execute(
        "INSERT INTO payment_references (payment_reference, order_id, created_at)
         VALUES (?1, ?2, ?3)",
        params![payment_reference, order_id, created_at],
    )?;
    Ok(PaymentReferenceMapping {
        payment_reference: payment_reference.to_string(),
        order_id: order_id.to_string(),
        created_at,
    })
}

pub fn find_payment_reference(
    conn: &Connection,
    payment_reference: &str,
) -> Result<Option<PaymentReferenceMapping>> {
    let mapping = conn
        .query_row(
            "SELECT payment_reference, order_id, created_at
             FROM payment_references WHERE payment_reference = ?1",
            params![payment_reference],
            |row| {
                Ok(PaymentReferenceMapping {
                    payment_reference: row.get(0)?,
                    order_id: row.get(1)?,
                    created_at: row.get(2)?,
                })
            },
        )
        .optional()?;
    Ok(mapping)
}

/// Atomically mark an order paid, returning whether this call did the marking.
///
/// Uses compare-and-swap so that concurrent duplicate callbacks for the same
/// payment reference cannot double-apply side effects:
/// - `Ok(true)` if this call transitioned the order to paid
/// - `Ok(false)` if the order was already paid (no-op)
pub fn mark_order_paid(conn: &Connection, id: &str, payment_reference: &str) -> Result<bool> {
    let affected = conn.execute(
        "UPDATE orders
         SET status = 'paid', paid_at = ?1, payment_reference = ?2, failure_reason = NULL
         WHERE id = ?3 AND status != 'paid'",
        params![now(), payment_reference, id],
    )?;
    Ok(affected > 0)
}

/// Mark an order failed, keeping the provider's decline reason.
/// Never demotes a paid order. Re-marking a failed order with the same
/// reason is a no-op in effect.
pub fn mark_order_failed(conn: &Connection, id: &str, reason: &str) -> Result<bool> {
    let affected = conn.execute(
        "UPDATE orders
         SET status = 'failed', failure_reason = ?1
         WHERE id = ?2 AND status != 'paid'",
        params![reason, id],
    )?;
    Ok(affected > 0)
}
