use rusqlite::Connection;

/// Initialize the database schema.
pub fn init_db(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        -- Merchant orders. Paid/failed state is only ever flipped by the
        -- reconciliation queries, which are guarded compare-and-swap updates.
        CREATE TABLE IF NOT EXISTS orders (
            id TEXT PRIMARY KEY,
            order_key TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'pending'
                CHECK (status IN ('pending', 'paid', 'failed')),
            total_cents INTEGER NOT NULL,
            currency TEXT NOT NULL,
            payment_reference TEXT,
            failure_reason TEXT,
            created_at INTEGER NOT NULL,
            paid_at INTEGER
        );

        -- Provider payment reference -> local order. Written once at
        -- payment-initiation time, read-only on return.
        CREATE TABLE IF NOT EXISTS payment_references (
            payment_reference TEXT PRIMARY KEY,
            order_id TEXT NOT NULL REFERENCES orders(id) ON DELETE CASCADE,
            created_at INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_payment_references_order
            ON payment_references(order_id);
        "#,
    )
}
