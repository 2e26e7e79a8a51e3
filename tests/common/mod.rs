//! Test utilities and fixtures for the return-flow integration tests

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;
use tower::ServiceExt;

pub use ipay_return::db::{init_db, queries, AppState, DbPool};
pub use ipay_return::error::{ReturnError, Result};
pub use ipay_return::gateway::{GatewayRegistry, IpayGateway};
pub use ipay_return::handlers;
pub use ipay_return::models::*;
pub use ipay_return::payments::{PaymentState, PaymentStatusRecord, StatusSource};

pub const CHECKOUT_URL: &str = "http://localhost:8080/checkout";
pub const STORE_URL: &str = "https://shop.example.com";

/// What the scripted provider double should answer with.
pub enum Script {
    Captured,
    Declined(&'static str),
    Pending,
    Fail(&'static str),
}

/// Provider double that plays a fixed script and counts invocations, so
/// tests can prove the provider was (or was not) called.
pub struct ScriptedStatusSource {
    script: Script,
    calls: AtomicUsize,
}

impl ScriptedStatusSource {
    pub fn new(script: Script) -> Arc<Self> {
        Arc::new(Self {
            script,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StatusSource for ScriptedStatusSource {
    async fn fetch_status(&self, payment_reference: &str) -> Result<PaymentStatusRecord> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.script {
            Script::Fail(msg) => Err(ReturnError::Provider(msg.to_string())),
            Script::Captured => Ok(status_record(payment_reference, PaymentState::Captured, None)),
            Script::Declined(reason) => Ok(status_record(
                payment_reference,
                PaymentState::Declined,
                Some(reason.to_string()),
            )),
            Script::Pending => Ok(status_record(payment_reference, PaymentState::Pending, None)),
        }
    }
}

pub fn status_record(
    payment_reference: &str,
    state: PaymentState,
    decline_reason: Option<String>,
) -> PaymentStatusRecord {
    PaymentStatusRecord {
        payment_reference: payment_reference.to_string(),
        order_number: None,
        state,
        amount_cents: Some(5000),
        currency: Some("RON".to_string()),
        decline_reason,
    }
}

/// Create an in-memory test database with schema initialized.
pub fn setup_test_db() -> Connection {
    let conn = Connection::open_in_memory().expect("Failed to create in-memory database");
    init_db(&conn).expect("Failed to initialize schema");
    conn
}

/// Create an AppState for testing with an in-memory database.
///
/// `max_size(1)` keeps every pool checkout on the same in-memory connection;
/// the return flow only ever holds one connection at a time.
pub fn create_test_app_state(source: Arc<ScriptedStatusSource>, with_gateway: bool) -> AppState {
    let manager = SqliteConnectionManager::memory();
    let pool = Pool::builder().max_size(1).build(manager).unwrap();
    {
        let conn = pool.get().unwrap();
        init_db(&conn).unwrap();
    }

    let mut gateways = GatewayRegistry::new();
    if with_gateway {
        gateways.register(Arc::new(IpayGateway::new(STORE_URL)));
    }

    AppState {
        db: pool,
        checkout_url: CHECKOUT_URL.to_string(),
        status_source: source,
        gateways: Arc::new(gateways),
    }
}

/// Create a Router with the return-flow endpoints.
pub fn return_app(state: AppState) -> Router {
    handlers::router().with_state(state)
}

/// Create a pending test order.
pub fn create_test_order(conn: &Connection) -> Order {
    queries::create_order(
        conn,
        &CreateOrder {
            total_cents: 5000,
            currency: "RON".to_string(),
        },
    )
    .expect("Failed to create test order")
}

/// Map a provider payment reference to an order.
pub fn map_reference(conn: &Connection, payment_reference: &str, order_id: &str) {
    queries::create_payment_reference(conn, payment_reference, order_id)
        .expect("Failed to create test payment reference");
}

pub fn get_order(conn: &Connection, id: &str) -> Order {
    queries::get_order_by_id(conn, id)
        .expect("Failed to load order")
        .expect("Order not found")
}

/// Drive one return callback through the app and capture the redirect.
pub async fn get_redirect(app: Router, uri: &str) -> (StatusCode, String) {
    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let location = response
        .headers()
        .get("location")
        .map(|v| v.to_str().unwrap().to_string())
        .unwrap_or_default();
    (status, location)
}
