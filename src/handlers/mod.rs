mod return_flow;

pub use return_flow::*;

use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::db::AppState;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        // The provider redirects the shopper back here; some integrations
        // use GET, some POST, so both are accepted.
        .route("/payment/return", get(payment_return).post(payment_return))
}
