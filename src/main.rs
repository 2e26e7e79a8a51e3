use std::sync::Arc;

use axum::Router;
use clap::Parser;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ipay_return::config::Config;
use ipay_return::db::{create_pool, init_db, queries, AppState};
use ipay_return::gateway::{GatewayRegistry, IpayGateway};
use ipay_return::handlers;
use ipay_return::models::CreateOrder;
use ipay_return::payments::IpayClient;

#[derive(Parser, Debug)]
#[command(name = "ipay-return")]
#[command(about = "Return-callback reconciliation service for iPay hosted payments")]
struct Cli {
    /// Seed the database with a dev order and payment-reference mapping
    #[arg(long)]
    seed: bool,
}

/// Seeds one pending order plus its payment-reference mapping so the return
/// flow can be exercised end to end against a dev storefront.
fn seed_dev_data(state: &AppState) {
    let conn = state.db.get().expect("Failed to get db connection for seeding");

    let order = queries::create_order(
        &conn,
        &CreateOrder {
            total_cents: 14999,
            currency: "RON".to_string(),
        },
    )
    .expect("Failed to create dev order");

    let payment_reference = format!("dev-{}", &order.id[..8]);
    queries::create_payment_reference(&conn, &payment_reference, &order.id)
        .expect("Failed to create dev payment reference");

    tracing::info!("============================================");
    tracing::info!("DEV DATA SEEDED");
    tracing::info!("============================================");

    println!();
    println!("--- COPY FROM HERE ---");
    println!("  order_id: {}", order.id);
    println!("  order_key: {}", order.order_key);
    println!("  payment_reference: {}", payment_reference);
    println!("  return_url: /payment/return?orderId={}&token=dev", payment_reference);
    println!("--- END COPY ---");
    println!();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ipay_return=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();

    if config.dev_mode {
        tracing::info!("Running in DEVELOPMENT mode");
    }

    let db_pool = create_pool(&config.database_path).expect("Failed to create database pool");
    {
        let conn = db_pool.get().expect("Failed to get connection");
        init_db(&conn).expect("Failed to initialize database");
    }

    let mut gateways = GatewayRegistry::new();
    gateways.register(Arc::new(IpayGateway::new(config.order_received_url.clone())));

    let state = AppState {
        db: db_pool,
        checkout_url: config.checkout_url.clone(),
        status_source: Arc::new(IpayClient::new(&config.ipay)),
        gateways: Arc::new(gateways),
    };

    if cli.seed {
        if !config.dev_mode {
            tracing::warn!("--seed flag ignored: not in dev mode (set IPAY_RETURN_ENV=dev)");
        } else {
            seed_dev_data(&state);
        }
    }

    let app = Router::new()
        .merge(handlers::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("iPay return service listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Failed to start server");
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received, stopping server...");
}
