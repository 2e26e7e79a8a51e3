//! Payment-method gateways and the registry they are looked up in.

use std::sync::Arc;

use crate::models::Order;

/// Identifier of the gateway this return flow settles payments for.
pub const GATEWAY_ID: &str = "ipay";

/// A registered payment-method handler, responsible for the canonical
/// post-payment URLs of an order.
pub trait Gateway: Send + Sync {
    fn id(&self) -> &str;

    /// The order-received page the shopper lands on after a successful
    /// payment.
    fn return_url(&self, order: &Order) -> String;
}

/// Read-only registry of gateways, injected into the app state instead of
/// being reached through ambient globals. Content is managed at startup.
#[derive(Default)]
pub struct GatewayRegistry {
    gateways: Vec<Arc<dyn Gateway>>,
}

impl GatewayRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, gateway: Arc<dyn Gateway>) {
        self.gateways.push(gateway);
    }

    /// Zero or one match expected.
    pub fn lookup(&self, id: &str) -> Option<Arc<dyn Gateway>> {
        self.gateways.iter().find(|g| g.id() == id).cloned()
    }
}

/// The iPay gateway: builds order-received URLs under the storefront base.
pub struct IpayGateway {
    order_received_url: String,
}

impl IpayGateway {
    pub fn new(order_received_url: impl Into<String>) -> Self {
        Self {
            order_received_url: order_received_url.into(),
        }
    }
}

impl Gateway for IpayGateway {
    fn id(&self) -> &str {
        GATEWAY_ID
    }

    fn return_url(&self, order: &Order) -> String {
        format!(
            "{}/order-received/{}?key={}",
            self.order_received_url.trim_end_matches('/'),
            order.id,
            order.order_key
        )
    }
}
