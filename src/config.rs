use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_path: String,
    /// Generic checkout page, the redirect target of last resort.
    pub checkout_url: String,
    /// Storefront base for order-received URLs.
    pub order_received_url: String,
    pub ipay: IpayConfig,
    pub dev_mode: bool,
}

#[derive(Debug, Clone)]
pub struct IpayConfig {
    pub api_url: String,
    pub user_name: String,
    pub password: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let dev_mode = env::var("IPAY_RETURN_ENV")
            .map(|v| v == "dev" || v == "development")
            .unwrap_or(false);

        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port: u16 = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3000);

        let checkout_url =
            env::var("CHECKOUT_URL").unwrap_or_else(|_| "http://localhost:8080/checkout".to_string());

        // Defaults to the checkout host; the storefront usually serves both.
        let order_received_url =
            env::var("ORDER_RECEIVED_URL").unwrap_or_else(|_| checkout_url.clone());

        Self {
            host,
            port,
            database_path: env::var("DATABASE_PATH").unwrap_or_else(|_| "ipay_return.db".to_string()),
            checkout_url,
            order_received_url,
            ipay: IpayConfig {
                api_url: env::var("IPAY_API_URL")
                    .unwrap_or_else(|_| "https://ecclients.btrl.ro/payment/rest".to_string()),
                user_name: env::var("IPAY_USER").unwrap_or_default(),
                password: env::var("IPAY_PASSWORD").unwrap_or_default(),
            },
            dev_mode,
        }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
