use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::config::IpayConfig;
use crate::error::{ReturnError, Result};

use super::{PaymentState, PaymentStatusRecord, StatusSource};

/// Client for the iPay order-status endpoint.
#[derive(Debug, Clone)]
pub struct IpayClient {
    client: Client,
    api_url: String,
    user_name: String,
    password: String,
}

/// Response of `getOrderStatusExtended.do`.
///
/// `orderStatus` values, per the provider docs:
/// 0 registered, 1 pre-auth hold, 2 deposited, 3 reversed, 4 refunded,
/// 5 ACS authorization started, 6 declined.
#[derive(Debug, Deserialize)]
struct OrderStatusResponse {
    #[serde(rename = "errorCode")]
    error_code: Option<i64>,
    #[serde(rename = "errorMessage")]
    error_message: Option<String>,
    #[serde(rename = "orderStatus")]
    order_status: Option<i64>,
    #[serde(rename = "orderNumber")]
    order_number: Option<String>,
    #[serde(rename = "actionCodeDescription")]
    action_description: Option<String>,
    amount: Option<i64>,
    currency: Option<String>,
}

impl IpayClient {
    pub fn new(config: &IpayConfig) -> Self {
        Self {
            client: Client::new(),
            api_url: config.api_url.trim_end_matches('/').to_string(),
            user_name: config.user_name.clone(),
            password: config.password.clone(),
        }
    }

    fn map_state(order_status: i64) -> Result<PaymentState> {
        match order_status {
            2 => Ok(PaymentState::Captured),
            3 | 4 | 6 => Ok(PaymentState::Declined),
            0 | 1 | 5 => Ok(PaymentState::Pending),
            other => Err(ReturnError::Provider(format!(
                "unrecognized order status {other}"
            ))),
        }
    }
}

#[async_trait]
impl StatusSource for IpayClient {
    async fn fetch_status(&self, payment_reference: &str) -> Result<PaymentStatusRecord> {
        let response = self
            .client
            .post(format!("{}/getOrderStatusExtended.do", self.api_url))
            .form(&[
                ("userName", self.user_name.as_str()),
                ("password", self.password.as_str()),
                ("orderId", payment_reference),
            ])
            .send()
            .await
            .map_err(|e| ReturnError::Provider(format!("status request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(ReturnError::Provider(format!(
                "status endpoint returned {}",
                response.status()
            )));
        }

        let body: OrderStatusResponse = response
            .json()
            .await
            .map_err(|e| ReturnError::Provider(format!("unparseable status response: {e}")))?;

        // errorCode 0 means success; anything else is a provider-side
        // rejection of the status query itself.
        if let Some(code) = body.error_code {
            if code != 0 {
                let message = body
                    .error_message
                    .unwrap_or_else(|| format!("error code {code}"));
                return Err(ReturnError::Provider(message));
            }
        }

        let order_status = body
            .order_status
            .ok_or_else(|| ReturnError::Provider("status response missing orderStatus".into()))?;

        Ok(PaymentStatusRecord {
            payment_reference: payment_reference.to_string(),
            order_number: body.order_number,
            state: Self::map_state(order_status)?,
            amount_cents: body.amount,
            currency: body.currency,
            decline_reason: body.action_description,
        })
    }
}
