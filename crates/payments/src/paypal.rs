//! PayPal orders client for the redirect payment flow.
//!
//! The flow is: create an order with a return/cancel URL, redirect the
//! donor to the approval link, then capture the order when the provider
//! redirects back with the order token.

use serde::Deserialize;
use serde_json::json;

use crate::{cents_to_decimal_string, PaymentError};

/// Default live API base URL. Use the sandbox URL in development.
const API_BASE: &str = "https://api-m.paypal.com";

/// PayPal credentials loaded from the environment.
#[derive(Debug, Clone)]
pub struct PayPalConfig {
    pub client_id: String,
    pub client_secret: String,
    /// API base URL; defaults to live, override with the sandbox URL.
    pub base_url: Option<String>,
}

/// A created order awaiting donor approval.
#[derive(Debug, Clone)]
pub struct PayPalOrder {
    /// Provider order id (the `token` query parameter on redirect).
    pub id: String,
    /// URL the donor must visit to approve the payment.
    pub approve_url: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct OrderResponse {
    id: String,
    #[serde(default)]
    links: Vec<OrderLink>,
}

#[derive(Debug, Deserialize)]
struct OrderLink {
    rel: String,
    href: String,
}

#[derive(Debug, Deserialize)]
struct CaptureResponse {
    status: String,
}

/// REST client for the PayPal orders API.
pub struct PayPalClient {
    http: reqwest::Client,
    config: PayPalConfig,
}

impl PayPalClient {
    pub fn new(config: &PayPalConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config: config.clone(),
        }
    }

    fn base_url(&self) -> &str {
        self.config.base_url.as_deref().unwrap_or(API_BASE)
    }

    /// Fetch a client-credentials access token.
    async fn access_token(&self) -> Result<String, PaymentError> {
        let response = self
            .http
            .post(format!("{}/v1/oauth2/token", self.base_url()))
            .basic_auth(&self.config.client_id, Some(&self.config.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(PaymentError::Provider(format!(
                "token request returned {}",
                response.status()
            )));
        }
        let token: TokenResponse = response.json().await?;
        Ok(token.access_token)
    }

    /// Create an order and return its id plus the donor approval URL.
    pub async fn create_order(
        &self,
        amount_cents: i64,
        currency: &str,
        reference_id: &str,
        return_url: &str,
        cancel_url: &str,
    ) -> Result<PayPalOrder, PaymentError> {
        let token = self.access_token().await?;
        let body = json!({
            "intent": "CAPTURE",
            "purchase_units": [{
                "reference_id": reference_id,
                "amount": {
                    "currency_code": currency.to_uppercase(),
                    "value": cents_to_decimal_string(amount_cents),
                },
            }],
            "application_context": {
                "return_url": return_url,
                "cancel_url": cancel_url,
            },
        });

        let response = self
            .http
            .post(format!("{}/v2/checkout/orders", self.base_url()))
            .bearer_auth(&token)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            tracing::error!(%status, %text, "PayPal order creation failed");
            return Err(PaymentError::Provider(format!(
                "order creation returned {status}"
            )));
        }

        let order: OrderResponse = response.json().await?;
        let approve_url = order
            .links
            .iter()
            .find(|l| l.rel == "approve")
            .map(|l| l.href.clone())
            .ok_or_else(|| PaymentError::Provider("order response missing approve link".into()))?;

        tracing::info!(order_id = %order.id, "PayPal order created");
        Ok(PayPalOrder {
            id: order.id,
            approve_url,
        })
    }

    /// Capture an approved order. Returns `true` when the capture completed.
    pub async fn capture_order(&self, order_id: &str) -> Result<bool, PaymentError> {
        let token = self.access_token().await?;
        let response = self
            .http
            .post(format!(
                "{}/v2/checkout/orders/{order_id}/capture",
                self.base_url()
            ))
            .bearer_auth(&token)
            .header("Content-Type", "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            tracing::warn!(%status, order_id, "PayPal capture was not successful");
            return Ok(false);
        }

        let capture: CaptureResponse = response.json().await?;
        Ok(capture.status == "COMPLETED")
    }
}
