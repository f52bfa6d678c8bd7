//! Stripe hosted-checkout client and webhook signature verification.
//!
//! Checkout sessions are created via the REST API with a single line item
//! covering the whole claim. Webhook deliveries are authenticated with the
//! `Stripe-Signature` scheme: HMAC-SHA256 over `"{timestamp}.{payload}"`
//! keyed by the endpoint's signing secret, with a timestamp tolerance to
//! reject replays.

use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;

use crate::PaymentError;

type HmacSha256 = Hmac<Sha256>;

/// Default REST API base URL.
const API_BASE: &str = "https://api.stripe.com";

/// Maximum accepted age of a webhook timestamp, in seconds.
const SIGNATURE_TOLERANCE_SECS: i64 = 300;

/// Stripe credentials loaded from the environment.
#[derive(Debug, Clone)]
pub struct StripeConfig {
    /// Secret API key (`sk_...`).
    pub secret_key: String,
    /// Webhook endpoint signing secret (`whsec_...`).
    pub webhook_secret: String,
}

/// A created checkout session.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSession {
    /// Provider session id (`cs_...`), stored on the transaction row.
    pub id: String,
    /// Hosted checkout URL the donor is redirected to.
    pub url: String,
}

/// Parameters for creating a checkout session.
#[derive(Debug, Clone)]
pub struct CreateCheckoutSession<'a> {
    /// Total amount in cents.
    pub amount_cents: i64,
    /// ISO currency code (e.g. `usd`).
    pub currency: &'a str,
    /// Line-item label shown on the hosted page.
    pub description: &'a str,
    /// Internal transaction id, round-tripped via `client_reference_id`.
    pub transaction_id: i64,
    /// Where the provider sends the donor after payment.
    pub success_url: &'a str,
    pub cancel_url: &'a str,
}

/// REST client for the Stripe API.
pub struct StripeClient {
    http: reqwest::Client,
    config: StripeConfig,
    base_url: String,
}

impl StripeClient {
    pub fn new(config: &StripeConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config: config.clone(),
            base_url: API_BASE.to_string(),
        }
    }

    /// Point the client at a different API base (test servers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Create a hosted checkout session for one claim.
    pub async fn create_checkout_session(
        &self,
        params: &CreateCheckoutSession<'_>,
    ) -> Result<CheckoutSession, PaymentError> {
        let transaction_id = params.transaction_id.to_string();
        let amount = params.amount_cents.to_string();
        let form: Vec<(&str, &str)> = vec![
            ("mode", "payment"),
            ("client_reference_id", &transaction_id),
            ("line_items[0][quantity]", "1"),
            ("line_items[0][price_data][currency]", params.currency),
            ("line_items[0][price_data][unit_amount]", &amount),
            (
                "line_items[0][price_data][product_data][name]",
                params.description,
            ),
            ("metadata[transaction_id]", &transaction_id),
            ("success_url", params.success_url),
            ("cancel_url", params.cancel_url),
        ];

        let response = self
            .http
            .post(format!("{}/v1/checkout/sessions", self.base_url))
            .bearer_auth(&self.config.secret_key)
            .form(&form)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(%status, %body, "Stripe checkout session creation failed");
            return Err(PaymentError::Provider(format!(
                "checkout session creation returned {status}"
            )));
        }

        let session: CheckoutSession = response.json().await?;
        tracing::info!(session_id = %session.id, "Stripe checkout session created");
        Ok(session)
    }

    /// Verify a `Stripe-Signature` header against the raw request body.
    ///
    /// Returns `Ok(true)` when the `v1` signature matches and the timestamp
    /// is within tolerance, `Ok(false)` when either check fails, and `Err`
    /// when the header is malformed.
    pub fn verify_webhook_signature(
        &self,
        payload: &[u8],
        signature_header: &str,
    ) -> Result<bool, PaymentError> {
        let mut timestamp: Option<&str> = None;
        let mut signature: Option<&str> = None;
        for part in signature_header.split(',') {
            match part.trim().split_once('=') {
                Some(("t", v)) => timestamp = Some(v),
                Some(("v1", v)) => signature = Some(v),
                _ => {}
            }
        }
        let timestamp = timestamp
            .ok_or_else(|| PaymentError::Signature("missing t= in signature header".into()))?;
        let signature = signature
            .ok_or_else(|| PaymentError::Signature("missing v1= in signature header".into()))?;

        let ts: i64 = timestamp
            .parse()
            .map_err(|_| PaymentError::Signature("non-numeric timestamp".into()))?;
        let age = chrono::Utc::now().timestamp() - ts;
        if age.abs() > SIGNATURE_TOLERANCE_SECS {
            return Ok(false);
        }

        let mut mac = HmacSha256::new_from_slice(self.config.webhook_secret.as_bytes())
            .map_err(|e| PaymentError::Signature(format!("bad signing secret: {e}")))?;
        mac.update(timestamp.as_bytes());
        mac.update(b".");
        mac.update(payload);
        let expected = format!("{:x}", mac.finalize().into_bytes());

        Ok(expected == signature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client() -> StripeClient {
        StripeClient::new(&StripeConfig {
            secret_key: "sk_test_xxx".to_string(),
            webhook_secret: "whsec_test123secret456".to_string(),
        })
    }

    fn sign(payload: &[u8], secret: &str, timestamp: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(timestamp.as_bytes());
        mac.update(b".");
        mac.update(payload);
        format!("{:x}", mac.finalize().into_bytes())
    }

    #[test]
    fn valid_signature_is_accepted() {
        let client = test_client();
        let payload = b"{\"type\":\"checkout.session.completed\"}";
        let timestamp = chrono::Utc::now().timestamp().to_string();
        let signature = sign(payload, "whsec_test123secret456", &timestamp);
        let header = format!("t={timestamp},v1={signature}");

        assert!(client.verify_webhook_signature(payload, &header).unwrap());
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let client = test_client();
        let payload = b"{\"type\":\"checkout.session.completed\"}";
        let timestamp = chrono::Utc::now().timestamp().to_string();
        let signature = sign(payload, "wrong_secret", &timestamp);
        let header = format!("t={timestamp},v1={signature}");

        assert!(!client.verify_webhook_signature(payload, &header).unwrap());
    }

    #[test]
    fn modified_payload_is_rejected() {
        let client = test_client();
        let original = b"{\"type\":\"checkout.session.completed\"}";
        let modified = b"{\"type\":\"checkout.session.completed\",\"amount\":1}";
        let timestamp = chrono::Utc::now().timestamp().to_string();
        let signature = sign(original, "whsec_test123secret456", &timestamp);
        let header = format!("t={timestamp},v1={signature}");

        assert!(!client.verify_webhook_signature(modified, &header).unwrap());
    }

    #[test]
    fn stale_timestamp_is_rejected() {
        let client = test_client();
        let payload = b"{}";
        // 10 minutes old, beyond the 5-minute tolerance.
        let timestamp = (chrono::Utc::now().timestamp() - 600).to_string();
        let signature = sign(payload, "whsec_test123secret456", &timestamp);
        let header = format!("t={timestamp},v1={signature}");

        assert!(!client.verify_webhook_signature(payload, &header).unwrap());
    }

    #[test]
    fn malformed_headers_error() {
        let client = test_client();
        let payload = b"{}";

        assert!(client.verify_webhook_signature(payload, "garbage").is_err());
        assert!(client
            .verify_webhook_signature(payload, "t=1234567890")
            .is_err());
        assert!(client
            .verify_webhook_signature(payload, "v1=deadbeef")
            .is_err());
    }
}
