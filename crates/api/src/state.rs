use std::sync::Arc;

use gridfund_payments::paypal::PayPalClient;
use gridfund_payments::stripe::StripeClient;

use crate::config::ServerConfig;

/// Payment-provider clients built once at startup from configuration.
///
/// A provider left unconfigured disables its payment channel; the claim
/// handlers answer with an error instead of panicking.
pub struct PaymentProviders {
    pub stripe: Option<StripeClient>,
    pub paypal: Option<PayPalClient>,
}

impl PaymentProviders {
    pub fn from_config(config: &ServerConfig) -> Self {
        Self {
            stripe: config.stripe.as_ref().map(StripeClient::new),
            paypal: config.paypal.as_ref().map(PayPalClient::new),
        }
    }
}

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: gridfund_db::DbPool,
    /// Server configuration (accessed by middleware and handlers).
    pub config: Arc<ServerConfig>,
    /// Payment-provider clients.
    pub payments: Arc<PaymentProviders>,
}
