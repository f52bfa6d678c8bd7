//! REST clients for the hosted payment providers.
//!
//! [`stripe::StripeClient`] drives the hosted card-checkout flow and
//! verifies webhook signatures; [`paypal::PayPalClient`] drives the
//! order/approve/capture redirect flow. Both convert amounts at this
//! boundary only; everything upstream works in integer cents.

pub mod paypal;
pub mod stripe;

/// Errors from payment-provider calls.
#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    /// Transport-level failure talking to the provider.
    #[error("Provider request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider answered but the response was not usable.
    #[error("Provider error: {0}")]
    Provider(String),

    /// A webhook signature header was missing or malformed.
    #[error("Signature error: {0}")]
    Signature(String),
}

/// Format integer cents as a decimal amount string (`2050` -> `"20.50"`).
///
/// PayPal's order API takes decimal strings; Stripe takes cents natively.
pub fn cents_to_decimal_string(cents: gridfund_core::types::Cents) -> String {
    format!("{}.{:02}", cents / 100, cents % 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cents_formatting() {
        assert_eq!(cents_to_decimal_string(0), "0.00");
        assert_eq!(cents_to_decimal_string(5), "0.05");
        assert_eq!(cents_to_decimal_string(100), "1.00");
        assert_eq!(cents_to_decimal_string(2050), "20.50");
        assert_eq!(cents_to_decimal_string(123456), "1234.56");
    }
}
