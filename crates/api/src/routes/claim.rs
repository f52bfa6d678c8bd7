//! Route definitions for the `/claims` workflows.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::claim;
use crate::state::AppState;

/// Routes mounted at `/claims`.
///
/// ```text
/// POST /cash                -> claim_cash
/// POST /checkout-session    -> claim_checkout (hosted card flow)
/// POST /paypal-order        -> claim_paypal
/// GET  /paypal/success      -> paypal_success (provider return redirect)
/// GET  /paypal/cancel       -> paypal_cancel  (provider cancel redirect)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/cash", post(claim::claim_cash))
        .route("/checkout-session", post(claim::claim_checkout))
        .route("/paypal-order", post(claim::claim_paypal))
        .route("/paypal/success", get(claim::paypal_success))
        .route("/paypal/cancel", get(claim::paypal_cancel))
}
