//! Route definitions for provider webhooks.

use axum::routing::post;
use axum::Router;

use crate::handlers::webhook;
use crate::state::AppState;

/// Routes mounted at `/webhooks`.
///
/// ```text
/// POST /stripe  -> stripe (signed event body)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/stripe", post(webhook::stripe))
}
