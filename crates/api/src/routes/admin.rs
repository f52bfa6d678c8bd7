//! Route definitions for the `/admin` endpoints.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::admin;
use crate::state::AppState;

/// Routes mounted at `/admin`. All handlers gate on the admin role.
///
/// ```text
/// GET    /campaigns                             -> list_campaigns
/// PUT    /campaigns/{id}                        -> update_campaign
/// DELETE /campaigns/{id}                        -> delete_campaign (cascades)
/// GET    /campaigns/{id}/transactions           -> list_transactions
/// POST   /campaigns/{id}/backfill-squares       -> backfill_squares
/// POST   /transactions/{id}/recompute-total     -> recompute_total
/// POST   /transactions/{id}/release-squares     -> release_squares
/// POST   /broadcast                             -> broadcast
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/campaigns", get(admin::list_campaigns))
        .route(
            "/campaigns/{id}",
            put(admin::update_campaign).delete(admin::delete_campaign),
        )
        .route(
            "/campaigns/{id}/transactions",
            get(admin::list_transactions),
        )
        .route(
            "/campaigns/{id}/backfill-squares",
            post(admin::backfill_squares),
        )
        .route(
            "/transactions/{id}/recompute-total",
            post(admin::recompute_total),
        )
        .route(
            "/transactions/{id}/release-squares",
            post(admin::release_squares),
        )
        .route("/broadcast", post(admin::broadcast))
}
