//! Route definitions for the `/campaigns` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::campaign;
use crate::state::AppState;

/// Routes mounted at `/campaigns`.
///
/// ```text
/// GET    /                              -> list (public)
/// POST   /                              -> create (organizer or admin)
/// GET    /{slug}                        -> get_by_slug (public)
/// GET    /{slug}/transactions/{id}      -> get_transaction (public)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(campaign::list).post(campaign::create))
        .route("/{slug}", get(campaign::get_by_slug))
        .route("/{slug}/transactions/{id}", get(campaign::get_transaction))
}
