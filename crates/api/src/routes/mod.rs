pub mod admin;
pub mod auth;
pub mod campaign;
pub mod claim;
pub mod health;
pub mod notification;
pub mod webhook;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/login                                      login (public)
/// /auth/refresh                                    refresh (public)
/// /auth/logout                                     logout (requires auth)
///
/// /campaigns                                       list (public), create (organizer)
/// /campaigns/{slug}                                campaign + grid (public)
/// /campaigns/{slug}/transactions/{id}              transaction status (public)
///
/// /claims/cash                                     cash claim (POST)
/// /claims/checkout-session                         card checkout (POST)
/// /claims/paypal-order                             PayPal order (POST)
/// /claims/paypal/success                           PayPal return redirect (GET)
/// /claims/paypal/cancel                            PayPal cancel redirect (GET)
///
/// /webhooks/stripe                                 provider events (POST)
///
/// /notifications                                   list (auth required)
/// /notifications/unread-count                      unread count (GET)
/// /notifications/read-all                          mark all read (POST)
/// /notifications/{id}/read                         mark read (POST)
///
/// /admin/campaigns                                 list all (admin only)
/// /admin/campaigns/{id}                            delete (admin only)
/// /admin/campaigns/{id}/backfill-squares           repair: create missing rows
/// /admin/transactions/{id}/recompute-total         repair: re-sum total
/// /admin/transactions/{id}/release-squares         repair: force-release
/// /admin/broadcast                                 notify all users (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Authentication routes (login, refresh, logout).
        .nest("/auth", auth::router())
        // Public campaign reads + organizer creation.
        .nest("/campaigns", campaign::router())
        // Claim workflows (cash, card, PayPal).
        .nest("/claims", claim::router())
        // Provider webhooks.
        .nest("/webhooks", webhook::router())
        // User notifications.
        .nest("/notifications", notification::router())
        // Admin management and repair endpoints.
        .nest("/admin", admin::router())
}
