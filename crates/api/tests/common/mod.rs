//! Shared helpers for API integration tests.
//!
//! Mirrors the production router construction so tests exercise the same
//! middleware stack (CORS, request ID, timeout, tracing, panic recovery).

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use gridfund_api::auth::jwt::{generate_access_token, JwtConfig};
use gridfund_api::auth::password::hash_password;
use gridfund_api::config::ServerConfig;
use gridfund_api::router::build_app_router;
use gridfund_api::state::{AppState, PaymentProviders};
use gridfund_core::pricing::{self, PricingMode};
use gridfund_core::types::{Cents, DbId};
use gridfund_db::models::campaign::{Campaign, CreateCampaign};
use gridfund_db::models::square::NewSquare;
use gridfund_db::models::user::{CreateUser, User};
use gridfund_db::repositories::{CampaignRepo, RoleRepo, SquareRepo, UserRepo};
use gridfund_payments::stripe::StripeConfig;

/// JWT secret used by every test token.
pub const TEST_JWT_SECRET: &str = "test-secret-that-is-long-enough-for-hmac";

/// Stripe webhook signing secret used by the webhook tests.
pub const TEST_WEBHOOK_SECRET: &str = "whsec_test123secret456";

/// Password assigned to every seeded user.
pub const TEST_PASSWORD: &str = "correct-horse-battery-staple";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        public_base_url: "http://localhost:3000".to_string(),
        frontend_base_url: "http://localhost:5173".to_string(),
        jwt: JwtConfig {
            secret: TEST_JWT_SECRET.to_string(),
            access_token_expiry_mins: 15,
            refresh_token_expiry_days: 7,
        },
        stripe: Some(StripeConfig {
            secret_key: "sk_test_xxx".to_string(),
            webhook_secret: TEST_WEBHOOK_SECRET.to_string(),
        }),
        paypal: None,
    }
}

/// Build the full application router with all middleware layers, using the
/// given database pool.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let payments = PaymentProviders::from_config(&config);

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        payments: Arc::new(payments),
    };

    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

/// Send a GET request without authentication.
pub async fn get(app: Router, path: &str) -> Response<Body> {
    let request = Request::builder()
        .uri(path)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Send a GET request with a Bearer token.
pub async fn get_auth(app: Router, path: &str, token: &str) -> Response<Body> {
    let request = Request::builder()
        .uri(path)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Send a POST request with a JSON body, no authentication.
pub async fn post_json(app: Router, path: &str, body: serde_json::Value) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(path)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Send a POST request with a JSON body and a Bearer token.
pub async fn post_json_auth(
    app: Router,
    path: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(path)
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {token}"))
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Send a POST request with no body and a Bearer token.
pub async fn post_auth(app: Router, path: &str, token: &str) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(path)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Send a PUT request with a JSON body and a Bearer token.
pub async fn put_json_auth(
    app: Router,
    path: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    let request = Request::builder()
        .method("PUT")
        .uri(path)
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {token}"))
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Send a DELETE request with a Bearer token.
pub async fn delete_auth(app: Router, path: &str, token: &str) -> Response<Body> {
    let request = Request::builder()
        .method("DELETE")
        .uri(path)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Seed helpers
// ---------------------------------------------------------------------------

/// Create a user with the given role and return it plus a valid access token.
pub async fn seed_user(pool: &PgPool, username: &str, role: &str) -> (User, String) {
    let role_row = RoleRepo::find_by_name(pool, role)
        .await
        .unwrap()
        .expect("role must be seeded by migrations");

    let user = UserRepo::create(
        pool,
        &CreateUser {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password_hash: hash_password(TEST_PASSWORD).unwrap(),
            role_id: role_row.id,
        },
    )
    .await
    .unwrap();

    let token = generate_access_token(user.id, role, &test_config().jwt).unwrap();
    (user, token)
}

/// Create an active fixed-price campaign with its full grid of squares.
pub async fn seed_campaign(
    pool: &PgPool,
    owner_id: DbId,
    slug: &str,
    rows: i32,
    cols: i32,
    price_cents: Cents,
) -> Campaign {
    let mut tx = pool.begin().await.unwrap();
    let campaign = CampaignRepo::create(
        &mut tx,
        owner_id,
        &CreateCampaign {
            title: "Test campaign".to_string(),
            slug: slug.to_string(),
            description: None,
            grid_rows: rows,
            grid_cols: cols,
            pricing_mode: PricingMode::Fixed,
            fixed_price_cents: Some(price_cents),
            sequential_step_cents: None,
            manual_prices_cents: None,
            currency: None,
        },
    )
    .await
    .unwrap();

    let mut squares = Vec::new();
    for row in 0..rows {
        for col in 0..cols {
            squares.push(NewSquare {
                row_idx: row,
                col_idx: col,
                number: pricing::square_number(row, col, cols),
                price_cents,
            });
        }
    }
    SquareRepo::bulk_insert(&mut tx, campaign.id, &squares)
        .await
        .unwrap();
    tx.commit().await.unwrap();

    campaign
}

/// Compute a valid `Stripe-Signature` header for a webhook payload.
pub fn stripe_signature(payload: &[u8], secret: &str) -> String {
    use hmac::{Hmac, Mac};
    use sha2::Sha256;

    let timestamp = chrono::Utc::now().timestamp().to_string();
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
    mac.update(timestamp.as_bytes());
    mac.update(b".");
    mac.update(payload);
    let signature = format!("{:x}", mac.finalize().into_bytes());
    format!("t={timestamp},v1={signature}")
}
