//! Integration tests for login, refresh rotation, and logout.

mod common;

use axum::http::StatusCode;
use common::{body_json, post_auth, post_json, seed_user, TEST_PASSWORD};
use serde_json::json;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Test: login returns tokens and user info
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn login_returns_tokens(pool: PgPool) {
    seed_user(&pool, "alice", "organizer").await;

    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        "/api/v1/auth/login",
        json!({"username": "alice", "password": TEST_PASSWORD}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert!(json["access_token"].is_string());
    assert!(json["refresh_token"].is_string());
    assert_eq!(json["user"]["username"], "alice");
    assert_eq!(json["user"]["role"], "organizer");
}

// ---------------------------------------------------------------------------
// Test: wrong password is rejected and counted
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn wrong_password_is_rejected(pool: PgPool) {
    let (user, _) = seed_user(&pool, "bob", "donor").await;

    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        "/api/v1/auth/login",
        json!({"username": "bob", "password": "not-the-password"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let failed: i32 = sqlx::query_scalar("SELECT failed_login_count FROM users WHERE id = $1")
        .bind(user.id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(failed, 1);
}

// ---------------------------------------------------------------------------
// Test: repeated failures lock the account
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn repeated_failures_lock_the_account(pool: PgPool) {
    seed_user(&pool, "carol", "donor").await;

    for _ in 0..5 {
        let app = common::build_test_app(pool.clone());
        let response = post_json(
            app,
            "/api/v1/auth/login",
            json!({"username": "carol", "password": "wrong"}),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    // Even the correct password is refused while the account is locked.
    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        "/api/v1/auth/login",
        json!({"username": "carol", "password": TEST_PASSWORD}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

// ---------------------------------------------------------------------------
// Test: refresh rotates the token
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn refresh_rotates_tokens(pool: PgPool) {
    seed_user(&pool, "dave", "donor").await;

    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        "/api/v1/auth/login",
        json!({"username": "dave", "password": TEST_PASSWORD}),
    )
    .await;
    let login = body_json(response).await;
    let refresh_token = login["refresh_token"].as_str().unwrap().to_string();

    // First refresh succeeds and returns a new refresh token.
    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        "/api/v1/auth/refresh",
        json!({"refresh_token": refresh_token}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let refreshed = body_json(response).await;
    assert_ne!(refreshed["refresh_token"].as_str(), Some(refresh_token.as_str()));

    // The old token was revoked by rotation.
    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        "/api/v1/auth/refresh",
        json!({"refresh_token": refresh_token}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Test: logout revokes every session
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn logout_revokes_sessions(pool: PgPool) {
    seed_user(&pool, "erin", "donor").await;

    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        "/api/v1/auth/login",
        json!({"username": "erin", "password": TEST_PASSWORD}),
    )
    .await;
    let login = body_json(response).await;
    let access_token = login["access_token"].as_str().unwrap().to_string();
    let refresh_token = login["refresh_token"].as_str().unwrap().to_string();

    let app = common::build_test_app(pool.clone());
    let response = post_auth(app, "/api/v1/auth/logout", &access_token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // The refresh token no longer works.
    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        "/api/v1/auth/refresh",
        json!({"refresh_token": refresh_token}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
