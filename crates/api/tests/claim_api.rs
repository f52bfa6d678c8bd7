//! Integration tests for the square-claim workflows (cash path).

mod common;

use axum::http::StatusCode;
use common::{body_json, post_json, seed_campaign, seed_user};
use gridfund_core::types::DbId;
use serde_json::json;
use sqlx::PgPool;

/// Build a cash claim body for the given cells.
fn cash_claim_body(campaign_id: DbId, cells: &[(i32, i32)], price_cents: i64) -> serde_json::Value {
    let squares: Vec<_> = cells
        .iter()
        .map(|(row, col)| json!({"row": row, "col": col, "price_cents": price_cents}))
        .collect();
    json!({
        "campaign_id": campaign_id,
        "squares": squares,
        "donor_name": "Jane Doe",
        "donor_email": "jane@example.com",
        "anonymous": false,
    })
}

// ---------------------------------------------------------------------------
// Test: end-to-end cash claim
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn cash_claim_end_to_end(pool: PgPool) {
    let (organizer, _) = seed_user(&pool, "organizer1", "organizer").await;
    let campaign = seed_campaign(&pool, organizer.id, "spring-fund", 10, 10, 1000).await;

    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        "/api/v1/claims/cash",
        cash_claim_body(campaign.id, &[(0, 0), (0, 1)], 1000),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let transaction_id = json["transaction_id"].as_i64().expect("transaction id");

    // The transaction row carries the sum of the submitted cell values.
    let (amount, status, method): (i64, String, String) = sqlx::query_as(
        "SELECT amount_cents, status, payment_method FROM transactions WHERE id = $1",
    )
    .bind(transaction_id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(amount, 2000);
    assert_eq!(status, "pending");
    assert_eq!(method, "cash");

    // Both squares are committed to the donor, awaiting offline payment.
    let squares: Vec<(String, String, Option<String>, Option<String>)> = sqlx::query_as(
        "SELECT state, payment_status, payment_method, claimed_by
         FROM squares WHERE transaction_id = $1 ORDER BY number",
    )
    .bind(transaction_id)
    .fetch_all(&pool)
    .await
    .unwrap();
    assert_eq!(squares.len(), 2);
    for (state, payment_status, payment_method, claimed_by) in &squares {
        assert_eq!(state, "claimed");
        assert_eq!(payment_status, "pending");
        assert_eq!(payment_method.as_deref(), Some("cash"));
        assert_eq!(claimed_by.as_deref(), Some("jane@example.com"));
    }
}

// ---------------------------------------------------------------------------
// Test: anonymous donors are recorded under the anonymous marker
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn anonymous_claim_masks_donor_email(pool: PgPool) {
    let (organizer, _) = seed_user(&pool, "organizer1", "organizer").await;
    let campaign = seed_campaign(&pool, organizer.id, "anon-fund", 3, 3, 500).await;

    let app = common::build_test_app(pool.clone());
    let mut body = cash_claim_body(campaign.id, &[(1, 1)], 500);
    body["anonymous"] = json!(true);
    let response = post_json(app, "/api/v1/claims/cash", body).await;
    assert_eq!(response.status(), StatusCode::OK);

    let claimed_by: Option<String> = sqlx::query_scalar(
        "SELECT claimed_by FROM squares WHERE campaign_id = $1 AND row_idx = 1 AND col_idx = 1",
    )
    .bind(campaign.id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(claimed_by.as_deref(), Some("anonymous"));
}

// ---------------------------------------------------------------------------
// Test: contested claims roll back entirely
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn contested_claim_returns_409_and_writes_nothing(pool: PgPool) {
    let (organizer, _) = seed_user(&pool, "organizer1", "organizer").await;
    let campaign = seed_campaign(&pool, organizer.id, "contested", 5, 5, 1000).await;

    // First donor takes (0, 0).
    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        "/api/v1/claims/cash",
        cash_claim_body(campaign.id, &[(0, 0)], 1000),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    // Second donor requests (0, 0) and (0, 2): the whole claim must fail.
    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        "/api/v1/claims/cash",
        cash_claim_body(campaign.id, &[(0, 0), (0, 2)], 1000),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // The uncontested cell was not taken.
    let state: String = sqlx::query_scalar(
        "SELECT state FROM squares WHERE campaign_id = $1 AND row_idx = 0 AND col_idx = 2",
    )
    .bind(campaign.id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(state, "unclaimed");

    // No second transaction row survived the rollback.
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM transactions WHERE campaign_id = $1")
        .bind(campaign.id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

// ---------------------------------------------------------------------------
// Test: request validation
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn claim_validation_rejects_bad_requests(pool: PgPool) {
    let (organizer, _) = seed_user(&pool, "organizer1", "organizer").await;
    let campaign = seed_campaign(&pool, organizer.id, "validate", 3, 3, 1000).await;

    // Empty cell list.
    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        "/api/v1/claims/cash",
        cash_claim_body(campaign.id, &[], 1000),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Out-of-bounds cell.
    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        "/api/v1/claims/cash",
        cash_claim_body(campaign.id, &[(7, 0)], 1000),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Same cell twice in one request.
    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        "/api/v1/claims/cash",
        cash_claim_body(campaign.id, &[(1, 1), (1, 1)], 1000),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Unknown campaign.
    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        "/api/v1/claims/cash",
        cash_claim_body(999_999, &[(0, 0)], 1000),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Test: inactive campaigns reject claims
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn inactive_campaign_rejects_claims(pool: PgPool) {
    let (organizer, _) = seed_user(&pool, "organizer1", "organizer").await;
    let campaign = seed_campaign(&pool, organizer.id, "closed", 3, 3, 1000).await;

    sqlx::query("UPDATE campaigns SET is_active = FALSE WHERE id = $1")
        .bind(campaign.id)
        .execute(&pool)
        .await
        .unwrap();

    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        "/api/v1/claims/cash",
        cash_claim_body(campaign.id, &[(0, 0)], 1000),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}
