//! Admin handlers: campaign management, data repair, broadcast.
//!
//! All endpoints require the admin role via [`RequireAdmin`].

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use gridfund_core::error::CoreError;
use gridfund_core::pagination::{clamp_limit, clamp_offset, DEFAULT_LIMIT, MAX_LIMIT};
use gridfund_core::pricing::{self, PricingMode};
use gridfund_core::types::{Cents, DbId};
use gridfund_db::models::campaign::{Campaign, UpdateCampaign};
use gridfund_db::models::square::NewSquare;
use gridfund_db::models::transaction::Transaction;
use gridfund_db::repositories::{
    CampaignRepo, NotificationRepo, SquareRepo, TransactionRepo,
};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Campaign management
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/campaigns
///
/// List all campaigns including inactive ones.
pub async fn list_campaigns(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<Campaign>>>> {
    let limit = clamp_limit(params.limit, DEFAULT_LIMIT, MAX_LIMIT);
    let offset = clamp_offset(params.offset);
    let campaigns = CampaignRepo::list_all(&state.pool, limit, offset).await?;
    Ok(Json(DataResponse { data: campaigns }))
}

/// PUT /api/v1/admin/campaigns/{id}
///
/// Update a campaign's mutable fields (title, description, active flag).
/// Grid dimensions and pricing are immutable after creation.
pub async fn update_campaign(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(campaign_id): Path<DbId>,
    Json(input): Json<UpdateCampaign>,
) -> AppResult<Json<DataResponse<Campaign>>> {
    let updated = CampaignRepo::update(&state.pool, campaign_id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Campaign",
            id: campaign_id,
        }))?;

    tracing::info!(campaign_id, user_id = admin.user_id, "Campaign updated");
    Ok(Json(DataResponse { data: updated }))
}

/// GET /api/v1/admin/campaigns/{id}/transactions
///
/// List a campaign's transactions, newest first.
pub async fn list_transactions(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(campaign_id): Path<DbId>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<Transaction>>>> {
    CampaignRepo::find_by_id(&state.pool, campaign_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Campaign",
            id: campaign_id,
        }))?;

    let limit = clamp_limit(params.limit, DEFAULT_LIMIT, MAX_LIMIT);
    let offset = clamp_offset(params.offset);
    let transactions =
        TransactionRepo::list_for_campaign(&state.pool, campaign_id, limit, offset).await?;
    Ok(Json(DataResponse { data: transactions }))
}

/// DELETE /api/v1/admin/campaigns/{id}
///
/// Permanently delete a campaign. Its squares and transactions cascade.
pub async fn delete_campaign(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(campaign_id): Path<DbId>,
) -> AppResult<StatusCode> {
    let deleted = CampaignRepo::delete(&state.pool, campaign_id).await?;
    if !deleted {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Campaign",
            id: campaign_id,
        }));
    }

    tracing::info!(campaign_id, user_id = admin.user_id, "Campaign deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Data repair
// ---------------------------------------------------------------------------

/// Result of a square backfill run.
#[derive(Debug, Serialize)]
pub struct BackfillResult {
    pub expected: i64,
    pub created: u64,
    /// Square rows the campaign has after the run.
    pub total: i64,
}

/// POST /api/v1/admin/campaigns/{id}/backfill-squares
///
/// Bulk-create any square rows missing from a campaign's grid, priced by
/// the campaign's pricing function. Re-runnable: existing cells are
/// untouched.
pub async fn backfill_squares(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(campaign_id): Path<DbId>,
) -> AppResult<Json<DataResponse<BackfillResult>>> {
    let campaign = CampaignRepo::find_by_id(&state.pool, campaign_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Campaign",
            id: campaign_id,
        }))?;

    let params = campaign.pricing_params().ok_or_else(|| {
        AppError::InternalError(format!(
            "Campaign {campaign_id} has unknown pricing mode '{}'",
            campaign.pricing_mode
        ))
    })?;
    if params.mode == PricingMode::Manual {
        return Err(AppError::BadRequest(
            "Manual-priced campaigns cannot be backfilled; prices are per square".into(),
        ));
    }

    let existing: std::collections::HashSet<i32> =
        SquareRepo::existing_numbers(&state.pool, campaign_id)
            .await?
            .into_iter()
            .collect();

    let mut missing = Vec::new();
    for row in 0..campaign.grid_rows {
        for col in 0..campaign.grid_cols {
            let number = pricing::square_number(row, col, campaign.grid_cols);
            if existing.contains(&number) {
                continue;
            }
            missing.push(NewSquare {
                row_idx: row,
                col_idx: col,
                number,
                price_cents: params.price_for_square(number)?,
            });
        }
    }

    let mut tx = state.pool.begin().await?;
    let created = SquareRepo::bulk_insert(&mut tx, campaign_id, &missing).await?;
    tx.commit().await?;

    let total = SquareRepo::count_for_campaign(&state.pool, campaign_id).await?;

    tracing::info!(
        campaign_id,
        created,
        total,
        user_id = admin.user_id,
        "Backfilled missing squares",
    );

    Ok(Json(DataResponse {
        data: BackfillResult {
            expected: i64::from(campaign.grid_rows) * i64::from(campaign.grid_cols),
            created,
            total,
        },
    }))
}

/// Result of a total recomputation.
#[derive(Debug, Serialize)]
pub struct RecomputeResult {
    pub transaction_id: DbId,
    pub amount_cents: Cents,
}

/// POST /api/v1/admin/transactions/{id}/recompute-total
///
/// Reset a transaction's total to the sum of the stored prices of the
/// squares that reference it.
pub async fn recompute_total(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(transaction_id): Path<DbId>,
) -> AppResult<Json<DataResponse<RecomputeResult>>> {
    TransactionRepo::find_by_id(&state.pool, transaction_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Transaction",
            id: transaction_id,
        }))?;

    let amount_cents = SquareRepo::sum_prices_for_transaction(&state.pool, transaction_id).await?;
    TransactionRepo::set_amount(&state.pool, transaction_id, amount_cents).await?;

    tracing::info!(
        transaction_id,
        amount_cents,
        user_id = admin.user_id,
        "Transaction total recomputed",
    );

    Ok(Json(DataResponse {
        data: RecomputeResult {
            transaction_id,
            amount_cents,
        },
    }))
}

/// Result of a forced release.
#[derive(Debug, Serialize)]
pub struct ReleaseResult {
    pub transaction_id: DbId,
    pub squares_released: u64,
}

/// POST /api/v1/admin/transactions/{id}/release-squares
///
/// Repair endpoint: force-release squares still reserved by a stale
/// transaction (e.g. a checkout the provider never reported on) and mark
/// the transaction failed.
pub async fn release_squares(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(transaction_id): Path<DbId>,
) -> AppResult<Json<DataResponse<ReleaseResult>>> {
    let transaction = TransactionRepo::find_by_id(&state.pool, transaction_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Transaction",
            id: transaction_id,
        }))?;

    let squares_released =
        crate::reconcile::release_transaction(&state.pool, &transaction).await?;

    tracing::info!(
        transaction_id,
        squares_released,
        user_id = admin.user_id,
        "Reserved squares force-released",
    );

    Ok(Json(DataResponse {
        data: ReleaseResult {
            transaction_id,
            squares_released,
        },
    }))
}

// ---------------------------------------------------------------------------
// Broadcast
// ---------------------------------------------------------------------------

/// Request body for `POST /admin/broadcast`.
#[derive(Debug, Deserialize)]
pub struct BroadcastRequest {
    pub title: String,
    pub body: String,
}

/// Result of a broadcast.
#[derive(Debug, Serialize)]
pub struct BroadcastResult {
    pub recipients: u64,
}

/// POST /api/v1/admin/broadcast
///
/// Send a notification to every active user.
pub async fn broadcast(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<BroadcastRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<BroadcastResult>>)> {
    if input.title.trim().is_empty() {
        return Err(AppError::BadRequest("title must not be empty".into()));
    }
    if input.body.trim().is_empty() {
        return Err(AppError::BadRequest("body must not be empty".into()));
    }

    let recipients =
        NotificationRepo::broadcast(&state.pool, input.title.trim(), input.body.trim()).await?;

    tracing::info!(recipients, user_id = admin.user_id, "Broadcast sent");

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: BroadcastResult { recipients },
        }),
    ))
}
