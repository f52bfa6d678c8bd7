//! Handlers for the `/campaigns` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use gridfund_core::error::CoreError;
use gridfund_core::pricing::{self, PricingMode, PricingParams};
use gridfund_core::types::DbId;
use gridfund_db::models::campaign::{Campaign, CreateCampaign};
use gridfund_db::models::square::{NewSquare, PublicSquare};
use gridfund_db::repositories::{CampaignRepo, SquareRepo, TransactionRepo};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireOrganizer;
use crate::state::AppState;

/// Campaign detail payload: the campaign plus its full grid.
#[derive(Debug, Serialize)]
pub struct CampaignDetail {
    pub campaign: Campaign,
    pub squares: Vec<PublicSquare>,
    /// True when this is the synthetic demo payload served because the
    /// backing queries failed.
    pub demo: bool,
}

/// Donor-facing transaction status, read by the post-redirect page.
#[derive(Debug, Serialize)]
pub struct TransactionStatus {
    pub id: DbId,
    pub status: String,
    pub amount_cents: i64,
    pub payment_method: String,
    /// The cells this transaction covers (or covered, if released).
    pub squares: Vec<PublicSquare>,
}

/// POST /api/v1/campaigns
///
/// Create a campaign and bulk-insert its full grid of squares in one
/// database transaction.
pub async fn create(
    RequireOrganizer(user): RequireOrganizer,
    State(state): State<AppState>,
    Json(input): Json<CreateCampaign>,
) -> AppResult<(StatusCode, Json<Campaign>)> {
    if input.title.trim().is_empty() {
        return Err(AppError::BadRequest("title must not be empty".into()));
    }
    validate_slug(&input.slug)?;
    pricing::validate_grid(input.grid_rows, input.grid_cols)?;

    let params = PricingParams {
        mode: input.pricing_mode,
        fixed_price_cents: input.fixed_price_cents,
        sequential_step_cents: input.sequential_step_cents,
    };
    params.validate()?;

    let squares = build_grid(&input, &params)?;

    let mut tx = state.pool.begin().await?;
    let campaign = CampaignRepo::create(&mut tx, user.user_id, &input).await?;
    let created = SquareRepo::bulk_insert(&mut tx, campaign.id, &squares).await?;
    tx.commit().await?;

    tracing::info!(
        campaign_id = campaign.id,
        slug = %campaign.slug,
        squares = created,
        user_id = user.user_id,
        "Campaign created",
    );

    Ok((StatusCode::CREATED, Json(campaign)))
}

/// GET /api/v1/campaigns
///
/// Public list of active campaigns.
pub async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<Campaign>>> {
    let campaigns = CampaignRepo::list_active(&state.pool).await?;
    Ok(Json(campaigns))
}

/// GET /api/v1/campaigns/{slug}
///
/// Public campaign read including the full grid. When the backing queries
/// fail, a synthetic demo payload is served instead of an error so the
/// public page still renders.
pub async fn get_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<CampaignDetail>> {
    let lookup = load_detail(&state, &slug).await;
    match lookup {
        Ok(Some(detail)) => Ok(Json(detail)),
        Ok(None) => Err(AppError::NotFound(format!(
            "No campaign with slug '{slug}'"
        ))),
        Err(err) => {
            tracing::warn!(%slug, error = %err, "Campaign read failed, serving demo payload");
            Ok(Json(demo_detail(&slug)))
        }
    }
}

/// GET /api/v1/campaigns/{slug}/transactions/{id}
///
/// Donor-facing transaction status for the given campaign.
pub async fn get_transaction(
    State(state): State<AppState>,
    Path((slug, id)): Path<(String, DbId)>,
) -> AppResult<Json<TransactionStatus>> {
    let campaign = CampaignRepo::find_by_slug(&state.pool, &slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No campaign with slug '{slug}'")))?;

    let transaction = TransactionRepo::find_by_id(&state.pool, id)
        .await?
        .filter(|t| t.campaign_id == campaign.id)
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Transaction",
            id,
        }))?;

    let squares = SquareRepo::list_for_transaction(&state.pool, transaction.id).await?;

    Ok(Json(TransactionStatus {
        id: transaction.id,
        status: transaction.status,
        amount_cents: transaction.amount_cents,
        payment_method: transaction.payment_method,
        squares: squares.iter().map(PublicSquare::from).collect(),
    }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn load_detail(state: &AppState, slug: &str) -> Result<Option<CampaignDetail>, sqlx::Error> {
    let Some(campaign) = CampaignRepo::find_by_slug(&state.pool, slug).await? else {
        return Ok(None);
    };
    let squares = SquareRepo::list_for_campaign(&state.pool, campaign.id).await?;
    Ok(Some(CampaignDetail {
        squares: squares.iter().map(PublicSquare::from).collect(),
        campaign,
        demo: false,
    }))
}

/// Synthetic 10x10 fixed-price campaign served when the database is down.
fn demo_detail(slug: &str) -> CampaignDetail {
    let now = Utc::now();
    let campaign = Campaign {
        id: 0,
        owner_id: 0,
        title: "Demo campaign".to_string(),
        slug: slug.to_string(),
        description: Some("Demo data shown while live data is unavailable.".to_string()),
        grid_rows: 10,
        grid_cols: 10,
        pricing_mode: PricingMode::Fixed.as_str().to_string(),
        fixed_price_cents: Some(1000),
        sequential_step_cents: None,
        currency: "usd".to_string(),
        is_active: true,
        created_at: now,
        updated_at: now,
    };
    let squares = (0..10)
        .flat_map(|row| {
            (0..10).map(move |col| PublicSquare {
                row_idx: row,
                col_idx: col,
                number: pricing::square_number(row, col, 10),
                price_cents: 1000,
                state: "unclaimed".to_string(),
                donor_name: None,
            })
        })
        .collect();
    CampaignDetail {
        campaign,
        squares,
        demo: true,
    }
}

/// Build the full grid of squares for a new campaign.
fn build_grid(input: &CreateCampaign, params: &PricingParams) -> Result<Vec<NewSquare>, AppError> {
    let cell_count = (input.grid_rows as usize) * (input.grid_cols as usize);

    let manual_prices = match input.pricing_mode {
        PricingMode::Manual => {
            let prices = input.manual_prices_cents.as_ref().ok_or_else(|| {
                AppError::BadRequest("manual pricing requires manual_prices_cents".into())
            })?;
            if prices.len() != cell_count {
                return Err(AppError::BadRequest(format!(
                    "manual_prices_cents must have {cell_count} entries, got {}",
                    prices.len()
                )));
            }
            if prices.iter().any(|p| *p <= 0) {
                return Err(AppError::BadRequest(
                    "manual prices must all be positive".into(),
                ));
            }
            Some(prices)
        }
        _ => None,
    };

    let mut squares = Vec::with_capacity(cell_count);
    for row in 0..input.grid_rows {
        for col in 0..input.grid_cols {
            let number = pricing::square_number(row, col, input.grid_cols);
            let price_cents = match manual_prices {
                Some(prices) => prices[(number - 1) as usize],
                None => params.price_for_square(number)?,
            };
            squares.push(NewSquare {
                row_idx: row,
                col_idx: col,
                number,
                price_cents,
            });
        }
    }
    Ok(squares)
}

/// Slugs are lowercase alphanumeric with hyphens, 3 to 64 characters.
fn validate_slug(slug: &str) -> Result<(), AppError> {
    let valid_chars = slug
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    if slug.len() < 3 || slug.len() > 64 || !valid_chars || slug.starts_with('-') {
        return Err(AppError::BadRequest(
            "slug must be 3-64 lowercase alphanumeric characters or hyphens".into(),
        ));
    }
    Ok(())
}
