//! Handlers for the square-claim workflows (cash, card checkout, PayPal).
//!
//! All three paths share the same reservation step: one database
//! transaction that creates the `transactions` row and compare-and-sets
//! every requested cell from `unclaimed`. If any cell is contested the
//! whole transaction rolls back, so a claim either takes all of its cells
//! or none of them.

use axum::extract::{Query, State};
use axum::response::Redirect;
use axum::Json;
use gridfund_core::claim::{claim_owner, ClaimState, PaymentMethod};
use gridfund_core::error::CoreError;
use gridfund_core::pricing;
use gridfund_core::types::{Cents, DbId};
use gridfund_db::models::campaign::Campaign;
use gridfund_db::models::transaction::{CreateTransaction, Transaction};
use gridfund_db::repositories::{CampaignRepo, SquareRepo, TransactionRepo};
use gridfund_payments::stripe::CreateCheckoutSession;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::reconcile::{finalize_transaction, release_transaction};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// One requested grid cell with the price shown to the donor.
#[derive(Debug, Clone, Deserialize)]
pub struct ClaimCell {
    pub row: i32,
    pub col: i32,
    pub price_cents: Cents,
}

/// Request body shared by all claim endpoints.
#[derive(Debug, Deserialize)]
pub struct ClaimRequest {
    pub campaign_id: DbId,
    pub squares: Vec<ClaimCell>,
    pub donor_name: String,
    pub donor_email: String,
    #[serde(default)]
    pub anonymous: bool,
}

/// Response for `POST /claims/cash`.
#[derive(Debug, Serialize)]
pub struct CashClaimResponse {
    pub transaction_id: DbId,
}

/// Response for the checkout endpoints: where to send the donor.
#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub url: String,
}

/// Query parameters of the PayPal return/cancel redirects.
#[derive(Debug, Deserialize)]
pub struct PaypalReturnParams {
    pub transaction_id: DbId,
    /// PayPal order id appended by the provider on approval.
    pub token: Option<String>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/claims/cash
///
/// Claim squares for offline payment. Squares are committed immediately
/// with `payment_status = pending` until the organizer collects the money.
pub async fn claim_cash(
    State(state): State<AppState>,
    Json(input): Json<ClaimRequest>,
) -> AppResult<Json<CashClaimResponse>> {
    let campaign = load_active_campaign(&state, input.campaign_id).await?;
    let total = validate_cells(&campaign, &input)?;

    let owner = claim_owner(&input.donor_email, input.anonymous);
    let transaction = reserve_cells(
        &state,
        &campaign,
        &input,
        total,
        ClaimState::Claimed,
        Some(&owner),
        PaymentMethod::Cash,
    )
    .await?;

    tracing::info!(
        transaction_id = transaction.id,
        campaign_id = campaign.id,
        squares = input.squares.len(),
        total_cents = total,
        "Cash claim recorded",
    );

    Ok(Json(CashClaimResponse {
        transaction_id: transaction.id,
    }))
}

/// POST /api/v1/claims/checkout-session
///
/// Reserve squares and create a hosted card-checkout session. The
/// reservation is released if the provider call fails.
pub async fn claim_checkout(
    State(state): State<AppState>,
    Json(input): Json<ClaimRequest>,
) -> AppResult<Json<CheckoutResponse>> {
    let stripe = state.payments.stripe.as_ref().ok_or_else(|| {
        AppError::InternalError("Card payments are not configured".into())
    })?;

    let campaign = load_active_campaign(&state, input.campaign_id).await?;
    let total = validate_cells(&campaign, &input)?;

    let transaction = reserve_cells(
        &state,
        &campaign,
        &input,
        total,
        ClaimState::Reserved,
        None,
        PaymentMethod::Card,
    )
    .await?;

    let campaign_url = campaign_page_url(&state, &campaign.slug);
    let session = stripe
        .create_checkout_session(&CreateCheckoutSession {
            amount_cents: total,
            currency: &campaign.currency,
            description: &campaign.title,
            transaction_id: transaction.id,
            success_url: &format!(
                "{campaign_url}?payment=success&transaction_id={}",
                transaction.id
            ),
            cancel_url: &format!("{campaign_url}?payment=cancelled"),
        })
        .await;

    let session = match session {
        Ok(session) => session,
        Err(err) => {
            // Give the cells back rather than leaving them reserved for a
            // checkout that never opened.
            release_transaction(&state.pool, &transaction).await?;
            return Err(err.into());
        }
    };

    TransactionRepo::set_provider_session(&state.pool, transaction.id, &session.id).await?;

    tracing::info!(
        transaction_id = transaction.id,
        campaign_id = campaign.id,
        session_id = %session.id,
        total_cents = total,
        "Checkout session created",
    );

    Ok(Json(CheckoutResponse { url: session.url }))
}

/// POST /api/v1/claims/paypal-order
///
/// Reserve squares and create a PayPal order for the redirect flow.
pub async fn claim_paypal(
    State(state): State<AppState>,
    Json(input): Json<ClaimRequest>,
) -> AppResult<Json<CheckoutResponse>> {
    let paypal = state.payments.paypal.as_ref().ok_or_else(|| {
        AppError::InternalError("PayPal payments are not configured".into())
    })?;

    let campaign = load_active_campaign(&state, input.campaign_id).await?;
    let total = validate_cells(&campaign, &input)?;

    let transaction = reserve_cells(
        &state,
        &campaign,
        &input,
        total,
        ClaimState::Reserved,
        None,
        PaymentMethod::Paypal,
    )
    .await?;

    let api_base = state.config.public_base_url.trim_end_matches('/');
    let return_url = format!(
        "{api_base}/api/v1/claims/paypal/success?transaction_id={}",
        transaction.id
    );
    let cancel_url = format!(
        "{api_base}/api/v1/claims/paypal/cancel?transaction_id={}",
        transaction.id
    );

    let order = match paypal
        .create_order(
            total,
            &campaign.currency,
            &transaction.id.to_string(),
            &return_url,
            &cancel_url,
        )
        .await
    {
        Ok(order) => order,
        Err(err) => {
            release_transaction(&state.pool, &transaction).await?;
            return Err(err.into());
        }
    };

    TransactionRepo::set_provider_session(&state.pool, transaction.id, &order.id).await?;

    tracing::info!(
        transaction_id = transaction.id,
        campaign_id = campaign.id,
        order_id = %order.id,
        total_cents = total,
        "PayPal order created",
    );

    Ok(Json(CheckoutResponse {
        url: order.approve_url,
    }))
}

/// GET /api/v1/claims/paypal/success
///
/// PayPal return redirect: capture the order, then finalize or release the
/// reservation. Always answers with a redirect to the campaign page; the
/// outcome travels in the `payment` query flag.
pub async fn paypal_success(
    State(state): State<AppState>,
    Query(params): Query<PaypalReturnParams>,
) -> Redirect {
    match paypal_capture(&state, &params).await {
        Ok(redirect) => redirect,
        Err(err) => {
            tracing::error!(
                transaction_id = params.transaction_id,
                error = %err,
                "PayPal capture failed",
            );
            Redirect::to(&format!(
                "{}?payment=error",
                state.config.frontend_base_url.trim_end_matches('/')
            ))
        }
    }
}

/// GET /api/v1/claims/paypal/cancel
///
/// PayPal cancel redirect: release the reservation.
pub async fn paypal_cancel(
    State(state): State<AppState>,
    Query(params): Query<PaypalReturnParams>,
) -> Redirect {
    let frontend = state.config.frontend_base_url.trim_end_matches('/').to_string();

    let transaction = match TransactionRepo::find_by_id(&state.pool, params.transaction_id).await {
        Ok(Some(transaction)) => transaction,
        _ => return Redirect::to(&format!("{frontend}?payment=error")),
    };

    if let Err(err) = release_transaction(&state.pool, &transaction).await {
        tracing::error!(
            transaction_id = transaction.id,
            error = %err,
            "Failed to release cancelled PayPal reservation",
        );
    }

    let slug = campaign_slug(&state, transaction.campaign_id).await;
    Redirect::to(&redirect_url(&state, slug.as_deref(), "cancelled"))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn paypal_capture(state: &AppState, params: &PaypalReturnParams) -> AppResult<Redirect> {
    let transaction = TransactionRepo::find_by_id(&state.pool, params.transaction_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Transaction",
            id: params.transaction_id,
        }))?;

    let paypal = state.payments.paypal.as_ref().ok_or_else(|| {
        AppError::InternalError("PayPal payments are not configured".into())
    })?;

    let order_id = params
        .token
        .clone()
        .or_else(|| transaction.provider_session_id.clone())
        .ok_or_else(|| AppError::BadRequest("missing PayPal order token".into()))?;

    let captured = paypal.capture_order(&order_id).await?;
    if captured {
        finalize_transaction(&state.pool, &transaction).await?;
    } else {
        release_transaction(&state.pool, &transaction).await?;
    }

    let slug = campaign_slug(state, transaction.campaign_id).await;
    let outcome = if captured { "success" } else { "error" };
    Ok(Redirect::to(&redirect_url(state, slug.as_deref(), outcome)))
}

/// Load a campaign and require it to accept claims.
async fn load_active_campaign(state: &AppState, campaign_id: DbId) -> AppResult<Campaign> {
    let campaign = CampaignRepo::find_by_id(&state.pool, campaign_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Campaign",
            id: campaign_id,
        }))?;
    if !campaign.is_active {
        return Err(AppError::Core(CoreError::Conflict(
            "Campaign is not accepting claims".into(),
        )));
    }
    Ok(campaign)
}

/// Validate the requested cells and return the claim total.
///
/// The total is the sum of the submitted per-cell values; the stored square
/// price is not re-derived here.
fn validate_cells(campaign: &Campaign, input: &ClaimRequest) -> Result<Cents, AppError> {
    if input.squares.is_empty() {
        return Err(AppError::BadRequest("squares must not be empty".into()));
    }
    if input.donor_name.trim().is_empty() || input.donor_email.trim().is_empty() {
        return Err(AppError::BadRequest(
            "donor_name and donor_email are required".into(),
        ));
    }

    let mut seen = std::collections::HashSet::new();
    let mut total: Cents = 0;
    for cell in &input.squares {
        if !pricing::in_bounds(cell.row, cell.col, campaign.grid_rows, campaign.grid_cols) {
            return Err(AppError::BadRequest(format!(
                "cell ({}, {}) is outside the {}x{} grid",
                cell.row, cell.col, campaign.grid_rows, campaign.grid_cols
            )));
        }
        if !seen.insert((cell.row, cell.col)) {
            return Err(AppError::BadRequest(format!(
                "cell ({}, {}) requested more than once",
                cell.row, cell.col
            )));
        }
        if cell.price_cents <= 0 {
            return Err(AppError::BadRequest(format!(
                "cell ({}, {}) has a non-positive price",
                cell.row, cell.col
            )));
        }
        total += cell.price_cents;
    }
    Ok(total)
}

/// Create the transaction row and take every requested cell, atomically.
///
/// Rolls back and returns 409 listing the contested cells if any cell is
/// no longer unclaimed.
async fn reserve_cells(
    state: &AppState,
    campaign: &Campaign,
    input: &ClaimRequest,
    total: Cents,
    target: ClaimState,
    claimed_by: Option<&str>,
    method: PaymentMethod,
) -> AppResult<Transaction> {
    let mut tx = state.pool.begin().await?;

    let transaction = TransactionRepo::create(
        &mut tx,
        &CreateTransaction {
            campaign_id: campaign.id,
            donor_name: input.donor_name.trim().to_string(),
            donor_email: input.donor_email.trim().to_string(),
            anonymous: input.anonymous,
            amount_cents: total,
            payment_method: method.as_str().to_string(),
        },
    )
    .await?;

    let mut contested = Vec::new();
    for cell in &input.squares {
        let taken = SquareRepo::take_unclaimed(
            &mut tx,
            campaign.id,
            cell.row,
            cell.col,
            target,
            transaction.id,
            input.donor_name.trim(),
            claimed_by,
            method.as_str(),
        )
        .await?;
        if !taken {
            contested.push(format!("({}, {})", cell.row, cell.col));
        }
    }

    if !contested.is_empty() {
        tx.rollback().await?;
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Squares already claimed: {}",
            contested.join(", ")
        ))));
    }

    tx.commit().await?;
    Ok(transaction)
}

/// Public URL of a campaign page on the frontend.
fn campaign_page_url(state: &AppState, slug: &str) -> String {
    format!(
        "{}/campaigns/{slug}",
        state.config.frontend_base_url.trim_end_matches('/')
    )
}

async fn campaign_slug(state: &AppState, campaign_id: DbId) -> Option<String> {
    CampaignRepo::find_by_id(&state.pool, campaign_id)
        .await
        .ok()
        .flatten()
        .map(|c| c.slug)
}

fn redirect_url(state: &AppState, slug: Option<&str>, outcome: &str) -> String {
    match slug {
        Some(slug) => format!("{}?payment={outcome}", campaign_page_url(state, slug)),
        None => format!(
            "{}?payment={outcome}",
            state.config.frontend_base_url.trim_end_matches('/')
        ),
    }
}
