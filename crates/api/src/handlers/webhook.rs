//! Stripe webhook handler.
//!
//! Deliveries are authenticated with the `Stripe-Signature` header before
//! anything is parsed, then recorded in the `payment_events` ledger. A
//! delivery already present in the ledger is a provider retry and is
//! acknowledged without side effects.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use gridfund_core::error::CoreError;
use gridfund_core::types::DbId;
use gridfund_db::models::transaction::Transaction;
use gridfund_db::repositories::{PaymentEventRepo, TransactionRepo};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::reconcile::{finalize_transaction, release_transaction};
use crate::state::AppState;

/// Acknowledgement body the provider expects.
#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub received: bool,
}

/// POST /api/v1/webhooks/stripe
///
/// Dispatches on the event type:
///
/// - `checkout.session.completed` finalizes the reservation
/// - `checkout.session.expired` and `payment_intent.payment_failed` release it
/// - anything else is acknowledged and ignored
pub async fn stripe(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Json<WebhookAck>> {
    let stripe = state.payments.stripe.as_ref().ok_or_else(|| {
        AppError::InternalError("Stripe webhook received but Stripe is not configured".into())
    })?;

    let signature = headers
        .get("stripe-signature")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Missing Stripe-Signature header".into(),
            ))
        })?;

    let valid = stripe
        .verify_webhook_signature(&body, signature)
        .map_err(|e| AppError::Core(CoreError::Unauthorized(format!("Bad signature: {e}"))))?;
    if !valid {
        return Err(AppError::Core(CoreError::Unauthorized(
            "Invalid webhook signature".into(),
        )));
    }

    let event: serde_json::Value = serde_json::from_slice(&body)
        .map_err(|e| AppError::BadRequest(format!("Invalid event payload: {e}")))?;

    let event_id = event["id"].as_str().unwrap_or_default().to_string();
    let event_type = event["type"].as_str().unwrap_or_default().to_string();
    if event_id.is_empty() || event_type.is_empty() {
        return Err(AppError::BadRequest(
            "Event payload missing id or type".into(),
        ));
    }

    // Idempotency: first delivery wins, retries are acknowledged untouched.
    let first_delivery =
        PaymentEventRepo::record(&state.pool, "stripe", &event_id, &event_type, &event).await?;
    if !first_delivery {
        tracing::info!(%event_id, %event_type, "Duplicate webhook delivery ignored");
        return Ok(Json(WebhookAck { received: true }));
    }

    match event_type.as_str() {
        "checkout.session.completed" => {
            if let Some(transaction) = resolve_transaction(&state, &event).await? {
                finalize_transaction(&state.pool, &transaction).await?;
            }
        }
        "checkout.session.expired" | "payment_intent.payment_failed" => {
            if let Some(transaction) = resolve_transaction(&state, &event).await? {
                release_transaction(&state.pool, &transaction).await?;
            }
        }
        other => {
            tracing::debug!(event_type = %other, "Ignoring unhandled webhook event type");
        }
    }

    Ok(Json(WebhookAck { received: true }))
}

/// Find the transaction an event refers to.
///
/// Prefers `client_reference_id` (set at session creation), falls back to
/// the `transaction_id` metadata entry, then to the provider session id.
/// An unresolvable event is logged and acknowledged; erroring would only
/// make the provider retry a delivery that can never succeed.
async fn resolve_transaction(
    state: &AppState,
    event: &serde_json::Value,
) -> AppResult<Option<Transaction>> {
    let object = &event["data"]["object"];

    let by_reference = object["client_reference_id"]
        .as_str()
        .or_else(|| object["metadata"]["transaction_id"].as_str())
        .and_then(|s| s.parse::<DbId>().ok());

    if let Some(id) = by_reference {
        if let Some(transaction) = TransactionRepo::find_by_id(&state.pool, id).await? {
            return Ok(Some(transaction));
        }
    }

    if let Some(session_id) = object["id"].as_str() {
        if let Some(transaction) =
            TransactionRepo::find_by_provider_session(&state.pool, session_id).await?
        {
            return Ok(Some(transaction));
        }
    }

    tracing::warn!(
        event_id = %event["id"].as_str().unwrap_or_default(),
        "Webhook event references no known transaction",
    );
    Ok(None)
}
