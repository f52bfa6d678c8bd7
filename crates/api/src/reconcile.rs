//! Reconciliation: finalize or release a reservation once a payment
//! provider reports its outcome.
//!
//! Both the Stripe webhook and the PayPal redirect handlers funnel into
//! these two functions. Every underlying update is conditional on the
//! current state (`pending` transaction, `reserved` squares), so applying
//! the same outcome twice is a no-op rather than a double-count.

use gridfund_core::claim::{claim_owner, TransactionStatus};
use gridfund_db::models::transaction::Transaction;
use gridfund_db::repositories::{SquareRepo, TransactionRepo};
use gridfund_db::DbPool;

use crate::error::AppResult;

/// Commit a paid-for reservation: transaction to `completed`, its reserved
/// squares to `claimed` with the donor identifier written to `claimed_by`.
///
/// Returns the number of squares finalized (zero on replay).
pub async fn finalize_transaction(pool: &DbPool, transaction: &Transaction) -> AppResult<u64> {
    if is_terminal(transaction) {
        tracing::debug!(
            transaction_id = transaction.id,
            status = %transaction.status,
            "Finalize skipped, transaction already terminal",
        );
        return Ok(0);
    }

    let transitioned = TransactionRepo::mark_completed(pool, transaction.id).await?;
    let owner = claim_owner(&transaction.donor_email, transaction.anonymous);
    let finalized = SquareRepo::finalize_for_transaction(pool, transaction.id, &owner).await?;

    if transitioned || finalized > 0 {
        tracing::info!(
            transaction_id = transaction.id,
            campaign_id = transaction.campaign_id,
            squares = finalized,
            "Transaction finalized",
        );
    } else {
        tracing::debug!(
            transaction_id = transaction.id,
            "Finalize replay ignored (already terminal)",
        );
    }
    Ok(finalized)
}

/// Roll back a failed or expired reservation: transaction to `failed`, its
/// reserved squares back to the open pool.
///
/// Returns the number of squares released (zero on replay).
pub async fn release_transaction(pool: &DbPool, transaction: &Transaction) -> AppResult<u64> {
    if is_terminal(transaction) {
        tracing::debug!(
            transaction_id = transaction.id,
            status = %transaction.status,
            "Release skipped, transaction already terminal",
        );
        return Ok(0);
    }

    let transitioned = TransactionRepo::mark_failed(pool, transaction.id).await?;
    let released = SquareRepo::release_for_transaction(pool, transaction.id).await?;

    if transitioned || released > 0 {
        tracing::info!(
            transaction_id = transaction.id,
            campaign_id = transaction.campaign_id,
            squares = released,
            "Transaction released",
        );
    } else {
        tracing::debug!(
            transaction_id = transaction.id,
            "Release replay ignored (already terminal)",
        );
    }
    Ok(released)
}

/// Whether the in-memory row already reached a terminal status. The SQL
/// transitions are conditional regardless, so this is only a fast path for
/// rows loaded moments ago.
fn is_terminal(transaction: &Transaction) -> bool {
    TransactionStatus::parse(&transaction.status).is_some_and(TransactionStatus::is_terminal)
}
