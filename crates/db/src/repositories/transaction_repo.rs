//! Repository for the `transactions` table.

use gridfund_core::claim::TransactionStatus;
use gridfund_core::types::{Cents, DbId};
use sqlx::{PgPool, Postgres, Transaction as PgTx};

use crate::models::transaction::{CreateTransaction, Transaction};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, campaign_id, donor_name, donor_email, anonymous, amount_cents, \
     payment_method, status, provider_session_id, created_at, updated_at";

/// Provides CRUD operations for transactions.
pub struct TransactionRepo;

impl TransactionRepo {
    /// Insert a new pending transaction inside an open database transaction.
    ///
    /// Runs alongside the square updates of the claim workflow so a failed
    /// claim leaves no orphaned transaction row.
    pub async fn create(
        tx: &mut PgTx<'_, Postgres>,
        input: &CreateTransaction,
    ) -> Result<Transaction, sqlx::Error> {
        let query = format!(
            "INSERT INTO transactions
                (campaign_id, donor_name, donor_email, anonymous, amount_cents, payment_method)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Transaction>(&query)
            .bind(input.campaign_id)
            .bind(&input.donor_name)
            .bind(&input.donor_email)
            .bind(input.anonymous)
            .bind(input.amount_cents)
            .bind(&input.payment_method)
            .fetch_one(&mut **tx)
            .await
    }

    /// Find a transaction by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Transaction>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM transactions WHERE id = $1");
        sqlx::query_as::<_, Transaction>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a transaction by the provider's checkout-session/order id.
    pub async fn find_by_provider_session(
        pool: &PgPool,
        provider_session_id: &str,
    ) -> Result<Option<Transaction>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM transactions WHERE provider_session_id = $1");
        sqlx::query_as::<_, Transaction>(&query)
            .bind(provider_session_id)
            .fetch_optional(pool)
            .await
    }

    /// List transactions for a campaign, newest first.
    pub async fn list_for_campaign(
        pool: &PgPool,
        campaign_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Transaction>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM transactions WHERE campaign_id = $1
             ORDER BY created_at DESC LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Transaction>(&query)
            .bind(campaign_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Attach the provider's session/order id after checkout creation.
    pub async fn set_provider_session(
        pool: &PgPool,
        id: DbId,
        provider_session_id: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE transactions SET provider_session_id = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(provider_session_id)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Move a pending transaction to `completed`.
    ///
    /// Conditional on the current status so a replayed callback cannot
    /// re-complete (or un-fail) a terminal transaction. Returns `true` if
    /// this call performed the transition.
    pub async fn mark_completed(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        Self::transition(pool, id, TransactionStatus::Completed).await
    }

    /// Move a pending transaction to `failed`.
    ///
    /// Same conditional guard as [`Self::mark_completed`].
    pub async fn mark_failed(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        Self::transition(pool, id, TransactionStatus::Failed).await
    }

    /// Conditional `pending -> status` transition shared by the markers.
    async fn transition(
        pool: &PgPool,
        id: DbId,
        status: TransactionStatus,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE transactions SET status = $2, updated_at = NOW()
             WHERE id = $1 AND status = $3",
        )
        .bind(id)
        .bind(status.as_str())
        .bind(TransactionStatus::Pending.as_str())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Overwrite the stored total (admin recompute).
    pub async fn set_amount(pool: &PgPool, id: DbId, amount_cents: Cents) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE transactions SET amount_cents = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(amount_cents)
            .execute(pool)
            .await?;
        Ok(())
    }
}
