//! Repository for the `squares` table.
//!
//! Claiming is a compare-and-set: every state change is a conditional
//! `UPDATE ... WHERE state = '<expected>'` whose affected-row count tells
//! the caller whether the transition won. Two concurrent claims for the
//! same cell therefore cannot both succeed, and replayed reconciliation
//! callbacks are no-ops.

use gridfund_core::claim::{ClaimState, PaymentStatus};
use gridfund_core::types::{Cents, DbId};
use sqlx::{PgPool, Postgres, Transaction};

use crate::models::square::{NewSquare, Square};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, campaign_id, row_idx, col_idx, number, price_cents, state, \
     transaction_id, claimed_by, donor_name, payment_status, payment_method, \
     created_at, updated_at";

/// Rows per batch for bulk inserts.
const INSERT_BATCH_SIZE: usize = 100;

/// Provides operations on grid squares.
pub struct SquareRepo;

impl SquareRepo {
    /// Bulk-insert squares for a campaign in fixed-size batches.
    ///
    /// Cells that already exist are skipped (`ON CONFLICT DO NOTHING` on the
    /// unique cell constraint), which makes backfill re-runnable. Returns
    /// the number of rows actually inserted.
    pub async fn bulk_insert(
        tx: &mut Transaction<'_, Postgres>,
        campaign_id: DbId,
        squares: &[NewSquare],
    ) -> Result<u64, sqlx::Error> {
        let mut inserted = 0;
        for chunk in squares.chunks(INSERT_BATCH_SIZE) {
            let rows: Vec<i32> = chunk.iter().map(|s| s.row_idx).collect();
            let cols: Vec<i32> = chunk.iter().map(|s| s.col_idx).collect();
            let numbers: Vec<i32> = chunk.iter().map(|s| s.number).collect();
            let prices: Vec<Cents> = chunk.iter().map(|s| s.price_cents).collect();

            let result = sqlx::query(
                "INSERT INTO squares (campaign_id, row_idx, col_idx, number, price_cents)
                 SELECT $1, r, c, n, p
                 FROM UNNEST($2::int4[], $3::int4[], $4::int4[], $5::int8[]) AS t(r, c, n, p)
                 ON CONFLICT ON CONSTRAINT uq_squares_campaign_cell DO NOTHING",
            )
            .bind(campaign_id)
            .bind(&rows)
            .bind(&cols)
            .bind(&numbers)
            .bind(&prices)
            .execute(&mut **tx)
            .await?;
            inserted += result.rows_affected();
        }
        Ok(inserted)
    }

    /// List all squares of a campaign ordered by their grid number.
    pub async fn list_for_campaign(
        pool: &PgPool,
        campaign_id: DbId,
    ) -> Result<Vec<Square>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM squares WHERE campaign_id = $1 ORDER BY number");
        sqlx::query_as::<_, Square>(&query)
            .bind(campaign_id)
            .fetch_all(pool)
            .await
    }

    /// List the squares held by a transaction.
    pub async fn list_for_transaction(
        pool: &PgPool,
        transaction_id: DbId,
    ) -> Result<Vec<Square>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM squares WHERE transaction_id = $1 ORDER BY number");
        sqlx::query_as::<_, Square>(&query)
            .bind(transaction_id)
            .fetch_all(pool)
            .await
    }

    /// Number of square rows a campaign currently has.
    pub async fn count_for_campaign(pool: &PgPool, campaign_id: DbId) -> Result<i64, sqlx::Error> {
        let count: Option<i64> =
            sqlx::query_scalar("SELECT COUNT(*) FROM squares WHERE campaign_id = $1")
                .bind(campaign_id)
                .fetch_one(pool)
                .await?;
        Ok(count.unwrap_or(0))
    }

    /// Grid numbers already present for a campaign (used by backfill).
    pub async fn existing_numbers(
        pool: &PgPool,
        campaign_id: DbId,
    ) -> Result<Vec<i32>, sqlx::Error> {
        sqlx::query_scalar("SELECT number FROM squares WHERE campaign_id = $1 ORDER BY number")
            .bind(campaign_id)
            .fetch_all(pool)
            .await
    }

    /// Atomically take one unclaimed cell for a transaction.
    ///
    /// Moves the cell from `unclaimed` to `target` (`Reserved` for provider
    /// flows, `Claimed` for cash) and attaches the transaction and donor
    /// display name. `claimed_by` is only written for cash claims; provider
    /// claims receive it at finalization.
    ///
    /// Returns `false` if the cell does not exist or is not unclaimed, in
    /// which case the caller must roll back the enclosing transaction.
    #[allow(clippy::too_many_arguments)]
    pub async fn take_unclaimed(
        tx: &mut Transaction<'_, Postgres>,
        campaign_id: DbId,
        row_idx: i32,
        col_idx: i32,
        target: ClaimState,
        transaction_id: DbId,
        donor_name: &str,
        claimed_by: Option<&str>,
        payment_method: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE squares SET
                state = $4,
                transaction_id = $5,
                donor_name = $6,
                claimed_by = $7,
                payment_status = 'pending',
                payment_method = $8,
                updated_at = NOW()
             WHERE campaign_id = $1 AND row_idx = $2 AND col_idx = $3
               AND state = 'unclaimed'",
        )
        .bind(campaign_id)
        .bind(row_idx)
        .bind(col_idx)
        .bind(target.as_str())
        .bind(transaction_id)
        .bind(donor_name)
        .bind(claimed_by)
        .bind(payment_method)
        .execute(&mut **tx)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Commit every reserved square of a transaction.
    ///
    /// Returns the number of squares finalized; zero on replay.
    pub async fn finalize_for_transaction(
        pool: &PgPool,
        transaction_id: DbId,
        claim_owner: &str,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE squares SET
                state = $3,
                claimed_by = $2,
                payment_status = $4,
                updated_at = NOW()
             WHERE transaction_id = $1 AND state = $5",
        )
        .bind(transaction_id)
        .bind(claim_owner)
        .bind(ClaimState::Claimed.as_str())
        .bind(PaymentStatus::Completed.as_str())
        .bind(ClaimState::Reserved.as_str())
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Return every reserved square of a transaction to the open pool.
    ///
    /// Returns the number of squares released; zero on replay.
    pub async fn release_for_transaction(
        pool: &PgPool,
        transaction_id: DbId,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE squares SET
                state = $2,
                transaction_id = NULL,
                claimed_by = NULL,
                donor_name = NULL,
                payment_status = $3,
                payment_method = NULL,
                updated_at = NOW()
             WHERE transaction_id = $1 AND state = $4",
        )
        .bind(transaction_id)
        .bind(ClaimState::Unclaimed.as_str())
        .bind(PaymentStatus::Pending.as_str())
        .bind(ClaimState::Reserved.as_str())
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Sum of the stored prices of the squares held by a transaction.
    pub async fn sum_prices_for_transaction(
        pool: &PgPool,
        transaction_id: DbId,
    ) -> Result<Cents, sqlx::Error> {
        let sum: Option<Cents> = sqlx::query_scalar(
            "SELECT SUM(price_cents)::int8 FROM squares WHERE transaction_id = $1",
        )
        .bind(transaction_id)
        .fetch_one(pool)
        .await?;
        Ok(sum.unwrap_or(0))
    }
}
