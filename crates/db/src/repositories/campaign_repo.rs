//! Repository for the `campaigns` table.

use gridfund_core::types::DbId;
use sqlx::{PgPool, Postgres, Transaction};

use crate::models::campaign::{Campaign, CreateCampaign, UpdateCampaign};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, owner_id, title, slug, description, grid_rows, grid_cols, \
     pricing_mode, fixed_price_cents, sequential_step_cents, currency, is_active, \
     created_at, updated_at";

/// Provides CRUD operations for campaigns.
pub struct CampaignRepo;

impl CampaignRepo {
    /// Insert a new campaign inside an open transaction, returning the row.
    ///
    /// Runs in the same transaction as the bulk square insert so a failed
    /// grid build leaves no half-created campaign behind.
    pub async fn create(
        tx: &mut Transaction<'_, Postgres>,
        owner_id: DbId,
        input: &CreateCampaign,
    ) -> Result<Campaign, sqlx::Error> {
        let query = format!(
            "INSERT INTO campaigns
                (owner_id, title, slug, description, grid_rows, grid_cols,
                 pricing_mode, fixed_price_cents, sequential_step_cents, currency)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, COALESCE($10, 'usd'))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Campaign>(&query)
            .bind(owner_id)
            .bind(&input.title)
            .bind(&input.slug)
            .bind(&input.description)
            .bind(input.grid_rows)
            .bind(input.grid_cols)
            .bind(input.pricing_mode.as_str())
            .bind(input.fixed_price_cents)
            .bind(input.sequential_step_cents)
            .bind(&input.currency)
            .fetch_one(&mut **tx)
            .await
    }

    /// Find a campaign by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Campaign>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM campaigns WHERE id = $1");
        sqlx::query_as::<_, Campaign>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a campaign by its public slug.
    pub async fn find_by_slug(pool: &PgPool, slug: &str) -> Result<Option<Campaign>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM campaigns WHERE slug = $1");
        sqlx::query_as::<_, Campaign>(&query)
            .bind(slug)
            .fetch_optional(pool)
            .await
    }

    /// List active campaigns, most recently created first.
    pub async fn list_active(pool: &PgPool) -> Result<Vec<Campaign>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM campaigns WHERE is_active = TRUE ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Campaign>(&query).fetch_all(pool).await
    }

    /// List all campaigns regardless of active flag (admin view).
    pub async fn list_all(
        pool: &PgPool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Campaign>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM campaigns ORDER BY created_at DESC LIMIT $1 OFFSET $2"
        );
        sqlx::query_as::<_, Campaign>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Update a campaign's mutable fields. Only non-`None` fields are applied.
    ///
    /// Grid dimensions and pricing are fixed at creation and cannot change.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateCampaign,
    ) -> Result<Option<Campaign>, sqlx::Error> {
        let query = format!(
            "UPDATE campaigns SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                is_active = COALESCE($4, is_active),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Campaign>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.is_active)
            .fetch_optional(pool)
            .await
    }

    /// Permanently delete a campaign. Squares and transactions cascade.
    ///
    /// Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM campaigns WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
