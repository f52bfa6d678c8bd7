//! Repository for the `payment_events` table (webhook idempotency ledger).

use sqlx::PgPool;

/// Provides the webhook deduplication check.
pub struct PaymentEventRepo;

impl PaymentEventRepo {
    /// Record a provider event delivery.
    ///
    /// Returns `true` if this is the first time the event was seen. A
    /// conflict on `(provider, event_id)` means the delivery is a replay
    /// and the caller must skip its side effects.
    pub async fn record(
        pool: &PgPool,
        provider: &str,
        event_id: &str,
        event_type: &str,
        payload: &serde_json::Value,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO payment_events (provider, event_id, event_type, payload)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT ON CONSTRAINT uq_payment_events_provider_event DO NOTHING",
        )
        .bind(provider)
        .bind(event_id)
        .bind(event_type)
        .bind(payload)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
