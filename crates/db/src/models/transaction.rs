//! Transaction entity model and DTOs.

use gridfund_core::types::{Cents, DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A transaction row from the `transactions` table.
///
/// The squares covered by a transaction are not stored as a list column;
/// they are the squares whose `transaction_id` references this row.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Transaction {
    pub id: DbId,
    pub campaign_id: DbId,
    pub donor_name: String,
    pub donor_email: String,
    pub anonymous: bool,
    pub amount_cents: Cents,
    pub payment_method: String,
    pub status: String,
    pub provider_session_id: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new transaction.
#[derive(Debug, Clone)]
pub struct CreateTransaction {
    pub campaign_id: DbId,
    pub donor_name: String,
    pub donor_email: String,
    pub anonymous: bool,
    pub amount_cents: Cents,
    pub payment_method: String,
}
