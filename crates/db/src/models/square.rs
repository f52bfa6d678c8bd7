//! Square entity model and DTOs.

use gridfund_core::types::{Cents, DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A square row from the `squares` table.
///
/// `state` is one of `unclaimed | reserved | claimed` (see
/// `gridfund_core::claim::ClaimState`). A reserved or claimed square always
/// carries the `transaction_id` that holds it; donor fields are only set
/// once a claim commits or a cash claim is taken.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Square {
    pub id: DbId,
    pub campaign_id: DbId,
    pub row_idx: i32,
    pub col_idx: i32,
    pub number: i32,
    pub price_cents: Cents,
    pub state: String,
    pub transaction_id: Option<DbId>,
    pub claimed_by: Option<String>,
    pub donor_name: Option<String>,
    pub payment_status: String,
    pub payment_method: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// One square to insert during campaign creation or backfill.
#[derive(Debug, Clone)]
pub struct NewSquare {
    pub row_idx: i32,
    pub col_idx: i32,
    pub number: i32,
    pub price_cents: Cents,
}

/// Public grid cell payload for campaign reads.
///
/// Deliberately omits donor email (`claimed_by`) so the public grid cannot
/// be scraped for addresses; `donor_name` is what campaigns display.
#[derive(Debug, Clone, Serialize)]
pub struct PublicSquare {
    pub row_idx: i32,
    pub col_idx: i32,
    pub number: i32,
    pub price_cents: Cents,
    pub state: String,
    pub donor_name: Option<String>,
}

impl From<&Square> for PublicSquare {
    fn from(square: &Square) -> Self {
        PublicSquare {
            row_idx: square.row_idx,
            col_idx: square.col_idx,
            number: square.number,
            price_cents: square.price_cents,
            state: square.state.clone(),
            donor_name: square.donor_name.clone(),
        }
    }
}
