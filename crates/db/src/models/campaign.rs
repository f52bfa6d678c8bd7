//! Campaign entity model and DTOs.

use gridfund_core::pricing::{PricingMode, PricingParams};
use gridfund_core::types::{Cents, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A campaign row from the `campaigns` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Campaign {
    pub id: DbId,
    pub owner_id: DbId,
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub grid_rows: i32,
    pub grid_cols: i32,
    pub pricing_mode: String,
    pub fixed_price_cents: Option<Cents>,
    pub sequential_step_cents: Option<Cents>,
    pub currency: String,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Campaign {
    /// Pricing parameters as stored on this row.
    ///
    /// Returns `None` when the stored mode string is unknown, which only
    /// happens if the row predates the `ck_campaigns_pricing_mode` check.
    pub fn pricing_params(&self) -> Option<PricingParams> {
        Some(PricingParams {
            mode: PricingMode::parse(&self.pricing_mode)?,
            fixed_price_cents: self.fixed_price_cents,
            sequential_step_cents: self.sequential_step_cents,
        })
    }
}

/// DTO for creating a new campaign.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCampaign {
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub grid_rows: i32,
    pub grid_cols: i32,
    pub pricing_mode: PricingMode,
    pub fixed_price_cents: Option<Cents>,
    pub sequential_step_cents: Option<Cents>,
    /// Required for `manual` pricing: one price per square, row-major.
    pub manual_prices_cents: Option<Vec<Cents>>,
    /// ISO currency code, defaults to `usd`.
    pub currency: Option<String>,
}

/// DTO for updating an existing campaign. All fields are optional.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateCampaign {
    pub title: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}
