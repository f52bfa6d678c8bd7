//! Campaign pricing rules and grid arithmetic.
//!
//! A campaign fixes its grid dimensions and pricing scheme at creation.
//! Squares are numbered row-major starting at 1, and a square's price is a
//! pure function of the scheme and its number (except `manual`, where prices
//! are supplied per square at creation time).

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Cents;

/// Maximum squares per grid side.
pub const MAX_GRID_SIDE: i32 = 100;

/// How square prices are derived for a campaign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PricingMode {
    /// Every square costs the same fixed amount.
    Fixed,
    /// Square `n` costs `n * step`, so later squares cost more.
    Sequential,
    /// Prices are supplied per square at campaign creation.
    Manual,
}

impl PricingMode {
    pub fn as_str(self) -> &'static str {
        match self {
            PricingMode::Fixed => "fixed",
            PricingMode::Sequential => "sequential",
            PricingMode::Manual => "manual",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "fixed" => Some(PricingMode::Fixed),
            "sequential" => Some(PricingMode::Sequential),
            "manual" => Some(PricingMode::Manual),
            _ => None,
        }
    }
}

/// Pricing parameters as stored on the campaign row.
#[derive(Debug, Clone, Copy)]
pub struct PricingParams {
    pub mode: PricingMode,
    /// Price of every square under `Fixed`.
    pub fixed_price_cents: Option<Cents>,
    /// Per-number increment under `Sequential`.
    pub sequential_step_cents: Option<Cents>,
}

impl PricingParams {
    /// Validate that the parameters required by the mode are present and
    /// positive. Called at campaign creation.
    pub fn validate(&self) -> Result<(), CoreError> {
        match self.mode {
            PricingMode::Fixed => match self.fixed_price_cents {
                Some(p) if p > 0 => Ok(()),
                _ => Err(CoreError::Validation(
                    "fixed pricing requires a positive fixed_price_cents".into(),
                )),
            },
            PricingMode::Sequential => match self.sequential_step_cents {
                Some(s) if s > 0 => Ok(()),
                _ => Err(CoreError::Validation(
                    "sequential pricing requires a positive sequential_step_cents".into(),
                )),
            },
            PricingMode::Manual => Ok(()),
        }
    }

    /// Price of square `number` (1-based) under these parameters.
    ///
    /// Returns an error for `Manual`, whose prices live on the square rows
    /// and cannot be recomputed.
    pub fn price_for_square(&self, number: i32) -> Result<Cents, CoreError> {
        if number < 1 {
            return Err(CoreError::Validation(format!(
                "square number must be >= 1, got {number}"
            )));
        }
        match self.mode {
            PricingMode::Fixed => self.fixed_price_cents.ok_or_else(|| {
                CoreError::Internal("fixed campaign missing fixed_price_cents".into())
            }),
            PricingMode::Sequential => self
                .sequential_step_cents
                .map(|step| step * Cents::from(number))
                .ok_or_else(|| {
                    CoreError::Internal("sequential campaign missing sequential_step_cents".into())
                }),
            PricingMode::Manual => Err(CoreError::Validation(
                "manual campaigns have no pricing function; prices are per square".into(),
            )),
        }
    }
}

/// Row-major 1-based number of the square at `(row, col)`.
pub fn square_number(row: i32, col: i32, grid_cols: i32) -> i32 {
    row * grid_cols + col + 1
}

/// Validate grid dimensions at campaign creation.
pub fn validate_grid(rows: i32, cols: i32) -> Result<(), CoreError> {
    if rows < 1 || cols < 1 {
        return Err(CoreError::Validation(format!(
            "grid must be at least 1x1, got {rows}x{cols}"
        )));
    }
    if rows > MAX_GRID_SIDE || cols > MAX_GRID_SIDE {
        return Err(CoreError::Validation(format!(
            "grid side may not exceed {MAX_GRID_SIDE}, got {rows}x{cols}"
        )));
    }
    Ok(())
}

/// Whether `(row, col)` lies inside a `rows x cols` grid.
pub fn in_bounds(row: i32, col: i32, rows: i32, cols: i32) -> bool {
    row >= 0 && col >= 0 && row < rows && col < cols
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn fixed(price: Cents) -> PricingParams {
        PricingParams {
            mode: PricingMode::Fixed,
            fixed_price_cents: Some(price),
            sequential_step_cents: None,
        }
    }

    fn sequential(step: Cents) -> PricingParams {
        PricingParams {
            mode: PricingMode::Sequential,
            fixed_price_cents: None,
            sequential_step_cents: Some(step),
        }
    }

    #[test]
    fn fixed_price_is_constant() {
        let params = fixed(1000);
        assert_eq!(params.price_for_square(1).unwrap(), 1000);
        assert_eq!(params.price_for_square(100).unwrap(), 1000);
    }

    #[test]
    fn sequential_price_scales_with_number() {
        let params = sequential(250);
        assert_eq!(params.price_for_square(1).unwrap(), 250);
        assert_eq!(params.price_for_square(4).unwrap(), 1000);
    }

    #[test]
    fn manual_has_no_pricing_function() {
        let params = PricingParams {
            mode: PricingMode::Manual,
            fixed_price_cents: None,
            sequential_step_cents: None,
        };
        assert_matches!(
            params.price_for_square(1),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn validate_rejects_missing_params() {
        let params = PricingParams {
            mode: PricingMode::Fixed,
            fixed_price_cents: None,
            sequential_step_cents: None,
        };
        assert_matches!(params.validate(), Err(CoreError::Validation(_)));

        let params = PricingParams {
            mode: PricingMode::Sequential,
            fixed_price_cents: None,
            sequential_step_cents: Some(0),
        };
        assert_matches!(params.validate(), Err(CoreError::Validation(_)));
    }

    #[test]
    fn numbering_is_row_major_one_based() {
        // 3-column grid:
        //   1 2 3
        //   4 5 6
        assert_eq!(square_number(0, 0, 3), 1);
        assert_eq!(square_number(0, 2, 3), 3);
        assert_eq!(square_number(1, 0, 3), 4);
        assert_eq!(square_number(1, 2, 3), 6);
    }

    #[test]
    fn grid_validation_bounds() {
        assert!(validate_grid(1, 1).is_ok());
        assert!(validate_grid(100, 100).is_ok());
        assert_matches!(validate_grid(0, 5), Err(CoreError::Validation(_)));
        assert_matches!(validate_grid(101, 5), Err(CoreError::Validation(_)));
    }

    #[test]
    fn bounds_check() {
        assert!(in_bounds(0, 0, 10, 10));
        assert!(in_bounds(9, 9, 10, 10));
        assert!(!in_bounds(10, 0, 10, 10));
        assert!(!in_bounds(-1, 0, 10, 10));
    }
}
