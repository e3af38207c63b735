//! Stock-status derivation.
//!
//! Classifies an item's current stock against its reorder level into
//! Critical / Low / Good, together with the stock ratio used for badges and
//! progress indicators. Pure; display concerns (badge color, clamping a
//! progress bar to 100%) stay with the caller.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use batcherp_core::{DomainError, DomainResult};

/// Discrete stock status, most urgent first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StockStatus {
    Critical,
    Low,
    Good,
}

impl StockStatus {
    /// Anything short of `Good` is flagged for replenishment.
    pub fn needs_reorder(self) -> bool {
        !matches!(self, StockStatus::Good)
    }
}

/// Classification result: discrete status plus the raw ratio.
///
/// `ratio` is stock / reorder level; `+∞` for an untracked item with stock
/// on hand, `0.0` for an empty untracked item.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StockAssessment {
    pub status: StockStatus,
    pub ratio: f64,
}

/// Classify stock against a reorder level.
///
/// - ratio ≤ 0.25 → `Critical`; 0.25 < ratio ≤ 1.0 → `Low`; ratio > 1.0 → `Good`.
///   Ties at 0.25 and 1.0 land on the more urgent tier, and the threshold
///   comparisons are done in `Decimal` so a boundary quantity never drifts
///   across a tier through float conversion.
/// - A reorder level of zero means the item is not tracked for reorder:
///   always `Good`, except that zero stock is always urgent → `Critical`.
/// - Negative stock or a negative reorder level is malformed input.
pub fn classify_stock(
    stock_quantity: Decimal,
    reorder_level: Decimal,
) -> DomainResult<StockAssessment> {
    if stock_quantity < Decimal::ZERO {
        return Err(DomainError::invalid_input(
            "stock quantity cannot be negative",
        ));
    }
    if reorder_level < Decimal::ZERO {
        return Err(DomainError::invalid_input(
            "reorder level cannot be negative",
        ));
    }

    if reorder_level.is_zero() {
        return Ok(if stock_quantity.is_zero() {
            StockAssessment {
                status: StockStatus::Critical,
                ratio: 0.0,
            }
        } else {
            StockAssessment {
                status: StockStatus::Good,
                ratio: f64::INFINITY,
            }
        });
    }

    let exact_ratio = stock_quantity / reorder_level;
    let critical_cutoff = Decimal::new(25, 2);

    let status = if exact_ratio <= critical_cutoff {
        StockStatus::Critical
    } else if exact_ratio <= Decimal::ONE {
        StockStatus::Low
    } else {
        StockStatus::Good
    };

    Ok(StockAssessment {
        status,
        ratio: exact_ratio.to_f64().unwrap_or(f64::INFINITY),
    })
}
