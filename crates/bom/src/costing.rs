//! Recipe costing engine.
//!
//! Pure functions: validate line items, price them, and roll them up into a
//! total cost and a cost per unit of yield. Rounding convention: each line
//! total is rounded to currency precision **before** summation, so the
//! rollup matches what a human auditing the recipe line by line would
//! compute. The yield-normalized unit cost is left unrounded.
//!
//! Callers are responsible for persisting recomputed totals; nothing here
//! has side effects.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use batcherp_core::{DomainError, DomainResult, Money};
use batcherp_inventory::ItemId;

/// Line classification: recipe ingredient or packaging material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineKind {
    Ingredient,
    Packaging,
}

/// One unpriced recipe line: what and how much one yield batch consumes.
///
/// `unit_cost` is a snapshot of the referenced item's cost at pricing time,
/// never a live reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BomLine {
    pub item_id: ItemId,
    pub quantity: Decimal,
    pub unit: String,
    pub unit_cost: Money,
    pub kind: LineKind,
}

/// A line with its rounded total, as stored on a priced BOM.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricedLine {
    pub item_id: ItemId,
    pub quantity: Decimal,
    pub unit: String,
    pub unit_cost: Money,
    pub total_cost: Money,
    pub kind: LineKind,
}

/// Rollup result for one recipe.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BomTotals {
    /// Sum of rounded line totals.
    pub total_cost: Money,
    /// `total_cost / yield_quantity`, unrounded.
    pub cost_per_yield_unit: Money,
}

fn validate_line(line: &BomLine) -> DomainResult<()> {
    if line.quantity <= Decimal::ZERO {
        return Err(DomainError::invalid_quantity(format!(
            "line quantity for item {} must be positive",
            line.item_id
        )));
    }
    if line.unit_cost.is_negative() {
        return Err(DomainError::invalid_cost(format!(
            "unit cost for item {} cannot be negative",
            line.item_id
        )));
    }
    Ok(())
}

/// Rounded total for one line: round(quantity × unit cost, currency precision).
pub fn line_total(line: &BomLine) -> DomainResult<Money> {
    validate_line(line)?;
    Ok((line.unit_cost * line.quantity).rounded())
}

/// Price every line, preserving order.
pub fn price_lines(lines: &[BomLine]) -> DomainResult<Vec<PricedLine>> {
    lines
        .iter()
        .map(|line| {
            let total_cost = line_total(line)?;
            Ok(PricedLine {
                item_id: line.item_id,
                quantity: line.quantity,
                unit: line.unit.clone(),
                unit_cost: line.unit_cost,
                total_cost,
                kind: line.kind,
            })
        })
        .collect()
}

/// Roll a recipe up into its total cost and cost per unit of yield.
///
/// Line totals are exact decimal sums of per-line rounded amounts, so the
/// result does not depend on line order.
pub fn compute_totals(lines: &[BomLine], yield_quantity: Decimal) -> DomainResult<BomTotals> {
    if yield_quantity <= Decimal::ZERO {
        return Err(DomainError::invalid_quantity(
            "yield quantity must be positive",
        ));
    }

    let mut total_cost = Money::ZERO;
    for line in lines {
        total_cost += line_total(line)?;
    }

    Ok(BomTotals {
        total_cost,
        cost_per_yield_unit: total_cost / yield_quantity,
    })
}

/// A line must be denominated in the unit its referenced item is tracked in.
pub fn ensure_line_unit(line: &BomLine, item_unit: &str) -> DomainResult<()> {
    if line.unit != item_unit {
        return Err(DomainError::invalid_input(format!(
            "line for item {} uses unit {}, but the item is tracked in {}",
            line.item_id, line.unit, item_unit
        )));
    }
    Ok(())
}
