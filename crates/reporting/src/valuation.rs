//! Inventory valuation rollups.
//!
//! Pure functions over stock records. Item values follow the same
//! round-per-line convention as recipe costing: each item's value is
//! rounded to currency precision before the portfolio sum.

use batcherp_core::Money;
use batcherp_inventory::StockStatus;

use crate::stock_levels::StockRecord;

/// Portfolio summary: total value plus status breakdown.
#[derive(Debug, Clone, PartialEq)]
pub struct InventorySummary {
    pub total_items: usize,
    pub total_value: Money,
    pub critical_items: usize,
    pub low_items: usize,
    pub good_items: usize,
}

impl InventorySummary {
    /// Items flagged for replenishment (anything short of `Good`).
    pub fn low_stock_items(&self) -> usize {
        self.critical_items + self.low_items
    }
}

/// Value of one item's stock on hand: round(quantity × unit cost, 2).
pub fn item_value(record: &StockRecord) -> Money {
    (record.unit_cost * record.quantity).rounded()
}

/// Roll a set of stock records up into a portfolio summary.
pub fn summarize_inventory(records: &[StockRecord]) -> InventorySummary {
    let mut summary = InventorySummary {
        total_items: records.len(),
        total_value: Money::ZERO,
        critical_items: 0,
        low_items: 0,
        good_items: 0,
    };

    for record in records {
        summary.total_value += item_value(record);
        match record.status {
            StockStatus::Critical => summary.critical_items += 1,
            StockStatus::Low => summary.low_items += 1,
            StockStatus::Good => summary.good_items += 1,
        }
    }

    summary
}

/// Records flagged for replenishment, most urgent first.
pub fn low_stock(records: &[StockRecord]) -> Vec<&StockRecord> {
    let mut flagged: Vec<&StockRecord> = records
        .iter()
        .filter(|r| r.status.needs_reorder())
        .collect();
    flagged.sort_by(|a, b| a.ratio.total_cmp(&b.ratio));
    flagged
}

#[cfg(test)]
mod tests {
    use super::*;
    use batcherp_core::AggregateId;
    use batcherp_inventory::{classify_stock, ItemCategory, ItemId};
    use chrono::Utc;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn record(quantity: Decimal, unit_cost: Decimal, reorder_level: Decimal) -> StockRecord {
        let assessment = classify_stock(quantity, reorder_level).unwrap();
        StockRecord {
            item_id: ItemId::new(AggregateId::new()),
            name: "Test Item".to_string(),
            category: ItemCategory::RawMaterial,
            quantity,
            unit: "kg".to_string(),
            unit_cost: Money::new(unit_cost),
            reorder_level,
            status: assessment.status,
            ratio: assessment.ratio,
            last_updated: Utc::now(),
        }
    }

    #[test]
    fn item_value_rounds_to_currency_precision() {
        // 2.5 × 0.333 = 0.8325 → 0.83
        let r = record(dec!(2.5), dec!(0.333), dec!(10));
        assert_eq!(item_value(&r), Money::new(dec!(0.83)));
    }

    #[test]
    fn summary_counts_statuses_and_sums_values() {
        let records = vec![
            record(dec!(20), dec!(0.85), dec!(100)),  // Critical, 17.00
            record(dec!(50), dec!(1.20), dec!(100)),  // Low, 60.00
            record(dec!(400), dec!(0.10), dec!(75)),  // Good, 40.00
        ];

        let summary = summarize_inventory(&records);
        assert_eq!(summary.total_items, 3);
        assert_eq!(summary.critical_items, 1);
        assert_eq!(summary.low_items, 1);
        assert_eq!(summary.good_items, 1);
        assert_eq!(summary.low_stock_items(), 2);
        assert_eq!(summary.total_value, Money::new(dec!(117.00)));
    }

    #[test]
    fn empty_portfolio() {
        let summary = summarize_inventory(&[]);
        assert_eq!(summary.total_items, 0);
        assert_eq!(summary.total_value, Money::ZERO);
    }

    #[test]
    fn low_stock_sorts_most_urgent_first() {
        let records = vec![
            record(dec!(50), dec!(1), dec!(100)),  // ratio 0.5
            record(dec!(5), dec!(1), dec!(40)),    // ratio 0.125
            record(dec!(400), dec!(1), dec!(75)),  // Good, excluded
        ];

        let flagged = low_stock(&records);
        assert_eq!(flagged.len(), 2);
        assert_eq!(flagged[0].quantity, dec!(5));
        assert_eq!(flagged[1].quantity, dec!(50));
    }
}
