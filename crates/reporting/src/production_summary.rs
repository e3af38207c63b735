//! Production cost rollups.

use batcherp_core::Money;
use batcherp_production::{OrderStatus, ProductionOrderId};

/// One production-order row as the data source returns it.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRecord {
    pub order_id: ProductionOrderId,
    pub bom_name: String,
    pub status: OrderStatus,
    pub materials_cost: Money,
    pub labor_cost: Money,
    pub total_cost: Money,
}

/// Status breakdown plus cost rollup across a set of orders.
///
/// Cancelled orders count toward the breakdown but not the cost totals —
/// their materials were never committed.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductionSummary {
    pub planned: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub cancelled: usize,
    pub materials_cost: Money,
    pub labor_cost: Money,
    pub total_cost: Money,
}

/// Roll a set of order records up into a production summary.
pub fn summarize_orders(records: &[OrderRecord]) -> ProductionSummary {
    let mut summary = ProductionSummary {
        planned: 0,
        in_progress: 0,
        completed: 0,
        cancelled: 0,
        materials_cost: Money::ZERO,
        labor_cost: Money::ZERO,
        total_cost: Money::ZERO,
    };

    for record in records {
        match record.status {
            OrderStatus::Planned => summary.planned += 1,
            OrderStatus::InProgress => summary.in_progress += 1,
            OrderStatus::Completed => summary.completed += 1,
            OrderStatus::Cancelled => {
                summary.cancelled += 1;
                continue;
            }
        }

        summary.materials_cost += record.materials_cost;
        summary.labor_cost += record.labor_cost;
        summary.total_cost += record.total_cost;
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use batcherp_core::AggregateId;
    use rust_decimal_macros::dec;

    fn order(status: OrderStatus, materials: rust_decimal::Decimal, labor: rust_decimal::Decimal) -> OrderRecord {
        OrderRecord {
            order_id: ProductionOrderId::new(AggregateId::new()),
            bom_name: "Sourdough Batch".to_string(),
            status,
            materials_cost: Money::new(materials),
            labor_cost: Money::new(labor),
            total_cost: Money::new(materials + labor),
        }
    }

    #[test]
    fn counts_statuses_and_sums_costs() {
        let records = vec![
            order(OrderStatus::Planned, dec!(0), dec!(0)),
            order(OrderStatus::InProgress, dec!(7.50), dec!(0)),
            order(OrderStatus::Completed, dec!(7.50), dec!(12.00)),
            order(OrderStatus::Cancelled, dec!(99.00), dec!(99.00)),
        ];

        let summary = summarize_orders(&records);
        assert_eq!(summary.planned, 1);
        assert_eq!(summary.in_progress, 1);
        assert_eq!(summary.completed, 1);
        assert_eq!(summary.cancelled, 1);
        assert_eq!(summary.materials_cost, Money::new(dec!(15.00)));
        assert_eq!(summary.labor_cost, Money::new(dec!(12.00)));
        assert_eq!(summary.total_cost, Money::new(dec!(27.00)));
    }

    #[test]
    fn empty_set() {
        let summary = summarize_orders(&[]);
        assert_eq!(summary.planned + summary.in_progress + summary.completed, 0);
        assert_eq!(summary.total_cost, Money::ZERO);
    }
}
