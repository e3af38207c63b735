//! Sales figures: sold-line totals, profit, and top sellers.
//!
//! Line revenue and cost follow the round-per-line convention; profit is
//! the difference of the rounded figures, so the reported numbers always
//! reconcile line by line.

use std::collections::HashMap;

use rust_decimal::Decimal;

use batcherp_core::Money;

/// One sold line as the data source returns it: quantity of a product at a
/// unit price, with the unit cost it was carried at.
#[derive(Debug, Clone, PartialEq)]
pub struct SoldLine {
    pub product_name: String,
    pub quantity: Decimal,
    pub unit_price: Money,
    pub unit_cost: Money,
}

/// Derived figures for one sold line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SoldLineTotals {
    pub revenue: Money,
    pub cost: Money,
    pub profit: Money,
}

/// Revenue / cost-of-goods / profit rollup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SalesSummary {
    pub revenue: Money,
    pub cost_of_goods: Money,
    pub profit: Money,
}

/// Aggregated sales of one product.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductSales {
    pub product_name: String,
    pub quantity: Decimal,
    pub revenue: Money,
}

/// Totals for one sold line: round(quantity × price, 2) and the matching cost.
pub fn line_totals(line: &SoldLine) -> SoldLineTotals {
    let revenue = (line.unit_price * line.quantity).rounded();
    let cost = (line.unit_cost * line.quantity).rounded();
    SoldLineTotals {
        revenue,
        cost,
        profit: revenue - cost,
    }
}

/// Roll sold lines up into revenue, cost of goods, and profit.
pub fn summarize_sales(lines: &[SoldLine]) -> SalesSummary {
    let mut summary = SalesSummary {
        revenue: Money::ZERO,
        cost_of_goods: Money::ZERO,
        profit: Money::ZERO,
    };

    for line in lines {
        let totals = line_totals(line);
        summary.revenue += totals.revenue;
        summary.cost_of_goods += totals.cost;
        summary.profit += totals.profit;
    }

    summary
}

/// Top-selling products by revenue, at most `limit` entries.
pub fn top_products(lines: &[SoldLine], limit: usize) -> Vec<ProductSales> {
    let mut by_product: HashMap<&str, ProductSales> = HashMap::new();

    for line in lines {
        let totals = line_totals(line);
        let entry = by_product
            .entry(line.product_name.as_str())
            .or_insert_with(|| ProductSales {
                product_name: line.product_name.clone(),
                quantity: Decimal::ZERO,
                revenue: Money::ZERO,
            });
        entry.quantity += line.quantity;
        entry.revenue += totals.revenue;
    }

    let mut ranked: Vec<ProductSales> = by_product.into_values().collect();
    // Revenue descending; name as tie-break so the ranking is deterministic.
    ranked.sort_by(|a, b| {
        b.revenue
            .cmp(&a.revenue)
            .then_with(|| a.product_name.cmp(&b.product_name))
    });
    ranked.truncate(limit);
    ranked
}
