//! Read models and rollups: the reporting edge of the system.
//!
//! Everything the dashboard needs that is *derived* lives here — the
//! stock-level read model fed by inventory events, inventory valuation,
//! production cost rollups, and sales figures. Domain crates stay pure;
//! this crate owns the projection worker and is the only place that logs.

pub mod production_summary;
pub mod read_model;
pub mod sales;
pub mod stock_levels;
pub mod valuation;
pub mod worker;

pub use production_summary::{summarize_orders, OrderRecord, ProductionSummary};
pub use read_model::{InMemoryStore, Store};
pub use sales::{
    line_totals, summarize_sales, top_products, ProductSales, SalesSummary, SoldLine,
    SoldLineTotals,
};
pub use stock_levels::{StockLevelError, StockLevelProjection, StockRecord};
pub use valuation::{item_value, low_stock, summarize_inventory, InventorySummary};
pub use worker::{ProjectionWorker, WorkerHandle};

#[cfg(test)]
mod integration_tests;
