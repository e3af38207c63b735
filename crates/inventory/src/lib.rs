//! Inventory domain module (event-sourced).
//!
//! This crate contains business rules for inventory, implemented purely as
//! deterministic domain logic (no IO, no HTTP, no storage): the item
//! aggregate (intake, stock receipt, production consumption, cost changes)
//! and the stock-status classifier.

pub mod item;
pub mod stock_status;

pub use item::{
    ChangeUnitCost, ConsumeStock, CreateItem, InventoryCommand, InventoryEvent, InventoryItem,
    ItemCategory, ItemCreated, ItemId, ReceiveStock, StockConsumed, StockReceived, UnitCostChanged,
};
pub use stock_status::{classify_stock, StockAssessment, StockStatus};
