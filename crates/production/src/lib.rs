//! Production-order domain module.
//!
//! A production order runs one BOM: planned → in-progress → completed, with
//! cancellation from either non-terminal state. Materials cost is locked
//! from the BOM snapshot at the moment work starts; later re-pricing never
//! rewrites a running or finished order.

pub mod order;

pub use order::{
    scale_materials_cost, CancelOrder, CompleteOrder, OrderCancelled, OrderCompleted,
    OrderPlanned, OrderStarted, OrderStatus, PlanOrder, ProductionCommand, ProductionEvent,
    ProductionOrder, ProductionOrderId, StartOrder,
};
