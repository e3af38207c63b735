//! Bill-of-materials domain module.
//!
//! A BOM is a versioned recipe: ordered ingredient/packaging lines, each
//! carrying a quantity and a unit-cost snapshot, rolled up into a total cost
//! and a yield-normalized unit cost. The costing engine is pure; the `Bom`
//! aggregate wraps it with the versioning/re-pricing lifecycle.

pub mod costing;
pub mod recipe;

pub use costing::{
    compute_totals, ensure_line_unit, line_total, price_lines, BomLine, BomTotals, LineKind,
    PricedLine,
};
pub use recipe::{
    ActivationChanged, Bom, BomCommand, BomCreated, BomEvent, BomId, BomRepriced, CreateBom,
    RepriceBom, SetActive,
};
