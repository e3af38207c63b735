use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use batcherp_core::{Aggregate, AggregateId, AggregateRoot, DomainError, Money};
use batcherp_events::Event;
use batcherp_inventory::ItemId;

use crate::costing::{compute_totals, price_lines, BomLine, PricedLine};

/// BOM identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BomId(pub AggregateId);

impl BomId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for BomId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Aggregate root: Bom (versioned recipe).
///
/// A priced version is a historical fact: the line set is fixed at creation,
/// and re-pricing re-snapshots costs under a **new** version label. The
/// stored `total_cost` is a derived cache — it is only ever written from the
/// costing engine's output carried on events, never assigned directly.
#[derive(Debug, Clone, PartialEq)]
pub struct Bom {
    id: BomId,
    name: String,
    version_label: String,
    yield_quantity: Decimal,
    yield_unit: String,
    lines: Vec<PricedLine>,
    is_active: bool,
    total_cost: Money,
    created_at: DateTime<Utc>,
    version: u64,
    created: bool,
}

impl Bom {
    /// Create an empty, not-yet-created aggregate instance for rehydration.
    pub fn empty(id: BomId) -> Self {
        Self {
            id,
            name: String::new(),
            version_label: String::new(),
            yield_quantity: Decimal::ZERO,
            yield_unit: String::new(),
            lines: Vec::new(),
            is_active: false,
            total_cost: Money::ZERO,
            created_at: DateTime::UNIX_EPOCH,
            version: 0,
            created: false,
        }
    }

    pub fn id_typed(&self) -> BomId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The recipe's version label (e.g. "1.2"), not the aggregate version.
    pub fn version_label(&self) -> &str {
        &self.version_label
    }

    pub fn yield_quantity(&self) -> Decimal {
        self.yield_quantity
    }

    pub fn yield_unit(&self) -> &str {
        &self.yield_unit
    }

    pub fn lines(&self) -> &[PricedLine] {
        &self.lines
    }

    /// Whether this version is eligible for new production orders.
    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn total_cost(&self) -> Money {
        self.total_cost
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Cost per unit of yield; `None` until the recipe has been created.
    pub fn cost_per_yield_unit(&self) -> Option<Money> {
        if self.yield_quantity > Decimal::ZERO {
            Some(self.total_cost / self.yield_quantity)
        } else {
            None
        }
    }
}

impl AggregateRoot for Bom {
    type Id = BomId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: CreateBom.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateBom {
    pub bom_id: BomId,
    pub name: String,
    pub version: String,
    pub yield_quantity: Decimal,
    pub yield_unit: String,
    pub lines: Vec<BomLine>,
    pub is_active: bool,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RepriceBom.
///
/// `item_costs` is the caller's read of each referenced item's current unit
/// cost; every line's item must be present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepriceBom {
    pub bom_id: BomId,
    pub version: String,
    pub item_costs: HashMap<ItemId, Money>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: SetActive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetActive {
    pub bom_id: BomId,
    pub active: bool,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BomCommand {
    CreateBom(CreateBom),
    RepriceBom(RepriceBom),
    SetActive(SetActive),
}

/// Event: BomCreated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BomCreated {
    pub bom_id: BomId,
    pub name: String,
    pub version: String,
    pub yield_quantity: Decimal,
    pub yield_unit: String,
    pub lines: Vec<PricedLine>,
    pub is_active: bool,
    pub total_cost: Money,
    pub occurred_at: DateTime<Utc>,
}

/// Event: BomRepriced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BomRepriced {
    pub bom_id: BomId,
    pub version: String,
    pub lines: Vec<PricedLine>,
    pub total_cost: Money,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ActivationChanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivationChanged {
    pub bom_id: BomId,
    pub active: bool,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BomEvent {
    BomCreated(BomCreated),
    BomRepriced(BomRepriced),
    ActivationChanged(ActivationChanged),
}

impl Event for BomEvent {
    fn event_type(&self) -> &'static str {
        match self {
            BomEvent::BomCreated(_) => "bom.created",
            BomEvent::BomRepriced(_) => "bom.repriced",
            BomEvent::ActivationChanged(_) => "bom.activation_changed",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            BomEvent::BomCreated(e) => e.occurred_at,
            BomEvent::BomRepriced(e) => e.occurred_at,
            BomEvent::ActivationChanged(e) => e.occurred_at,
        }
    }
}

impl Aggregate for Bom {
    type Command = BomCommand;
    type Event = BomEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            BomEvent::BomCreated(e) => {
                self.id = e.bom_id;
                self.name = e.name.clone();
                self.version_label = e.version.clone();
                self.yield_quantity = e.yield_quantity;
                self.yield_unit = e.yield_unit.clone();
                self.lines = e.lines.clone();
                self.is_active = e.is_active;
                self.total_cost = e.total_cost;
                self.created_at = e.occurred_at;
                self.created = true;
            }
            BomEvent::BomRepriced(e) => {
                self.version_label = e.version.clone();
                self.lines = e.lines.clone();
                self.total_cost = e.total_cost;
            }
            BomEvent::ActivationChanged(e) => {
                self.is_active = e.active;
            }
        }

        // Deterministic version tracking: +1 per applied event.
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            BomCommand::CreateBom(cmd) => self.handle_create(cmd),
            BomCommand::RepriceBom(cmd) => self.handle_reprice(cmd),
            BomCommand::SetActive(cmd) => self.handle_set_active(cmd),
        }
    }
}

impl Bom {
    fn ensure_bom_id(&self, bom_id: BomId) -> Result<(), DomainError> {
        if self.id != bom_id {
            return Err(DomainError::invalid_input("bom_id mismatch"));
        }
        Ok(())
    }

    fn handle_create(&self, cmd: &CreateBom) -> Result<Vec<BomEvent>, DomainError> {
        if self.created {
            return Err(DomainError::conflict("bom already exists"));
        }
        if cmd.name.trim().is_empty() {
            return Err(DomainError::invalid_input("name cannot be empty"));
        }
        if cmd.version.trim().is_empty() {
            return Err(DomainError::invalid_input("version cannot be empty"));
        }
        if cmd.yield_unit.trim().is_empty() {
            return Err(DomainError::invalid_input("yield unit cannot be empty"));
        }
        if cmd.lines.is_empty() {
            return Err(DomainError::invalid_input(
                "a recipe needs at least one line",
            ));
        }

        // Price through the engine; this also validates every quantity,
        // every cost snapshot, and the yield.
        let totals = compute_totals(&cmd.lines, cmd.yield_quantity)?;
        let lines = price_lines(&cmd.lines)?;

        Ok(vec![BomEvent::BomCreated(BomCreated {
            bom_id: cmd.bom_id,
            name: cmd.name.clone(),
            version: cmd.version.clone(),
            yield_quantity: cmd.yield_quantity,
            yield_unit: cmd.yield_unit.clone(),
            lines,
            is_active: cmd.is_active,
            total_cost: totals.total_cost,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_reprice(&self, cmd: &RepriceBom) -> Result<Vec<BomEvent>, DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        self.ensure_bom_id(cmd.bom_id)?;

        if cmd.version.trim().is_empty() {
            return Err(DomainError::invalid_input("version cannot be empty"));
        }
        if cmd.version == self.version_label {
            return Err(DomainError::invalid_input(
                "re-pricing requires a new version label; a priced version is immutable",
            ));
        }

        // Re-snapshot every line from the supplied current costs.
        let repriced: Vec<BomLine> = self
            .lines
            .iter()
            .map(|line| {
                let unit_cost = cmd.item_costs.get(&line.item_id).copied().ok_or_else(|| {
                    DomainError::invalid_input(format!(
                        "no current cost supplied for item {}",
                        line.item_id
                    ))
                })?;
                Ok(BomLine {
                    item_id: line.item_id,
                    quantity: line.quantity,
                    unit: line.unit.clone(),
                    unit_cost,
                    kind: line.kind,
                })
            })
            .collect::<Result<_, DomainError>>()?;

        let totals = compute_totals(&repriced, self.yield_quantity)?;
        let lines = price_lines(&repriced)?;

        Ok(vec![BomEvent::BomRepriced(BomRepriced {
            bom_id: cmd.bom_id,
            version: cmd.version.clone(),
            lines,
            total_cost: totals.total_cost,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_set_active(&self, cmd: &SetActive) -> Result<Vec<BomEvent>, DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        self.ensure_bom_id(cmd.bom_id)?;

        Ok(vec![BomEvent::ActivationChanged(ActivationChanged {
            bom_id: cmd.bom_id,
            active: cmd.active,
            occurred_at: cmd.occurred_at,
        })])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::costing::LineKind;
    use rust_decimal_macros::dec;

    fn test_bom_id() -> BomId {
        BomId::new(AggregateId::new())
    }

    fn test_item_id() -> ItemId {
        ItemId::new(AggregateId::new())
    }

    fn test_time() -> DateTime<Utc> {
        Utc::now()
    }

    fn flour_and_jar_lines(flour: ItemId, jar: ItemId) -> Vec<BomLine> {
        vec![
            BomLine {
                item_id: flour,
                quantity: dec!(2),
                unit: "kg".to_string(),
                unit_cost: Money::new(dec!(1.50)),
                kind: LineKind::Ingredient,
            },
            BomLine {
                item_id: jar,
                quantity: dec!(1),
                unit: "pieces".to_string(),
                unit_cost: Money::new(dec!(0.75)),
                kind: LineKind::Packaging,
            },
        ]
    }

    fn created_bom(bom_id: BomId, flour: ItemId, jar: ItemId) -> Bom {
        let mut bom = Bom::empty(bom_id);
        let cmd = CreateBom {
            bom_id,
            name: "Sourdough Batch".to_string(),
            version: "1.0".to_string(),
            yield_quantity: dec!(10),
            yield_unit: "loaves".to_string(),
            lines: flour_and_jar_lines(flour, jar),
            is_active: true,
            occurred_at: test_time(),
        };
        let events = bom.handle(&BomCommand::CreateBom(cmd)).unwrap();
        bom.apply(&events[0]);
        bom
    }

    #[test]
    fn create_prices_lines_and_rolls_up() {
        let bom_id = test_bom_id();
        let bom = created_bom(bom_id, test_item_id(), test_item_id());

        assert_eq!(bom.total_cost(), Money::new(dec!(3.75)));
        assert_eq!(
            bom.cost_per_yield_unit(),
            Some(Money::new(dec!(0.375)))
        );
        assert_eq!(bom.lines().len(), 2);
        assert_eq!(bom.lines()[0].total_cost, Money::new(dec!(3.00)));
        assert_eq!(bom.lines()[1].total_cost, Money::new(dec!(0.75)));
        assert_eq!(bom.version_label(), "1.0");
        assert!(bom.is_active());
    }

    #[test]
    fn create_rejects_invalid_lines() {
        let bom_id = test_bom_id();
        let bom = Bom::empty(bom_id);

        let mut lines = flour_and_jar_lines(test_item_id(), test_item_id());
        lines[0].quantity = dec!(-1);

        let cmd = CreateBom {
            bom_id,
            name: "Bad Batch".to_string(),
            version: "1.0".to_string(),
            yield_quantity: dec!(10),
            yield_unit: "loaves".to_string(),
            lines,
            is_active: false,
            occurred_at: test_time(),
        };
        let err = bom.handle(&BomCommand::CreateBom(cmd)).unwrap_err();
        assert!(matches!(err, DomainError::InvalidQuantity(_)));
    }

    #[test]
    fn reprice_requires_new_version_label() {
        let bom_id = test_bom_id();
        let flour = test_item_id();
        let jar = test_item_id();
        let bom = created_bom(bom_id, flour, jar);

        let cmd = RepriceBom {
            bom_id,
            version: "1.0".to_string(),
            item_costs: HashMap::from([
                (flour, Money::new(dec!(1.80))),
                (jar, Money::new(dec!(0.75))),
            ]),
            occurred_at: test_time(),
        };
        let err = bom.handle(&BomCommand::RepriceBom(cmd)).unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));
    }

    #[test]
    fn reprice_requires_cost_for_every_line() {
        let bom_id = test_bom_id();
        let flour = test_item_id();
        let jar = test_item_id();
        let bom = created_bom(bom_id, flour, jar);

        let cmd = RepriceBom {
            bom_id,
            version: "1.1".to_string(),
            item_costs: HashMap::from([(flour, Money::new(dec!(1.80)))]),
            occurred_at: test_time(),
        };
        let err = bom.handle(&BomCommand::RepriceBom(cmd)).unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));
    }

    #[test]
    fn reprice_resnapshots_costs_and_recomputes_totals() {
        let bom_id = test_bom_id();
        let flour = test_item_id();
        let jar = test_item_id();
        let mut bom = created_bom(bom_id, flour, jar);

        let cmd = RepriceBom {
            bom_id,
            version: "1.1".to_string(),
            item_costs: HashMap::from([
                (flour, Money::new(dec!(2.00))),
                (jar, Money::new(dec!(0.50))),
            ]),
            occurred_at: test_time(),
        };
        let events = bom.handle(&BomCommand::RepriceBom(cmd)).unwrap();
        bom.apply(&events[0]);

        assert_eq!(bom.version_label(), "1.1");
        assert_eq!(bom.total_cost(), Money::new(dec!(4.50)));
        assert_eq!(bom.lines()[0].unit_cost, Money::new(dec!(2.00)));
        // Quantities and line order are untouched by a re-price.
        assert_eq!(bom.lines()[0].quantity, dec!(2));
        assert_eq!(bom.lines()[1].item_id, jar);
    }

    #[test]
    fn activation_toggle() {
        let bom_id = test_bom_id();
        let mut bom = created_bom(bom_id, test_item_id(), test_item_id());
        assert!(bom.is_active());

        let cmd = SetActive {
            bom_id,
            active: false,
            occurred_at: test_time(),
        };
        let events = bom.handle(&BomCommand::SetActive(cmd)).unwrap();
        bom.apply(&events[0]);
        assert!(!bom.is_active());
    }

    #[test]
    fn handle_does_not_mutate_state() {
        let bom_id = test_bom_id();
        let flour = test_item_id();
        let jar = test_item_id();
        let bom = created_bom(bom_id, flour, jar);
        let before = bom.clone();

        let cmd = RepriceBom {
            bom_id,
            version: "2.0".to_string(),
            item_costs: HashMap::from([
                (flour, Money::new(dec!(9.99))),
                (jar, Money::new(dec!(9.99))),
            ]),
            occurred_at: test_time(),
        };
        let events1 = bom.handle(&BomCommand::RepriceBom(cmd.clone())).unwrap();
        let events2 = bom.handle(&BomCommand::RepriceBom(cmd)).unwrap();

        assert_eq!(bom, before);
        assert_eq!(events1, events2);
    }

    #[test]
    fn version_increments_on_apply() {
        let bom_id = test_bom_id();
        let mut bom = created_bom(bom_id, test_item_id(), test_item_id());
        assert_eq!(bom.version(), 1);

        let cmd = SetActive {
            bom_id,
            active: false,
            occurred_at: test_time(),
        };
        let events = bom.handle(&BomCommand::SetActive(cmd)).unwrap();
        bom.apply(&events[0]);
        assert_eq!(bom.version(), 2);
    }
}
