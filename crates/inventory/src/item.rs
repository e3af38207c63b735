use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use batcherp_core::{Aggregate, AggregateId, AggregateRoot, DomainError, DomainResult, Money};
use batcherp_events::Event;

use crate::stock_status::{classify_stock, StockAssessment};

/// Inventory item identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub AggregateId);

impl ItemId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for ItemId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Inventory category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ItemCategory {
    RawMaterial,
    FinishedProduct,
    Packaging,
}

/// Aggregate root: InventoryItem.
///
/// `stock_quantity` and `reorder_level` are denominated in the item's
/// `unit`; every stock mutation refreshes `last_updated`.
#[derive(Debug, Clone, PartialEq)]
pub struct InventoryItem {
    id: ItemId,
    name: String,
    category: ItemCategory,
    stock_quantity: Decimal,
    unit: String,
    unit_cost: Money,
    reorder_level: Decimal,
    last_updated: DateTime<Utc>,
    version: u64,
    created: bool,
}

impl InventoryItem {
    /// Create an empty, not-yet-created aggregate instance for rehydration.
    pub fn empty(id: ItemId) -> Self {
        Self {
            id,
            name: String::new(),
            category: ItemCategory::RawMaterial,
            stock_quantity: Decimal::ZERO,
            unit: String::new(),
            unit_cost: Money::ZERO,
            reorder_level: Decimal::ZERO,
            last_updated: DateTime::UNIX_EPOCH,
            version: 0,
            created: false,
        }
    }

    pub fn id_typed(&self) -> ItemId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> ItemCategory {
        self.category
    }

    pub fn stock_quantity(&self) -> Decimal {
        self.stock_quantity
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }

    pub fn unit_cost(&self) -> Money {
        self.unit_cost
    }

    pub fn reorder_level(&self) -> Decimal {
        self.reorder_level
    }

    pub fn last_updated(&self) -> DateTime<Utc> {
        self.last_updated
    }

    /// Current stock assessment (status + ratio) for this item.
    pub fn status(&self) -> DomainResult<StockAssessment> {
        classify_stock(self.stock_quantity, self.reorder_level)
    }
}

impl AggregateRoot for InventoryItem {
    type Id = ItemId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: CreateItem (intake).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateItem {
    pub item_id: ItemId,
    pub name: String,
    pub category: ItemCategory,
    pub unit: String,
    pub opening_stock: Decimal,
    pub unit_cost: Money,
    pub reorder_level: Decimal,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ReceiveStock (purchase receipt).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiveStock {
    pub item_id: ItemId,
    pub quantity: Decimal,
    pub unit: String,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ConsumeStock (production consumption).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsumeStock {
    pub item_id: ItemId,
    pub quantity: Decimal,
    pub unit: String,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ChangeUnitCost (re-price source for BOM re-pricing).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeUnitCost {
    pub item_id: ItemId,
    pub unit_cost: Money,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InventoryCommand {
    CreateItem(CreateItem),
    ReceiveStock(ReceiveStock),
    ConsumeStock(ConsumeStock),
    ChangeUnitCost(ChangeUnitCost),
}

/// Event: ItemCreated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemCreated {
    pub item_id: ItemId,
    pub name: String,
    pub category: ItemCategory,
    pub unit: String,
    pub opening_stock: Decimal,
    pub unit_cost: Money,
    pub reorder_level: Decimal,
    pub occurred_at: DateTime<Utc>,
}

/// Event: StockReceived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockReceived {
    pub item_id: ItemId,
    pub quantity: Decimal,
    pub occurred_at: DateTime<Utc>,
}

/// Event: StockConsumed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockConsumed {
    pub item_id: ItemId,
    pub quantity: Decimal,
    pub occurred_at: DateTime<Utc>,
}

/// Event: UnitCostChanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitCostChanged {
    pub item_id: ItemId,
    pub unit_cost: Money,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InventoryEvent {
    ItemCreated(ItemCreated),
    StockReceived(StockReceived),
    StockConsumed(StockConsumed),
    UnitCostChanged(UnitCostChanged),
}

impl Event for InventoryEvent {
    fn event_type(&self) -> &'static str {
        match self {
            InventoryEvent::ItemCreated(_) => "inventory.item.created",
            InventoryEvent::StockReceived(_) => "inventory.item.stock_received",
            InventoryEvent::StockConsumed(_) => "inventory.item.stock_consumed",
            InventoryEvent::UnitCostChanged(_) => "inventory.item.unit_cost_changed",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            InventoryEvent::ItemCreated(e) => e.occurred_at,
            InventoryEvent::StockReceived(e) => e.occurred_at,
            InventoryEvent::StockConsumed(e) => e.occurred_at,
            InventoryEvent::UnitCostChanged(e) => e.occurred_at,
        }
    }
}

impl Aggregate for InventoryItem {
    type Command = InventoryCommand;
    type Event = InventoryEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            InventoryEvent::ItemCreated(e) => {
                self.id = e.item_id;
                self.name = e.name.clone();
                self.category = e.category;
                self.unit = e.unit.clone();
                self.stock_quantity = e.opening_stock;
                self.unit_cost = e.unit_cost;
                self.reorder_level = e.reorder_level;
                self.last_updated = e.occurred_at;
                self.created = true;
            }
            InventoryEvent::StockReceived(e) => {
                self.stock_quantity += e.quantity;
                self.last_updated = e.occurred_at;
            }
            InventoryEvent::StockConsumed(e) => {
                self.stock_quantity -= e.quantity;
                self.last_updated = e.occurred_at;
            }
            InventoryEvent::UnitCostChanged(e) => {
                self.unit_cost = e.unit_cost;
                self.last_updated = e.occurred_at;
            }
        }

        // Deterministic version tracking: +1 per applied event.
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            InventoryCommand::CreateItem(cmd) => self.handle_create(cmd),
            InventoryCommand::ReceiveStock(cmd) => self.handle_receive(cmd),
            InventoryCommand::ConsumeStock(cmd) => self.handle_consume(cmd),
            InventoryCommand::ChangeUnitCost(cmd) => self.handle_change_cost(cmd),
        }
    }
}

impl InventoryItem {
    fn ensure_item_id(&self, item_id: ItemId) -> Result<(), DomainError> {
        if self.id != item_id {
            return Err(DomainError::invalid_input("item_id mismatch"));
        }
        Ok(())
    }

    fn ensure_unit(&self, unit: &str) -> Result<(), DomainError> {
        if self.unit != unit {
            return Err(DomainError::invalid_input(format!(
                "unit mismatch: item is tracked in {}, command uses {}",
                self.unit, unit
            )));
        }
        Ok(())
    }

    fn handle_create(&self, cmd: &CreateItem) -> Result<Vec<InventoryEvent>, DomainError> {
        if self.created {
            return Err(DomainError::conflict("item already exists"));
        }
        if cmd.name.trim().is_empty() {
            return Err(DomainError::invalid_input("name cannot be empty"));
        }
        if cmd.unit.trim().is_empty() {
            return Err(DomainError::invalid_input("unit cannot be empty"));
        }
        if cmd.opening_stock < Decimal::ZERO {
            return Err(DomainError::invalid_quantity(
                "opening stock cannot be negative",
            ));
        }
        if cmd.reorder_level < Decimal::ZERO {
            return Err(DomainError::invalid_quantity(
                "reorder level cannot be negative",
            ));
        }
        if cmd.unit_cost.is_negative() {
            return Err(DomainError::invalid_cost("unit cost cannot be negative"));
        }

        Ok(vec![InventoryEvent::ItemCreated(ItemCreated {
            item_id: cmd.item_id,
            name: cmd.name.clone(),
            category: cmd.category,
            unit: cmd.unit.clone(),
            opening_stock: cmd.opening_stock,
            unit_cost: cmd.unit_cost,
            reorder_level: cmd.reorder_level,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_receive(&self, cmd: &ReceiveStock) -> Result<Vec<InventoryEvent>, DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        self.ensure_item_id(cmd.item_id)?;
        self.ensure_unit(&cmd.unit)?;

        if cmd.quantity <= Decimal::ZERO {
            return Err(DomainError::invalid_quantity(
                "received quantity must be positive",
            ));
        }

        Ok(vec![InventoryEvent::StockReceived(StockReceived {
            item_id: cmd.item_id,
            quantity: cmd.quantity,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_consume(&self, cmd: &ConsumeStock) -> Result<Vec<InventoryEvent>, DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        self.ensure_item_id(cmd.item_id)?;
        self.ensure_unit(&cmd.unit)?;

        if cmd.quantity <= Decimal::ZERO {
            return Err(DomainError::invalid_quantity(
                "consumed quantity must be positive",
            ));
        }
        if self.stock_quantity - cmd.quantity < Decimal::ZERO {
            return Err(DomainError::invalid_quantity(
                "consumption would drive stock negative",
            ));
        }

        Ok(vec![InventoryEvent::StockConsumed(StockConsumed {
            item_id: cmd.item_id,
            quantity: cmd.quantity,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_change_cost(&self, cmd: &ChangeUnitCost) -> Result<Vec<InventoryEvent>, DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        self.ensure_item_id(cmd.item_id)?;

        if cmd.unit_cost.is_negative() {
            return Err(DomainError::invalid_cost("unit cost cannot be negative"));
        }

        Ok(vec![InventoryEvent::UnitCostChanged(UnitCostChanged {
            item_id: cmd.item_id,
            unit_cost: cmd.unit_cost,
            occurred_at: cmd.occurred_at,
        })])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stock_status::StockStatus;
    use rust_decimal_macros::dec;

    fn test_item_id() -> ItemId {
        ItemId::new(AggregateId::new())
    }

    fn test_time() -> DateTime<Utc> {
        Utc::now()
    }

    fn created_item(item_id: ItemId) -> InventoryItem {
        let mut item = InventoryItem::empty(item_id);
        let cmd = CreateItem {
            item_id,
            name: "All-Purpose Flour".to_string(),
            category: ItemCategory::RawMaterial,
            unit: "kg".to_string(),
            opening_stock: dec!(50),
            unit_cost: Money::new(dec!(0.85)),
            reorder_level: dec!(100),
            occurred_at: test_time(),
        };
        let events = item.handle(&InventoryCommand::CreateItem(cmd)).unwrap();
        item.apply(&events[0]);
        item
    }

    #[test]
    fn create_item_emits_item_created_event() {
        let item_id = test_item_id();
        let item = InventoryItem::empty(item_id);
        let cmd = CreateItem {
            item_id,
            name: "Granulated Sugar".to_string(),
            category: ItemCategory::RawMaterial,
            unit: "kg".to_string(),
            opening_stock: dec!(30),
            unit_cost: Money::new(dec!(1.20)),
            reorder_level: dec!(75),
            occurred_at: test_time(),
        };

        let events = item.handle(&InventoryCommand::CreateItem(cmd)).unwrap();
        assert_eq!(events.len(), 1);

        match &events[0] {
            InventoryEvent::ItemCreated(e) => {
                assert_eq!(e.item_id, item_id);
                assert_eq!(e.opening_stock, dec!(30));
                assert_eq!(e.unit, "kg");
            }
            _ => panic!("Expected ItemCreated event"),
        }
    }

    #[test]
    fn create_rejects_negative_opening_stock_and_cost() {
        let item_id = test_item_id();
        let item = InventoryItem::empty(item_id);

        let cmd = CreateItem {
            item_id,
            name: "Butter".to_string(),
            category: ItemCategory::RawMaterial,
            unit: "kg".to_string(),
            opening_stock: dec!(-1),
            unit_cost: Money::new(dec!(4.00)),
            reorder_level: dec!(40),
            occurred_at: test_time(),
        };
        let err = item.handle(&InventoryCommand::CreateItem(cmd)).unwrap_err();
        assert!(matches!(err, DomainError::InvalidQuantity(_)));

        let cmd = CreateItem {
            item_id,
            name: "Butter".to_string(),
            category: ItemCategory::RawMaterial,
            unit: "kg".to_string(),
            opening_stock: dec!(1),
            unit_cost: Money::new(dec!(-4.00)),
            reorder_level: dec!(40),
            occurred_at: test_time(),
        };
        let err = item.handle(&InventoryCommand::CreateItem(cmd)).unwrap_err();
        assert!(matches!(err, DomainError::InvalidCost(_)));
    }

    #[test]
    fn receive_and_consume_adjust_stock_and_last_updated() {
        let item_id = test_item_id();
        let mut item = created_item(item_id);
        let t0 = item.last_updated();

        let receive = ReceiveStock {
            item_id,
            quantity: dec!(25),
            unit: "kg".to_string(),
            occurred_at: test_time(),
        };
        let events = item.handle(&InventoryCommand::ReceiveStock(receive)).unwrap();
        item.apply(&events[0]);
        assert_eq!(item.stock_quantity(), dec!(75));
        assert!(item.last_updated() >= t0);

        let consume = ConsumeStock {
            item_id,
            quantity: dec!(12.5),
            unit: "kg".to_string(),
            occurred_at: test_time(),
        };
        let events = item.handle(&InventoryCommand::ConsumeStock(consume)).unwrap();
        item.apply(&events[0]);
        assert_eq!(item.stock_quantity(), dec!(62.5));
    }

    #[test]
    fn consumption_cannot_drive_stock_negative() {
        let item_id = test_item_id();
        let item = created_item(item_id);

        let consume = ConsumeStock {
            item_id,
            quantity: dec!(50.01),
            unit: "kg".to_string(),
            occurred_at: test_time(),
        };
        let err = item
            .handle(&InventoryCommand::ConsumeStock(consume))
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidQuantity(_)));
    }

    #[test]
    fn unit_mismatch_is_rejected() {
        let item_id = test_item_id();
        let item = created_item(item_id);

        let receive = ReceiveStock {
            item_id,
            quantity: dec!(10),
            unit: "pieces".to_string(),
            occurred_at: test_time(),
        };
        let err = item
            .handle(&InventoryCommand::ReceiveStock(receive))
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));
    }

    #[test]
    fn status_reflects_current_stock() {
        let item_id = test_item_id();
        let mut item = created_item(item_id);

        // 50 of 100 → Low.
        assert_eq!(item.status().unwrap().status, StockStatus::Low);

        let consume = ConsumeStock {
            item_id,
            quantity: dec!(30),
            unit: "kg".to_string(),
            occurred_at: test_time(),
        };
        let events = item.handle(&InventoryCommand::ConsumeStock(consume)).unwrap();
        item.apply(&events[0]);

        // 20 of 100 → Critical.
        assert_eq!(item.status().unwrap().status, StockStatus::Critical);
    }

    #[test]
    fn cost_change_does_not_touch_stock() {
        let item_id = test_item_id();
        let mut item = created_item(item_id);

        let cmd = ChangeUnitCost {
            item_id,
            unit_cost: Money::new(dec!(0.95)),
            occurred_at: test_time(),
        };
        let events = item.handle(&InventoryCommand::ChangeUnitCost(cmd)).unwrap();
        item.apply(&events[0]);

        assert_eq!(item.unit_cost(), Money::new(dec!(0.95)));
        assert_eq!(item.stock_quantity(), dec!(50));
    }

    #[test]
    fn handle_does_not_mutate_state() {
        let item_id = test_item_id();
        let item = created_item(item_id);
        let before = item.clone();

        let receive = ReceiveStock {
            item_id,
            quantity: dec!(5),
            unit: "kg".to_string(),
            occurred_at: test_time(),
        };
        let events1 = item
            .handle(&InventoryCommand::ReceiveStock(receive.clone()))
            .unwrap();
        let events2 = item
            .handle(&InventoryCommand::ReceiveStock(receive))
            .unwrap();

        assert_eq!(item, before);
        assert_eq!(events1, events2);
    }

    #[test]
    fn version_increments_on_apply() {
        let item_id = test_item_id();
        let item = created_item(item_id);
        assert_eq!(item.version(), 1);
    }
}
