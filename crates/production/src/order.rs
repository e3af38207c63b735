use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use batcherp_bom::BomId;
use batcherp_core::{Aggregate, AggregateId, AggregateRoot, DomainError, DomainResult, Money};
use batcherp_events::Event;

/// Production order identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductionOrderId(pub AggregateId);

impl ProductionOrderId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for ProductionOrderId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Production order status lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrderStatus {
    Planned,
    InProgress,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }

    /// Legal edges of the status machine.
    pub fn can_transition(self, next: OrderStatus) -> bool {
        matches!(
            (self, next),
            (OrderStatus::Planned, OrderStatus::InProgress)
                | (OrderStatus::Planned, OrderStatus::Cancelled)
                | (OrderStatus::InProgress, OrderStatus::Completed)
                | (OrderStatus::InProgress, OrderStatus::Cancelled)
        )
    }
}

impl core::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let s = match self {
            OrderStatus::Planned => "planned",
            OrderStatus::InProgress => "in-progress",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

/// Materials cost for an order: BOM total scaled by planned/yield, rounded
/// to currency precision.
pub fn scale_materials_cost(
    bom_total_cost: Money,
    yield_quantity: Decimal,
    planned_quantity: Decimal,
) -> DomainResult<Money> {
    if yield_quantity <= Decimal::ZERO {
        return Err(DomainError::invalid_quantity(
            "yield quantity must be positive",
        ));
    }
    if planned_quantity <= Decimal::ZERO {
        return Err(DomainError::invalid_quantity(
            "planned quantity must be positive",
        ));
    }
    if bom_total_cost.is_negative() {
        return Err(DomainError::invalid_cost("bom total cannot be negative"));
    }

    Ok((bom_total_cost * planned_quantity / yield_quantity).rounded())
}

/// Aggregate root: ProductionOrder.
///
/// Quantities are denominated in the BOM's yield unit. `materials_cost` is
/// locked at the instant the order enters `in-progress`.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductionOrder {
    id: ProductionOrderId,
    bom_id: Option<BomId>,
    bom_name: String,
    planned_quantity: Decimal,
    actual_quantity: Decimal,
    unit: String,
    status: OrderStatus,
    materials_cost: Money,
    labor_cost: Money,
    total_cost: Money,
    started_at: Option<DateTime<Utc>>,
    ended_at: Option<DateTime<Utc>>,
    version: u64,
    created: bool,
}

impl ProductionOrder {
    /// Create an empty, not-yet-created aggregate instance for rehydration.
    pub fn empty(id: ProductionOrderId) -> Self {
        Self {
            id,
            bom_id: None,
            bom_name: String::new(),
            planned_quantity: Decimal::ZERO,
            actual_quantity: Decimal::ZERO,
            unit: String::new(),
            status: OrderStatus::Planned,
            materials_cost: Money::ZERO,
            labor_cost: Money::ZERO,
            total_cost: Money::ZERO,
            started_at: None,
            ended_at: None,
            version: 0,
            created: false,
        }
    }

    pub fn id_typed(&self) -> ProductionOrderId {
        self.id
    }

    pub fn bom_id(&self) -> Option<BomId> {
        self.bom_id
    }

    pub fn bom_name(&self) -> &str {
        &self.bom_name
    }

    pub fn planned_quantity(&self) -> Decimal {
        self.planned_quantity
    }

    pub fn actual_quantity(&self) -> Decimal {
        self.actual_quantity
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn materials_cost(&self) -> Money {
        self.materials_cost
    }

    pub fn labor_cost(&self) -> Money {
        self.labor_cost
    }

    pub fn total_cost(&self) -> Money {
        self.total_cost
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.ended_at
    }
}

impl AggregateRoot for ProductionOrder {
    type Id = ProductionOrderId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: PlanOrder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanOrder {
    pub order_id: ProductionOrderId,
    pub bom_id: BomId,
    pub bom_name: String,
    pub planned_quantity: Decimal,
    pub unit: String,
    pub occurred_at: DateTime<Utc>,
}

/// Command: StartOrder.
///
/// Carries the caller's read of the BOM's current rollup; the materials
/// cost computed from it is locked into the order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartOrder {
    pub order_id: ProductionOrderId,
    pub bom_total_cost: Money,
    pub bom_yield_quantity: Decimal,
    pub occurred_at: DateTime<Utc>,
}

/// Command: CompleteOrder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompleteOrder {
    pub order_id: ProductionOrderId,
    pub actual_quantity: Decimal,
    pub labor_cost: Money,
    pub occurred_at: DateTime<Utc>,
}

/// Command: CancelOrder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CancelOrder {
    pub order_id: ProductionOrderId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ProductionCommand {
    PlanOrder(PlanOrder),
    StartOrder(StartOrder),
    CompleteOrder(CompleteOrder),
    CancelOrder(CancelOrder),
}

/// Event: OrderPlanned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderPlanned {
    pub order_id: ProductionOrderId,
    pub bom_id: BomId,
    pub bom_name: String,
    pub planned_quantity: Decimal,
    pub unit: String,
    pub occurred_at: DateTime<Utc>,
}

/// Event: OrderStarted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderStarted {
    pub order_id: ProductionOrderId,
    pub materials_cost: Money,
    pub occurred_at: DateTime<Utc>,
}

/// Event: OrderCompleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderCompleted {
    pub order_id: ProductionOrderId,
    pub actual_quantity: Decimal,
    pub labor_cost: Money,
    pub total_cost: Money,
    pub occurred_at: DateTime<Utc>,
}

/// Event: OrderCancelled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderCancelled {
    pub order_id: ProductionOrderId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ProductionEvent {
    OrderPlanned(OrderPlanned),
    OrderStarted(OrderStarted),
    OrderCompleted(OrderCompleted),
    OrderCancelled(OrderCancelled),
}

impl Event for ProductionEvent {
    fn event_type(&self) -> &'static str {
        match self {
            ProductionEvent::OrderPlanned(_) => "production.order.planned",
            ProductionEvent::OrderStarted(_) => "production.order.started",
            ProductionEvent::OrderCompleted(_) => "production.order.completed",
            ProductionEvent::OrderCancelled(_) => "production.order.cancelled",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            ProductionEvent::OrderPlanned(e) => e.occurred_at,
            ProductionEvent::OrderStarted(e) => e.occurred_at,
            ProductionEvent::OrderCompleted(e) => e.occurred_at,
            ProductionEvent::OrderCancelled(e) => e.occurred_at,
        }
    }
}

impl Aggregate for ProductionOrder {
    type Command = ProductionCommand;
    type Event = ProductionEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            ProductionEvent::OrderPlanned(e) => {
                self.id = e.order_id;
                self.bom_id = Some(e.bom_id);
                self.bom_name = e.bom_name.clone();
                self.planned_quantity = e.planned_quantity;
                self.unit = e.unit.clone();
                self.status = OrderStatus::Planned;
                self.created = true;
            }
            ProductionEvent::OrderStarted(e) => {
                self.status = OrderStatus::InProgress;
                self.materials_cost = e.materials_cost;
                self.started_at = Some(e.occurred_at);
            }
            ProductionEvent::OrderCompleted(e) => {
                self.status = OrderStatus::Completed;
                self.actual_quantity = e.actual_quantity;
                self.labor_cost = e.labor_cost;
                self.total_cost = e.total_cost;
                self.ended_at = Some(e.occurred_at);
            }
            ProductionEvent::OrderCancelled(e) => {
                self.status = OrderStatus::Cancelled;
                self.ended_at = Some(e.occurred_at);
            }
        }

        // Deterministic version tracking: +1 per applied event.
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            ProductionCommand::PlanOrder(cmd) => self.handle_plan(cmd),
            ProductionCommand::StartOrder(cmd) => self.handle_start(cmd),
            ProductionCommand::CompleteOrder(cmd) => self.handle_complete(cmd),
            ProductionCommand::CancelOrder(cmd) => self.handle_cancel(cmd),
        }
    }
}

impl ProductionOrder {
    fn ensure_order_id(&self, order_id: ProductionOrderId) -> Result<(), DomainError> {
        if self.id != order_id {
            return Err(DomainError::invalid_input("order_id mismatch"));
        }
        Ok(())
    }

    fn ensure_transition(&self, next: OrderStatus) -> Result<(), DomainError> {
        if !self.status.can_transition(next) {
            return Err(DomainError::invalid_transition(format!(
                "{} -> {} is not allowed",
                self.status, next
            )));
        }
        Ok(())
    }

    fn handle_plan(&self, cmd: &PlanOrder) -> Result<Vec<ProductionEvent>, DomainError> {
        if self.created {
            return Err(DomainError::conflict("production order already exists"));
        }
        if cmd.bom_name.trim().is_empty() {
            return Err(DomainError::invalid_input("bom name cannot be empty"));
        }
        if cmd.unit.trim().is_empty() {
            return Err(DomainError::invalid_input("unit cannot be empty"));
        }
        if cmd.planned_quantity <= Decimal::ZERO {
            return Err(DomainError::invalid_quantity(
                "planned quantity must be positive",
            ));
        }

        Ok(vec![ProductionEvent::OrderPlanned(OrderPlanned {
            order_id: cmd.order_id,
            bom_id: cmd.bom_id,
            bom_name: cmd.bom_name.clone(),
            planned_quantity: cmd.planned_quantity,
            unit: cmd.unit.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_start(&self, cmd: &StartOrder) -> Result<Vec<ProductionEvent>, DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        self.ensure_order_id(cmd.order_id)?;
        self.ensure_transition(OrderStatus::InProgress)?;

        let materials_cost = scale_materials_cost(
            cmd.bom_total_cost,
            cmd.bom_yield_quantity,
            self.planned_quantity,
        )?;

        Ok(vec![ProductionEvent::OrderStarted(OrderStarted {
            order_id: cmd.order_id,
            materials_cost,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_complete(&self, cmd: &CompleteOrder) -> Result<Vec<ProductionEvent>, DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        self.ensure_order_id(cmd.order_id)?;
        self.ensure_transition(OrderStatus::Completed)?;

        // A scrapped batch may complete at zero output; negative never.
        if cmd.actual_quantity < Decimal::ZERO {
            return Err(DomainError::invalid_quantity(
                "actual quantity cannot be negative",
            ));
        }
        if cmd.labor_cost.is_negative() {
            return Err(DomainError::invalid_cost("labor cost cannot be negative"));
        }

        let total_cost = self.materials_cost + cmd.labor_cost;

        Ok(vec![ProductionEvent::OrderCompleted(OrderCompleted {
            order_id: cmd.order_id,
            actual_quantity: cmd.actual_quantity,
            labor_cost: cmd.labor_cost,
            total_cost,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_cancel(&self, cmd: &CancelOrder) -> Result<Vec<ProductionEvent>, DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        self.ensure_order_id(cmd.order_id)?;
        self.ensure_transition(OrderStatus::Cancelled)?;

        Ok(vec![ProductionEvent::OrderCancelled(OrderCancelled {
            order_id: cmd.order_id,
            occurred_at: cmd.occurred_at,
        })])
    }
}
