//! End-to-end wiring: aggregate → envelopes → bus → worker → read model.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use rust_decimal_macros::dec;
use serde_json::Value as JsonValue;

use batcherp_core::{AggregateId, Money};
use batcherp_events::{execute, EventBus, EventEnvelope, InMemoryEventBus};
use batcherp_inventory::{
    ConsumeStock, CreateItem, InventoryCommand, InventoryItem, ItemCategory, ItemId, StockStatus,
};

use crate::read_model::InMemoryStore;
use crate::stock_levels::{StockLevelProjection, StockRecord};
use crate::valuation::summarize_inventory;
use crate::worker::ProjectionWorker;

fn wait_for<F: Fn() -> bool>(deadline: Duration, check: F) -> bool {
    let start = Instant::now();
    while start.elapsed() < deadline {
        if check() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    false
}

#[test]
fn stock_levels_flow_from_commands_to_summary() {
    batcherp_observability::init();

    // Drive the aggregate through intake and a production draw.
    let item_id = ItemId::new(AggregateId::new());
    let mut item = InventoryItem::empty(item_id);
    let mut events = Vec::new();

    events.extend(
        execute(
            &mut item,
            &InventoryCommand::CreateItem(CreateItem {
                item_id,
                name: "All-Purpose Flour".to_string(),
                category: ItemCategory::RawMaterial,
                unit: "kg".to_string(),
                opening_stock: dec!(50),
                unit_cost: Money::new(dec!(0.85)),
                reorder_level: dec!(100),
                occurred_at: Utc::now(),
            }),
        )
        .unwrap(),
    );
    events.extend(
        execute(
            &mut item,
            &InventoryCommand::ConsumeStock(ConsumeStock {
                item_id,
                quantity: dec!(30),
                unit: "kg".to_string(),
                occurred_at: Utc::now(),
            }),
        )
        .unwrap(),
    );

    // Publish the stream through the bus into a worker-fed projection.
    let bus: Arc<InMemoryEventBus<EventEnvelope<JsonValue>>> = Arc::new(InMemoryEventBus::new());
    let store = Arc::new(InMemoryStore::<ItemId, StockRecord>::new());
    let projection = Arc::new(StockLevelProjection::new(store));

    let worker_projection = Arc::clone(&projection);
    let worker = ProjectionWorker::spawn("stock-levels", Arc::clone(&bus), move |env| {
        worker_projection.apply_envelope(&env)
    });

    for (i, event) in events.iter().enumerate() {
        let envelope = EventEnvelope::new(
            uuid::Uuid::now_v7(),
            item_id.0,
            "inventory.item",
            (i + 1) as u64,
            serde_json::to_value(event).unwrap(),
        );
        bus.publish(envelope).unwrap();
    }

    let projected = wait_for(Duration::from_secs(2), || {
        projection
            .get(&item_id)
            .is_some_and(|r| r.quantity == dec!(20))
    });
    assert!(projected, "projection did not catch up in time");

    let record = projection.get(&item_id).unwrap();
    assert_eq!(record.status, StockStatus::Critical);
    assert_eq!(record.unit_cost, Money::new(dec!(0.85)));

    // And the aggregator sees the same world.
    let summary = summarize_inventory(&projection.list());
    assert_eq!(summary.total_items, 1);
    assert_eq!(summary.critical_items, 1);
    assert_eq!(summary.total_value, Money::new(dec!(17.00)));

    worker.shutdown();
}
