use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde_json::Value as JsonValue;
use thiserror::Error;

use batcherp_core::{AggregateId, Money};
use batcherp_events::EventEnvelope;
use batcherp_inventory::{
    classify_stock, InventoryEvent, ItemCategory, ItemCreated, ItemId, StockStatus,
};

use crate::read_model::Store;

/// Queryable inventory read model: one row per item, status derived.
#[derive(Debug, Clone, PartialEq)]
pub struct StockRecord {
    pub item_id: ItemId,
    pub name: String,
    pub category: ItemCategory,
    pub quantity: Decimal,
    pub unit: String,
    pub unit_cost: Money,
    pub reorder_level: Decimal,
    pub status: StockStatus,
    pub ratio: f64,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum StockLevelError {
    #[error("failed to deserialize inventory event: {0}")]
    Deserialize(String),

    #[error("envelope/event mismatch: {0}")]
    AggregateMismatch(String),

    #[error("non-monotonic sequence number (last={last}, found={found})")]
    NonMonotonicSequence { last: u64, found: u64 },

    #[error("inconsistent read model state: {0}")]
    InvalidState(String),
}

/// Stock-level projection.
///
/// Consumes published envelopes (JSON payloads) and maintains a read model
/// of current quantity, cost, and stock status per item. Idempotent for
/// at-least-once delivery: replays at or below the per-item cursor are
/// ignored, gaps and rewinds are rejected.
#[derive(Debug)]
pub struct StockLevelProjection<S>
where
    S: Store<ItemId, StockRecord>,
{
    store: S,
    cursors: RwLock<HashMap<AggregateId, u64>>,
}

impl<S> StockLevelProjection<S>
where
    S: Store<ItemId, StockRecord>,
{
    pub fn new(store: S) -> Self {
        Self {
            store,
            cursors: RwLock::new(HashMap::new()),
        }
    }

    /// Query the read model for one item.
    pub fn get(&self, item_id: &ItemId) -> Option<StockRecord> {
        self.store.get(item_id)
    }

    /// List all items (disposable read model).
    pub fn list(&self) -> Vec<StockRecord> {
        self.store.list()
    }

    /// Items flagged for replenishment, most urgent first.
    pub fn list_needing_reorder(&self) -> Vec<StockRecord> {
        let mut rows: Vec<StockRecord> = self
            .store
            .list()
            .into_iter()
            .filter(|r| r.status.needs_reorder())
            .collect();
        rows.sort_by(|a, b| a.ratio.total_cmp(&b.ratio));
        rows
    }

    /// Apply a published envelope into the projection.
    ///
    /// - Enforces monotonic sequence per item stream
    /// - Idempotent for at-least-once delivery (replays <= cursor are ignored)
    /// - Derives the stock status on every write
    pub fn apply_envelope(
        &self,
        envelope: &EventEnvelope<JsonValue>,
    ) -> Result<(), StockLevelError> {
        if envelope.aggregate_type() != "inventory.item" {
            return Ok(());
        }

        let aggregate_id = envelope.aggregate_id();
        let seq = envelope.sequence_number();

        let last = match self.cursors.read() {
            Ok(cursors) => *cursors.get(&aggregate_id).unwrap_or(&0),
            Err(_) => 0,
        };

        if seq == 0 {
            return Err(StockLevelError::NonMonotonicSequence { last, found: seq });
        }

        if seq <= last {
            // Duplicate or replay; safe to ignore.
            return Ok(());
        }

        if seq != last + 1 && last != 0 {
            // First event may carry any positive sequence (some stores start
            // above 1); after that, strict increments only.
            return Err(StockLevelError::NonMonotonicSequence { last, found: seq });
        }

        let ev: InventoryEvent = serde_json::from_value(envelope.payload().clone())
            .map_err(|e| StockLevelError::Deserialize(e.to_string()))?;

        let item_id = match &ev {
            InventoryEvent::ItemCreated(e) => e.item_id,
            InventoryEvent::StockReceived(e) => e.item_id,
            InventoryEvent::StockConsumed(e) => e.item_id,
            InventoryEvent::UnitCostChanged(e) => e.item_id,
        };

        if item_id.0 != aggregate_id {
            return Err(StockLevelError::AggregateMismatch(
                "event item_id does not match envelope aggregate_id".to_string(),
            ));
        }

        match ev {
            InventoryEvent::ItemCreated(e) => {
                let record = record_from_created(e)?;
                self.store.upsert(record.item_id, record);
            }
            InventoryEvent::StockReceived(e) => {
                self.update(e.item_id, e.occurred_at, |record| {
                    record.quantity += e.quantity;
                })?;
            }
            InventoryEvent::StockConsumed(e) => {
                self.update(e.item_id, e.occurred_at, |record| {
                    record.quantity -= e.quantity;
                })?;
            }
            InventoryEvent::UnitCostChanged(e) => {
                self.update(e.item_id, e.occurred_at, |record| {
                    record.unit_cost = e.unit_cost;
                })?;
            }
        }

        if let Ok(mut cursors) = self.cursors.write() {
            cursors.insert(aggregate_id, seq);
        }

        Ok(())
    }

    fn update(
        &self,
        item_id: ItemId,
        occurred_at: DateTime<Utc>,
        mutate: impl FnOnce(&mut StockRecord),
    ) -> Result<(), StockLevelError> {
        let mut record = self.store.get(&item_id).ok_or_else(|| {
            StockLevelError::InvalidState(format!("no record for item {item_id}"))
        })?;

        mutate(&mut record);
        record.last_updated = occurred_at;

        let assessment = classify_stock(record.quantity, record.reorder_level)
            .map_err(|e| StockLevelError::InvalidState(e.to_string()))?;
        record.status = assessment.status;
        record.ratio = assessment.ratio;

        self.store.upsert(item_id, record);
        Ok(())
    }

    /// Rebuild the read model from scratch.
    pub fn rebuild_from_scratch(
        &self,
        envelopes: impl IntoIterator<Item = EventEnvelope<JsonValue>>,
    ) -> Result<(), StockLevelError> {
        let mut envs: Vec<_> = envelopes.into_iter().collect();

        self.store.clear();
        if let Ok(mut cursors) = self.cursors.write() {
            cursors.clear();
        }

        envs.sort_by_key(|e| (*e.aggregate_id().as_uuid().as_bytes(), e.sequence_number()));

        for env in &envs {
            self.apply_envelope(env)?;
        }

        Ok(())
    }
}

fn record_from_created(e: ItemCreated) -> Result<StockRecord, StockLevelError> {
    let assessment = classify_stock(e.opening_stock, e.reorder_level)
        .map_err(|err| StockLevelError::InvalidState(err.to_string()))?;

    Ok(StockRecord {
        item_id: e.item_id,
        name: e.name,
        category: e.category,
        quantity: e.opening_stock,
        unit: e.unit,
        unit_cost: e.unit_cost,
        reorder_level: e.reorder_level,
        status: assessment.status,
        ratio: assessment.ratio,
        last_updated: e.occurred_at,
    })
}
