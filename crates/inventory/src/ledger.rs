//! Per-product inventory ledger with transaction-scoped record locks.
//!
//! Stock mutations go through [`InventoryLedger::with_locked`]: every record
//! the transaction touches is locked up front in ascending product-id order
//! (so concurrent transactions over overlapping product sets cannot
//! deadlock), deltas are staged against the locked records, and the staged
//! deltas are committed only if the transaction body returns `Ok`. An `Err`
//! aborts with no ledger mutation at all.
//!
//! The ledger itself enforces no negative-quantity guard; callers validate
//! before staging a negative delta.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use partsdesk_core::DomainError;
use partsdesk_products::ProductId;

/// Current on-hand quantity for one product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryRecord {
    pub product_id: ProductId,
    pub quantity: i64,
    pub updated_at: DateTime<Utc>,
}

impl InventoryRecord {
    fn empty(product_id: ProductId, now: DateTime<Utc>) -> Self {
        Self {
            product_id,
            quantity: 0,
            updated_at: now,
        }
    }
}

/// In-memory inventory ledger.
///
/// Records are created lazily: the first adjustment or confirmation touching
/// a product materializes its record at quantity 0.
#[derive(Debug, Default)]
pub struct InventoryLedger {
    records: RwLock<BTreeMap<ProductId, Arc<Mutex<InventoryRecord>>>>,
}

impl InventoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the record for `product_id`, creating it at quantity 0 if absent.
    pub fn get_or_create(&self, product_id: ProductId) -> Result<InventoryRecord, DomainError> {
        let handle = self.handle(product_id)?;
        let guard = handle.lock().map_err(|_| poisoned())?;
        Ok(guard.clone())
    }

    /// Current quantity for `product_id`, if a record exists.
    pub fn quantity(&self, product_id: ProductId) -> Result<Option<i64>, DomainError> {
        let records = self.records.read().map_err(|_| poisoned())?;
        match records.get(&product_id) {
            Some(handle) => {
                let guard = handle.lock().map_err(|_| poisoned())?;
                Ok(Some(guard.quantity))
            }
            None => Ok(None),
        }
    }

    /// Snapshot of every record, in ascending product-id order.
    pub fn snapshot(&self) -> Result<Vec<InventoryRecord>, DomainError> {
        let records = self.records.read().map_err(|_| poisoned())?;
        let mut out = Vec::with_capacity(records.len());
        for handle in records.values() {
            let guard = handle.lock().map_err(|_| poisoned())?;
            out.push(guard.clone());
        }
        Ok(out)
    }

    /// Runs `f` with exclusive locks on every listed product's record.
    ///
    /// Ids are deduplicated and locked in ascending order. Deltas staged via
    /// [`LockedInventory::apply_delta`] are committed only when `f` returns
    /// `Ok`; any `Err` rolls the transaction back with no side effects.
    pub fn with_locked<R, E, F>(
        &self,
        product_ids: &[ProductId],
        now: DateTime<Utc>,
        f: F,
    ) -> Result<R, E>
    where
        E: From<DomainError>,
        F: FnOnce(&mut LockedInventory<'_>) -> Result<R, E>,
    {
        let mut ids: Vec<ProductId> = product_ids.to_vec();
        ids.sort();
        ids.dedup();

        // Materialize handles for missing records first, then release the
        // table lock before acquiring record locks.
        let handles: Vec<(ProductId, Arc<Mutex<InventoryRecord>>)> = {
            let mut records = self.records.write().map_err(|_| E::from(poisoned()))?;
            ids.iter()
                .map(|id| {
                    let handle = records
                        .entry(*id)
                        .or_insert_with(|| Arc::new(Mutex::new(InventoryRecord::empty(*id, now))));
                    (*id, Arc::clone(handle))
                })
                .collect()
        };

        // Ascending acquisition; `ids` is already sorted.
        let mut guards = BTreeMap::new();
        for (id, handle) in &handles {
            let guard = handle.lock().map_err(|_| E::from(poisoned()))?;
            guards.insert(*id, guard);
        }

        let mut locked = LockedInventory {
            guards,
            pending: BTreeMap::new(),
        };
        let out = f(&mut locked)?;
        locked.commit(now);
        Ok(out)
    }

    fn handle(&self, product_id: ProductId) -> Result<Arc<Mutex<InventoryRecord>>, DomainError> {
        {
            let records = self.records.read().map_err(|_| poisoned())?;
            if let Some(handle) = records.get(&product_id) {
                return Ok(Arc::clone(handle));
            }
        }
        let mut records = self.records.write().map_err(|_| poisoned())?;
        let handle = records
            .entry(product_id)
            .or_insert_with(|| Arc::new(Mutex::new(InventoryRecord::empty(product_id, Utc::now()))));
        Ok(Arc::clone(handle))
    }
}

fn poisoned() -> DomainError {
    DomainError::conflict("inventory lock poisoned")
}

/// The locked section of an inventory transaction.
///
/// Reads see the transaction's own staged deltas. Nothing is written to the
/// ledger until the owning [`InventoryLedger::with_locked`] call commits.
pub struct LockedInventory<'a> {
    guards: BTreeMap<ProductId, MutexGuard<'a, InventoryRecord>>,
    pending: BTreeMap<ProductId, i64>,
}

impl LockedInventory<'_> {
    /// Quantity of a locked record, including this transaction's staged deltas.
    pub fn quantity(&self, product_id: ProductId) -> Result<i64, DomainError> {
        let base = self
            .guards
            .get(&product_id)
            .ok_or_else(|| not_locked(product_id))?
            .quantity;
        Ok(base + self.pending.get(&product_id).copied().unwrap_or(0))
    }

    /// Stage a signed delta against a locked record.
    pub fn apply_delta(&mut self, product_id: ProductId, delta: i64) -> Result<(), DomainError> {
        if !self.guards.contains_key(&product_id) {
            return Err(not_locked(product_id));
        }
        *self.pending.entry(product_id).or_insert(0) += delta;
        Ok(())
    }

    fn commit(mut self, now: DateTime<Utc>) {
        for (product_id, delta) in self.pending {
            if delta == 0 {
                continue;
            }
            if let Some(guard) = self.guards.get_mut(&product_id) {
                guard.quantity += delta;
                guard.updated_at = now;
            }
        }
    }
}

fn not_locked(product_id: ProductId) -> DomainError {
    DomainError::conflict(format!(
        "product {product_id} is not locked by this transaction"
    ))
}
