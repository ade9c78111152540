//! Append-only audit log for manual stock adjustments.
//!
//! Only explicit manual adjustments are audited; order confirmation and
//! deletion-compensation mutate the ledger without writing audit rows.

use std::sync::RwLock;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use partsdesk_core::{DomainError, RecordId, UserId};
use partsdesk_products::ProductId;

/// One audited stock change. Never updated or deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjustmentRecord {
    pub id: RecordId,
    pub product_id: ProductId,
    pub change: i64,
    pub note: String,
    /// Actor who made the change; `None` once the actor account is gone.
    pub changed_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
}

/// Append-only adjustment log. There is deliberately no update or delete.
#[derive(Debug, Default)]
pub struct AdjustmentLog {
    entries: RwLock<Vec<AdjustmentRecord>>,
    seq: AtomicI64,
}

impl AdjustmentLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record for a ledger mutation happening in the same
    /// transaction.
    pub fn record(
        &self,
        product_id: ProductId,
        change: i64,
        note: impl Into<String>,
        changed_by: Option<UserId>,
        now: DateTime<Utc>,
    ) -> Result<AdjustmentRecord, DomainError> {
        let record = AdjustmentRecord {
            id: RecordId::from_i64(self.seq.fetch_add(1, Ordering::SeqCst) + 1),
            product_id,
            change,
            note: note.into(),
            changed_by,
            created_at: now,
        };
        let mut entries = self
            .entries
            .write()
            .map_err(|_| DomainError::conflict("adjustment log lock poisoned"))?;
        entries.push(record.clone());
        Ok(record)
    }

    pub fn for_product(&self, product_id: ProductId) -> Result<Vec<AdjustmentRecord>, DomainError> {
        let entries = self
            .entries
            .read()
            .map_err(|_| DomainError::conflict("adjustment log lock poisoned"))?;
        Ok(entries
            .iter()
            .filter(|r| r.product_id == product_id)
            .cloned()
            .collect())
    }

    pub fn all(&self) -> Result<Vec<AdjustmentRecord>, DomainError> {
        let entries = self
            .entries
            .read()
            .map_err(|_| DomainError::conflict("adjustment log lock poisoned"))?;
        Ok(entries.clone())
    }
}
