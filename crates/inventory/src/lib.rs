//! `partsdesk-inventory` — per-product stock ledger and adjustment audit log.

pub mod adjustment;
pub mod ledger;

pub use adjustment::{AdjustmentLog, AdjustmentRecord};
pub use ledger::{InventoryLedger, InventoryRecord, LockedInventory};
