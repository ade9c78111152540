//! In-memory transactional store and order lifecycle service.
//!
//! Lock ordering, everywhere: orders table, then products table, then
//! inventory record mutexes in ascending product-id order. Never acquire
//! the orders lock while holding a products or inventory lock.

pub mod error;
pub mod service;
pub mod store;

pub use error::ServiceError;
pub use service::{OrderEdit, OrderItemDraft};
pub use store::{InventoryLevel, Store};
