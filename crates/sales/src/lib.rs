//! `partsdesk-sales` — the order aggregate and its lifecycle state machine.

pub mod order;
pub mod shortfall;

pub use order::{Order, OrderId, OrderItem, OrderStatus};
pub use shortfall::StockShortfall;
