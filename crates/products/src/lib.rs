//! `partsdesk-products` — the product catalog entity.

pub mod product;

pub use product::{Product, ProductId};
