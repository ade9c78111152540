//! `partsdesk-parties` — dealers that purchase from the catalog.

pub mod dealer;

pub use dealer::{ContactInfo, Dealer, DealerId};
