use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use partsdesk_core::{DomainError, DomainResult, Entity, RecordId};
use partsdesk_parties::DealerId;
use partsdesk_products::{Product, ProductId};

/// Order identifier.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct OrderId(pub RecordId);

impl OrderId {
    pub fn new(id: RecordId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for OrderId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Order status lifecycle.
///
/// Only forward transitions exist: Draft → Confirmed → Delivered, and
/// Draft → Cancelled. Nothing ever re-enters Draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderStatus {
    Draft,
    Confirmed,
    Delivered,
    Cancelled,
}

impl core::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let s = match self {
            OrderStatus::Draft => "DRAFT",
            OrderStatus::Confirmed => "CONFIRMED",
            OrderStatus::Delivered => "DELIVERED",
            OrderStatus::Cancelled => "CANCELLED",
        };
        f.write_str(s)
    }
}

/// Order line holding a product snapshot.
///
/// sku/name/price are copied from the product at item-creation time and are
/// immutable afterwards; they survive later product edits and even product
/// deletion (which only clears `product_id`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderItem {
    product_id: Option<ProductId>,
    product_sku: String,
    product_name: String,
    quantity: u32,
    unit_price: Decimal,
    line_total: Decimal,
}

impl OrderItem {
    /// Snapshot a product into an order line.
    ///
    /// `unit_price` overrides the product's current price when supplied.
    pub fn snapshot(
        product: &Product,
        quantity: u32,
        unit_price: Option<Decimal>,
    ) -> DomainResult<Self> {
        if quantity == 0 {
            return Err(DomainError::validation("quantity must be positive"));
        }
        let unit_price = unit_price.unwrap_or_else(|| product.price());
        Ok(Self {
            product_id: Some(product.id_typed()),
            product_sku: product.sku().to_string(),
            product_name: product.name().to_string(),
            quantity,
            unit_price,
            line_total: Self::line_total_of(quantity, unit_price),
        })
    }

    /// Pure line-total computation, invoked whenever items are created or
    /// replaced (never as a hidden persistence hook).
    pub fn line_total_of(quantity: u32, unit_price: Decimal) -> Decimal {
        Decimal::from(quantity) * unit_price
    }

    pub fn product_id(&self) -> Option<ProductId> {
        self.product_id
    }

    pub fn product_sku(&self) -> &str {
        &self.product_sku
    }

    pub fn product_name(&self) -> &str {
        &self.product_name
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn unit_price(&self) -> Decimal {
        self.unit_price
    }

    pub fn line_total(&self) -> Decimal {
        self.line_total
    }

    /// Detach the catalog reference when the product is deleted. The
    /// snapshot fields stay intact.
    pub fn clear_product_ref(&mut self) {
        self.product_id = None;
    }
}

/// The order aggregate: header plus owned line items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    id: OrderId,
    order_number: String,
    dealer_id: DealerId,
    status: OrderStatus,
    items: Vec<OrderItem>,
    total_amount: Decimal,
    confirmed_at: Option<DateTime<Utc>>,
    delivered_at: Option<DateTime<Utc>>,
    canceled_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Order {
    /// Create a Draft order. The order number is derived from the assigned
    /// numeric id and the creation date, exactly once.
    pub fn new(id: OrderId, dealer_id: DealerId, items: Vec<OrderItem>, now: DateTime<Utc>) -> Self {
        let total_amount = Self::total_of(&items);
        Self {
            id,
            order_number: Self::order_number_for(id, now),
            dealer_id,
            status: OrderStatus::Draft,
            items,
            total_amount,
            confirmed_at: None,
            delivered_at: None,
            canceled_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// `ORD-YYYYMMDD-NNNN` with the numeric order id zero-padded to 4 digits.
    pub fn order_number_for(id: OrderId, on: DateTime<Utc>) -> String {
        format!("ORD-{}-{:04}", on.format("%Y%m%d"), id.0.as_i64())
    }

    /// Pure total computation over a set of items.
    pub fn total_of(items: &[OrderItem]) -> Decimal {
        items.iter().map(|i| i.line_total()).sum()
    }

    pub fn id_typed(&self) -> OrderId {
        self.id
    }

    pub fn order_number(&self) -> &str {
        &self.order_number
    }

    pub fn dealer_id(&self) -> DealerId {
        self.dealer_id
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn items(&self) -> &[OrderItem] {
        &self.items
    }

    pub fn items_mut(&mut self) -> &mut [OrderItem] {
        &mut self.items
    }

    pub fn total_amount(&self) -> Decimal {
        self.total_amount
    }

    pub fn confirmed_at(&self) -> Option<DateTime<Utc>> {
        self.confirmed_at
    }

    pub fn delivered_at(&self) -> Option<DateTime<Utc>> {
        self.delivered_at
    }

    pub fn canceled_at(&self) -> Option<DateTime<Utc>> {
        self.canceled_at
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Guard used by the edit path. The stock guard for confirmation lives
    /// in the service layer, next to the ledger locks.
    pub fn ensure_editable(&self) -> DomainResult<()> {
        if self.status != OrderStatus::Draft {
            return Err(DomainError::invalid_state("Only Draft orders can be edited"));
        }
        Ok(())
    }

    /// Replace all line items with fresh snapshots and recompute the total.
    ///
    /// Draft-only is enforced by the caller via [`Order::ensure_editable`].
    pub fn replace_items(&mut self, items: Vec<OrderItem>, now: DateTime<Utc>) {
        self.items = items;
        self.total_amount = Self::total_of(&self.items);
        self.updated_at = now;
    }

    /// Draft → Confirmed. Sets `confirmed_at` exactly once.
    pub fn confirm(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        if self.status != OrderStatus::Draft {
            return Err(DomainError::invalid_state(
                "Only Draft orders can be confirmed",
            ));
        }
        self.status = OrderStatus::Confirmed;
        self.confirmed_at = Some(now);
        self.updated_at = now;
        Ok(())
    }

    /// Confirmed → Delivered. No inventory effect.
    pub fn deliver(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        if self.status != OrderStatus::Confirmed {
            return Err(DomainError::invalid_state(
                "Only Confirmed orders can be delivered",
            ));
        }
        self.status = OrderStatus::Delivered;
        self.delivered_at = Some(now);
        self.updated_at = now;
        Ok(())
    }

    /// Draft → Cancelled. Stock was never deducted, so no inventory effect.
    pub fn cancel(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        if self.status != OrderStatus::Draft {
            return Err(DomainError::invalid_state(
                "Only Draft orders can be cancelled",
            ));
        }
        self.status = OrderStatus::Cancelled;
        self.canceled_at = Some(now);
        self.updated_at = now;
        Ok(())
    }
}

impl Entity for Order {
    type Id = OrderId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
