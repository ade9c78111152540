//! Order lifecycle operations: create, edit, confirm, deliver, cancel,
//! delete-with-compensation.
//!
//! The stock guard and the deduction run inside one
//! [`InventoryLedger::with_locked`] section while the orders table write
//! lock is held, so a confirmation either deducts every line item and flips
//! the status, or does nothing at all.
//!
//! [`InventoryLedger::with_locked`]: partsdesk_inventory::InventoryLedger::with_locked

use chrono::Utc;
use rust_decimal::Decimal;

use partsdesk_core::{DomainError, DomainResult};
use partsdesk_parties::DealerId;
use partsdesk_products::{Product, ProductId};
use partsdesk_sales::{Order, OrderId, OrderItem, OrderStatus, StockShortfall};

use crate::error::ServiceError;
use crate::store::{Store, table_poisoned};

/// Requested line item, as supplied by a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderItemDraft {
    pub product: ProductId,
    pub quantity: u32,
    /// Overrides the snapshot of the product's current price when set.
    pub unit_price: Option<Decimal>,
}

/// An edit request against a Draft order.
///
/// `status` holds whatever status value the payload carried; its mere
/// presence makes the edit invalid, whatever the value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderEdit {
    pub status: Option<String>,
    pub items: Option<Vec<OrderItemDraft>>,
}

impl Store {
    /// Create a Draft order for a dealer, snapshotting every item.
    pub fn create_order(
        &self,
        dealer_id: DealerId,
        items: Vec<OrderItemDraft>,
    ) -> DomainResult<Order> {
        {
            let dealers = self.dealers.read().map_err(|_| table_poisoned("dealers"))?;
            if !dealers.contains_key(&dealer_id) {
                return Err(DomainError::validation(format!(
                    "dealer {dealer_id} does not exist"
                )));
            }
        }

        let snapshots = self.snapshot_items(&items)?;

        let id = OrderId::new(Self::next_id(&self.order_seq));
        let order = Order::new(id, dealer_id, snapshots, Utc::now());

        let mut orders = self.orders.write().map_err(|_| table_poisoned("orders"))?;
        orders.insert(id, order.clone());
        tracing::info!(order = %order.order_number(), dealer = %dealer_id, "order created");
        Ok(order)
    }

    pub fn order(&self, id: OrderId) -> DomainResult<Option<Order>> {
        let orders = self.orders.read().map_err(|_| table_poisoned("orders"))?;
        Ok(orders.get(&id).cloned())
    }

    pub fn list_orders(&self) -> DomainResult<Vec<Order>> {
        let orders = self.orders.read().map_err(|_| table_poisoned("orders"))?;
        Ok(orders.values().cloned().collect())
    }

    pub fn orders_for_dealer(&self, dealer_id: DealerId) -> DomainResult<Vec<Order>> {
        let orders = self.orders.read().map_err(|_| table_poisoned("orders"))?;
        Ok(orders
            .values()
            .filter(|o| o.dealer_id() == dealer_id)
            .cloned()
            .collect())
    }

    /// Edit a Draft order.
    ///
    /// A payload carrying a status field is rejected outright, before the
    /// Draft guard, regardless of the order's current status or the value
    /// being "set". Dealer reference and order number are immutable; only
    /// items can be replaced.
    pub fn edit_order(&self, id: OrderId, edit: OrderEdit) -> DomainResult<Order> {
        if edit.status.is_some() {
            return Err(DomainError::invalid_state(
                "Order status cannot be changed via update; use confirm or deliver endpoints",
            ));
        }

        let mut orders = self.orders.write().map_err(|_| table_poisoned("orders"))?;
        let order = orders.get_mut(&id).ok_or(DomainError::NotFound)?;
        order.ensure_editable()?;

        if let Some(items) = edit.items {
            let snapshots = self.snapshot_items(&items)?;
            order.replace_items(snapshots, Utc::now());
        }
        Ok(order.clone())
    }

    /// Draft → Confirmed: the critical section.
    ///
    /// Locks every distinct product's inventory record (ascending id) and
    /// walks the lines, staging each deduction as its guard passes. Any
    /// failing line aborts the whole transaction with no staged delta
    /// committed, and every failure is reported.
    pub fn confirm_order(&self, id: OrderId) -> Result<Order, ServiceError> {
        let mut orders = self.orders.write().map_err(|_| table_poisoned("orders"))?;
        let order = orders.get_mut(&id).ok_or(DomainError::NotFound)?;
        if order.status() != OrderStatus::Draft {
            return Err(DomainError::invalid_state("Only Draft orders can be confirmed").into());
        }

        // Resolve catalog products up front; the products lock is released
        // before the inventory locks are taken.
        let resolved: Vec<(Option<Product>, u32)> = {
            let products = self.products.read().map_err(|_| table_poisoned("products"))?;
            order
                .items()
                .iter()
                .map(|item| {
                    let product = item
                        .product_id()
                        .and_then(|pid| products.get(&pid).cloned());
                    (product, item.quantity())
                })
                .collect()
        };
        let product_ids: Vec<ProductId> = resolved
            .iter()
            .filter_map(|(p, _)| p.as_ref().map(|p| p.id_typed()))
            .collect();

        let now = Utc::now();
        let confirmed = self.ledger.with_locked(&product_ids, now, |locked| {
            // Each passing line stages its deduction immediately, so a later
            // line for the same product is checked against what is left
            // after the earlier ones, not the original on-hand quantity.
            let mut shortfalls = Vec::new();
            for (product, quantity) in &resolved {
                match product {
                    None => shortfalls.push(StockShortfall::missing_product()),
                    Some(product) => {
                        let requested = i64::from(*quantity);
                        let available = locked.quantity(product.id_typed())?;
                        if requested > available {
                            shortfalls.push(StockShortfall::insufficient(
                                product, available, requested,
                            ));
                        } else {
                            locked.apply_delta(product.id_typed(), -requested)?;
                        }
                    }
                }
            }
            if !shortfalls.is_empty() {
                return Err(ServiceError::insufficient(shortfalls));
            }

            order.confirm(now)?;
            Ok(order.clone())
        })?;

        tracing::info!(order = %confirmed.order_number(), "order confirmed, stock deducted");
        Ok(confirmed)
    }

    /// Confirmed → Delivered. No inventory effect.
    pub fn deliver_order(&self, id: OrderId) -> DomainResult<Order> {
        let mut orders = self.orders.write().map_err(|_| table_poisoned("orders"))?;
        let order = orders.get_mut(&id).ok_or(DomainError::NotFound)?;
        order.deliver(Utc::now())?;
        tracing::info!(order = %order.order_number(), "order delivered");
        Ok(order.clone())
    }

    /// Draft → Cancelled. No inventory effect.
    pub fn cancel_order(&self, id: OrderId) -> DomainResult<Order> {
        let mut orders = self.orders.write().map_err(|_| table_poisoned("orders"))?;
        let order = orders.get_mut(&id).ok_or(DomainError::NotFound)?;
        order.cancel(Utc::now())?;
        tracing::info!(order = %order.order_number(), "order cancelled");
        Ok(order.clone())
    }

    /// Delete an order, compensating the ledger first when it is Confirmed.
    ///
    /// Restoration and removal happen while the orders write lock and the
    /// relevant inventory locks are held: either both take effect or
    /// neither. Items whose product reference was cleared are skipped;
    /// with the product gone their stock has nowhere to return to.
    pub fn delete_order(&self, id: OrderId) -> DomainResult<()> {
        let mut orders = self.orders.write().map_err(|_| table_poisoned("orders"))?;
        let order = orders.get(&id).ok_or(DomainError::NotFound)?;

        if order.status() == OrderStatus::Confirmed {
            let restorable: Vec<(ProductId, u32)> = order
                .items()
                .iter()
                .filter_map(|item| item.product_id().map(|pid| (pid, item.quantity())))
                .collect();
            let product_ids: Vec<ProductId> = restorable.iter().map(|(pid, _)| *pid).collect();

            self.ledger
                .with_locked::<_, DomainError, _>(&product_ids, Utc::now(), |locked| {
                    for (pid, quantity) in &restorable {
                        locked.apply_delta(*pid, i64::from(*quantity))?;
                    }
                    Ok(())
                })?;
            tracing::info!(order = %order.order_number(), "stock restored for deleted confirmed order");
        }

        orders.remove(&id);
        Ok(())
    }

    fn snapshot_items(&self, items: &[OrderItemDraft]) -> DomainResult<Vec<OrderItem>> {
        let products = self.products.read().map_err(|_| table_poisoned("products"))?;
        let mut snapshots = Vec::with_capacity(items.len());
        for draft in items {
            let product = products.get(&draft.product).ok_or_else(|| {
                DomainError::validation(format!("product {} does not exist", draft.product))
            })?;
            snapshots.push(OrderItem::snapshot(product, draft.quantity, draft.unit_price)?);
        }
        Ok(snapshots)
    }
}
