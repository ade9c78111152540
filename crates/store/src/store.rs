//! Tables, sequences and catalog/dealer/inventory operations.

use std::collections::BTreeMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;
use rust_decimal::Decimal;

use partsdesk_core::{DomainError, DomainResult, RecordId, UserId};
use partsdesk_inventory::{AdjustmentLog, AdjustmentRecord, InventoryLedger};
use partsdesk_parties::{ContactInfo, Dealer, DealerId};
use partsdesk_products::{Product, ProductId};
use partsdesk_sales::{Order, OrderId};

/// Inventory listing row: a ledger record joined with its product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryLevel {
    pub product_id: ProductId,
    pub sku: String,
    pub quantity: i64,
}

/// In-memory store: the persistence collaborator of the core.
///
/// Sequences mimic autoincrement primary keys; numeric ids feed the
/// order-number format.
#[derive(Debug, Default)]
pub struct Store {
    pub(crate) products: RwLock<BTreeMap<ProductId, Product>>,
    pub(crate) dealers: RwLock<BTreeMap<DealerId, Dealer>>,
    pub(crate) orders: RwLock<BTreeMap<OrderId, Order>>,
    pub(crate) ledger: InventoryLedger,
    pub(crate) adjustments: AdjustmentLog,
    product_seq: AtomicI64,
    dealer_seq: AtomicI64,
    pub(crate) order_seq: AtomicI64,
}

pub(crate) fn table_poisoned(table: &str) -> DomainError {
    DomainError::conflict(format!("{table} table lock poisoned"))
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ledger(&self) -> &InventoryLedger {
        &self.ledger
    }

    pub(crate) fn next_id(seq: &AtomicI64) -> RecordId {
        RecordId::from_i64(seq.fetch_add(1, Ordering::SeqCst) + 1)
    }

    // ---- products ----

    pub fn create_product(
        &self,
        name: impl Into<String>,
        sku: impl Into<String>,
        price: Decimal,
        description: Option<String>,
    ) -> DomainResult<Product> {
        let now = Utc::now();
        let sku = sku.into();

        let mut products = self.products.write().map_err(|_| table_poisoned("products"))?;
        if products.values().any(|p| p.sku() == sku) {
            return Err(DomainError::validation(format!(
                "sku '{sku}' is already in use"
            )));
        }

        let id = ProductId::new(Self::next_id(&self.product_seq));
        let mut product = Product::new(id, name, sku, price, now)?;
        if let Some(description) = description {
            product.set_description(description, now);
        }
        products.insert(id, product.clone());
        Ok(product)
    }

    pub fn product(&self, id: ProductId) -> DomainResult<Option<Product>> {
        let products = self.products.read().map_err(|_| table_poisoned("products"))?;
        Ok(products.get(&id).cloned())
    }

    pub fn list_products(&self) -> DomainResult<Vec<Product>> {
        let products = self.products.read().map_err(|_| table_poisoned("products"))?;
        Ok(products.values().cloned().collect())
    }

    /// Remove a product from the catalog.
    ///
    /// Order items that reference it keep their snapshots but lose the
    /// catalog reference, so their stock can no longer be restored by the
    /// deletion compensator.
    pub fn delete_product(&self, id: ProductId) -> DomainResult<()> {
        // orders lock before products lock, as everywhere.
        let mut orders = self.orders.write().map_err(|_| table_poisoned("orders"))?;
        let mut products = self.products.write().map_err(|_| table_poisoned("products"))?;

        if products.remove(&id).is_none() {
            return Err(DomainError::not_found());
        }
        for order in orders.values_mut() {
            for item in order.items_mut() {
                if item.product_id() == Some(id) {
                    item.clear_product_ref();
                }
            }
        }
        tracing::info!(product_id = %id, "product deleted; order-item references cleared");
        Ok(())
    }

    // ---- dealers ----

    pub fn create_dealer(
        &self,
        name: impl Into<String>,
        code: impl Into<String>,
        contact: ContactInfo,
    ) -> DomainResult<Dealer> {
        let code = code.into();
        let mut dealers = self.dealers.write().map_err(|_| table_poisoned("dealers"))?;
        if dealers.values().any(|d| d.code() == code) {
            return Err(DomainError::validation(format!(
                "code '{code}' is already in use"
            )));
        }

        let id = DealerId::new(Self::next_id(&self.dealer_seq));
        let dealer = Dealer::new(id, name, code, contact, Utc::now())?;
        dealers.insert(id, dealer.clone());
        Ok(dealer)
    }

    pub fn dealer(&self, id: DealerId) -> DomainResult<Option<Dealer>> {
        let dealers = self.dealers.read().map_err(|_| table_poisoned("dealers"))?;
        Ok(dealers.get(&id).cloned())
    }

    pub fn list_dealers(&self) -> DomainResult<Vec<Dealer>> {
        let dealers = self.dealers.read().map_err(|_| table_poisoned("dealers"))?;
        Ok(dealers.values().cloned().collect())
    }

    // ---- inventory ----

    /// Manual stock adjustment: mutates the ledger and appends an audit row
    /// within the same locked section, so either both happen or neither.
    pub fn adjust_inventory(
        &self,
        product_id: ProductId,
        change: i64,
        note: impl Into<String>,
        changed_by: Option<UserId>,
    ) -> DomainResult<AdjustmentRecord> {
        {
            let products = self.products.read().map_err(|_| table_poisoned("products"))?;
            if !products.contains_key(&product_id) {
                return Err(DomainError::not_found());
            }
        }

        let note = note.into();
        let now = Utc::now();
        let record = self
            .ledger
            .with_locked(&[product_id], now, |locked| {
                locked.apply_delta(product_id, change)?;
                self.adjustments
                    .record(product_id, change, note, changed_by, now)
            })?;
        tracing::info!(product_id = %product_id, change, "inventory adjusted");
        Ok(record)
    }

    pub fn inventory_levels(&self) -> DomainResult<Vec<InventoryLevel>> {
        let products = self.products.read().map_err(|_| table_poisoned("products"))?;
        let mut levels = Vec::new();
        for record in self.ledger.snapshot()? {
            // Orphan records (product deleted) are not listed.
            if let Some(product) = products.get(&record.product_id) {
                levels.push(InventoryLevel {
                    product_id: record.product_id,
                    sku: product.sku().to_string(),
                    quantity: record.quantity,
                });
            }
        }
        Ok(levels)
    }

    pub fn adjustments(&self) -> DomainResult<Vec<AdjustmentRecord>> {
        self.adjustments.all()
    }

    pub fn adjustments_for(&self, product_id: ProductId) -> DomainResult<Vec<AdjustmentRecord>> {
        self.adjustments.for_product(product_id)
    }
}
