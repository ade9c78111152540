use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use partsdesk_core::{DomainError, DomainResult, Entity, RecordId};

/// Product identifier.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ProductId(pub RecordId);

impl ProductId {
    pub fn new(id: RecordId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for ProductId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Catalog product.
///
/// Name and price may change after creation; order items snapshot both at
/// item-creation time, so later edits never rewrite historical orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    id: ProductId,
    name: String,
    sku: String,
    description: String,
    price: Decimal,
    active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Product {
    pub fn new(
        id: ProductId,
        name: impl Into<String>,
        sku: impl Into<String>,
        price: Decimal,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let name = name.into();
        let sku = sku.into();

        if name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        if sku.trim().is_empty() {
            return Err(DomainError::validation("sku cannot be empty"));
        }
        if price < Decimal::ZERO {
            return Err(DomainError::validation("price cannot be negative"));
        }

        Ok(Self {
            id,
            name,
            sku,
            description: String::new(),
            price,
            active: true,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn id_typed(&self) -> ProductId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sku(&self) -> &str {
        &self.sku
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn price(&self) -> Decimal {
        self.price
    }

    pub fn active(&self) -> bool {
        self.active
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn set_description(&mut self, description: impl Into<String>, now: DateTime<Utc>) {
        self.description = description.into();
        self.updated_at = now;
    }

    pub fn rename(&mut self, name: impl Into<String>, now: DateTime<Utc>) -> DomainResult<()> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        self.name = name;
        self.updated_at = now;
        Ok(())
    }

    pub fn set_price(&mut self, price: Decimal, now: DateTime<Utc>) -> DomainResult<()> {
        if price < Decimal::ZERO {
            return Err(DomainError::validation("price cannot be negative"));
        }
        self.price = price;
        self.updated_at = now;
        Ok(())
    }

    pub fn deactivate(&mut self, now: DateTime<Utc>) {
        self.active = false;
        self.updated_at = now;
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn test_product_id() -> ProductId {
        ProductId::new(RecordId::from_i64(1))
    }

    #[test]
    fn new_product_is_active_with_given_price() {
        let p = Product::new(test_product_id(), "Brake Pad", "BP-001", dec!(500.00), Utc::now())
            .unwrap();
        assert!(p.active());
        assert_eq!(p.price(), dec!(500.00));
        assert_eq!(p.sku(), "BP-001");
    }

    #[test]
    fn empty_name_is_rejected() {
        let err =
            Product::new(test_product_id(), "  ", "BP-001", dec!(1.00), Utc::now()).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn empty_sku_is_rejected() {
        let err =
            Product::new(test_product_id(), "Brake Pad", "", dec!(1.00), Utc::now()).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn negative_price_is_rejected_on_create_and_update() {
        let err = Product::new(test_product_id(), "Brake Pad", "BP-001", dec!(-1.00), Utc::now())
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        let mut p =
            Product::new(test_product_id(), "Brake Pad", "BP-001", dec!(1.00), Utc::now()).unwrap();
        let err = p.set_price(dec!(-0.01), Utc::now()).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert_eq!(p.price(), dec!(1.00));
    }

    #[test]
    fn price_change_does_not_touch_created_at() {
        let created = Utc::now();
        let mut p =
            Product::new(test_product_id(), "Brake Pad", "BP-001", dec!(1.00), created).unwrap();
        p.set_price(dec!(2.00), Utc::now()).unwrap();
        assert_eq!(p.created_at(), created);
        assert_eq!(p.price(), dec!(2.00));
    }
}
