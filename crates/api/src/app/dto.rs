//! Request payloads and JSON mapping helpers.

use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;

use partsdesk_core::RecordId;
use partsdesk_inventory::AdjustmentRecord;
use partsdesk_parties::Dealer;
use partsdesk_products::{Product, ProductId};
use partsdesk_sales::{Order, OrderItem};
use partsdesk_store::{InventoryLevel, OrderItemDraft};

#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    pub sku: String,
    pub price: Decimal,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateDealerRequest {
    pub name: String,
    pub code: String,
    pub contact_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct OrderItemPayload {
    pub product: i64,
    pub quantity: u32,
    pub unit_price: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub dealer: i64,
    pub items: Vec<OrderItemPayload>,
}

/// Edit payload. `status` is captured as a raw value so that its mere
/// presence can be rejected, whatever was sent. The double `Option`
/// distinguishes an absent key (outer `None`) from an explicit `null`
/// (outer `Some`), which is still a rejectable status field.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateOrderRequest {
    #[serde(default, deserialize_with = "present_value")]
    pub status: Option<Option<serde_json::Value>>,
    pub items: Option<Vec<OrderItemPayload>>,
}

fn present_value<'de, D>(
    deserializer: D,
) -> Result<Option<Option<serde_json::Value>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<serde_json::Value>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Deserialize)]
pub struct AdjustStockRequest {
    pub change: i64,
    pub note: Option<String>,
}

pub fn item_drafts(items: &[OrderItemPayload]) -> Vec<OrderItemDraft> {
    items
        .iter()
        .map(|i| OrderItemDraft {
            product: ProductId::new(RecordId::from_i64(i.product)),
            quantity: i.quantity,
            unit_price: i.unit_price,
        })
        .collect()
}

pub fn product_to_json(p: &Product) -> serde_json::Value {
    json!({
        "id": p.id_typed().0.as_i64(),
        "name": p.name(),
        "sku": p.sku(),
        "description": p.description(),
        "price": p.price(),
        "active": p.active(),
        "created_at": p.created_at(),
        "updated_at": p.updated_at(),
    })
}

pub fn dealer_to_json(d: &Dealer) -> serde_json::Value {
    json!({
        "id": d.id_typed().0.as_i64(),
        "name": d.name(),
        "code": d.code(),
        "contact_name": d.contact().contact_name,
        "email": d.contact().email,
        "phone": d.contact().phone,
        "address": d.contact().address,
        "created_at": d.created_at(),
    })
}

fn item_to_json(i: &OrderItem) -> serde_json::Value {
    json!({
        "product": i.product_id().map(|p| p.0.as_i64()),
        "product_sku": i.product_sku(),
        "product_name": i.product_name(),
        "quantity": i.quantity(),
        "unit_price": i.unit_price(),
        "line_total": i.line_total(),
    })
}

pub fn order_to_json(o: &Order) -> serde_json::Value {
    json!({
        "id": o.id_typed().0.as_i64(),
        "order_number": o.order_number(),
        "dealer": o.dealer_id().0.as_i64(),
        "status": o.status(),
        "items": o.items().iter().map(item_to_json).collect::<Vec<_>>(),
        "total_amount": o.total_amount(),
        "confirmed_at": o.confirmed_at(),
        "delivered_at": o.delivered_at(),
        "canceled_at": o.canceled_at(),
        "created_at": o.created_at(),
        "updated_at": o.updated_at(),
    })
}

/// Compact order line used inside the dealer detail payload.
pub fn order_summary_to_json(o: &Order) -> serde_json::Value {
    json!({
        "id": o.id_typed().0.as_i64(),
        "order_number": o.order_number(),
        "status": o.status(),
        "total_amount": o.total_amount(),
    })
}

pub fn level_to_json(level: &InventoryLevel) -> serde_json::Value {
    json!({
        "product_id": level.product_id.0.as_i64(),
        "sku": level.sku,
        "quantity": level.quantity,
    })
}

pub fn adjustment_to_json(a: &AdjustmentRecord) -> serde_json::Value {
    json!({
        "id": a.id.as_i64(),
        "product": a.product_id.0.as_i64(),
        "change": a.change,
        "note": a.note,
        "changed_by": a.changed_by,
        "created_at": a.created_at,
    })
}
