//! Inventory endpoints. All of them require the admin role.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    response::IntoResponse,
    routing::{get, put},
};
use serde_json::json;

use partsdesk_core::RecordId;
use partsdesk_products::ProductId;
use partsdesk_store::Store;

use crate::app::{dto, errors};
use crate::context::ActorContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_inventory))
        .route("/adjustments", get(list_adjustments))
        .route("/:product_id/adjust", put(adjust_stock))
}

pub async fn list_inventory(
    Extension(store): Extension<Arc<Store>>,
    Extension(actor): Extension<ActorContext>,
) -> axum::response::Response {
    if !actor.is_admin() {
        return errors::forbidden();
    }
    match store.inventory_levels() {
        Ok(levels) => Json(levels.iter().map(dto::level_to_json).collect::<Vec<_>>()).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn adjust_stock(
    Extension(store): Extension<Arc<Store>>,
    Extension(actor): Extension<ActorContext>,
    Path(product_id): Path<i64>,
    Json(body): Json<dto::AdjustStockRequest>,
) -> axum::response::Response {
    if !actor.is_admin() {
        return errors::forbidden();
    }
    let product_id = ProductId::new(RecordId::from_i64(product_id));
    match store.adjust_inventory(
        product_id,
        body.change,
        body.note.unwrap_or_default(),
        Some(actor.user_id()),
    ) {
        Ok(_) => Json(json!({ "detail": "Inventory adjusted" })).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn list_adjustments(
    Extension(store): Extension<Arc<Store>>,
    Extension(actor): Extension<ActorContext>,
) -> axum::response::Response {
    if !actor.is_admin() {
        return errors::forbidden();
    }
    match store.adjustments() {
        Ok(records) => Json(
            records
                .iter()
                .map(dto::adjustment_to_json)
                .collect::<Vec<_>>(),
        )
        .into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
