use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::json;

use partsdesk_core::RecordId;
use partsdesk_parties::DealerId;
use partsdesk_sales::OrderId;
use partsdesk_store::{OrderEdit, Store};

use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_order).get(list_orders))
        .route("/:id", get(get_order).put(update_order).delete(delete_order))
        .route("/:id/confirm", post(confirm_order))
        .route("/:id/deliver", post(deliver_order))
        .route("/:id/cancel", post(cancel_order))
}

pub async fn create_order(
    Extension(store): Extension<Arc<Store>>,
    Json(body): Json<dto::CreateOrderRequest>,
) -> axum::response::Response {
    let dealer_id = DealerId::new(RecordId::from_i64(body.dealer));
    match store.create_order(dealer_id, dto::item_drafts(&body.items)) {
        Ok(order) => (StatusCode::CREATED, Json(dto::order_to_json(&order))).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn list_orders(Extension(store): Extension<Arc<Store>>) -> axum::response::Response {
    match store.list_orders() {
        Ok(orders) => {
            Json(orders.iter().map(dto::order_to_json).collect::<Vec<_>>()).into_response()
        }
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn get_order(
    Extension(store): Extension<Arc<Store>>,
    Path(id): Path<i64>,
) -> axum::response::Response {
    match store.order(order_id(id)) {
        Ok(Some(order)) => Json(dto::order_to_json(&order)).into_response(),
        Ok(None) => errors::json_detail(StatusCode::NOT_FOUND, "Not found."),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn update_order(
    Extension(store): Extension<Arc<Store>>,
    Path(id): Path<i64>,
    Json(body): Json<dto::UpdateOrderRequest>,
) -> axum::response::Response {
    let edit = OrderEdit {
        status: body
            .status
            .map(|v| v.map_or_else(|| "null".to_string(), |s| s.to_string())),
        items: body.items.as_deref().map(dto::item_drafts),
    };
    match store.edit_order(order_id(id), edit) {
        Ok(order) => Json(dto::order_to_json(&order)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn delete_order(
    Extension(store): Extension<Arc<Store>>,
    Path(id): Path<i64>,
) -> axum::response::Response {
    match store.delete_order(order_id(id)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn confirm_order(
    Extension(store): Extension<Arc<Store>>,
    Path(id): Path<i64>,
) -> axum::response::Response {
    match store.confirm_order(order_id(id)) {
        Ok(_) => Json(json!({ "detail": "Order confirmed" })).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn deliver_order(
    Extension(store): Extension<Arc<Store>>,
    Path(id): Path<i64>,
) -> axum::response::Response {
    match store.deliver_order(order_id(id)) {
        Ok(_) => Json(json!({ "detail": "Order marked as delivered" })).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn cancel_order(
    Extension(store): Extension<Arc<Store>>,
    Path(id): Path<i64>,
) -> axum::response::Response {
    match store.cancel_order(order_id(id)) {
        Ok(_) => Json(json!({ "detail": "Order cancelled" })).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

fn order_id(id: i64) -> OrderId {
    OrderId::new(RecordId::from_i64(id))
}
