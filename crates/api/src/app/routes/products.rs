use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use partsdesk_core::RecordId;
use partsdesk_products::ProductId;
use partsdesk_store::Store;

use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_product).get(list_products))
        .route("/:id", get(get_product).delete(delete_product))
}

pub async fn create_product(
    Extension(store): Extension<Arc<Store>>,
    Json(body): Json<dto::CreateProductRequest>,
) -> axum::response::Response {
    match store.create_product(body.name, body.sku, body.price, body.description) {
        Ok(product) => {
            (StatusCode::CREATED, Json(dto::product_to_json(&product))).into_response()
        }
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn list_products(Extension(store): Extension<Arc<Store>>) -> axum::response::Response {
    match store.list_products() {
        Ok(products) => {
            Json(products.iter().map(dto::product_to_json).collect::<Vec<_>>()).into_response()
        }
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn get_product(
    Extension(store): Extension<Arc<Store>>,
    Path(id): Path<i64>,
) -> axum::response::Response {
    match store.product(ProductId::new(RecordId::from_i64(id))) {
        Ok(Some(product)) => Json(dto::product_to_json(&product)).into_response(),
        Ok(None) => errors::json_detail(StatusCode::NOT_FOUND, "Not found."),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn delete_product(
    Extension(store): Extension<Arc<Store>>,
    Path(id): Path<i64>,
) -> axum::response::Response {
    match store.delete_product(ProductId::new(RecordId::from_i64(id))) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
