use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use partsdesk_core::RecordId;
use partsdesk_parties::{ContactInfo, DealerId};
use partsdesk_store::Store;

use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_dealer).get(list_dealers))
        .route("/:id", get(get_dealer))
}

pub async fn create_dealer(
    Extension(store): Extension<Arc<Store>>,
    Json(body): Json<dto::CreateDealerRequest>,
) -> axum::response::Response {
    let contact = ContactInfo {
        contact_name: body.contact_name,
        email: body.email,
        phone: body.phone,
        address: body.address,
    };
    match store.create_dealer(body.name, body.code, contact) {
        Ok(dealer) => (StatusCode::CREATED, Json(dto::dealer_to_json(&dealer))).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn list_dealers(Extension(store): Extension<Arc<Store>>) -> axum::response::Response {
    match store.list_dealers() {
        Ok(dealers) => {
            Json(dealers.iter().map(dto::dealer_to_json).collect::<Vec<_>>()).into_response()
        }
        Err(e) => errors::domain_error_to_response(e),
    }
}

/// Dealer detail, with a summary of the dealer's orders embedded.
pub async fn get_dealer(
    Extension(store): Extension<Arc<Store>>,
    Path(id): Path<i64>,
) -> axum::response::Response {
    let dealer_id = DealerId::new(RecordId::from_i64(id));
    let dealer = match store.dealer(dealer_id) {
        Ok(Some(dealer)) => dealer,
        Ok(None) => return errors::json_detail(StatusCode::NOT_FOUND, "Not found."),
        Err(e) => return errors::domain_error_to_response(e),
    };
    let orders = match store.orders_for_dealer(dealer_id) {
        Ok(orders) => orders,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let mut body = dto::dealer_to_json(&dealer);
    body["orders"] = orders
        .iter()
        .map(dto::order_summary_to_json)
        .collect::<Vec<_>>()
        .into();
    Json(body).into_response()
}
