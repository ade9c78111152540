use axum::{Router, routing::get};

pub mod dealers;
pub mod inventory;
pub mod orders;
pub mod products;
pub mod system;

/// Router for all authenticated endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .nest("/orders", orders::router())
        .nest("/inventory", inventory::router())
        .nest("/products", products::router())
        .nest("/dealers", dealers::router())
}
