use axum::Json;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use partsdesk_core::DomainError;
use partsdesk_store::ServiceError;

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::Validation(msg) => json_detail(StatusCode::BAD_REQUEST, msg),
        DomainError::InvalidState(msg) => json_detail(StatusCode::BAD_REQUEST, msg),
        DomainError::InvalidId(msg) => json_detail(StatusCode::BAD_REQUEST, msg),
        DomainError::NotFound => json_detail(StatusCode::NOT_FOUND, "Not found."),
        DomainError::Conflict(msg) => json_detail(StatusCode::CONFLICT, msg),
    }
}

pub fn service_error_to_response(err: ServiceError) -> axum::response::Response {
    match err {
        ServiceError::Domain(e) => domain_error_to_response(e),
        ServiceError::InsufficientStock { detail, items } => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "detail": detail, "items": items })),
        )
            .into_response(),
    }
}

pub fn json_detail(status: StatusCode, detail: impl Into<String>) -> axum::response::Response {
    (status, Json(json!({ "detail": detail.into() }))).into_response()
}

pub fn forbidden() -> axum::response::Response {
    json_detail(
        StatusCode::FORBIDDEN,
        "You do not have permission to perform this action.",
    )
}
