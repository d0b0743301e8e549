//! GraphQL-style error bodies: `{ "errors": [{ "message", "extensions"? }] }`.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::{Value, json};

use emall_core::DomainError;
use emall_infra::PlaceOrderError;

pub fn place_order_error_to_response(err: PlaceOrderError) -> axum::response::Response {
    let message = err.to_string();
    match err {
        PlaceOrderError::Validation(_) => graphql_error(
            StatusCode::BAD_REQUEST,
            message,
            Some(json!({ "code": "BAD_USER_INPUT" })),
        ),
        PlaceOrderError::ProductNotFound(_) => graphql_error(StatusCode::NOT_FOUND, message, None),
        PlaceOrderError::InsufficientStock(stock) => graphql_error(
            StatusCode::CONFLICT,
            message,
            Some(json!({
                "code": stock.code.as_str(),
                "soldOutProductName": stock.sold_out_product_name,
            })),
        ),
        PlaceOrderError::Conflict(_) => graphql_error(
            StatusCode::CONFLICT,
            message,
            Some(json!({ "code": "CONFLICT" })),
        ),
        PlaceOrderError::InvariantViolation(_) => graphql_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            message,
            Some(json!({ "code": "INTERNAL_SERVER_ERROR" })),
        ),
    }
}

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    let message = err.to_string();
    let (status, code) = match err {
        DomainError::Validation(_) | DomainError::InvalidId(_) => {
            (StatusCode::BAD_REQUEST, "BAD_USER_INPUT")
        }
        DomainError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
        DomainError::NotFound => (StatusCode::NOT_FOUND, "NOT_FOUND"),
        DomainError::InvariantViolation(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_SERVER_ERROR")
        }
    };
    graphql_error(status, message, Some(json!({ "code": code })))
}

pub fn graphql_error(
    status: StatusCode,
    message: impl Into<String>,
    extensions: Option<Value>,
) -> axum::response::Response {
    let mut error = json!({ "message": message.into() });
    if let Some(extensions) = extensions {
        error["extensions"] = extensions;
    }
    (status, axum::Json(json!({ "errors": [error] }))).into_response()
}
