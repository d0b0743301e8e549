use std::sync::Arc;

use axum::{
    Json, Router, extract::Extension, http::StatusCode, response::IntoResponse, routing::post,
};

use crate::app::{dto, errors};
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new().route("/", post(place_order))
}

/// Confirm a member order: existence check, stock check, then reservation.
pub async fn place_order(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::PlaceOrderRequest>,
) -> axum::response::Response {
    match services.place_order(&body.items) {
        Ok(order) => (
            StatusCode::CREATED,
            Json(dto::ConfirmMemberOrderResponse::confirmed(order.order_id)),
        )
            .into_response(),
        Err(e) => errors::place_order_error_to_response(e),
    }
}
