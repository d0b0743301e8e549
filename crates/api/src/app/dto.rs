use serde::{Deserialize, Serialize};

use emall_catalog::Product;
use emall_core::{AggregateRoot, OrderId};
use emall_orders::OrderLineItem;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct PlaceOrderRequest {
    pub items: Vec<OrderLineItem>,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmMemberOrderResponse {
    pub ok: bool,
    pub results: bool,
    pub order_id: OrderId,
}

impl ConfirmMemberOrderResponse {
    pub fn confirmed(order_id: OrderId) -> Self {
        Self {
            ok: true,
            results: true,
            order_id,
        }
    }
}

pub fn product_to_json(product: &Product) -> serde_json::Value {
    serde_json::json!({
        "id": product.id_typed(),
        "name": product.name(),
        "stockCount": product.stock_count(),
        "optionsType": product.options_type(),
        "options": product.options(),
        "version": product.version(),
    })
}
