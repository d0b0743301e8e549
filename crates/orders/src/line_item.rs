use serde::{Deserialize, Serialize};

use emall_core::{OptionId, ProductId};

/// One requested line of an order. Lives only for the duration of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineItem {
    pub product_id: ProductId,
    #[serde(default)]
    pub option_id: Option<OptionId>,
    pub order_quantity: i64,
}

impl OrderLineItem {
    pub fn new(product_id: ProductId, order_quantity: i64) -> Self {
        Self {
            product_id,
            option_id: None,
            order_quantity,
        }
    }

    pub fn with_option(mut self, option_id: OptionId) -> Self {
        self.option_id = Some(option_id);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_request_shape() {
        let item: OrderLineItem =
            serde_json::from_str(r#"{"productId": 1, "optionId": 2, "orderQuantity": 4}"#).unwrap();
        assert_eq!(
            item,
            OrderLineItem::new(ProductId::new(1), 4).with_option(OptionId::new(2))
        );

        let item: OrderLineItem =
            serde_json::from_str(r#"{"productId": 1, "orderQuantity": 4}"#).unwrap();
        assert!(item.option_id.is_none());
    }
}
