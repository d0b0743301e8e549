//! Order placement pipeline.
//!
//! ```text
//! line items
//!   ↓
//! 1. Shape checks (non-empty order, positive quantities)
//!   ↓
//! 2. Existence check (first missing product aborts)
//!   ↓
//! 3. Stock check (read-only, aggregated failure)
//!   ↓
//! 4. Commit reservation (version-guarded, all-or-nothing)
//! ```
//!
//! The validator never writes; the only write is step 4, and it fails with a
//! conflict if any product changed since step 3 read it. Conflicts are returned
//! to the caller, not retried here.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::{info, instrument, warn};

use emall_catalog::CatalogStore;
use emall_core::{DomainError, OrderId, ProductId};
use emall_orders::{InsufficientStock, OrderLineItem, StockError, StockValidator};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PlaceOrderError {
    /// Malformed order (empty, non-positive quantity).
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("Could not find the product with ID")]
    ProductNotFound(ProductId),

    #[error("stock count less than order quantity")]
    InsufficientStock(InsufficientStock),

    /// The catalog changed between the stock check and the commit.
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("invariant violated: {0}")]
    InvariantViolation(String),
}

impl From<StockError> for PlaceOrderError {
    fn from(value: StockError) -> Self {
        match value {
            StockError::ProductNotFound(id) => PlaceOrderError::ProductNotFound(id),
            StockError::InsufficientStock(s) => PlaceOrderError::InsufficientStock(s),
        }
    }
}

impl From<DomainError> for PlaceOrderError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation(msg) => PlaceOrderError::Validation(msg),
            DomainError::InvalidId(msg) => PlaceOrderError::Validation(msg),
            DomainError::Conflict(msg) => PlaceOrderError::Conflict(msg),
            DomainError::InvariantViolation(msg) => PlaceOrderError::InvariantViolation(msg),
            DomainError::NotFound => {
                PlaceOrderError::Conflict("product removed while placing order".to_string())
            }
        }
    }
}

/// A committed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedOrder {
    pub order_id: OrderId,
    pub items: Vec<OrderLineItem>,
    pub placed_at: DateTime<Utc>,
}

/// Checks an order against the catalog and takes the stock out.
#[derive(Debug)]
pub struct OrderPlacement<S> {
    validator: StockValidator<S>,
}

impl<S> OrderPlacement<S>
where
    S: CatalogStore,
{
    pub fn new(store: S) -> Self {
        Self {
            validator: StockValidator::new(store),
        }
    }

    pub fn catalog(&self) -> &S {
        self.validator.store()
    }

    #[instrument(skip(self, items), fields(lines = items.len()))]
    pub fn place_order(&self, items: &[OrderLineItem]) -> Result<PlacedOrder, PlaceOrderError> {
        validate_shape(items)?;

        let product_ids: Vec<ProductId> = items.iter().map(|i| i.product_id).collect();
        self.validator.check_product_exist(&product_ids)?;

        let check = self.validator.check_product_stock_count(items)?;

        if let Err(e) = self.catalog().commit_reservation(&check.into_reservation()) {
            warn!(error = %e, "stock reservation rejected");
            return Err(e.into());
        }

        let order = PlacedOrder {
            order_id: OrderId::new(),
            items: items.to_vec(),
            placed_at: Utc::now(),
        };
        info!(order_id = %order.order_id, "order placed");
        Ok(order)
    }
}

fn validate_shape(items: &[OrderLineItem]) -> Result<(), PlaceOrderError> {
    if items.is_empty() {
        return Err(PlaceOrderError::Validation(
            "order must contain at least one item".to_string(),
        ));
    }
    if let Some(bad) = items.iter().find(|i| i.order_quantity <= 0) {
        return Err(PlaceOrderError::Validation(format!(
            "order quantity for product {} must be positive",
            bad.product_id
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    use emall_catalog::{
        OptionsType, Product, ProductOption, RegisterProduct, ReservedProduct, StatusOfStock,
        StockDecrement, StockReservation,
    };
    use emall_core::{AggregateRoot, DomainResult, ExpectedVersion, OptionId};
    use emall_orders::StockErrorCode;

    use crate::catalog_store::InMemoryCatalogStore;

    fn catalog() -> Arc<InMemoryCatalogStore> {
        let plain = Product::register(&RegisterProduct {
            product_id: ProductId::new(1),
            name: "Plain".to_string(),
            stock_count: 5,
            options_type: OptionsType::None,
            options: vec![],
        })
        .unwrap();
        let combo = Product::register(&RegisterProduct {
            product_id: ProductId::new(2),
            name: "Combo".to_string(),
            stock_count: 10,
            options_type: OptionsType::Combination,
            options: vec![ProductOption {
                option_id: OptionId::new(1),
                option_name1: Some("color".to_string()),
                option_value1: Some("red".to_string()),
                stock_count: 3,
                status_of_stock: Some(StatusOfStock::OnSale),
            }],
        })
        .unwrap();
        Arc::new(InMemoryCatalogStore::with_products(vec![plain, combo]))
    }

    #[test]
    fn placing_an_order_takes_stock_out() {
        let placement = OrderPlacement::new(catalog());

        let order = placement
            .place_order(&[
                OrderLineItem::new(ProductId::new(1), 2),
                OrderLineItem::new(ProductId::new(2), 3).with_option(OptionId::new(1)),
            ])
            .unwrap();
        assert_eq!(order.items.len(), 2);

        let plain = placement.catalog().find_by_id(&ProductId::new(1)).unwrap();
        assert_eq!(plain.stock_count(), 3);
        let combo = placement.catalog().find_by_id(&ProductId::new(2)).unwrap();
        assert_eq!(combo.stock_count(), 7);
        assert_eq!(combo.options()[0].stock_count, 0);
    }

    #[test]
    fn missing_product_is_reported_before_stock() {
        let placement = OrderPlacement::new(catalog());

        let err = placement
            .place_order(&[
                OrderLineItem::new(ProductId::new(1), 100),
                OrderLineItem::new(ProductId::new(9), 1),
            ])
            .unwrap_err();

        assert_eq!(err, PlaceOrderError::ProductNotFound(ProductId::new(9)));
    }

    #[test]
    fn failed_stock_check_leaves_catalog_untouched() {
        let placement = OrderPlacement::new(catalog());
        let before = placement.catalog().list();

        let err = placement
            .place_order(&[
                OrderLineItem::new(ProductId::new(1), 1),
                OrderLineItem::new(ProductId::new(2), 4).with_option(OptionId::new(1)),
            ])
            .unwrap_err();

        match err {
            PlaceOrderError::InsufficientStock(s) => {
                assert_eq!(s.code, StockErrorCode::LackOfStockCount);
                assert_eq!(s.sold_out_product_name, vec!["Combo / option stock shortage"]);
            }
            other => panic!("expected InsufficientStock, got {other:?}"),
        }
        assert_eq!(placement.catalog().list(), before);
    }

    #[test]
    fn rejects_empty_orders_and_non_positive_quantities() {
        let placement = OrderPlacement::new(catalog());

        assert!(matches!(
            placement.place_order(&[]),
            Err(PlaceOrderError::Validation(_))
        ));
        assert!(matches!(
            placement.place_order(&[OrderLineItem::new(ProductId::new(1), 0)]),
            Err(PlaceOrderError::Validation(_))
        ));
    }

    #[test]
    fn second_order_sees_first_orders_reservation() {
        let placement = OrderPlacement::new(catalog());
        let line = [OrderLineItem::new(ProductId::new(2), 2).with_option(OptionId::new(1))];

        placement.place_order(&line).unwrap();
        let err = placement.place_order(&line).unwrap_err();

        assert!(matches!(err, PlaceOrderError::InsufficientStock(_)));
    }

    #[test]
    fn over_ordering_a_plain_product_across_lines_conflicts_at_commit() {
        let placement = OrderPlacement::new(catalog());

        // each line fits the stock of 5 on its own
        let err = placement
            .place_order(&[
                OrderLineItem::new(ProductId::new(1), 3),
                OrderLineItem::new(ProductId::new(1), 3),
            ])
            .unwrap_err();

        match err {
            PlaceOrderError::Conflict(msg) => assert!(msg.contains("below zero")),
            other => panic!("expected Conflict, got {other:?}"),
        }
        let plain = placement.catalog().find_by_id(&ProductId::new(1)).unwrap();
        assert_eq!(plain.stock_count(), 5);
        assert_eq!(plain.version(), 1);
    }

    #[test]
    fn huge_quantities_conflict_instead_of_overselling() {
        let bulk = Product::register(&RegisterProduct {
            product_id: ProductId::new(1),
            name: "Bulk".to_string(),
            stock_count: i64::MAX,
            options_type: OptionsType::None,
            options: vec![],
        })
        .unwrap();
        let placement = OrderPlacement::new(InMemoryCatalogStore::with_products(vec![bulk]));
        let line = OrderLineItem::new(ProductId::new(1), i64::MAX);

        let err = placement.place_order(&[line, line, line]).unwrap_err();

        assert!(matches!(err, PlaceOrderError::Conflict(_)));
        let stock = placement.catalog().find_by_id(&ProductId::new(1)).unwrap();
        assert_eq!(stock.stock_count(), i64::MAX);
    }

    /// Lets another order take one unit of a product between the stock check
    /// and this order's commit.
    struct RacingCatalog {
        inner: InMemoryCatalogStore,
        contested: ProductId,
    }

    impl CatalogStore for RacingCatalog {
        fn find_by_id(&self, product_id: &ProductId) -> Option<Product> {
            self.inner.find_by_id(product_id)
        }

        fn list(&self) -> Vec<Product> {
            self.inner.list()
        }

        fn insert(&self, product: Product) -> DomainResult<()> {
            self.inner.insert(product)
        }

        fn commit_reservation(&self, reservation: &StockReservation) -> DomainResult<()> {
            if let Some(current) = self.inner.find_by_id(&self.contested) {
                self.inner.commit_reservation(&StockReservation {
                    products: vec![ReservedProduct {
                        product_id: self.contested,
                        expected_version: ExpectedVersion::Exact(current.version()),
                        decrements: vec![StockDecrement {
                            option_id: None,
                            quantity: 1,
                        }],
                    }],
                })?;
            }
            self.inner.commit_reservation(reservation)
        }
    }

    #[test]
    fn stale_read_is_rejected_as_conflict() {
        let store = catalog();
        let placement = OrderPlacement::new(RacingCatalog {
            inner: InMemoryCatalogStore::with_products(store.list()),
            contested: ProductId::new(1),
        });

        let err = placement
            .place_order(&[
                OrderLineItem::new(ProductId::new(1), 1),
                OrderLineItem::new(ProductId::new(2), 1).with_option(OptionId::new(1)),
            ])
            .unwrap_err();

        match err {
            PlaceOrderError::Conflict(msg) => assert!(msg.contains("optimistic concurrency")),
            other => panic!("expected Conflict, got {other:?}"),
        }
        // only the competing order went through
        let plain = placement.catalog().find_by_id(&ProductId::new(1)).unwrap();
        assert_eq!(plain.stock_count(), 4);
        assert_eq!(plain.version(), 2);
        let combo = placement.catalog().find_by_id(&ProductId::new(2)).unwrap();
        assert_eq!(combo.stock_count(), 10);
        assert_eq!(combo.options()[0].stock_count, 3);
    }

    #[test]
    fn concurrent_orders_never_oversell() {
        let store = catalog();
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let placement = OrderPlacement::new(store.clone());
                thread::spawn(move || {
                    placement
                        .place_order(&[OrderLineItem::new(ProductId::new(1), 1)])
                        .is_ok()
                })
            })
            .collect();

        let placed = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();

        let remaining = store.find_by_id(&ProductId::new(1)).unwrap().stock_count();
        assert!(placed <= 5);
        assert_eq!(remaining, 5 - placed as i64);
        assert!(remaining >= 0);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: however orders are sized, stock never goes negative
            /// and drops by exactly what the accepted orders asked for.
            #[test]
            fn placements_never_leave_negative_stock(
                orders in proptest::collection::vec(
                    proptest::collection::vec((1i64..=2, 1i64..4), 1..4),
                    1..12,
                )
            ) {
                let placement = OrderPlacement::new(catalog());
                let mut plain_taken = 0;
                let mut combo_taken = 0;

                for lines in &orders {
                    let items: Vec<OrderLineItem> = lines
                        .iter()
                        .map(|(product, quantity)| {
                            let item = OrderLineItem::new(ProductId::new(*product), *quantity);
                            if *product == 2 { item.with_option(OptionId::new(1)) } else { item }
                        })
                        .collect();
                    if placement.place_order(&items).is_ok() {
                        for item in &items {
                            match item.product_id.get() {
                                1 => plain_taken += item.order_quantity,
                                _ => combo_taken += item.order_quantity,
                            }
                        }
                    }
                }

                let plain = placement.catalog().find_by_id(&ProductId::new(1)).unwrap();
                let combo = placement.catalog().find_by_id(&ProductId::new(2)).unwrap();
                prop_assert!(plain.stock_count() >= 0);
                prop_assert!(combo.options()[0].stock_count >= 0);
                prop_assert_eq!(plain.stock_count(), 5 - plain_taken);
                prop_assert_eq!(combo.stock_count(), 10 - combo_taken);
                prop_assert_eq!(combo.options()[0].stock_count, 3 - combo_taken);
            }
        }
    }
}
