//! Existence and stock checks run before an order is committed.
//!
//! The stock check makes two passes over the line items:
//!
//! 1. whole product: a line asking for more than the product's total stock
//!    flags the product;
//! 2. option: for `Combination` products, the line's tracked option is drawn
//!    down from a local tally; a product whose tally goes negative is flagged
//!    unless pass 1 already flagged it.
//!
//! Everything flagged is reported in one `StockError::InsufficientStock`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use emall_catalog::{CatalogStore, Product, ReservedProduct, StockDecrement, StockReservation};
use emall_core::{AggregateRoot, ExpectedVersion, OptionId, ProductId};

use crate::line_item::OrderLineItem;

/// Appended to a product name when only its option stock fell short.
pub const OPTION_SHORTAGE_SUFFIX: &str = " / option stock shortage";

/// Machine-readable code attached to stock failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StockErrorCode {
    LackOfStockCount,
}

impl StockErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            StockErrorCode::LackOfStockCount => "LACK_OF_STOCK_COUNT",
        }
    }
}

impl core::fmt::Display for StockErrorCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Aggregated stock failure for one validation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsufficientStock {
    pub code: StockErrorCode,
    /// Whole-product shortages first, then option shortages (suffixed).
    pub sold_out_product_name: Vec<String>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StockError {
    /// A referenced product does not exist. Raised on the first miss.
    #[error("Could not find the product with ID")]
    ProductNotFound(ProductId),

    #[error("stock count less than order quantity")]
    InsufficientStock(InsufficientStock),
}

/// Successful stock check: what was read, ready to be committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockCheck {
    reservation: StockReservation,
}

impl StockCheck {
    pub fn reservation(&self) -> &StockReservation {
        &self.reservation
    }

    /// Decrements grouped per product, each guarded by the version the check saw.
    pub fn into_reservation(self) -> StockReservation {
        self.reservation
    }
}

/// Runs existence and stock checks against an injected catalog store.
#[derive(Debug, Clone)]
pub struct StockValidator<S> {
    store: S,
}

impl<S> StockValidator<S>
where
    S: CatalogStore,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Fail on the first product id the catalog does not know.
    pub fn check_product_exist(&self, product_ids: &[ProductId]) -> Result<(), StockError> {
        for product_id in product_ids {
            if self.store.find_by_id(product_id).is_none() {
                debug!(%product_id, "product not found");
                return Err(StockError::ProductNotFound(*product_id));
            }
        }
        Ok(())
    }

    /// Check every line item against product and option stock.
    ///
    /// Read-only: the catalog is never written. Line items whose product is
    /// missing are skipped here; run `check_product_exist` first.
    pub fn check_product_stock_count(
        &self,
        items: &[OrderLineItem],
    ) -> Result<StockCheck, StockError> {
        let catalog = self.load_products(items);

        let mut lacking: Vec<&Product> = Vec::new();
        for item in items {
            let Some(product) = catalog.get(&item.product_id) else {
                continue;
            };
            if product.stock_count() < item.order_quantity && !contains(&lacking, product) {
                debug!(
                    product_id = %product.id_typed(),
                    stock = product.stock_count(),
                    requested = item.order_quantity,
                    "product stock shortage"
                );
                lacking.push(product);
            }
        }

        // Running option stock, shared by every line that hits the same option.
        let mut remaining: HashMap<(ProductId, OptionId), i64> = HashMap::new();
        let mut lacking_option: Vec<&Product> = Vec::new();
        for item in items {
            let Some(product) = catalog.get(&item.product_id) else {
                continue;
            };
            if !product.has_combination_options() {
                continue;
            }
            let Some(option) = item
                .option_id
                .and_then(|option_id| product.tracked_option(option_id))
            else {
                continue;
            };

            let left = remaining
                .entry((product.id_typed(), option.option_id))
                .or_insert(option.stock_count);
            // An overflowing request saturates below zero and is flagged.
            *left = left.saturating_sub(item.order_quantity);

            if *left < 0 && !contains(&lacking, product) && !contains(&lacking_option, product) {
                debug!(
                    product_id = %product.id_typed(),
                    option_id = %option.option_id,
                    remaining = *left,
                    "option stock shortage"
                );
                lacking_option.push(product);
            }
        }

        if !lacking.is_empty() || !lacking_option.is_empty() {
            let sold_out_product_name: Vec<String> = lacking
                .iter()
                .map(|p| p.name().to_string())
                .chain(
                    lacking_option
                        .iter()
                        .map(|p| format!("{}{OPTION_SHORTAGE_SUFFIX}", p.name())),
                )
                .collect();
            warn!(sold_out = ?sold_out_product_name, "stock check failed");

            return Err(StockError::InsufficientStock(InsufficientStock {
                code: StockErrorCode::LackOfStockCount,
                sold_out_product_name,
            }));
        }

        Ok(StockCheck {
            reservation: build_reservation(&catalog, items),
        })
    }

    /// One lookup per distinct product, so both passes see the same snapshot.
    fn load_products(&self, items: &[OrderLineItem]) -> HashMap<ProductId, Product> {
        let mut catalog = HashMap::new();
        for item in items {
            if catalog.contains_key(&item.product_id) {
                continue;
            }
            if let Some(product) = self.store.find_by_id(&item.product_id) {
                catalog.insert(item.product_id, product);
            }
        }
        catalog
    }
}

fn contains(products: &[&Product], product: &Product) -> bool {
    products.iter().any(|p| p.id_typed() == product.id_typed())
}

fn build_reservation(
    catalog: &HashMap<ProductId, Product>,
    items: &[OrderLineItem],
) -> StockReservation {
    let mut reservation = StockReservation::default();
    for item in items {
        let Some(product) = catalog.get(&item.product_id) else {
            continue;
        };
        let decrement = StockDecrement {
            option_id: item.option_id,
            quantity: item.order_quantity,
        };
        match reservation
            .products
            .iter_mut()
            .find(|r| r.product_id == item.product_id)
        {
            Some(reserved) => reserved.decrements.push(decrement),
            None => reservation.products.push(ReservedProduct {
                product_id: item.product_id,
                expected_version: ExpectedVersion::Exact(product.version()),
                decrements: vec![decrement],
            }),
        }
    }
    reservation
}
