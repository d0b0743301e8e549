//! Catalog store port.

use std::sync::Arc;

use emall_core::{DomainResult, ExpectedVersion, ProductId};

use crate::product::{Product, StockDecrement};

/// Decrements to apply to one product, guarded by the version that was read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservedProduct {
    pub product_id: ProductId,
    pub expected_version: ExpectedVersion,
    pub decrements: Vec<StockDecrement>,
}

/// A whole order's worth of stock to take out of the catalog in one step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StockReservation {
    pub products: Vec<ReservedProduct>,
}

/// Product lookups and guarded stock writes.
///
/// Reads are plain point lookups and may run concurrently. `commit_reservation`
/// must apply the whole reservation atomically: either every product's version
/// matches and every count stays non-negative, or nothing changes.
pub trait CatalogStore: Send + Sync {
    fn find_by_id(&self, product_id: &ProductId) -> Option<Product>;

    /// All products, ordered by id.
    fn list(&self) -> Vec<Product>;

    /// Insert a newly registered product. Conflicts if the id is taken.
    fn insert(&self, product: Product) -> DomainResult<()>;

    fn commit_reservation(&self, reservation: &StockReservation) -> DomainResult<()>;
}

impl<S> CatalogStore for Arc<S>
where
    S: CatalogStore + ?Sized,
{
    fn find_by_id(&self, product_id: &ProductId) -> Option<Product> {
        (**self).find_by_id(product_id)
    }

    fn list(&self) -> Vec<Product> {
        (**self).list()
    }

    fn insert(&self, product: Product) -> DomainResult<()> {
        (**self).insert(product)
    }

    fn commit_reservation(&self, reservation: &StockReservation) -> DomainResult<()> {
        (**self).commit_reservation(reservation)
    }
}
