use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard};

use tracing::{debug, warn};

use emall_catalog::{CatalogStore, Product, StockReservation};
use emall_core::{AggregateRoot, DomainError, DomainResult, ProductId};

/// In-memory catalog for tests/dev.
///
/// Reads take a shared lock; `commit_reservation` takes the write lock for the
/// whole reservation, so a commit is atomic with respect to other commits.
#[derive(Debug, Default)]
pub struct InMemoryCatalogStore {
    inner: RwLock<BTreeMap<ProductId, Product>>,
}

impl InMemoryCatalogStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(BTreeMap::new()),
        }
    }

    pub fn with_products(products: impl IntoIterator<Item = Product>) -> Self {
        Self {
            inner: RwLock::new(products.into_iter().map(|p| (p.id_typed(), p)).collect()),
        }
    }

    /// Commits only write after every product has been staged, so the map
    /// behind a poisoned lock is still the last committed state.
    fn read(&self) -> RwLockReadGuard<'_, BTreeMap<ProductId, Product>> {
        self.inner.read().unwrap_or_else(|poisoned| {
            warn!("catalog lock poisoned, reading last committed state");
            PoisonError::into_inner(poisoned)
        })
    }
}

impl CatalogStore for InMemoryCatalogStore {
    fn find_by_id(&self, product_id: &ProductId) -> Option<Product> {
        self.read().get(product_id).cloned()
    }

    fn list(&self) -> Vec<Product> {
        self.read().values().cloned().collect()
    }

    fn insert(&self, product: Product) -> DomainResult<()> {
        let mut map = self
            .inner
            .write()
            .map_err(|_| DomainError::invariant("catalog lock poisoned"))?;
        let product_id = product.id_typed();
        if map.contains_key(&product_id) {
            return Err(DomainError::conflict(format!(
                "product {product_id} already exists"
            )));
        }
        map.insert(product_id, product);
        Ok(())
    }

    fn commit_reservation(&self, reservation: &StockReservation) -> DomainResult<()> {
        let mut map = self
            .inner
            .write()
            .map_err(|_| DomainError::invariant("catalog lock poisoned"))?;

        // Stage every update before writing any of them back.
        let mut staged = Vec::with_capacity(reservation.products.len());
        for reserved in &reservation.products {
            let Some(current) = map.get(&reserved.product_id) else {
                return Err(DomainError::not_found());
            };
            reserved.expected_version.check(current.version())?;

            let mut updated = current.clone();
            updated.apply_decrements(&reserved.decrements)?;
            staged.push(updated);
        }

        for product in staged {
            debug!(
                product_id = %product.id_typed(),
                stock = product.stock_count(),
                version = product.version(),
                "stock reserved"
            );
            map.insert(product.id_typed(), product);
        }
        Ok(())
    }
}
