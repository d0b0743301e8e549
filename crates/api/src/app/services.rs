use std::sync::Arc;

use emall_catalog::{CatalogStore, Product, RegisterProduct};
use emall_core::{DomainResult, ProductId};
use emall_infra::{
    InMemoryCatalogStore, OrderPlacement, PlaceOrderError, PlacedOrder, SeedError,
    load_seed_file, seed_catalog,
};
use emall_orders::OrderLineItem;

use crate::config::ApiConfig;

/// Everything the handlers need, shared behind an `Arc`.
#[derive(Debug)]
pub struct AppServices {
    placement: OrderPlacement<Arc<InMemoryCatalogStore>>,
}

impl AppServices {
    /// Empty in-memory catalog (dev/test).
    pub fn in_memory() -> Self {
        Self {
            placement: OrderPlacement::new(Arc::new(InMemoryCatalogStore::new())),
        }
    }

    /// In-memory catalog, seeded from `EMALL_SEED_FILE` when configured.
    pub fn from_config(config: &ApiConfig) -> Result<Self, SeedError> {
        let services = Self::in_memory();
        if let Some(path) = &config.seed_file {
            let products = load_seed_file(path)?;
            seed_catalog(services.catalog(), &products)?;
        }
        Ok(services)
    }

    fn catalog(&self) -> &Arc<InMemoryCatalogStore> {
        self.placement.catalog()
    }

    pub fn products_get(&self, product_id: &ProductId) -> Option<Product> {
        self.catalog().find_by_id(product_id)
    }

    pub fn products_list(&self) -> Vec<Product> {
        self.catalog().list()
    }

    pub fn register_product(&self, cmd: &RegisterProduct) -> DomainResult<ProductId> {
        let product = Product::register(cmd)?;
        let product_id = product.id_typed();
        self.catalog().insert(product)?;
        Ok(product_id)
    }

    pub fn place_order(&self, items: &[OrderLineItem]) -> Result<PlacedOrder, PlaceOrderError> {
        self.placement.place_order(items)
    }
}
