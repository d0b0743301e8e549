//! Catalog seeding from a JSON file (dev/demo).

use std::path::Path;

use thiserror::Error;
use tracing::info;

use emall_catalog::{CatalogStore, Product, RegisterProduct};
use emall_core::DomainError;

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("failed to read seed file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse seed file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid seed product: {0}")]
    Domain(#[from] DomainError),
}

/// Read a JSON array of `RegisterProduct` commands.
pub fn load_seed_file(path: impl AsRef<Path>) -> Result<Vec<RegisterProduct>, SeedError> {
    let raw = std::fs::read_to_string(path.as_ref())?;
    let products = serde_json::from_str(&raw)?;
    Ok(products)
}

/// Register every product into the store. Stops at the first invalid one.
pub fn seed_catalog<S>(store: &S, products: &[RegisterProduct]) -> Result<usize, SeedError>
where
    S: CatalogStore + ?Sized,
{
    for cmd in products {
        store.insert(Product::register(cmd)?)?;
    }
    info!(count = products.len(), "catalog seeded");
    Ok(products.len())
}
