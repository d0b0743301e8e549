//! Infrastructure layer: catalog storage, seeding and order placement.

pub mod catalog_store;
pub mod order_placement;
pub mod seed;

pub use catalog_store::InMemoryCatalogStore;
pub use order_placement::{OrderPlacement, PlaceOrderError, PlacedOrder};
pub use seed::{SeedError, load_seed_file, seed_catalog};
