//! Product catalog domain module.
//!
//! Products, their option variants and the `CatalogStore` port the order core
//! reads from. Pure domain logic; storage adapters live in `emall-infra`.

pub mod product;
pub mod store;

pub use product::{
    OptionsType, Product, ProductOption, RegisterProduct, StatusOfStock, StockDecrement,
};
pub use store::{CatalogStore, ReservedProduct, StockReservation};
