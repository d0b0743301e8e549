//! Order-time stock validation.
//!
//! Given the line items of an order, decide whether the catalog can satisfy
//! them. The validator only reads the catalog; taking the stock out is the
//! caller's job (see `StockCheck::into_reservation`).

pub mod line_item;
pub mod stock;

pub use line_item::OrderLineItem;
pub use stock::{
    InsufficientStock, OPTION_SHORTAGE_SUFFIX, StockCheck, StockError, StockErrorCode,
    StockValidator,
};
