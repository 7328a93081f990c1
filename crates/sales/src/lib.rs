//! Sales Orders domain module.
//!
//! This crate contains business rules for orders (line items, status
//! lifecycle, input validation), implemented purely as deterministic domain
//! logic (no IO, no HTTP, no storage).

pub mod order;

pub use order::{
    validate_line_items, LineItem, NewOrder, Order, OrderFilter, OrderId, OrderPatch, OrderStatus,
};
