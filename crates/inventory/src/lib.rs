//! Inventory domain module.
//!
//! Products and the stock arithmetic applied to them, implemented purely as
//! deterministic domain logic (no IO, no HTTP, no storage). Coordinated
//! mutation of stock lives in the infra ledger.

pub mod product;
pub mod stock;

pub use product::{NewProduct, Product, ProductFilter, ProductId, ProductPatch};
pub use stock::{net_deltas, StockDelta, StockLine};
