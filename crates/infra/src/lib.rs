//! Infrastructure layer: storage, stock ledger, services, config.

pub mod catalog;
pub mod clients;
pub mod config;
pub mod error;
pub mod ledger;
pub mod orders;
pub mod store;


pub use catalog::ProductCatalog;
pub use clients::ClientDirectory;
pub use config::{AppConfig, ConfigError, LogConfig};
pub use error::{ServiceError, ServiceResult};
pub use ledger::{CommittedAdjustment, InventoryLedger, LedgerError, LedgerOptions, PendingSwap, PricedLine};
pub use orders::{OrderPolicy, OrderProcessor};
pub use store::{EntityStore, InMemoryEntityStore, StoreError, Stored};
