//! Service wiring: one store per collection, shared by the services that need it.

use std::sync::Arc;

use salesdesk_infra::{
    AppConfig, ClientDirectory, InMemoryEntityStore, InventoryLedger, OrderProcessor, ProductCatalog,
};
use salesdesk_inventory::Product;
use salesdesk_parties::Client;
use salesdesk_sales::Order;

pub type ProductStore = Arc<InMemoryEntityStore<Product>>;
pub type ClientStore = Arc<InMemoryEntityStore<Client>>;
pub type OrderStore = Arc<InMemoryEntityStore<Order>>;

#[derive(Debug)]
pub struct AppServices {
    pub orders: OrderProcessor<OrderStore, ClientStore, ProductStore>,
    pub clients: ClientDirectory<ClientStore>,
    pub catalog: ProductCatalog<ProductStore>,
}

pub fn build_services(config: &AppConfig) -> AppServices {
    let products: ProductStore = Arc::new(InMemoryEntityStore::new());
    let clients: ClientStore = Arc::new(InMemoryEntityStore::new());
    let orders: OrderStore = Arc::new(InMemoryEntityStore::new());

    let ledger = InventoryLedger::with_options(products, config.ledger);

    AppServices {
        orders: OrderProcessor::new(orders, clients.clone(), ledger.clone()).with_policy(config.orders),
        clients: ClientDirectory::new(clients),
        catalog: ProductCatalog::new(ledger),
    }
}
