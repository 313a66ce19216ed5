use std::sync::Arc;

use crate::application::{ClientService, InvoiceService, ProductService};
use crate::db::DbPool;
use crate::domain::ports::{ClientRepository, InvoiceRepository, ProductRepository};
use crate::infrastructure::{
    DieselClientRepository, DieselInvoiceRepository, DieselProductRepository, InMemoryStore,
};

/// Services shared by every request handler.
#[derive(Clone)]
pub struct AppState {
    pub clients: ClientService,
    pub products: ProductService,
    pub invoices: InvoiceService,
}

impl AppState {
    pub fn new(
        clients: Arc<dyn ClientRepository>,
        products: Arc<dyn ProductRepository>,
        invoices: Arc<dyn InvoiceRepository>,
    ) -> Self {
        Self {
            clients: ClientService::new(clients.clone()),
            products: ProductService::new(products.clone()),
            invoices: InvoiceService::new(invoices, clients, products),
        }
    }

    pub fn postgres(pool: DbPool) -> Self {
        Self::new(
            Arc::new(DieselClientRepository::new(pool.clone())),
            Arc::new(DieselProductRepository::new(pool.clone())),
            Arc::new(DieselInvoiceRepository::new(pool)),
        )
    }

    pub fn in_memory(store: InMemoryStore) -> Self {
        Self::new(
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            Arc::new(store),
        )
    }
}
