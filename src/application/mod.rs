pub mod client_service;
pub mod invoice_service;
pub mod product_service;

pub use client_service::ClientService;
pub use invoice_service::InvoiceService;
pub use product_service::ProductService;

use crate::domain::errors::DomainError;

/// Log input the caller has to fix before it goes back as a 400.
fn rejected(entity: &str, e: DomainError) -> DomainError {
    if let DomainError::InvalidInput(msg) = &e {
        log::warn!("rejected {entity}: {msg}");
    }
    e
}
