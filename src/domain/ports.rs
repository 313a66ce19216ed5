use bigdecimal::BigDecimal;
use uuid::Uuid;

use super::client::{Client, ClientDetails};
use super::errors::DomainError;
use super::invoice::{Invoice, InvoiceContent, InvoiceFilter, ListResult};
use super::product::{Product, ProductDetails};

/// Every mutating method records a [`ChangeEvent`](super::events::ChangeEvent)
/// atomically with the write.
pub trait ClientRepository: Send + Sync + 'static {
    fn create(&self, details: ClientDetails) -> Result<Client, DomainError>;
    fn find_by_id(&self, id: Uuid) -> Result<Option<Client>, DomainError>;
    fn list(&self) -> Result<Vec<Client>, DomainError>;
    fn update(&self, id: Uuid, details: ClientDetails) -> Result<Client, DomainError>;
    /// Fails with `Conflict` while invoices still reference the client.
    fn delete(&self, id: Uuid) -> Result<(), DomainError>;
}

pub trait ProductRepository: Send + Sync + 'static {
    fn create(&self, details: ProductDetails) -> Result<Product, DomainError>;
    fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, DomainError>;
    fn list(&self) -> Result<Vec<Product>, DomainError>;
    fn update(&self, id: Uuid, details: ProductDetails) -> Result<Product, DomainError>;
    fn delete(&self, id: Uuid) -> Result<(), DomainError>;
}

pub trait InvoiceRepository: Send + Sync + 'static {
    /// Inserts the invoice, generating the next `BILL-NNN` number inside the
    /// same transaction when `bill_no` is `None`.
    fn create(&self, bill_no: Option<String>, content: InvoiceContent) -> Result<Invoice, DomainError>;
    fn find_by_id(&self, id: Uuid) -> Result<Option<Invoice>, DomainError>;
    /// Newest first; `page` is 1-based.
    fn list(&self, filter: &InvoiceFilter, page: i64, limit: i64) -> Result<ListResult, DomainError>;
    fn update(&self, id: Uuid, bill_no: String, content: InvoiceContent) -> Result<Invoice, DomainError>;
    fn delete(&self, id: Uuid) -> Result<(), DomainError>;
    /// What `create` would generate right now. Another writer may claim it first.
    fn next_bill_number(&self) -> Result<String, DomainError>;
    /// Sum of positive remaining balances for one client.
    fn receivable_balance(&self, client_id: Uuid) -> Result<BigDecimal, DomainError>;
}
