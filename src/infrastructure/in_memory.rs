//! Process-local repositories for tests and local experiments.
//!
//! One [`InMemoryStore`] backs all three ports so that cross-aggregate rules
//! (bill number uniqueness, clients referenced by invoices) behave the same
//! as on PostgreSQL.

use std::sync::{Arc, Mutex, MutexGuard};

use bigdecimal::{BigDecimal, Zero};
use chrono::Utc;
use uuid::Uuid;

use crate::domain::bill_number::{self, BillNumberLedger};
use crate::domain::client::{Client, ClientDetails};
use crate::domain::errors::DomainError;
use crate::domain::events::{Aggregate, ChangeEvent};
use crate::domain::invoice::{page_offset, Invoice, InvoiceContent, InvoiceFilter, ListResult};
use crate::domain::ports::{ClientRepository, InvoiceRepository, ProductRepository};
use crate::domain::product::{Product, ProductDetails};

use super::{client_in_use, duplicate_bill_number};

#[derive(Default)]
struct State {
    clients: Vec<Client>,
    products: Vec<Product>,
    /// Creation order.
    invoices: Vec<Invoice>,
    events: Vec<ChangeEvent>,
}

impl BillNumberLedger for State {
    fn latest(&mut self) -> Result<Option<String>, DomainError> {
        Ok(self.invoices.last().map(|i| i.bill_no.clone()))
    }

    fn is_taken(&mut self, bill_no: &str) -> Result<bool, DomainError> {
        Ok(self.invoices.iter().any(|i| i.bill_no == bill_no))
    }

    fn all(&mut self) -> Result<Vec<String>, DomainError> {
        Ok(self.invoices.iter().map(|i| i.bill_no.clone()).collect())
    }
}

#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<State>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Change events recorded so far, oldest first.
    pub fn events(&self) -> Result<Vec<ChangeEvent>, DomainError> {
        Ok(self.lock()?.events.clone())
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, DomainError> {
        self.state
            .lock()
            .map_err(|e| DomainError::Internal(format!("in-memory store poisoned: {e}")))
    }
}

impl ClientRepository for InMemoryStore {
    fn create(&self, details: ClientDetails) -> Result<Client, DomainError> {
        let mut state = self.lock()?;
        let now = Utc::now();
        let client = Client {
            id: Uuid::new_v4(),
            name: details.name,
            phone: details.phone,
            location: details.location,
            created_at: now,
            updated_at: now,
        };
        state
            .events
            .push(ChangeEvent::created(Aggregate::Client, client.id, &client)?);
        state.clients.push(client.clone());
        Ok(client)
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<Client>, DomainError> {
        Ok(self.lock()?.clients.iter().find(|c| c.id == id).cloned())
    }

    fn list(&self) -> Result<Vec<Client>, DomainError> {
        Ok(self.lock()?.clients.clone())
    }

    fn update(&self, id: Uuid, details: ClientDetails) -> Result<Client, DomainError> {
        let mut state = self.lock()?;
        let client = state
            .clients
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(DomainError::NotFound("Client"))?;
        client.name = details.name;
        client.phone = details.phone;
        client.location = details.location;
        client.updated_at = Utc::now();
        let client = client.clone();
        state
            .events
            .push(ChangeEvent::updated(Aggregate::Client, id, &client)?);
        Ok(client)
    }

    fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        let mut state = self.lock()?;
        let pos = state
            .clients
            .iter()
            .position(|c| c.id == id)
            .ok_or(DomainError::NotFound("Client"))?;
        if state.invoices.iter().any(|i| i.client_id == id) {
            return Err(client_in_use());
        }
        state.clients.remove(pos);
        state.events.push(ChangeEvent::deleted(Aggregate::Client, id));
        Ok(())
    }
}

impl ProductRepository for InMemoryStore {
    fn create(&self, details: ProductDetails) -> Result<Product, DomainError> {
        let mut state = self.lock()?;
        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4(),
            name: details.name,
            design_number: details.design_number,
            price: details.price,
            sizes: details.sizes,
            created_at: now,
            updated_at: now,
        };
        state
            .events
            .push(ChangeEvent::created(Aggregate::Product, product.id, &product)?);
        state.products.push(product.clone());
        Ok(product)
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, DomainError> {
        Ok(self.lock()?.products.iter().find(|p| p.id == id).cloned())
    }

    fn list(&self) -> Result<Vec<Product>, DomainError> {
        Ok(self.lock()?.products.clone())
    }

    fn update(&self, id: Uuid, details: ProductDetails) -> Result<Product, DomainError> {
        let mut state = self.lock()?;
        let product = state
            .products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(DomainError::NotFound("Product"))?;
        product.name = details.name;
        product.design_number = details.design_number;
        product.price = details.price;
        product.sizes = details.sizes;
        product.updated_at = Utc::now();
        let product = product.clone();
        state
            .events
            .push(ChangeEvent::updated(Aggregate::Product, id, &product)?);
        Ok(product)
    }

    fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        let mut state = self.lock()?;
        let pos = state
            .products
            .iter()
            .position(|p| p.id == id)
            .ok_or(DomainError::NotFound("Product"))?;
        state.products.remove(pos);
        state
            .events
            .push(ChangeEvent::deleted(Aggregate::Product, id));
        Ok(())
    }
}

impl InvoiceRepository for InMemoryStore {
    fn create(&self, bill_no: Option<String>, content: InvoiceContent) -> Result<Invoice, DomainError> {
        let mut state = self.lock()?;
        let bill_no = match bill_no {
            Some(b) => b,
            None => bill_number::next_bill_number(&mut *state)?,
        };
        if state.invoices.iter().any(|i| i.bill_no == bill_no) {
            return Err(duplicate_bill_number(&bill_no));
        }

        let now = Utc::now();
        let invoice = Invoice {
            id: Uuid::new_v4(),
            bill_no,
            client_id: content.client_id,
            items: content.items,
            grand_total: content.grand_total,
            paid_amount: content.paid_amount,
            remaining_balance: content.remaining_balance,
            created_at: now,
            updated_at: now,
        };
        state
            .events
            .push(ChangeEvent::created(Aggregate::Invoice, invoice.id, &invoice)?);
        state.invoices.push(invoice.clone());
        Ok(invoice)
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<Invoice>, DomainError> {
        Ok(self.lock()?.invoices.iter().find(|i| i.id == id).cloned())
    }

    fn list(&self, filter: &InvoiceFilter, page: i64, limit: i64) -> Result<ListResult, DomainError> {
        let state = self.lock()?;
        let matching: Vec<&Invoice> = state
            .invoices
            .iter()
            .rev()
            .filter(|i| filter.matches(i))
            .collect();
        let offset = page_offset(page, limit)
            .and_then(|o| usize::try_from(o).ok())
            .unwrap_or(usize::MAX);
        let limit = usize::try_from(limit).unwrap_or(0);

        Ok(ListResult {
            total: matching.len() as i64,
            items: matching
                .into_iter()
                .skip(offset)
                .take(limit)
                .cloned()
                .collect(),
        })
    }

    fn update(&self, id: Uuid, bill_no: String, content: InvoiceContent) -> Result<Invoice, DomainError> {
        let mut state = self.lock()?;
        if state.invoices.iter().any(|i| i.id != id && i.bill_no == bill_no) {
            return Err(duplicate_bill_number(&bill_no));
        }
        let invoice = state
            .invoices
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or(DomainError::NotFound("Invoice"))?;
        invoice.bill_no = bill_no;
        invoice.client_id = content.client_id;
        invoice.items = content.items;
        invoice.grand_total = content.grand_total;
        invoice.paid_amount = content.paid_amount;
        invoice.remaining_balance = content.remaining_balance;
        invoice.updated_at = Utc::now();
        let invoice = invoice.clone();
        state
            .events
            .push(ChangeEvent::updated(Aggregate::Invoice, id, &invoice)?);
        Ok(invoice)
    }

    fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        let mut state = self.lock()?;
        let pos = state
            .invoices
            .iter()
            .position(|i| i.id == id)
            .ok_or(DomainError::NotFound("Invoice"))?;
        state.invoices.remove(pos);
        state
            .events
            .push(ChangeEvent::deleted(Aggregate::Invoice, id));
        Ok(())
    }

    fn next_bill_number(&self) -> Result<String, DomainError> {
        bill_number::next_bill_number(&mut *self.lock()?)
    }

    fn receivable_balance(&self, client_id: Uuid) -> Result<BigDecimal, DomainError> {
        let zero = BigDecimal::zero();
        Ok(self
            .lock()?
            .invoices
            .iter()
            .filter(|i| i.client_id == client_id && i.remaining_balance > zero)
            .fold(BigDecimal::zero(), |acc, i| acc + &i.remaining_balance))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deleting_unknown_records_is_not_found() {
        let store = InMemoryStore::new();
        assert!(matches!(
            ClientRepository::delete(&store, Uuid::new_v4()),
            Err(DomainError::NotFound("Client"))
        ));
        assert!(matches!(
            ProductRepository::delete(&store, Uuid::new_v4()),
            Err(DomainError::NotFound("Product"))
        ));
        assert!(matches!(
            InvoiceRepository::delete(&store, Uuid::new_v4()),
            Err(DomainError::NotFound("Invoice"))
        ));
        assert!(store.events().unwrap().is_empty());
    }

    #[test]
    fn poisoned_store_reports_internal_errors() {
        let store = InMemoryStore::new();
        let holder = store.clone();
        let _ = std::thread::spawn(move || {
            let _guard = holder.state.lock().unwrap();
            panic!("writer died holding the lock");
        })
        .join();

        assert!(matches!(store.events(), Err(DomainError::Internal(_))));
        assert!(matches!(
            ClientRepository::list(&store),
            Err(DomainError::Internal(_))
        ));
    }

    #[test]
    fn huge_page_number_is_empty_not_a_panic() {
        let store = InMemoryStore::new();
        let page = InvoiceRepository::list(&store, &InvoiceFilter::default(), i64::MAX, 20).unwrap();
        assert!(page.items.is_empty());
    }

    #[test]
    fn paging_past_the_end_is_empty() {
        let store = InMemoryStore::new();
        let page = InvoiceRepository::list(&store, &InvoiceFilter::default(), 5, 20).unwrap();
        assert_eq!(page.total, 0);
        assert!(page.items.is_empty());
    }
}
