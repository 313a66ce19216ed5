use std::sync::Arc;

use bigdecimal::BigDecimal;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::invoice::{
    Invoice, InvoiceContent, InvoiceFilter, InvoiceInput, InvoiceItem, LineItemInput, ListResult,
};
use crate::domain::optional;
use crate::domain::ports::{ClientRepository, InvoiceRepository, ProductRepository};
use crate::domain::UpdateOutcome;

use super::rejected;

#[derive(Clone)]
pub struct InvoiceService {
    invoices: Arc<dyn InvoiceRepository>,
    clients: Arc<dyn ClientRepository>,
    products: Arc<dyn ProductRepository>,
}

impl InvoiceService {
    pub fn new(
        invoices: Arc<dyn InvoiceRepository>,
        clients: Arc<dyn ClientRepository>,
        products: Arc<dyn ProductRepository>,
    ) -> Self {
        Self {
            invoices,
            clients,
            products,
        }
    }

    pub fn create_invoice(&self, input: InvoiceInput) -> Result<Invoice, DomainError> {
        self.ensure_client(input.client_id)?;
        let bill_no = input
            .requested_bill_no()
            .map_err(|e| rejected("invoice", e))?;
        let content = self.compute_content(&input, &[])?;
        let invoice = self.invoices.create(bill_no, content)?;
        log::info!(
            "created invoice {} ({}) for client {}: total {}, paid {}",
            invoice.id,
            invoice.bill_no,
            invoice.client_id,
            invoice.grand_total,
            invoice.paid_amount
        );
        Ok(invoice)
    }

    pub fn get_invoice(&self, id: Uuid) -> Result<Invoice, DomainError> {
        self.invoices
            .find_by_id(id)?
            .ok_or(DomainError::NotFound("Invoice"))
    }

    pub fn list_invoices(
        &self,
        filter: &InvoiceFilter,
        page: i64,
        limit: i64,
    ) -> Result<ListResult, DomainError> {
        self.invoices.list(filter, page, limit)
    }

    /// Full replacement. Totals are recomputed, and nothing is written when
    /// the result equals the stored invoice. A line that names the same
    /// product as the stored line at its position keeps that line's name,
    /// design number and price unless the request overrides them.
    pub fn update_invoice(
        &self,
        id: Uuid,
        input: InvoiceInput,
    ) -> Result<UpdateOutcome<Invoice>, DomainError> {
        let existing = self.get_invoice(id)?;
        if input.client_id != existing.client_id {
            self.ensure_client(input.client_id)?;
        }
        let bill_no = input
            .requested_bill_no()
            .map_err(|e| rejected("invoice", e))?
            .unwrap_or_else(|| existing.bill_no.clone());
        let content = self.compute_content(&input, &existing.items)?;

        if existing.bill_no == bill_no && existing.content() == content {
            log::debug!("invoice {id} unchanged, skipping write");
            return Ok(UpdateOutcome::Unchanged(existing));
        }

        let invoice = self.invoices.update(id, bill_no, content)?;
        log::info!(
            "updated invoice {} ({}): total {}, remaining {}",
            invoice.id,
            invoice.bill_no,
            invoice.grand_total,
            invoice.remaining_balance
        );
        Ok(UpdateOutcome::Modified(invoice))
    }

    pub fn delete_invoice(&self, id: Uuid) -> Result<(), DomainError> {
        self.invoices.delete(id)?;
        log::info!("deleted invoice {id}");
        Ok(())
    }

    /// Preview of the number the next generated invoice will get. Another
    /// request may claim it first.
    pub fn next_bill_number(&self) -> Result<String, DomainError> {
        self.invoices.next_bill_number()
    }

    pub fn receivable_balance(&self, client_id: Uuid) -> Result<BigDecimal, DomainError> {
        if self.clients.find_by_id(client_id)?.is_none() {
            return Err(DomainError::NotFound("Client"));
        }
        self.invoices.receivable_balance(client_id)
    }

    fn ensure_client(&self, client_id: Uuid) -> Result<(), DomainError> {
        match self.clients.find_by_id(client_id)? {
            Some(_) => Ok(()),
            None => Err(rejected(
                "invoice",
                DomainError::invalid(format!("Client {client_id} does not exist.")),
            )),
        }
    }

    fn compute_content(
        &self,
        input: &InvoiceInput,
        stored: &[InvoiceItem],
    ) -> Result<InvoiceContent, DomainError> {
        let items = input
            .items
            .iter()
            .enumerate()
            .map(|(pos, line)| match stored.get(pos) {
                Some(previous) => self.resolve_line(&line.with_snapshot(previous)),
                None => self.resolve_line(line),
            })
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| rejected("invoice", e))?;
        InvoiceContent::compute(input.client_id, items, input.paid_amount.clone())
            .map_err(|e| rejected("invoice", e))
    }

    /// A line that already carries its own name and price survives deletion
    /// of the product it references.
    fn resolve_line(&self, line: &LineItemInput) -> Result<InvoiceItem, DomainError> {
        let Some(product_id) = line.product_id else {
            return line.resolve(None);
        };

        let product = self.products.find_by_id(product_id)?;
        let self_contained =
            optional(line.product_name.as_deref()).is_some() && line.price.is_some();
        if product.is_none() && !self_contained {
            return Err(DomainError::invalid(format!(
                "Product {product_id} does not exist."
            )));
        }
        line.resolve(product.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;
    use crate::domain::billing::PaymentStatus;
    use crate::domain::client::ClientInput;
    use crate::domain::product::ProductInput;
    use crate::infrastructure::in_memory::InMemoryStore;
    use crate::application::{ClientService, ProductService};

    struct Fixture {
        store: InMemoryStore,
        invoices: InvoiceService,
        clients: ClientService,
        products: ProductService,
    }

    fn fixture() -> Fixture {
        let store = InMemoryStore::new();
        let shared = Arc::new(store.clone());
        Fixture {
            store,
            invoices: InvoiceService::new(shared.clone(), shared.clone(), shared.clone()),
            clients: ClientService::new(shared.clone()),
            products: ProductService::new(shared),
        }
    }

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).expect("valid decimal")
    }

    fn client(f: &Fixture) -> Uuid {
        f.clients
            .create_client(ClientInput {
                name: "Lakshmi Stores".into(),
                phone: "555-0199".into(),
                location: Some("Jaipur".into()),
            })
            .unwrap()
            .id
    }

    fn line(name: &str, qty: i32, price: &str) -> LineItemInput {
        LineItemInput {
            product_name: Some(name.into()),
            size: Some("M".into()),
            quantity: qty,
            price: Some(dec(price)),
            ..Default::default()
        }
    }

    fn input(client_id: Uuid, items: Vec<LineItemInput>, paid: &str) -> InvoiceInput {
        InvoiceInput {
            bill_no: None,
            client_id,
            items,
            paid_amount: dec(paid),
        }
    }

    #[test]
    fn create_numbers_bills_sequentially() {
        let f = fixture();
        let c = client(&f);

        let first = f
            .invoices
            .create_invoice(input(c, vec![line("Kurta", 1, "100")], "0"))
            .unwrap();
        let second = f
            .invoices
            .create_invoice(input(c, vec![line("Kurta", 1, "100")], "0"))
            .unwrap();

        assert_eq!(first.bill_no, "BILL-001");
        assert_eq!(second.bill_no, "BILL-002");
        assert_eq!(f.invoices.next_bill_number().unwrap(), "BILL-003");
    }

    #[test]
    fn create_keeps_caller_supplied_bill_number() {
        let f = fixture();
        let c = client(&f);
        let mut req = input(c, vec![line("Kurta", 1, "100")], "0");
        req.bill_no = Some(" INV-1718000000000 ".into());

        let invoice = f.invoices.create_invoice(req).unwrap();
        assert_eq!(invoice.bill_no, "INV-1718000000000");
    }

    #[test]
    fn duplicate_bill_number_is_a_conflict() {
        let f = fixture();
        let c = client(&f);
        let mut req = input(c, vec![line("Kurta", 1, "100")], "0");
        req.bill_no = Some("BILL-050".into());
        f.invoices.create_invoice(req.clone()).unwrap();

        assert!(matches!(
            f.invoices.create_invoice(req),
            Err(DomainError::Conflict(_))
        ));
    }

    #[test]
    fn generated_number_skips_past_a_taken_candidate() {
        let f = fixture();
        let c = client(&f);
        for _ in 0..10 {
            f.invoices
                .create_invoice(input(c, vec![line("Kurta", 1, "100")], "0"))
                .unwrap();
        }
        let mut manual = input(c, vec![line("Kurta", 1, "100")], "0");
        manual.bill_no = Some("INV-5".into());
        f.invoices.create_invoice(manual).unwrap();

        assert_eq!(f.invoices.next_bill_number().unwrap(), "BILL-011");
        let next = f
            .invoices
            .create_invoice(input(c, vec![line("Kurta", 1, "100")], "0"))
            .unwrap();
        assert_eq!(next.bill_no, "BILL-011");
        let after = f
            .invoices
            .create_invoice(input(c, vec![line("Kurta", 1, "100")], "0"))
            .unwrap();
        assert_eq!(after.bill_no, "BILL-012");
    }

    #[test]
    fn overlong_bill_number_is_invalid_input() {
        let f = fixture();
        let c = client(&f);
        let mut req = input(c, vec![line("Kurta", 1, "100")], "0");
        req.bill_no = Some("B".repeat(51));

        assert!(matches!(
            f.invoices.create_invoice(req),
            Err(DomainError::InvalidInput(_))
        ));
    }

    #[test]
    fn create_computes_totals_and_status() {
        let f = fixture();
        let c = client(&f);

        let invoice = f
            .invoices
            .create_invoice(input(
                c,
                vec![line("Kurta", 2, "450"), line("Dupatta", 1, "100")],
                "400",
            ))
            .unwrap();

        assert_eq!(invoice.grand_total, dec("1000"));
        assert_eq!(invoice.remaining_balance, dec("600"));
        assert_eq!(invoice.status(), PaymentStatus::Partial);
    }

    #[test]
    fn create_rejects_overpayment() {
        let f = fixture();
        let c = client(&f);

        let err = f
            .invoices
            .create_invoice(input(c, vec![line("Kurta", 1, "100")], "150"))
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));
        assert!(f.store.events().unwrap().iter().all(|e| e.event_type != "InvoiceCreated"));
    }

    #[test]
    fn create_rejects_unknown_client() {
        let f = fixture();
        let err = f
            .invoices
            .create_invoice(input(Uuid::new_v4(), vec![line("Kurta", 1, "100")], "0"))
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));
    }

    #[test]
    fn items_snapshot_the_product_at_invoicing_time() {
        let f = fixture();
        let c = client(&f);
        let product = f
            .products
            .create_product(ProductInput {
                name: "Lehenga".into(),
                design_number: "LH-3".into(),
                price: dec("2500"),
                sizes: vec![],
            })
            .unwrap();

        let invoice = f
            .invoices
            .create_invoice(input(
                c,
                vec![LineItemInput {
                    product_id: Some(product.id),
                    quantity: 2,
                    ..Default::default()
                }],
                "0",
            ))
            .unwrap();

        f.products
            .update_product(
                product.id,
                ProductInput {
                    name: "Lehenga".into(),
                    design_number: "LH-3".into(),
                    price: dec("3000"),
                    sizes: vec![],
                },
            )
            .unwrap();

        let stored = f.invoices.get_invoice(invoice.id).unwrap();
        assert_eq!(stored.items[0].product_name, "Lehenga");
        assert_eq!(stored.items[0].price, dec("2500"));
        assert_eq!(stored.grand_total, dec("5000"));
    }

    #[test]
    fn unknown_product_without_own_data_is_rejected() {
        let f = fixture();
        let c = client(&f);
        let err = f
            .invoices
            .create_invoice(input(
                c,
                vec![LineItemInput {
                    product_id: Some(Uuid::new_v4()),
                    quantity: 1,
                    ..Default::default()
                }],
                "0",
            ))
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));
    }

    #[test]
    fn resubmitting_unchanged_invoice_is_not_a_modification() {
        let f = fixture();
        let c = client(&f);
        let req = input(c, vec![line("Kurta", 2, "450")], "100");
        let invoice = f.invoices.create_invoice(req.clone()).unwrap();
        let events_before = f.store.events().unwrap().len();

        let outcome = f.invoices.update_invoice(invoice.id, req).unwrap();

        assert!(!outcome.is_modified());
        assert_eq!(f.store.events().unwrap().len(), events_before);
    }

    #[test]
    fn resubmitting_a_catalog_line_keeps_its_billed_price() {
        let f = fixture();
        let c = client(&f);
        let kurta = ProductInput {
            name: "Kurta".into(),
            design_number: "K-12".into(),
            price: dec("450"),
            sizes: vec![],
        };
        let product = f.products.create_product(kurta.clone()).unwrap();
        let req = input(
            c,
            vec![LineItemInput {
                product_id: Some(product.id),
                quantity: 2,
                ..Default::default()
            }],
            "0",
        );
        let invoice = f.invoices.create_invoice(req.clone()).unwrap();

        f.products
            .update_product(
                product.id,
                ProductInput {
                    price: dec("500"),
                    ..kurta
                },
            )
            .unwrap();

        let outcome = f.invoices.update_invoice(invoice.id, req.clone()).unwrap();
        assert!(!outcome.is_modified());
        assert_eq!(outcome.into_inner().items[0].price, dec("450"));

        let mut more = req;
        more.items[0].quantity = 3;
        let updated = f
            .invoices
            .update_invoice(invoice.id, more)
            .unwrap()
            .into_inner();
        assert_eq!(updated.items[0].price, dec("450"));
        assert_eq!(updated.grand_total, dec("1350"));
    }

    #[test]
    fn changing_a_nested_item_field_is_a_modification() {
        let f = fixture();
        let c = client(&f);
        let invoice = f
            .invoices
            .create_invoice(input(c, vec![line("Kurta", 2, "450")], "100"))
            .unwrap();

        let mut changed = line("Kurta", 2, "450");
        changed.size = Some("L".into());
        let outcome = f
            .invoices
            .update_invoice(invoice.id, input(c, vec![changed], "100"))
            .unwrap();

        assert!(outcome.is_modified());
        let updated = outcome.into_inner();
        assert_eq!(updated.items[0].size, "L");
        assert_eq!(updated.bill_no, invoice.bill_no);
    }

    #[test]
    fn update_recomputes_totals() {
        let f = fixture();
        let c = client(&f);
        let invoice = f
            .invoices
            .create_invoice(input(c, vec![line("Kurta", 1, "100")], "0"))
            .unwrap();

        let updated = f
            .invoices
            .update_invoice(
                invoice.id,
                input(c, vec![line("Kurta", 1, "100"), line("Stole", 2, "50")], "200"),
            )
            .unwrap()
            .into_inner();

        assert_eq!(updated.grand_total, dec("200"));
        assert_eq!(updated.remaining_balance, dec("0"));
        assert_eq!(updated.status(), PaymentStatus::Paid);
    }

    #[test]
    fn update_rejects_paid_above_total() {
        let f = fixture();
        let c = client(&f);
        let invoice = f
            .invoices
            .create_invoice(input(c, vec![line("Kurta", 1, "100")], "0"))
            .unwrap();

        assert!(matches!(
            f.invoices
                .update_invoice(invoice.id, input(c, vec![line("Kurta", 1, "100")], "100.5")),
            Err(DomainError::InvalidInput(_))
        ));
    }

    #[test]
    fn list_filters_by_status() {
        let f = fixture();
        let c = client(&f);
        for paid in ["0", "40", "100"] {
            f.invoices
                .create_invoice(input(c, vec![line("Kurta", 1, "100")], paid))
                .unwrap();
        }

        let partial = f
            .invoices
            .list_invoices(
                &InvoiceFilter {
                    client_id: None,
                    status: Some(PaymentStatus::Partial),
                },
                1,
                20,
            )
            .unwrap();
        assert_eq!(partial.total, 1);
        assert_eq!(partial.items[0].paid_amount, dec("40"));

        let all = f
            .invoices
            .list_invoices(&InvoiceFilter::default(), 1, 2)
            .unwrap();
        assert_eq!(all.total, 3);
        assert_eq!(all.items.len(), 2);
        assert_eq!(all.items[0].bill_no, "BILL-003", "newest first");
    }

    #[test]
    fn receivable_sums_open_balances() {
        let f = fixture();
        let c = client(&f);
        let other = client(&f);
        for (who, paid) in [(c, "0"), (c, "60"), (c, "100"), (other, "0")] {
            f.invoices
                .create_invoice(input(who, vec![line("Kurta", 1, "100")], paid))
                .unwrap();
        }

        assert_eq!(f.invoices.receivable_balance(c).unwrap(), dec("140"));
        assert!(matches!(
            f.invoices.receivable_balance(Uuid::new_v4()),
            Err(DomainError::NotFound("Client"))
        ));
    }

    #[test]
    fn client_with_invoices_cannot_be_deleted() {
        let f = fixture();
        let c = client(&f);
        let invoice = f
            .invoices
            .create_invoice(input(c, vec![line("Kurta", 1, "100")], "0"))
            .unwrap();

        assert!(matches!(
            f.clients.delete_client(c),
            Err(DomainError::Conflict(_))
        ));

        f.invoices.delete_invoice(invoice.id).unwrap();
        f.clients.delete_client(c).unwrap();
    }
}
