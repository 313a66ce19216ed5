use bigdecimal::{BigDecimal, Zero};
use diesel::pg::{Pg, PgConnection};
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::bill_number::{self, BillNumberLedger};
use crate::domain::billing::PaymentStatus;
use crate::domain::errors::DomainError;
use crate::domain::events::{Aggregate, ChangeEvent};
use crate::domain::invoice::{page_offset, Invoice, InvoiceContent, InvoiceFilter, ListResult};
use crate::domain::ports::InvoiceRepository;
use crate::schema::{invoice_items, invoices};

use super::models::{InvoiceItemRow, InvoiceRow, NewInvoiceItemRow, NewInvoiceRow};
use super::{duplicate_bill_number, outbox};

pub struct DieselInvoiceRepository {
    pool: DbPool,
}

impl DieselInvoiceRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Same classification as [`PaymentStatus::classify`], in SQL.
fn filtered(filter: &InvoiceFilter) -> invoices::BoxedQuery<'static, Pg> {
    let mut query = invoices::table.into_boxed();
    if let Some(client_id) = filter.client_id {
        query = query.filter(invoices::client_id.eq(client_id));
    }
    match filter.status {
        None => query,
        Some(PaymentStatus::Paid) => query.filter(invoices::paid_amount.ge(invoices::grand_total)),
        Some(PaymentStatus::Unpaid) => query
            .filter(invoices::paid_amount.lt(invoices::grand_total))
            .filter(invoices::paid_amount.eq(BigDecimal::zero())),
        Some(PaymentStatus::Partial) => query
            .filter(invoices::paid_amount.lt(invoices::grand_total))
            .filter(invoices::paid_amount.gt(BigDecimal::zero())),
    }
}

/// Items for each row, in row order, each group sorted by position.
fn load_items(
    conn: &mut PgConnection,
    rows: &[InvoiceRow],
) -> Result<Vec<Vec<InvoiceItemRow>>, DomainError> {
    let items: Vec<InvoiceItemRow> = InvoiceItemRow::belonging_to(rows)
        .select(InvoiceItemRow::as_select())
        .order(invoice_items::position.asc())
        .load(conn)?;
    Ok(items.grouped_by(rows))
}

/// Bill numbers as seen from one connection (and its open transaction).
struct PgBillNumbers<'a>(&'a mut PgConnection);

impl BillNumberLedger for PgBillNumbers<'_> {
    fn latest(&mut self) -> Result<Option<String>, DomainError> {
        Ok(invoices::table
            .select(invoices::bill_no)
            .order(invoices::created_at.desc())
            .first::<String>(self.0)
            .optional()?)
    }

    fn is_taken(&mut self, bill_no: &str) -> Result<bool, DomainError> {
        Ok(diesel::select(diesel::dsl::exists(
            invoices::table.filter(invoices::bill_no.eq(bill_no)),
        ))
        .get_result(self.0)?)
    }

    fn all(&mut self) -> Result<Vec<String>, DomainError> {
        Ok(invoices::table.select(invoices::bill_no).load::<String>(self.0)?)
    }
}

/// A unique violation on insert/update can only come from `bill_no`.
fn bill_no_conflict(bill_no: &str) -> impl FnOnce(DieselError) -> DomainError + '_ {
    move |e| match e {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            duplicate_bill_number(bill_no)
        }
        other => other.into(),
    }
}

fn replace_items(
    conn: &mut PgConnection,
    invoice_id: Uuid,
    content: &InvoiceContent,
) -> Result<(), DomainError> {
    diesel::delete(invoice_items::table.filter(invoice_items::invoice_id.eq(invoice_id)))
        .execute(conn)?;
    diesel::insert_into(invoice_items::table)
        .values(&NewInvoiceItemRow::from_items(invoice_id, &content.items))
        .execute(conn)?;
    Ok(())
}

impl InvoiceRepository for DieselInvoiceRepository {
    fn create(&self, bill_no: Option<String>, content: InvoiceContent) -> Result<Invoice, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            // 1. Pick the bill number inside the transaction; the unique
            //    constraint rejects a concurrent duplicate.
            let bill_no = match bill_no {
                Some(b) => b,
                None => bill_number::next_bill_number(&mut PgBillNumbers(conn))?,
            };

            // 2. Insert the invoice and its items
            let invoice_id = Uuid::new_v4();
            let row: InvoiceRow = diesel::insert_into(invoices::table)
                .values(&NewInvoiceRow {
                    id: invoice_id,
                    bill_no: bill_no.clone(),
                    client_id: content.client_id,
                    grand_total: content.grand_total.clone(),
                    paid_amount: content.paid_amount.clone(),
                    remaining_balance: content.remaining_balance.clone(),
                })
                .returning(InvoiceRow::as_returning())
                .get_result(conn)
                .map_err(bill_no_conflict(&bill_no))?;
            diesel::insert_into(invoice_items::table)
                .values(&NewInvoiceItemRow::from_items(invoice_id, &content.items))
                .execute(conn)?;

            // 3. Outbox event in the same transaction
            let invoice = row.with_items(content.items);
            outbox::record(
                conn,
                ChangeEvent::created(Aggregate::Invoice, invoice.id, &invoice)?,
            )?;
            Ok(invoice)
        })
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<Invoice>, DomainError> {
        let mut conn = self.pool.get()?;

        let row: Option<InvoiceRow> = invoices::table
            .find(id)
            .select(InvoiceRow::as_select())
            .first(&mut conn)
            .optional()?;

        let Some(row) = row else {
            return Ok(None);
        };

        let items: Vec<InvoiceItemRow> = invoice_items::table
            .filter(invoice_items::invoice_id.eq(row.id))
            .order(invoice_items::position.asc())
            .select(InvoiceItemRow::as_select())
            .load(&mut conn)?;

        Ok(Some(row.into_invoice(items)))
    }

    fn list(&self, filter: &InvoiceFilter, page: i64, limit: i64) -> Result<ListResult, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let total: i64 = filtered(filter).count().get_result(conn)?;
            let Some(offset) = page_offset(page, limit) else {
                return Ok(ListResult {
                    items: vec![],
                    total,
                });
            };

            let rows: Vec<InvoiceRow> = filtered(filter)
                .select(InvoiceRow::as_select())
                .order(invoices::created_at.desc())
                .limit(limit)
                .offset(offset)
                .load(conn)?;
            let items = load_items(conn, &rows)?;

            Ok(ListResult {
                items: rows
                    .into_iter()
                    .zip(items)
                    .map(|(row, items)| row.into_invoice(items))
                    .collect(),
                total,
            })
        })
    }

    fn update(&self, id: Uuid, bill_no: String, content: InvoiceContent) -> Result<Invoice, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let row: InvoiceRow = diesel::update(invoices::table.find(id))
                .set((
                    invoices::bill_no.eq(&bill_no),
                    invoices::client_id.eq(content.client_id),
                    invoices::grand_total.eq(&content.grand_total),
                    invoices::paid_amount.eq(&content.paid_amount),
                    invoices::remaining_balance.eq(&content.remaining_balance),
                    invoices::updated_at.eq(diesel::dsl::now),
                ))
                .returning(InvoiceRow::as_returning())
                .get_result(conn)
                .optional()
                .map_err(bill_no_conflict(&bill_no))?
                .ok_or(DomainError::NotFound("Invoice"))?;

            replace_items(conn, id, &content)?;

            let invoice = row.with_items(content.items);
            outbox::record(conn, ChangeEvent::updated(Aggregate::Invoice, id, &invoice)?)?;
            Ok(invoice)
        })
    }

    fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            // invoice_items go with it (ON DELETE CASCADE)
            let deleted = diesel::delete(invoices::table.find(id)).execute(conn)?;
            if deleted == 0 {
                return Err(DomainError::NotFound("Invoice"));
            }
            outbox::record(conn, ChangeEvent::deleted(Aggregate::Invoice, id))
        })
    }

    fn next_bill_number(&self) -> Result<String, DomainError> {
        let mut conn = self.pool.get()?;
        bill_number::next_bill_number(&mut PgBillNumbers(&mut conn))
    }

    fn receivable_balance(&self, client_id: Uuid) -> Result<BigDecimal, DomainError> {
        let mut conn = self.pool.get()?;

        let sum: Option<BigDecimal> = invoices::table
            .filter(invoices::client_id.eq(client_id))
            .filter(invoices::remaining_balance.gt(BigDecimal::zero()))
            .select(diesel::dsl::sum(invoices::remaining_balance))
            .get_result(&mut conn)?;
        Ok(sum.unwrap_or_else(BigDecimal::zero))
    }
}
