use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::domain::client::Client;
use crate::domain::invoice::{Invoice, InvoiceItem};
use crate::domain::product::Product;
use crate::schema::{billing_outbox, clients, invoice_items, invoices, products};

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = clients)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ClientRow {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ClientRow> for Client {
    fn from(r: ClientRow) -> Self {
        Client {
            id: r.id,
            name: r.name,
            phone: r.phone,
            location: r.location,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = clients)]
pub struct NewClientRow {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = products)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProductRow {
    pub id: Uuid,
    pub name: String,
    pub design_number: String,
    pub price: BigDecimal,
    pub sizes: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(r: ProductRow) -> Self {
        Product {
            id: r.id,
            name: r.name,
            design_number: r.design_number,
            price: r.price,
            sizes: r.sizes,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = products)]
pub struct NewProductRow {
    pub id: Uuid,
    pub name: String,
    pub design_number: String,
    pub price: BigDecimal,
    pub sizes: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = invoices)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct InvoiceRow {
    pub id: Uuid,
    pub bill_no: String,
    pub client_id: Uuid,
    pub grand_total: BigDecimal,
    pub paid_amount: BigDecimal,
    pub remaining_balance: BigDecimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl InvoiceRow {
    /// `items` must already be in `position` order.
    pub fn into_invoice(self, items: Vec<InvoiceItemRow>) -> Invoice {
        self.with_items(items.into_iter().map(InvoiceItem::from).collect())
    }

    pub fn with_items(self, items: Vec<InvoiceItem>) -> Invoice {
        Invoice {
            id: self.id,
            bill_no: self.bill_no,
            client_id: self.client_id,
            items,
            grand_total: self.grand_total,
            paid_amount: self.paid_amount,
            remaining_balance: self.remaining_balance,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = invoices)]
pub struct NewInvoiceRow {
    pub id: Uuid,
    pub bill_no: String,
    pub client_id: Uuid,
    pub grand_total: BigDecimal,
    pub paid_amount: BigDecimal,
    pub remaining_balance: BigDecimal,
}

#[derive(
    Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable, Associations,
)]
#[diesel(table_name = invoice_items)]
#[diesel(belongs_to(InvoiceRow, foreign_key = invoice_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct InvoiceItemRow {
    pub id: Uuid,
    pub invoice_id: Uuid,
    pub position: i32,
    pub product_id: Option<Uuid>,
    pub product_name: String,
    pub design_number: String,
    pub size: String,
    pub quantity: i32,
    pub price: BigDecimal,
    pub total: BigDecimal,
}

impl From<InvoiceItemRow> for InvoiceItem {
    fn from(r: InvoiceItemRow) -> Self {
        InvoiceItem {
            product_id: r.product_id,
            product_name: r.product_name,
            design_number: r.design_number,
            size: r.size,
            quantity: r.quantity,
            price: r.price,
            total: r.total,
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = invoice_items)]
pub struct NewInvoiceItemRow {
    pub id: Uuid,
    pub invoice_id: Uuid,
    pub position: i32,
    pub product_id: Option<Uuid>,
    pub product_name: String,
    pub design_number: String,
    pub size: String,
    pub quantity: i32,
    pub price: BigDecimal,
    pub total: BigDecimal,
}

impl NewInvoiceItemRow {
    pub fn from_items(invoice_id: Uuid, items: &[InvoiceItem]) -> Vec<Self> {
        items
            .iter()
            .zip(0..)
            .map(|(item, position)| NewInvoiceItemRow {
                id: Uuid::new_v4(),
                invoice_id,
                position,
                product_id: item.product_id,
                product_name: item.product_name.clone(),
                design_number: item.design_number.clone(),
                size: item.size.clone(),
                quantity: item.quantity,
                price: item.price.clone(),
                total: item.total.clone(),
            })
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = billing_outbox)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OutboxEventRow {
    pub id: Uuid,
    pub aggregate_type: String,
    pub aggregate_id: String,
    pub event_type: String,
    pub payload: Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = billing_outbox)]
pub struct NewOutboxEventRow {
    pub id: Uuid,
    pub aggregate_type: String,
    pub aggregate_id: String,
    pub event_type: String,
    pub payload: Value,
}
