use bigdecimal::{BigDecimal, Zero};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::billing::{self, PaymentStatus};
use super::errors::DomainError;
use super::{optional, within_limit};
use super::product::Product;

pub const ITEMS_REQUIRED: &str = "Invoice must have one item to proceed!";
pub const ITEM_NAME_REQUIRED: &str = "Please enter product name for all items!";

pub const BILL_NO_MAX_CHARS: usize = 50;
pub const ITEM_NAME_MAX_CHARS: usize = 255;
pub const ITEM_DESIGN_NUMBER_MAX_CHARS: usize = 100;
pub const ITEM_SIZE_MAX_CHARS: usize = 50;

/// One invoice line as submitted. Blank fields are filled from the referenced
/// product, if any.
#[derive(Debug, Clone, Default)]
pub struct LineItemInput {
    pub product_id: Option<Uuid>,
    pub product_name: Option<String>,
    pub design_number: Option<String>,
    pub size: Option<String>,
    pub quantity: i32,
    pub price: Option<BigDecimal>,
}

impl LineItemInput {
    /// Snapshot the line into an [`InvoiceItem`].
    ///
    /// `product` must be the catalog entry named by `product_id`; the caller
    /// is responsible for looking it up.
    pub fn resolve(&self, product: Option<&Product>) -> Result<InvoiceItem, DomainError> {
        if self.quantity <= 0 {
            return Err(DomainError::invalid(
                "Quantity must be a positive whole number.",
            ));
        }

        let product_name = optional(self.product_name.as_deref())
            .or_else(|| product.map(|p| p.name.clone()))
            .ok_or_else(|| DomainError::invalid(ITEM_NAME_REQUIRED))?;
        let design_number = optional(self.design_number.as_deref())
            .or_else(|| product.map(|p| p.design_number.clone()))
            .unwrap_or_default();
        let size = optional(self.size.as_deref()).unwrap_or_default();
        let price = self
            .price
            .clone()
            .or_else(|| product.map(|p| p.price.clone()))
            .ok_or_else(|| {
                DomainError::invalid(format!("Please enter a price for '{product_name}'."))
            })?;
        if price < BigDecimal::zero() {
            return Err(DomainError::invalid("Item price cannot be negative."));
        }
        within_limit(&product_name, ITEM_NAME_MAX_CHARS, "Product name")?;
        within_limit(&design_number, ITEM_DESIGN_NUMBER_MAX_CHARS, "Design number")?;
        within_limit(&size, ITEM_SIZE_MAX_CHARS, "Size")?;

        Ok(InvoiceItem {
            product_id: self.product_id,
            total: billing::item_total(self.quantity, &price),
            product_name,
            design_number,
            size,
            quantity: self.quantity,
            price,
        })
    }

    /// Fill blank catalog fields from an earlier snapshot of the same product,
    /// so resubmitting a line keeps the name and price it was billed at.
    pub fn with_snapshot(&self, stored: &InvoiceItem) -> LineItemInput {
        let mut line = self.clone();
        if self.product_id.is_none() || self.product_id != stored.product_id {
            return line;
        }
        if optional(line.product_name.as_deref()).is_none() {
            line.product_name = Some(stored.product_name.clone());
        }
        if optional(line.design_number.as_deref()).is_none() {
            line.design_number = Some(stored.design_number.clone());
        }
        if line.price.is_none() {
            line.price = Some(stored.price.clone());
        }
        line
    }
}

/// A priced invoice line. Product data is copied in at invoicing time so
/// later catalog edits leave history untouched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvoiceItem {
    pub product_id: Option<Uuid>,
    pub product_name: String,
    pub design_number: String,
    pub size: String,
    pub quantity: i32,
    pub price: BigDecimal,
    pub total: BigDecimal,
}

/// Everything an invoice stores apart from its identity and timestamps.
///
/// Only [`InvoiceContent::compute`] builds one, so the totals always match
/// the items and the payment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvoiceContent {
    pub client_id: Uuid,
    pub items: Vec<InvoiceItem>,
    pub grand_total: BigDecimal,
    pub paid_amount: BigDecimal,
    pub remaining_balance: BigDecimal,
}

impl InvoiceContent {
    pub fn compute(
        client_id: Uuid,
        items: Vec<InvoiceItem>,
        paid_amount: BigDecimal,
    ) -> Result<Self, DomainError> {
        if items.is_empty() {
            return Err(DomainError::invalid(ITEMS_REQUIRED));
        }
        let grand_total = billing::grand_total(items.iter().map(|i| &i.total));
        let remaining_balance = billing::remaining_balance(&grand_total, &paid_amount)?;

        Ok(Self {
            client_id,
            items,
            grand_total,
            paid_amount,
            remaining_balance,
        })
    }

    pub fn status(&self) -> PaymentStatus {
        PaymentStatus::classify(&self.grand_total, &self.paid_amount)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Invoice {
    pub id: Uuid,
    pub bill_no: String,
    pub client_id: Uuid,
    pub items: Vec<InvoiceItem>,
    pub grand_total: BigDecimal,
    pub paid_amount: BigDecimal,
    pub remaining_balance: BigDecimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Invoice {
    pub fn content(&self) -> InvoiceContent {
        InvoiceContent {
            client_id: self.client_id,
            items: self.items.clone(),
            grand_total: self.grand_total.clone(),
            paid_amount: self.paid_amount.clone(),
            remaining_balance: self.remaining_balance.clone(),
        }
    }

    pub fn status(&self) -> PaymentStatus {
        PaymentStatus::classify(&self.grand_total, &self.paid_amount)
    }
}

/// Create or full-replacement update request.
#[derive(Debug, Clone)]
pub struct InvoiceInput {
    /// Caller-chosen bill number; generated on create, kept on update when absent.
    pub bill_no: Option<String>,
    pub client_id: Uuid,
    pub items: Vec<LineItemInput>,
    pub paid_amount: BigDecimal,
}

impl InvoiceInput {
    /// Trimmed caller-chosen bill number; blank means none.
    pub fn requested_bill_no(&self) -> Result<Option<String>, DomainError> {
        let bill_no = optional(self.bill_no.as_deref());
        if let Some(b) = &bill_no {
            within_limit(b, BILL_NO_MAX_CHARS, "Bill number")?;
        }
        Ok(bill_no)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvoiceFilter {
    pub client_id: Option<Uuid>,
    pub status: Option<PaymentStatus>,
}

impl InvoiceFilter {
    pub fn matches(&self, invoice: &Invoice) -> bool {
        self.client_id.map_or(true, |id| invoice.client_id == id)
            && self.status.map_or(true, |s| invoice.status() == s)
    }
}

#[derive(Debug, Clone)]
pub struct ListResult {
    pub items: Vec<Invoice>,
    pub total: i64,
}

/// Rows to skip for a 1-based `page`. `None` when the offset does not fit in
/// an `i64`; such a page is always empty.
pub fn page_offset(page: i64, limit: i64) -> Option<i64> {
    page.max(1).checked_sub(1)?.checked_mul(limit.max(0))
}
