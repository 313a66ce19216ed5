use std::str::FromStr;

use actix_web::{web, HttpResponse};
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::domain::billing::PaymentStatus;
use crate::domain::invoice::{Invoice, InvoiceFilter, InvoiceInput, InvoiceItem, LineItemInput};
use crate::errors::AppError;
use crate::state::AppState;

use super::{blocking, parse_money};

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct InvoiceItemRequest {
    /// Catalog product; blank name, design number and price are taken from it.
    /// On update, a line naming the same product as the stored line at its
    /// position takes them from that stored line instead.
    #[serde(default)]
    pub product_id: Option<Uuid>,
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub design_number: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
    pub quantity: i32,
    /// Decimal unit price as a string, e.g. "450.00"
    #[serde(default)]
    pub price: Option<String>,
}

impl InvoiceItemRequest {
    fn into_input(self) -> Result<LineItemInput, AppError> {
        let price = match self.price.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(p) => Some(parse_money("price", p)?),
        };
        Ok(LineItemInput {
            product_id: self.product_id,
            product_name: self.product_name,
            design_number: self.design_number,
            size: self.size,
            quantity: self.quantity,
            price,
        })
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct InvoiceRequest {
    /// Generated when omitted on create; kept as-is when omitted on update.
    #[serde(default)]
    pub bill_no: Option<String>,
    pub client_id: Uuid,
    pub items: Vec<InvoiceItemRequest>,
    /// Decimal amount as a string. Defaults to "0".
    #[serde(default)]
    pub paid_amount: Option<String>,
}

impl InvoiceRequest {
    fn into_input(self) -> Result<InvoiceInput, AppError> {
        let paid_amount = match self.paid_amount.as_deref().map(str::trim) {
            None | Some("") => BigDecimal::from(0),
            Some(p) => parse_money("paid_amount", p)?,
        };
        let items = self
            .items
            .into_iter()
            .map(InvoiceItemRequest::into_input)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(InvoiceInput {
            bill_no: self.bill_no,
            client_id: self.client_id,
            items,
            paid_amount,
        })
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct InvoiceItemResponse {
    pub product_id: Option<Uuid>,
    pub product_name: String,
    pub design_number: String,
    pub size: String,
    pub quantity: i32,
    pub price: String,
    pub total: String,
}

impl From<InvoiceItem> for InvoiceItemResponse {
    fn from(i: InvoiceItem) -> Self {
        InvoiceItemResponse {
            product_id: i.product_id,
            product_name: i.product_name,
            design_number: i.design_number,
            size: i.size,
            quantity: i.quantity,
            price: i.price.to_string(),
            total: i.total.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct InvoiceResponse {
    pub id: Uuid,
    pub bill_no: String,
    pub client_id: Uuid,
    pub items: Vec<InvoiceItemResponse>,
    pub grand_total: String,
    pub paid_amount: String,
    pub remaining_balance: String,
    /// One of `paid`, `unpaid`, `partial`.
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Invoice> for InvoiceResponse {
    fn from(inv: Invoice) -> Self {
        let status = inv.status().to_string();
        InvoiceResponse {
            id: inv.id,
            bill_no: inv.bill_no,
            client_id: inv.client_id,
            items: inv.items.into_iter().map(InvoiceItemResponse::from).collect(),
            grand_total: inv.grand_total.to_string(),
            paid_amount: inv.paid_amount.to_string(),
            remaining_balance: inv.remaining_balance.to_string(),
            status,
            created_at: inv.created_at.to_rfc3339(),
            updated_at: inv.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct InvoiceUpdateResponse {
    pub modified: bool,
    pub invoice: InvoiceResponse,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct NextBillNumberResponse {
    pub bill_no: String,
}

// ── Pagination ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListInvoicesParams {
    /// Page number (1-based). Defaults to 1.
    #[serde(default = "default_page")]
    pub page: i64,
    /// Number of items per page. Defaults to 20, maximum 100.
    #[serde(default = "default_limit")]
    pub limit: i64,
    /// `paid`, `unpaid` or `partial`.
    pub status: Option<String>,
    pub client_id: Option<Uuid>,
}

fn default_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    20
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ListInvoicesResponse {
    pub items: Vec<InvoiceResponse>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /invoices
///
/// Prices the items, checks the payment against the grand total and stores the
/// invoice with its lines. A bill number is generated when none is given.
#[utoipa::path(
    post,
    path = "/invoices",
    request_body = InvoiceRequest,
    responses(
        (status = 201, description = "Invoice created", body = InvoiceResponse),
        (status = 400, description = "No items, unnamed item, unknown client or overpayment"),
        (status = 409, description = "Bill number already in use"),
    ),
    tag = "invoices"
)]
pub async fn create_invoice(
    state: web::Data<AppState>,
    body: web::Json<InvoiceRequest>,
) -> Result<HttpResponse, AppError> {
    let service = state.invoices.clone();
    let input = body.into_inner().into_input()?;
    let invoice = blocking(move || service.create_invoice(input)).await?;
    Ok(HttpResponse::Created().json(InvoiceResponse::from(invoice)))
}

/// GET /invoices
///
/// Newest first. Filter by `status` and/or `client_id`; paginate with `page`
/// and `limit`.
#[utoipa::path(
    get,
    path = "/invoices",
    params(ListInvoicesParams),
    responses(
        (status = 200, description = "Paginated list of invoices", body = ListInvoicesResponse),
        (status = 400, description = "Unknown status"),
    ),
    tag = "invoices"
)]
pub async fn list_invoices(
    state: web::Data<AppState>,
    query: web::Query<ListInvoicesParams>,
) -> Result<HttpResponse, AppError> {
    let params = query.into_inner();
    let page = params.page.max(1);
    let limit = params.limit.clamp(1, 100);
    let status = params
        .status
        .as_deref()
        .map(PaymentStatus::from_str)
        .transpose()?;
    let filter = InvoiceFilter {
        client_id: params.client_id,
        status,
    };

    let service = state.invoices.clone();
    let result = blocking(move || service.list_invoices(&filter, page, limit)).await?;

    Ok(HttpResponse::Ok().json(ListInvoicesResponse {
        items: result.items.into_iter().map(InvoiceResponse::from).collect(),
        total: result.total,
        page,
        limit,
    }))
}

#[utoipa::path(
    get,
    path = "/invoices/next-bill-number",
    responses((status = 200, description = "Number the next generated invoice would get", body = NextBillNumberResponse)),
    tag = "invoices"
)]
pub async fn next_bill_number(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let service = state.invoices.clone();
    let bill_no = blocking(move || service.next_bill_number()).await?;
    Ok(HttpResponse::Ok().json(NextBillNumberResponse { bill_no }))
}

#[utoipa::path(
    get,
    path = "/invoices/{id}",
    params(("id" = Uuid, Path, description = "Invoice UUID")),
    responses(
        (status = 200, description = "Invoice found", body = InvoiceResponse),
        (status = 404, description = "Invoice not found"),
    ),
    tag = "invoices"
)]
pub async fn get_invoice(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let service = state.invoices.clone();
    let id = path.into_inner();
    let invoice = blocking(move || service.get_invoice(id)).await?;
    Ok(HttpResponse::Ok().json(InvoiceResponse::from(invoice)))
}

/// PUT /invoices/{id}
///
/// Full replacement. Reports `modified: false` and writes nothing when the
/// recomputed invoice equals the stored one.
#[utoipa::path(
    put,
    path = "/invoices/{id}",
    params(("id" = Uuid, Path, description = "Invoice UUID")),
    request_body = InvoiceRequest,
    responses(
        (status = 200, description = "Update applied or skipped as unchanged", body = InvoiceUpdateResponse),
        (status = 400, description = "Invalid invoice"),
        (status = 404, description = "Invoice not found"),
        (status = 409, description = "Bill number already in use"),
    ),
    tag = "invoices"
)]
pub async fn update_invoice(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<InvoiceRequest>,
) -> Result<HttpResponse, AppError> {
    let service = state.invoices.clone();
    let id = path.into_inner();
    let input = body.into_inner().into_input()?;
    let outcome = blocking(move || service.update_invoice(id, input)).await?;
    Ok(HttpResponse::Ok().json(InvoiceUpdateResponse {
        modified: outcome.is_modified(),
        invoice: outcome.into_inner().into(),
    }))
}

#[utoipa::path(
    delete,
    path = "/invoices/{id}",
    params(("id" = Uuid, Path, description = "Invoice UUID")),
    responses(
        (status = 204, description = "Invoice deleted"),
        (status = 404, description = "Invoice not found"),
    ),
    tag = "invoices"
)]
pub async fn delete_invoice(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let service = state.invoices.clone();
    let id = path.into_inner();
    blocking(move || service.delete_invoice(id)).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(json: serde_json::Value) -> InvoiceItemRequest {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn blank_item_price_means_catalog_price() {
        let input = item(serde_json::json!({ "quantity": 2, "price": "  " }))
            .into_input()
            .unwrap();
        assert!(input.price.is_none());
    }

    #[test]
    fn paid_amount_defaults_to_zero() {
        let req: InvoiceRequest = serde_json::from_value(serde_json::json!({
            "client_id": Uuid::new_v4(),
            "items": [{ "product_name": "Kurta", "quantity": 1, "price": "10" }]
        }))
        .unwrap();
        let input = req.into_input().unwrap();
        assert_eq!(input.paid_amount, BigDecimal::from(0));
        assert_eq!(input.items.len(), 1);
    }

    #[test]
    fn malformed_paid_amount_is_bad_request() {
        let req: InvoiceRequest = serde_json::from_value(serde_json::json!({
            "client_id": Uuid::new_v4(),
            "items": [],
            "paid_amount": "lots"
        }))
        .unwrap();
        assert!(matches!(req.into_input(), Err(AppError::BadRequest(_))));
    }
}
