use utoipa::OpenApi;

use crate::handlers::{clients, invoices, products};

#[derive(OpenApi)]
#[openapi(
    info(title = "Billing service", description = "Clients, products and invoices for a garment shop"),
    paths(
        clients::create_client,
        clients::list_clients,
        clients::get_client,
        clients::update_client,
        clients::delete_client,
        clients::receivable_balance,
        products::create_product,
        products::list_products,
        products::get_product,
        products::update_product,
        products::delete_product,
        invoices::create_invoice,
        invoices::list_invoices,
        invoices::next_bill_number,
        invoices::get_invoice,
        invoices::update_invoice,
        invoices::delete_invoice,
    ),
    components(schemas(
        clients::ClientRequest,
        clients::ClientResponse,
        clients::ClientUpdateResponse,
        clients::ReceivableResponse,
        products::ProductRequest,
        products::ProductResponse,
        products::ProductUpdateResponse,
        invoices::InvoiceItemRequest,
        invoices::InvoiceRequest,
        invoices::InvoiceItemResponse,
        invoices::InvoiceResponse,
        invoices::InvoiceUpdateResponse,
        invoices::ListInvoicesResponse,
        invoices::NextBillNumberResponse,
    )),
    tags(
        (name = "clients", description = "Customer records"),
        (name = "products", description = "Catalog"),
        (name = "invoices", description = "Bills, payments and bill numbering"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/clients",
            "/clients/{id}",
            "/clients/{id}/receivable",
            "/products",
            "/products/{id}",
            "/invoices",
            "/invoices/next-bill-number",
            "/invoices/{id}",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
