use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::product::{Product, ProductInput};
use crate::errors::AppError;
use crate::state::AppState;

use super::{blocking, parse_money};

#[derive(Debug, Deserialize, ToSchema)]
pub struct ProductRequest {
    pub name: String,
    pub design_number: String,
    /// Decimal price as a string, e.g. "450.00"
    pub price: String,
    #[serde(default)]
    pub sizes: Vec<String>,
}

impl ProductRequest {
    fn into_input(self) -> Result<ProductInput, AppError> {
        Ok(ProductInput {
            price: parse_money("price", &self.price)?,
            name: self.name,
            design_number: self.design_number,
            sizes: self.sizes,
        })
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProductResponse {
    pub id: Uuid,
    pub name: String,
    pub design_number: String,
    pub price: String,
    pub sizes: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Product> for ProductResponse {
    fn from(p: Product) -> Self {
        ProductResponse {
            id: p.id,
            name: p.name,
            design_number: p.design_number,
            price: p.price.to_string(),
            sizes: p.sizes,
            created_at: p.created_at.to_rfc3339(),
            updated_at: p.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProductUpdateResponse {
    pub modified: bool,
    pub product: ProductResponse,
}

#[utoipa::path(
    post,
    path = "/products",
    request_body = ProductRequest,
    responses(
        (status = 201, description = "Product created", body = ProductResponse),
        (status = 400, description = "Missing name/design number or negative price"),
    ),
    tag = "products"
)]
pub async fn create_product(
    state: web::Data<AppState>,
    body: web::Json<ProductRequest>,
) -> Result<HttpResponse, AppError> {
    let service = state.products.clone();
    let input = body.into_inner().into_input()?;
    let product = blocking(move || service.create_product(input)).await?;
    Ok(HttpResponse::Created().json(ProductResponse::from(product)))
}

#[utoipa::path(
    get,
    path = "/products",
    responses((status = 200, description = "All products", body = [ProductResponse])),
    tag = "products"
)]
pub async fn list_products(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let service = state.products.clone();
    let products = blocking(move || service.list_products()).await?;
    let body: Vec<ProductResponse> = products.into_iter().map(ProductResponse::from).collect();
    Ok(HttpResponse::Ok().json(body))
}

#[utoipa::path(
    get,
    path = "/products/{id}",
    params(("id" = Uuid, Path, description = "Product UUID")),
    responses(
        (status = 200, description = "Product found", body = ProductResponse),
        (status = 404, description = "Product not found"),
    ),
    tag = "products"
)]
pub async fn get_product(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let service = state.products.clone();
    let id = path.into_inner();
    let product = blocking(move || service.get_product(id)).await?;
    Ok(HttpResponse::Ok().json(ProductResponse::from(product)))
}

#[utoipa::path(
    put,
    path = "/products/{id}",
    params(("id" = Uuid, Path, description = "Product UUID")),
    request_body = ProductRequest,
    responses(
        (status = 200, description = "Update applied or skipped as unchanged", body = ProductUpdateResponse),
        (status = 400, description = "Missing name/design number or non-positive price"),
        (status = 404, description = "Product not found"),
    ),
    tag = "products"
)]
pub async fn update_product(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<ProductRequest>,
) -> Result<HttpResponse, AppError> {
    let service = state.products.clone();
    let id = path.into_inner();
    let input = body.into_inner().into_input()?;
    let outcome = blocking(move || service.update_product(id, input)).await?;
    Ok(HttpResponse::Ok().json(ProductUpdateResponse {
        modified: outcome.is_modified(),
        product: outcome.into_inner().into(),
    }))
}

#[utoipa::path(
    delete,
    path = "/products/{id}",
    params(("id" = Uuid, Path, description = "Product UUID")),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 404, description = "Product not found"),
    ),
    tag = "products"
)]
pub async fn delete_product(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let service = state.products.clone();
    let id = path.into_inner();
    blocking(move || service.delete_product(id)).await?;
    Ok(HttpResponse::NoContent().finish())
}
