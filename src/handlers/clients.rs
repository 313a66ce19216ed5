use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::client::{Client, ClientInput};
use crate::errors::AppError;
use crate::state::AppState;

use super::blocking;

#[derive(Debug, Deserialize, ToSchema)]
pub struct ClientRequest {
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub location: Option<String>,
}

impl From<ClientRequest> for ClientInput {
    fn from(r: ClientRequest) -> Self {
        ClientInput {
            name: r.name,
            phone: r.phone,
            location: r.location,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ClientResponse {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    pub location: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Client> for ClientResponse {
    fn from(c: Client) -> Self {
        ClientResponse {
            id: c.id,
            name: c.name,
            phone: c.phone,
            location: c.location,
            created_at: c.created_at.to_rfc3339(),
            updated_at: c.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ClientUpdateResponse {
    /// False when the submitted data matched the stored client.
    pub modified: bool,
    pub client: ClientResponse,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReceivableResponse {
    pub client_id: Uuid,
    /// Sum of the remaining balances of the client's open invoices.
    pub receivable: String,
}

#[utoipa::path(
    post,
    path = "/clients",
    request_body = ClientRequest,
    responses(
        (status = 201, description = "Client created", body = ClientResponse),
        (status = 400, description = "Name or phone missing"),
    ),
    tag = "clients"
)]
pub async fn create_client(
    state: web::Data<AppState>,
    body: web::Json<ClientRequest>,
) -> Result<HttpResponse, AppError> {
    let service = state.clients.clone();
    let input = ClientInput::from(body.into_inner());
    let client = blocking(move || service.create_client(input)).await?;
    Ok(HttpResponse::Created().json(ClientResponse::from(client)))
}

#[utoipa::path(
    get,
    path = "/clients",
    responses((status = 200, description = "All clients", body = [ClientResponse])),
    tag = "clients"
)]
pub async fn list_clients(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let service = state.clients.clone();
    let clients = blocking(move || service.list_clients()).await?;
    let body: Vec<ClientResponse> = clients.into_iter().map(ClientResponse::from).collect();
    Ok(HttpResponse::Ok().json(body))
}

#[utoipa::path(
    get,
    path = "/clients/{id}",
    params(("id" = Uuid, Path, description = "Client UUID")),
    responses(
        (status = 200, description = "Client found", body = ClientResponse),
        (status = 404, description = "Client not found"),
    ),
    tag = "clients"
)]
pub async fn get_client(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let service = state.clients.clone();
    let id = path.into_inner();
    let client = blocking(move || service.get_client(id)).await?;
    Ok(HttpResponse::Ok().json(ClientResponse::from(client)))
}

#[utoipa::path(
    put,
    path = "/clients/{id}",
    params(("id" = Uuid, Path, description = "Client UUID")),
    request_body = ClientRequest,
    responses(
        (status = 200, description = "Update applied or skipped as unchanged", body = ClientUpdateResponse),
        (status = 400, description = "Name or phone missing"),
        (status = 404, description = "Client not found"),
    ),
    tag = "clients"
)]
pub async fn update_client(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<ClientRequest>,
) -> Result<HttpResponse, AppError> {
    let service = state.clients.clone();
    let id = path.into_inner();
    let input = ClientInput::from(body.into_inner());
    let outcome = blocking(move || service.update_client(id, input)).await?;
    Ok(HttpResponse::Ok().json(ClientUpdateResponse {
        modified: outcome.is_modified(),
        client: outcome.into_inner().into(),
    }))
}

#[utoipa::path(
    delete,
    path = "/clients/{id}",
    params(("id" = Uuid, Path, description = "Client UUID")),
    responses(
        (status = 204, description = "Client deleted"),
        (status = 404, description = "Client not found"),
        (status = 409, description = "Client still has invoices"),
    ),
    tag = "clients"
)]
pub async fn delete_client(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let service = state.clients.clone();
    let id = path.into_inner();
    blocking(move || service.delete_client(id)).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[utoipa::path(
    get,
    path = "/clients/{id}/receivable",
    params(("id" = Uuid, Path, description = "Client UUID")),
    responses(
        (status = 200, description = "Outstanding balance", body = ReceivableResponse),
        (status = 404, description = "Client not found"),
    ),
    tag = "clients"
)]
pub async fn receivable_balance(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let service = state.invoices.clone();
    let client_id = path.into_inner();
    let receivable = blocking(move || service.receivable_balance(client_id)).await?;
    Ok(HttpResponse::Ok().json(ReceivableResponse {
        client_id,
        receivable: receivable.to_string(),
    }))
}
