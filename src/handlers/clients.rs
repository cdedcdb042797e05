use super::common::{created_response, page_request, parse_id, success_response, ApiJson, ApiQuery};
use crate::{
    entities::client::ClientStatus,
    errors::ServiceError,
    services::{
        clients::{ClientFilter, ClientResponse, CreateClientRequest, UpdateClientRequest},
        rentals::RentalResponse,
    },
    ApiResponse, AppState, MessageResponse,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct ClientListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub status: Option<ClientStatus>,
    pub search: Option<String>,
}

/// List clients with pagination and filtering
#[utoipa::path(
    get,
    path = "/api/clients",
    summary = "List clients",
    description = "Paginated clients, newest first. Also served under /api/students.",
    params(
        ("page" = Option<u64>, Query, description = "Page number (default: 1)"),
        ("limit" = Option<u64>, Query, description = "Items per page (default: 10)"),
        ("status" = Option<ClientStatus>, Query, description = "Filter by status"),
        ("search" = Option<String>, Query, description = "Matches name, email or document"),
    ),
    responses(
        (status = 200, description = "Clients retrieved", body = ApiResponse<Vec<ClientResponse>>),
        (status = 400, description = "Invalid filter", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "clients"
)]
pub async fn list_clients(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ClientListQuery>,
) -> Result<Json<ApiResponse<Vec<ClientResponse>>>, ServiceError> {
    let page = page_request(query.page.as_deref(), query.limit.as_deref(), &state.config);
    let filter = ClientFilter {
        status: query.status,
        search: query.search,
    };
    let clients = state.services.clients.list_clients(filter, page).await?;
    Ok(Json(ApiResponse::paginated(clients)))
}

/// Register a client
#[utoipa::path(
    post,
    path = "/api/clients",
    summary = "Create client",
    request_body = CreateClientRequest,
    responses(
        (status = 201, description = "Client created", body = ApiResponse<ClientResponse>),
        (status = 400, description = "Invalid request data", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 409, description = "Email or document already registered", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "clients"
)]
pub async fn create_client(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateClientRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ClientResponse>>), ServiceError> {
    let client = state.services.clients.create_client(request).await?;
    Ok(created_response(client, "Client created successfully"))
}

/// Get client by ID
#[utoipa::path(
    get,
    path = "/api/clients/{id}",
    summary = "Get client",
    params(("id" = String, Path, description = "Client ID")),
    responses(
        (status = 200, description = "Client retrieved", body = ApiResponse<ClientResponse>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 404, description = "Client not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "clients"
)]
pub async fn get_client(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<ClientResponse>>, ServiceError> {
    let client_id = parse_id(&id, "Client")?;
    let client = state.services.clients.get_client(client_id).await?;
    Ok(success_response(client))
}

/// Update a client
#[utoipa::path(
    put,
    path = "/api/clients/{id}",
    summary = "Update client",
    params(("id" = String, Path, description = "Client ID")),
    request_body = UpdateClientRequest,
    responses(
        (status = 200, description = "Client updated", body = ApiResponse<ClientResponse>),
        (status = 400, description = "Invalid request data", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 404, description = "Client not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Email or document already registered", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "clients"
)]
pub async fn update_client(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<UpdateClientRequest>,
) -> Result<Json<ApiResponse<ClientResponse>>, ServiceError> {
    let client_id = parse_id(&id, "Client")?;
    let client = state.services.clients.update_client(client_id, request).await?;
    Ok(Json(ApiResponse::with_message(
        client,
        "Client updated successfully",
    )))
}

/// Delete a client
#[utoipa::path(
    delete,
    path = "/api/clients/{id}",
    summary = "Delete client",
    params(("id" = String, Path, description = "Client ID")),
    responses(
        (status = 200, description = "Client deleted", body = MessageResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 404, description = "Client not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Client is referenced by rentals", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "clients"
)]
pub async fn delete_client(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ServiceError> {
    let client_id = parse_id(&id, "Client")?;
    state.services.clients.delete_client(client_id).await?;
    Ok(Json(MessageResponse::new("Client deleted successfully")))
}

/// Rentals held by a client
#[utoipa::path(
    get,
    path = "/api/clients/{id}/rentals",
    summary = "Client rentals",
    params(("id" = String, Path, description = "Client ID")),
    responses(
        (status = 200, description = "Rentals of the client, newest first", body = ApiResponse<Vec<RentalResponse>>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 404, description = "Client not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "clients"
)]
pub async fn client_rentals(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Vec<RentalResponse>>>, ServiceError> {
    let client_id = parse_id(&id, "Client")?;
    let rentals = state.services.rentals.rentals_for_client(client_id).await?;
    Ok(success_response(rentals))
}
