use super::common::{created_response, page_request, parse_id, success_response, ApiJson, ApiQuery};
use crate::{
    entities::locker::{LockerSize, LockerStatus},
    errors::ServiceError,
    services::{
        lockers::{CreateLockerRequest, LockerFilter, LockerResponse, LockerStats, UpdateLockerRequest},
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
pub struct LockerListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub status: Option<LockerStatus>,
    pub size: Option<LockerSize>,
    pub search: Option<String>,
}

/// List lockers with pagination and filtering
#[utoipa::path(
    get,
    path = "/api/lockers",
    summary = "List lockers",
    description = "Paginated lockers ordered by number",
    params(
        ("page" = Option<u64>, Query, description = "Page number (default: 1)"),
        ("limit" = Option<u64>, Query, description = "Items per page (default: 10)"),
        ("status" = Option<LockerStatus>, Query, description = "Filter by status"),
        ("size" = Option<LockerSize>, Query, description = "Filter by size"),
        ("search" = Option<String>, Query, description = "Matches number or location"),
    ),
    responses(
        (status = 200, description = "Lockers retrieved", body = ApiResponse<Vec<LockerResponse>>),
        (status = 400, description = "Invalid filter", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "lockers"
)]
pub async fn list_lockers(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<LockerListQuery>,
) -> Result<Json<ApiResponse<Vec<LockerResponse>>>, ServiceError> {
    let page = page_request(query.page.as_deref(), query.limit.as_deref(), &state.config);
    let filter = LockerFilter {
        status: query.status,
        size: query.size,
        search: query.search,
    };
    let lockers = state.services.lockers.list_lockers(filter, page).await?;
    Ok(Json(ApiResponse::paginated(lockers)))
}

/// Lockers that can take a new rental
#[utoipa::path(
    get,
    path = "/api/lockers/available",
    summary = "Available lockers",
    responses(
        (status = 200, description = "Available lockers", body = ApiResponse<Vec<LockerResponse>>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "lockers"
)]
pub async fn list_available_lockers(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<LockerResponse>>>, ServiceError> {
    let lockers = state.services.lockers.list_available().await?;
    Ok(success_response(lockers))
}

/// Locker counts per status
#[utoipa::path(
    get,
    path = "/api/lockers/stats",
    summary = "Locker statistics",
    responses(
        (status = 200, description = "Counts per status", body = ApiResponse<LockerStats>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "lockers"
)]
pub async fn locker_stats(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<LockerStats>>, ServiceError> {
    let stats = state.services.lockers.locker_stats().await?;
    Ok(success_response(stats))
}

/// Register a locker
#[utoipa::path(
    post,
    path = "/api/lockers",
    summary = "Create locker",
    request_body = CreateLockerRequest,
    responses(
        (status = 201, description = "Locker created", body = ApiResponse<LockerResponse>),
        (status = 400, description = "Invalid request data", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 409, description = "Locker number already in use", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "lockers"
)]
pub async fn create_locker(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateLockerRequest>,
) -> Result<(StatusCode, Json<ApiResponse<LockerResponse>>), ServiceError> {
    let locker = state.services.lockers.create_locker(request).await?;
    Ok(created_response(locker, "Locker created successfully"))
}

/// Get locker by ID
#[utoipa::path(
    get,
    path = "/api/lockers/{id}",
    summary = "Get locker",
    params(("id" = String, Path, description = "Locker ID")),
    responses(
        (status = 200, description = "Locker retrieved", body = ApiResponse<LockerResponse>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 404, description = "Locker not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "lockers"
)]
pub async fn get_locker(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<LockerResponse>>, ServiceError> {
    let locker_id = parse_id(&id, "Locker")?;
    let locker = state.services.lockers.get_locker(locker_id).await?;
    Ok(success_response(locker))
}

/// Update a locker
#[utoipa::path(
    put,
    path = "/api/lockers/{id}",
    summary = "Update locker",
    description = "Partial update; `rented` is managed by the rental ledger and cannot be set here",
    params(("id" = String, Path, description = "Locker ID")),
    request_body = UpdateLockerRequest,
    responses(
        (status = 200, description = "Locker updated", body = ApiResponse<LockerResponse>),
        (status = 400, description = "Invalid request data", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 404, description = "Locker not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Number taken or locker held by an active rental", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "lockers"
)]
pub async fn update_locker(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<UpdateLockerRequest>,
) -> Result<Json<ApiResponse<LockerResponse>>, ServiceError> {
    let locker_id = parse_id(&id, "Locker")?;
    let locker = state.services.lockers.update_locker(locker_id, request).await?;
    Ok(Json(ApiResponse::with_message(
        locker,
        "Locker updated successfully",
    )))
}

/// Delete a locker
#[utoipa::path(
    delete,
    path = "/api/lockers/{id}",
    summary = "Delete locker",
    params(("id" = String, Path, description = "Locker ID")),
    responses(
        (status = 200, description = "Locker deleted", body = MessageResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 404, description = "Locker not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Locker is referenced by rentals", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "lockers"
)]
pub async fn delete_locker(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ServiceError> {
    let locker_id = parse_id(&id, "Locker")?;
    state.services.lockers.delete_locker(locker_id).await?;
    Ok(Json(MessageResponse::new("Locker deleted successfully")))
}

/// Rental history of a locker
#[utoipa::path(
    get,
    path = "/api/lockers/{id}/rentals",
    summary = "Locker rentals",
    params(("id" = String, Path, description = "Locker ID")),
    responses(
        (status = 200, description = "Rentals of the locker, newest first", body = ApiResponse<Vec<RentalResponse>>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 404, description = "Locker not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "lockers"
)]
pub async fn locker_rentals(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Vec<RentalResponse>>>, ServiceError> {
    let locker_id = parse_id(&id, "Locker")?;
    let rentals = state.services.rentals.rentals_for_locker(locker_id).await?;
    Ok(success_response(rentals))
}
