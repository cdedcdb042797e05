use super::common::{created_response, page_request, parse_id, success_response, ApiJson, ApiQuery};
use crate::{
    entities::rental::{PaymentStatus, RentalStatus},
    errors::ServiceError,
    services::rentals::{
        quote as price_quote, CreateRentalRequest, RentalFilter, RentalQuote, RentalResponse,
        RentalStats, UpdateRentalRequest,
    },
    ApiResponse, AppState, MessageResponse,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RentalListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub search: Option<String>,
    pub status: Option<RentalStatus>,
    pub payment_status: Option<PaymentStatus>,
    pub locker_id: Option<Uuid>,
    pub client_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteQuery {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub monthly_price: Decimal,
}

/// List rentals with pagination and filtering
#[utoipa::path(
    get,
    path = "/api/rentals",
    summary = "List rentals",
    description = "Paginated rentals, newest first, each with its locker and client summaries",
    params(
        ("page" = Option<u64>, Query, description = "Page number (default: 1)"),
        ("limit" = Option<u64>, Query, description = "Items per page (default: 10)"),
        ("search" = Option<String>, Query, description = "Matches notes, locker number or client name"),
        ("status" = Option<RentalStatus>, Query, description = "Filter by rental status"),
        ("paymentStatus" = Option<PaymentStatus>, Query, description = "Filter by payment status"),
        ("lockerId" = Option<String>, Query, description = "Filter by locker"),
        ("clientId" = Option<String>, Query, description = "Filter by client"),
    ),
    responses(
        (status = 200, description = "Rentals retrieved", body = ApiResponse<Vec<RentalResponse>>),
        (status = 400, description = "Invalid filter", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "rentals"
)]
pub async fn list_rentals(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<RentalListQuery>,
) -> Result<Json<ApiResponse<Vec<RentalResponse>>>, ServiceError> {
    let page = page_request(query.page.as_deref(), query.limit.as_deref(), &state.config);
    let filter = RentalFilter {
        search: query.search,
        status: query.status,
        payment_status: query.payment_status,
        locker_id: query.locker_id,
        client_id: query.client_id,
    };
    let rentals = state.services.rentals.list_rentals(filter, page).await?;
    Ok(Json(ApiResponse::paginated(rentals)))
}

/// Price a prospective rental
#[utoipa::path(
    get,
    path = "/api/rentals/quote",
    summary = "Quote rental",
    description = "Months billed and total amount for a date range at a monthly price",
    params(
        ("startDate" = String, Query, description = "First day (YYYY-MM-DD)"),
        ("endDate" = String, Query, description = "Last day (YYYY-MM-DD)"),
        ("monthlyPrice" = String, Query, description = "Monthly price, e.g. 300.00"),
    ),
    responses(
        (status = 200, description = "Quote", body = ApiResponse<RentalQuote>),
        (status = 400, description = "Invalid dates or price", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "rentals"
)]
pub async fn quote_rental(
    ApiQuery(query): ApiQuery<QuoteQuery>,
) -> Result<Json<ApiResponse<RentalQuote>>, ServiceError> {
    let quote = price_quote(query.start_date, query.end_date, query.monthly_price)?;
    Ok(success_response(quote))
}

/// Rental counts and revenue
#[utoipa::path(
    get,
    path = "/api/rentals/stats",
    summary = "Rental statistics",
    responses(
        (status = 200, description = "Counts per status and paid revenue", body = ApiResponse<RentalStats>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "rentals"
)]
pub async fn rental_stats(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<RentalStats>>, ServiceError> {
    let stats = state.services.rentals.rental_stats().await?;
    Ok(success_response(stats))
}

/// Open a rental
#[utoipa::path(
    post,
    path = "/api/rentals",
    summary = "Create rental",
    description = "Creates an active rental and marks its locker rented in the same transaction",
    request_body = CreateRentalRequest,
    responses(
        (status = 201, description = "Rental created", body = ApiResponse<RentalResponse>),
        (status = 400, description = "Invalid data, unknown locker/client or locker under maintenance", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 409, description = "Locker already has an active rental", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "rentals"
)]
pub async fn create_rental(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateRentalRequest>,
) -> Result<(StatusCode, Json<ApiResponse<RentalResponse>>), ServiceError> {
    let rental = state.services.rentals.create_rental(request).await?;
    Ok(created_response(rental, "Rental created successfully"))
}

/// Get rental by ID
#[utoipa::path(
    get,
    path = "/api/rentals/{id}",
    summary = "Get rental",
    params(("id" = String, Path, description = "Rental ID")),
    responses(
        (status = 200, description = "Rental retrieved", body = ApiResponse<RentalResponse>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 404, description = "Rental not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "rentals"
)]
pub async fn get_rental(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<RentalResponse>>, ServiceError> {
    let rental_id = parse_id(&id, "Rental")?;
    let rental = state.services.rentals.get_rental(rental_id).await?;
    Ok(success_response(rental))
}

/// Update a rental
#[utoipa::path(
    put,
    path = "/api/rentals/{id}",
    summary = "Update rental",
    description = "Partial update. Status and locker changes claim or release lockers in the same transaction.",
    params(("id" = String, Path, description = "Rental ID")),
    request_body = UpdateRentalRequest,
    responses(
        (status = 200, description = "Rental updated", body = ApiResponse<RentalResponse>),
        (status = 400, description = "Invalid request data", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 404, description = "Rental not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Target locker already has an active rental", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "rentals"
)]
pub async fn update_rental(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<UpdateRentalRequest>,
) -> Result<Json<ApiResponse<RentalResponse>>, ServiceError> {
    let rental_id = parse_id(&id, "Rental")?;
    let rental = state.services.rentals.update_rental(rental_id, request).await?;
    Ok(Json(ApiResponse::with_message(
        rental,
        "Rental updated successfully",
    )))
}

/// Delete a rental
#[utoipa::path(
    delete,
    path = "/api/rentals/{id}",
    summary = "Delete rental",
    description = "Removes the rental and its payments and releases the locker",
    params(("id" = String, Path, description = "Rental ID")),
    responses(
        (status = 200, description = "Rental deleted", body = MessageResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 404, description = "Rental not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "rentals"
)]
pub async fn delete_rental(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ServiceError> {
    let rental_id = parse_id(&id, "Rental")?;
    state.services.rentals.delete_rental(rental_id).await?;
    Ok(Json(MessageResponse::new("Rental deleted successfully")))
}
