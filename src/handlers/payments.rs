use super::common::{created_response, page_request, parse_id, success_response, ApiJson, ApiQuery};
use crate::{
    entities::payment::{PaymentMethod, PaymentRecordStatus},
    errors::ServiceError,
    services::payments::{
        CreatePaymentRequest, PaymentFilter, PaymentResponse, UpdatePaymentRequest,
    },
    ApiResponse, AppState, MessageResponse,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub rental_id: Option<Uuid>,
    pub status: Option<PaymentRecordStatus>,
    pub method: Option<PaymentMethod>,
}

/// List payments with pagination and filtering
#[utoipa::path(
    get,
    path = "/api/payments",
    summary = "List payments",
    description = "Paginated payments, most recent payment date first",
    params(
        ("page" = Option<u64>, Query, description = "Page number (default: 1)"),
        ("limit" = Option<u64>, Query, description = "Items per page (default: 10)"),
        ("rentalId" = Option<String>, Query, description = "Filter by rental"),
        ("status" = Option<PaymentRecordStatus>, Query, description = "Filter by status"),
        ("method" = Option<PaymentMethod>, Query, description = "Filter by method"),
    ),
    responses(
        (status = 200, description = "Payments retrieved", body = ApiResponse<Vec<PaymentResponse>>),
        (status = 400, description = "Invalid filter", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "payments"
)]
pub async fn list_payments(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<PaymentListQuery>,
) -> Result<Json<ApiResponse<Vec<PaymentResponse>>>, ServiceError> {
    let page = page_request(query.page.as_deref(), query.limit.as_deref(), &state.config);
    let filter = PaymentFilter {
        rental_id: query.rental_id,
        status: query.status,
        method: query.method,
    };
    let payments = state.services.payments.list_payments(filter, page).await?;
    Ok(Json(ApiResponse::paginated(payments)))
}

/// Record a payment
#[utoipa::path(
    post,
    path = "/api/payments",
    summary = "Create payment",
    request_body = CreatePaymentRequest,
    responses(
        (status = 201, description = "Payment recorded", body = ApiResponse<PaymentResponse>),
        (status = 400, description = "Invalid data or unknown rental", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "payments"
)]
pub async fn create_payment(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreatePaymentRequest>,
) -> Result<(StatusCode, Json<ApiResponse<PaymentResponse>>), ServiceError> {
    let payment = state.services.payments.create_payment(request).await?;
    Ok(created_response(payment, "Payment created successfully"))
}

/// Get payment by ID
#[utoipa::path(
    get,
    path = "/api/payments/{id}",
    summary = "Get payment",
    params(("id" = String, Path, description = "Payment ID")),
    responses(
        (status = 200, description = "Payment retrieved", body = ApiResponse<PaymentResponse>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 404, description = "Payment not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "payments"
)]
pub async fn get_payment(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<PaymentResponse>>, ServiceError> {
    let payment_id = parse_id(&id, "Payment")?;
    let payment = state.services.payments.get_payment(payment_id).await?;
    Ok(success_response(payment))
}

/// Update a payment
#[utoipa::path(
    put,
    path = "/api/payments/{id}",
    summary = "Update payment",
    params(("id" = String, Path, description = "Payment ID")),
    request_body = UpdatePaymentRequest,
    responses(
        (status = 200, description = "Payment updated", body = ApiResponse<PaymentResponse>),
        (status = 400, description = "Invalid request data", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 404, description = "Payment not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "payments"
)]
pub async fn update_payment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<UpdatePaymentRequest>,
) -> Result<Json<ApiResponse<PaymentResponse>>, ServiceError> {
    let payment_id = parse_id(&id, "Payment")?;
    let payment = state
        .services
        .payments
        .update_payment(payment_id, request)
        .await?;
    Ok(Json(ApiResponse::with_message(
        payment,
        "Payment updated successfully",
    )))
}

/// Delete a payment
#[utoipa::path(
    delete,
    path = "/api/payments/{id}",
    summary = "Delete payment",
    params(("id" = String, Path, description = "Payment ID")),
    responses(
        (status = 200, description = "Payment deleted", body = MessageResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 404, description = "Payment not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "payments"
)]
pub async fn delete_payment(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ServiceError> {
    let payment_id = parse_id(&id, "Payment")?;
    state.services.payments.delete_payment(payment_id).await?;
    Ok(Json(MessageResponse::new("Payment deleted successfully")))
}

/// Payments recorded against a rental
#[utoipa::path(
    get,
    path = "/api/rentals/{id}/payments",
    summary = "Rental payments",
    params(("id" = String, Path, description = "Rental ID")),
    responses(
        (status = 200, description = "Payments of the rental", body = ApiResponse<Vec<PaymentResponse>>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 404, description = "Rental not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "payments"
)]
pub async fn rental_payments(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Vec<PaymentResponse>>>, ServiceError> {
    let rental_id = parse_id(&id, "Rental")?;
    let payments = state.services.payments.payments_for_rental(rental_id).await?;
    Ok(success_response(payments))
}
