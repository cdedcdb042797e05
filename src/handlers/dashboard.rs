use super::common::success_response;
use crate::{errors::ServiceError, services::dashboard::DashboardStats, ApiResponse, AppState};
use axum::{extract::State, Json};

/// Back-office summary counters
#[utoipa::path(
    get,
    path = "/api/dashboard/stats",
    summary = "Dashboard statistics",
    description = "Locker, rental, client and payment totals computed from the current tables",
    responses(
        (status = 200, description = "Statistics", body = ApiResponse<DashboardStats>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "dashboard"
)]
pub async fn dashboard_stats(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<DashboardStats>>, ServiceError> {
    let stats = state.services.dashboard.stats().await?;
    Ok(success_response(stats))
}
