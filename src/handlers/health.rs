use crate::{db, handlers::AppState};
use axum::{extract::State, http::StatusCode, response::Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;
use utoipa::ToSchema;

/// Store connectivity as reported by the health probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseStatus {
    Connected,
    Disconnected,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub success: bool,
    pub message: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,
    pub database: DatabaseStatus,
}

/// Liveness probe that also pings the store
#[utoipa::path(
    get,
    path = "/api/health",
    summary = "Health check",
    responses(
        (status = 200, description = "Service and database are up", body = HealthResponse),
        (status = 503, description = "Database unreachable", body = HealthResponse),
    ),
    tag = "health"
)]
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let (status, success, message, database) = match db::check_connection(&state.db).await {
        Ok(()) => (
            StatusCode::OK,
            true,
            "LockerSys API is running",
            DatabaseStatus::Connected,
        ),
        Err(e) => {
            warn!(error = %e, "Health check could not reach the database");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                false,
                "Database unavailable",
                DatabaseStatus::Disconnected,
            )
        }
    };

    (
        status,
        Json(HealthResponse {
            success,
            message: message.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: Utc::now(),
            database,
        }),
    )
}
