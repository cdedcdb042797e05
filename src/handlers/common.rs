use crate::{config::AppConfig, errors::ServiceError, services::PageRequest, ApiResponse};
use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Query, Request},
    http::{request::Parts, StatusCode},
    Json,
};
use serde::de::DeserializeOwned;
use uuid::Uuid;

/// JSON body extractor whose rejections use the error envelope.
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(ServiceError::BadRequest(rejection.body_text())),
        }
    }
}

/// Query string extractor whose rejections use the error envelope.
pub struct ApiQuery<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => Ok(Self(value)),
            Err(rejection) => Err(ServiceError::BadRequest(rejection.body_text())),
        }
    }
}

/// Standard success response
pub fn success_response<T>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse::success(data))
}

/// Standard created response
pub fn created_response<T>(data: T, message: &str) -> (StatusCode, Json<ApiResponse<T>>) {
    (
        StatusCode::CREATED,
        Json(ApiResponse::with_message(data, message)),
    )
}

/// Parses a path id. Anything that is not a UUID is reported as not found.
pub fn parse_id(raw: &str, entity: &str) -> Result<Uuid, ServiceError> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| ServiceError::NotFound(format!("{} {} not found", entity, raw)))
}

fn coerce(raw: Option<&str>, default: u64) -> u64 {
    match raw.map(str::trim).filter(|v| !v.is_empty()) {
        None => default,
        Some(value) => match value.parse::<i64>() {
            Ok(n) if n < 1 => 1,
            Ok(n) => n as u64,
            Err(_) => default,
        },
    }
}

/// Page number: defaults to 1, never below 1.
pub fn coerce_page(raw: Option<&str>) -> u64 {
    coerce(raw, 1)
}

/// Page size: defaults to `default`, kept within `1..=max`.
pub fn coerce_limit(raw: Option<&str>, default: u64, max: u64) -> u64 {
    coerce(raw, default).min(max.max(1))
}

/// Builds the page request for a listing from raw `page`/`limit` values.
pub fn page_request(page: Option<&str>, limit: Option<&str>, config: &AppConfig) -> PageRequest {
    PageRequest::new(
        coerce_page(page),
        coerce_limit(limit, config.api_default_page_size, config.api_max_page_size),
    )
}
