use super::common::{created_response, ApiJson};
use crate::{
    auth::{AuthResponse, AuthUser, LoginRequest, RegisterRequest, UserResponse},
    errors::ServiceError,
    ApiResponse, AppState,
};
use axum::{extract::State, http::StatusCode, Extension, Json};

/// Sign in with email and password
#[utoipa::path(
    post,
    path = "/api/auth/login",
    summary = "Login",
    description = "Exchange operator credentials for a bearer token",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = ApiResponse<AuthResponse>),
        (status = 400, description = "Email or password missing", body = crate::errors::ErrorResponse),
        (status = 401, description = "Invalid credentials", body = crate::errors::ErrorResponse),
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> Result<Json<ApiResponse<AuthResponse>>, ServiceError> {
    let session = state.services.auth.login(request).await?;
    Ok(Json(ApiResponse::with_message(session, "Login successful")))
}

/// Create an operator account
#[utoipa::path(
    post,
    path = "/api/auth/register",
    summary = "Register",
    description = "Create an operator account and return a bearer token for it",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Operator registered", body = ApiResponse<AuthResponse>),
        (status = 400, description = "Invalid request data", body = crate::errors::ErrorResponse),
        (status = 409, description = "Email already registered", body = crate::errors::ErrorResponse),
    ),
    tag = "auth"
)]
pub async fn register(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AuthResponse>>), ServiceError> {
    let session = state.services.auth.register(request).await?;
    Ok(created_response(session, "User registered successfully"))
}

/// Current operator profile
#[utoipa::path(
    get,
    path = "/api/auth/me",
    summary = "Current user",
    description = "Profile of the operator the bearer token belongs to",
    responses(
        (status = 200, description = "Profile", body = ApiResponse<UserResponse>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 404, description = "User no longer exists", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "auth"
)]
pub async fn me(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<ApiResponse<UserResponse>>, ServiceError> {
    let profile = state.services.auth.profile(user.user_id).await?;
    Ok(Json(ApiResponse::success(profile)))
}
