//! LockerSys API Library
//!
//! Locker-rental back office: lockers, clients, rentals and the payments
//! recorded against them, served as a JSON REST API.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod handlers;
pub mod middleware_helpers;
pub mod migrator;
pub mod openapi;
pub mod seed;
pub mod services;
pub mod tracing;

use axum::{
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{catch_panic::CatchPanicLayer, compression::CompressionLayer, timeout::TimeoutLayer};
use utoipa::ToSchema;

use crate::auth::{AuthRouterExt, AuthService};
use crate::errors::ErrorResponse;
use crate::services::Page;

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: Arc<config::AppConfig>,
    pub services: handlers::AppServices,
}

impl AppState {
    pub fn new(db: Arc<DatabaseConnection>, config: config::AppConfig) -> Self {
        let services = handlers::AppServices::new(db.clone(), &config);
        Self {
            db,
            config: Arc::new(config),
            services,
        }
    }
}

/// Success envelope shared by every endpoint.
///
/// Listings also fill `total`, `page`, `limit` and `totalPages`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_pages: Option<u64>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            total: None,
            page: None,
            limit: None,
            total_pages: None,
        }
    }

    pub fn with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::success(data)
        }
    }
}

impl<T> ApiResponse<Vec<T>> {
    pub fn paginated(page: Page<T>) -> Self {
        let total_pages = page.total_pages();
        Self {
            success: true,
            data: Some(page.items),
            message: None,
            total: Some(page.total),
            page: Some(page.page),
            limit: Some(page.limit),
            total_pages: Some(total_pages),
        }
    }
}

/// Body of responses that only confirm an action.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    #[schema(example = true)]
    pub success: bool,
    #[schema(example = "Locker deleted successfully")]
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

fn client_routes() -> Router<AppState> {
    use handlers::clients;
    Router::new()
        .route("/", get(clients::list_clients).post(clients::create_client))
        .route(
            "/:id",
            get(clients::get_client)
                .put(clients::update_client)
                .delete(clients::delete_client),
        )
        .route("/:id/rentals", get(clients::client_rentals))
}

/// Routes that require a bearer token.
pub fn protected_routes() -> Router<AppState> {
    use handlers::{auth as auth_handlers, dashboard, lockers, payments, rentals};

    let lockers = Router::new()
        .route("/", get(lockers::list_lockers).post(lockers::create_locker))
        .route("/available", get(lockers::list_available_lockers))
        .route("/stats", get(lockers::locker_stats))
        .route(
            "/:id",
            get(lockers::get_locker)
                .put(lockers::update_locker)
                .delete(lockers::delete_locker),
        )
        .route("/:id/rentals", get(lockers::locker_rentals));

    let rentals = Router::new()
        .route("/", get(rentals::list_rentals).post(rentals::create_rental))
        .route("/quote", get(rentals::quote_rental))
        .route("/stats", get(rentals::rental_stats))
        .route(
            "/:id",
            get(rentals::get_rental)
                .put(rentals::update_rental)
                .delete(rentals::delete_rental),
        )
        .route("/:id/payments", get(payments::rental_payments));

    let payments = Router::new()
        .route("/", get(payments::list_payments).post(payments::create_payment))
        .route(
            "/:id",
            get(payments::get_payment)
                .put(payments::update_payment)
                .delete(payments::delete_payment),
        );

    Router::new()
        .route("/api/auth/me", get(auth_handlers::me))
        .route("/api/dashboard/stats", get(dashboard::dashboard_stats))
        .nest("/api/lockers", lockers)
        .nest("/api/clients", client_routes())
        .nest("/api/students", client_routes())
        .nest("/api/rentals", rentals)
        .nest("/api/payments", payments)
        .with_auth()
}

/// Routes reachable without a token.
pub fn public_routes() -> Router<AppState> {
    use handlers::{auth as auth_handlers, health};

    Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/auth/login", post(auth_handlers::login))
        .route("/api/auth/register", post(auth_handlers::register))
}

async fn inject_auth_service(
    axum::extract::State(auth_service): axum::extract::State<Arc<AuthService>>,
    mut request: axum::extract::Request,
    next: middleware::Next,
) -> Response {
    request.extensions_mut().insert(auth_service);
    next.run(request).await
}

async fn route_not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            success: false,
            message: "Route not found".to_string(),
        }),
    )
        .into_response()
}

fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    ::tracing::error!(panic = %detail, "handler panicked");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            success: false,
            message: "Internal server error".to_string(),
        }),
    )
        .into_response()
}

/// Assembles the full application router. CORS is left to the binary since
/// it depends on deployment settings.
pub fn build_router(state: AppState) -> Router {
    let auth_service = state.services.auth.clone();
    let request_timeout = Duration::from_secs(state.config.request_timeout_secs);

    Router::new()
        .merge(public_routes())
        .merge(protected_routes())
        .merge(openapi::swagger_ui())
        .fallback(route_not_found)
        .with_state(state)
        .layer(middleware::from_fn_with_state(
            auth_service,
            inject_auth_service,
        ))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(CompressionLayer::new())
        .layer(crate::tracing::configure_http_tracing())
        .layer(middleware::from_fn(
            middleware_helpers::request_id::request_id_middleware,
        ))
}
