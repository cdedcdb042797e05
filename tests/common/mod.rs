#![allow(dead_code)]

use std::str::FromStr;
use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    response::Response,
    Router,
};
use lockersys_api::{
    build_router, config::AppConfig, db, entities::user, seed, AppState,
};
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

pub const ADMIN_EMAIL: &str = "admin@lockers.com";
pub const ADMIN_PASSWORD: &str = "admin123";
const TEST_SECRET: &str = "test_secret_key_for_testing_purposes_only_32chars";

/// Helper harness for spinning up the full router over a throwaway SQLite file.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    token: String,
    _dir: TempDir,
}

impl TestApp {
    /// Construct a new test application with fresh database state.
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let db_path = dir.path().join("lockersys_test.db");

        let mut cfg = AppConfig::new(
            format!("sqlite://{}?mode=rwc", db_path.display()),
            TEST_SECRET.to_string(),
            "test".to_string(),
        );
        cfg.db_max_connections = 4;
        cfg.db_min_connections = 1;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");
        seed::ensure_admin_user(&pool, ADMIN_EMAIL, ADMIN_PASSWORD, "Admin User")
            .await
            .expect("bootstrap operator");

        let admin = user::Entity::find()
            .filter(user::Column::Email.eq(ADMIN_EMAIL))
            .one(&pool)
            .await
            .expect("query operator")
            .expect("operator exists");

        let state = AppState::new(Arc::new(pool), cfg);
        let token = state
            .services
            .auth
            .issue_token(&admin)
            .expect("issue test token");
        let router = build_router(state.clone());

        Self {
            router,
            state,
            token,
            _dir: dir,
        }
    }

    /// Access the bearer token for the bootstrap operator.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Send a request against the router with an optional bearer token.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(tok) = token {
            builder = builder.header("authorization", format!("Bearer {}", tok));
        }

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.send(request).await
    }

    /// Runs a prebuilt request through the router.
    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    /// Authenticated request; returns the status and the decoded JSON body.
    pub async fn call(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let response = self.request(method, uri, body, Some(self.token())).await;
        read_json(response).await
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.call(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.call(Method::POST, uri, Some(body)).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.call(Method::PUT, uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.call(Method::DELETE, uri, None).await
    }

    /// Creates a locker and returns its JSON representation.
    pub async fn create_locker(&self, number: &str, monthly_price: &str) -> Value {
        let (status, body) = self
            .post(
                "/api/lockers",
                json!({
                    "number": number,
                    "location": "Bloco A - 1º Andar",
                    "size": "medium",
                    "monthlyPrice": monthly_price,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create locker failed: {body}");
        body["data"].clone()
    }

    /// Creates a client whose email and document derive from `tag`.
    pub async fn create_client(&self, tag: &str) -> Value {
        let (status, body) = self
            .post(
                "/api/clients",
                json!({
                    "name": format!("Client {tag}"),
                    "email": format!("{tag}@example.com"),
                    "phone": "(11) 99999-0000",
                    "document": format!("DOC-{tag}"),
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create client failed: {body}");
        body["data"].clone()
    }

    /// Opens a rental over `start..end` at the locker's price, totalled with the quote endpoint.
    pub async fn create_rental(
        &self,
        locker: &Value,
        client: &Value,
        start: &str,
        end: &str,
    ) -> (StatusCode, Value) {
        let price = locker["monthlyPrice"].as_str().expect("price string").to_string();
        let (status, quote) = self
            .get(&format!(
                "/api/rentals/quote?startDate={start}&endDate={end}&monthlyPrice={price}"
            ))
            .await;
        assert_eq!(status, StatusCode::OK, "quote failed: {quote}");

        self.post(
            "/api/rentals",
            json!({
                "lockerId": locker["id"],
                "clientId": client["id"],
                "startDate": start,
                "endDate": end,
                "monthlyPrice": price,
                "totalAmount": quote["data"]["totalAmount"],
            }),
        )
        .await
    }

    /// Current status string of a locker.
    pub async fn locker_status(&self, locker_id: &Value) -> String {
        let id = locker_id.as_str().expect("locker id string");
        let (status, body) = self.get(&format!("/api/lockers/{id}")).await;
        assert_eq!(status, StatusCode::OK, "get locker failed: {body}");
        body["data"]["status"]
            .as_str()
            .expect("status string")
            .to_string()
    }
}

/// Splits a response into its status and JSON body (`Null` when empty).
pub async fn read_json(response: Response) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("body is json")
    };
    (status, value)
}

/// Parses a decimal that the API serialized as a string.
pub fn decimal(value: &Value) -> Decimal {
    let raw = value.as_str().unwrap_or_else(|| panic!("not a decimal string: {value}"));
    Decimal::from_str(raw).expect("valid decimal")
}
