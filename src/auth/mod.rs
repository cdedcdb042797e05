/*!
 * # Authentication
 *
 * Operators sign in with email and password and receive an HS256 JWT that
 * every protected `/api` route expects as `Authorization: Bearer <token>`.
 *
 * - [`AuthService`] issues and validates tokens and owns login, registration
 *   and profile lookup against the `users` table.
 * - [`auth_middleware`] rejects requests without a valid token and stores the
 *   caller as [`AuthUser`] in the request extensions.
 * - [`password`] hashes credentials with Argon2id.
 */

pub mod password;

use crate::{
    db::DbPool,
    entities::user::{self, ActiveModel as UserActiveModel, Entity as UserEntity, ADMIN_ROLE},
    errors::{ErrorResponse, ServiceError},
};
use axum::{
    extract::Request,
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// JWT claims carried by every operator token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user id
    pub email: String,
    pub name: String,
    pub role: String,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
}

/// Operator resolved from a valid token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: String,
    pub name: String,
    pub role: String,
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub issuer: String,
    pub token_lifetime: Duration,
}

impl AuthConfig {
    pub fn from_app_config(cfg: &crate::config::AppConfig) -> Self {
        Self {
            jwt_secret: cfg.jwt_secret.clone(),
            issuer: cfg.auth_issuer.clone(),
            token_lifetime: Duration::from_secs(cfg.jwt_expiration),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Access token required")]
    MissingToken,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token has expired")]
    TokenExpired,

    #[error("Token creation failed: {0}")]
    TokenCreation(String),

    #[error("Authentication service not available")]
    ServiceUnavailable,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = match self {
            AuthError::MissingToken | AuthError::InvalidToken | AuthError::TokenExpired => {
                StatusCode::UNAUTHORIZED
            }
            AuthError::TokenCreation(_) | AuthError::ServiceUnavailable => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let message = match &self {
            AuthError::TokenCreation(detail) => {
                error!(error = %detail, "token creation failed");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        (
            status,
            Json(ErrorResponse {
                success: false,
                message,
            }),
        )
            .into_response()
    }
}

impl From<AuthError> for ServiceError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::TokenCreation(detail) => ServiceError::JwtError(detail),
            AuthError::ServiceUnavailable => {
                ServiceError::InternalError("authentication service not available".into())
            }
            other => ServiceError::Unauthorized(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[serde(default)]
    #[schema(example = "admin@lockers.com")]
    pub email: String,
    #[serde(default)]
    #[schema(example = "admin123")]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "A valid email is required"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters long"))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<user::Model> for UserResponse {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            email: model.email,
            role: model.role,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Signed-in operator plus the bearer token to send back.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    pub user: UserResponse,
    pub token: String,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

const INVALID_CREDENTIALS: &str = "Invalid credentials";

#[derive(Clone)]
pub struct AuthService {
    config: AuthConfig,
    db_pool: Arc<DbPool>,
}

impl AuthService {
    pub fn new(config: AuthConfig, db_pool: Arc<DbPool>) -> Self {
        Self { config, db_pool }
    }

    /// Signs a token for `user` valid for the configured lifetime.
    pub fn issue_token(&self, user: &user::Model) -> Result<String, AuthError> {
        let now = Utc::now();
        let exp = now
            + ChronoDuration::from_std(self.config.token_lifetime)
                .map_err(|_| AuthError::TokenCreation("Invalid token duration".to_string()))?;

        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role.clone(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            iss: self.config.issuer.clone(),
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )
        .map_err(|e| AuthError::TokenCreation(e.to_string()))
    }

    pub fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[self.config.issuer.as_str()]);

        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::InvalidToken,
        })
    }

    /// Exchanges email and password for a token.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn login(&self, request: LoginRequest) -> Result<AuthResponse, ServiceError> {
        let email = normalize_email(&request.email);
        if email.is_empty() || request.password.is_empty() {
            return Err(ServiceError::ValidationError(
                "Email and password are required".to_string(),
            ));
        }

        let db = &*self.db_pool;
        let user = UserEntity::find()
            .filter(user::Column::Email.eq(email.as_str()))
            .one(db)
            .await?
            .ok_or_else(|| {
                warn!("Login attempt for unknown email");
                ServiceError::AuthError(INVALID_CREDENTIALS.to_string())
            })?;

        let candidate = request.password;
        let hash = user.password_hash.clone();
        let matches = tokio::task::spawn_blocking(move || password::verify_password(&candidate, &hash))
            .await
            .map_err(|e| ServiceError::InternalError(e.to_string()))?
            .map_err(|e| ServiceError::HashError(e.to_string()))?;

        if !matches {
            warn!(user_id = %user.id, "Login attempt with wrong password");
            return Err(ServiceError::AuthError(INVALID_CREDENTIALS.to_string()));
        }

        let token = self.issue_token(&user)?;
        info!(user_id = %user.id, "Operator signed in");
        Ok(AuthResponse {
            user: user.into(),
            token,
        })
    }

    /// Creates an operator account and signs it in.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn register(&self, request: RegisterRequest) -> Result<AuthResponse, ServiceError> {
        request.validate()?;

        let db = &*self.db_pool;
        let email = normalize_email(&request.email);

        let existing = UserEntity::find()
            .filter(user::Column::Email.eq(email.as_str()))
            .one(db)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::Conflict("User already exists".to_string()));
        }

        let user = create_user(db, request.name.trim(), &email, request.password, ADMIN_ROLE).await?;
        let token = self.issue_token(&user)?;

        info!(user_id = %user.id, "Operator registered");
        Ok(AuthResponse {
            user: user.into(),
            token,
        })
    }

    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn profile(&self, user_id: Uuid) -> Result<UserResponse, ServiceError> {
        let db = &*self.db_pool;
        UserEntity::find_by_id(user_id)
            .one(db)
            .await?
            .map(Into::into)
            .ok_or_else(|| ServiceError::NotFound("User not found".to_string()))
    }
}

/// Hashes `password` off the async runtime and inserts the user.
pub async fn create_user<C: sea_orm::ConnectionTrait>(
    db: &C,
    name: &str,
    email: &str,
    plain_password: String,
    role: &str,
) -> Result<user::Model, ServiceError> {
    let password_hash = tokio::task::spawn_blocking(move || password::hash_password(&plain_password))
        .await
        .map_err(|e| ServiceError::InternalError(e.to_string()))?
        .map_err(|e| ServiceError::HashError(e.to_string()))?;

    let now = Utc::now();
    let model = UserActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        email: Set(normalize_email(email)),
        password_hash: Set(password_hash),
        role: Set(role.to_string()),
        created_at: Set(now),
        updated_at: Set(now),
    };

    model.insert(db).await.map_err(|e| {
        error!(error = %e, "Failed to create user");
        ServiceError::from_write_error(e, "User already exists")
    })
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Authentication middleware for protected routes.
///
/// Expects an `Arc<AuthService>` in the request extensions, put there by the
/// router's outer layer.
pub async fn auth_middleware(mut request: Request, next: Next) -> Response {
    let auth_service = match request.extensions().get::<Arc<AuthService>>() {
        Some(service) => service.clone(),
        None => return AuthError::ServiceUnavailable.into_response(),
    };

    let Some(token) = bearer_token(request.headers()) else {
        return AuthError::MissingToken.into_response();
    };

    let claims = match auth_service.validate_token(token) {
        Ok(claims) => claims,
        Err(e) => return e.into_response(),
    };

    let user_id = match Uuid::parse_str(&claims.sub) {
        Ok(id) => id,
        Err(_) => return AuthError::InvalidToken.into_response(),
    };

    request.extensions_mut().insert(AuthUser {
        user_id,
        email: claims.email,
        name: claims.name,
        role: claims.role,
    });
    next.run(request).await
}

/// Extension methods for adding authentication to routers
pub trait AuthRouterExt {
    fn with_auth(self) -> Self;
}

impl<S> AuthRouterExt for axum::Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_auth(self) -> Self {
        self.layer(axum::middleware::from_fn(auth_middleware))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn service_with(lifetime: Duration) -> AuthService {
        let db = sea_orm::DatabaseConnection::Disconnected;
        AuthService::new(
            AuthConfig {
                jwt_secret: "unit-test-secret-that-is-long-enough-000".to_string(),
                issuer: "lockersys-api".to_string(),
                token_lifetime: lifetime,
            },
            Arc::new(db),
        )
    }

    fn operator() -> user::Model {
        let now = Utc::now();
        user::Model {
            id: Uuid::new_v4(),
            name: "Admin User".to_string(),
            email: "admin@lockers.com".to_string(),
            password_hash: String::new(),
            role: ADMIN_ROLE.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn issued_token_validates() {
        let service = service_with(Duration::from_secs(3600));
        let user = operator();
        let token = service.issue_token(&user).unwrap();
        let claims = service.validate_token(&token).unwrap();
        assert_eq!(claims.sub, user.id.to_string());
        assert_eq!(claims.role, "admin");
        assert_eq!(claims.iss, "lockersys-api");
    }

    #[test]
    fn token_from_another_secret_is_rejected() {
        let token = service_with(Duration::from_secs(3600))
            .issue_token(&operator())
            .unwrap();
        let other = AuthService::new(
            AuthConfig {
                jwt_secret: "a-completely-different-secret-of-length".to_string(),
                issuer: "lockersys-api".to_string(),
                token_lifetime: Duration::from_secs(3600),
            },
            Arc::new(sea_orm::DatabaseConnection::Disconnected),
        );
        assert!(matches!(
            other.validate_token(&token),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn expired_token_is_reported_as_expired() {
        let service = service_with(Duration::from_secs(3600));
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: Uuid::new_v4().to_string(),
            email: "admin@lockers.com".into(),
            name: "Admin User".into(),
            role: "admin".into(),
            iat: now - 7200,
            exp: now - 3600,
            iss: "lockersys-api".into(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"unit-test-secret-that-is-long-enough-000"),
        )
        .unwrap();
        assert!(matches!(
            service.validate_token(&token),
            Err(AuthError::TokenExpired)
        ));
    }

    #[test]
    fn bearer_token_parsing() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(bearer_token(&headers), Some("abc.def"));
    }
}
