use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

/// Registers the JWT bearer scheme the protected paths refer to.
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "Bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "LockerSys API",
        version = "1.0.0",
        description = r#"
# LockerSys Locker Rental API

Back office for renting lockers to clients and tracking what they pay.

## Authentication

Every endpoint except `/api/health`, `/api/auth/login` and `/api/auth/register`
requires a token obtained from `/api/auth/login`:

```
Authorization: Bearer <your-jwt-token>
```

## Responses

Successful calls return `{ "success": true, "data": ... }`; listings add `total`,
`page`, `limit` and `totalPages`. Failures return `{ "success": false, "message": ... }`.

## Pagination

- `page`: Page number (default: 1)
- `limit`: Items per page (default: 10, max: 100)
        "#
    ),
    tags(
        (name = "auth", description = "Operator sign-in and registration"),
        (name = "dashboard", description = "Summary counters"),
        (name = "lockers", description = "Locker registry"),
        (name = "clients", description = "Client registry (also served under /api/students)"),
        (name = "rentals", description = "Rental ledger"),
        (name = "payments", description = "Payments recorded against rentals"),
        (name = "health", description = "Liveness probe")
    ),
    paths(
        // Auth
        crate::handlers::auth::login,
        crate::handlers::auth::register,
        crate::handlers::auth::me,

        // Dashboard
        crate::handlers::dashboard::dashboard_stats,

        // Lockers
        crate::handlers::lockers::list_lockers,
        crate::handlers::lockers::list_available_lockers,
        crate::handlers::lockers::locker_stats,
        crate::handlers::lockers::create_locker,
        crate::handlers::lockers::get_locker,
        crate::handlers::lockers::update_locker,
        crate::handlers::lockers::delete_locker,
        crate::handlers::lockers::locker_rentals,

        // Clients
        crate::handlers::clients::list_clients,
        crate::handlers::clients::create_client,
        crate::handlers::clients::get_client,
        crate::handlers::clients::update_client,
        crate::handlers::clients::delete_client,
        crate::handlers::clients::client_rentals,

        // Rentals
        crate::handlers::rentals::list_rentals,
        crate::handlers::rentals::quote_rental,
        crate::handlers::rentals::rental_stats,
        crate::handlers::rentals::create_rental,
        crate::handlers::rentals::get_rental,
        crate::handlers::rentals::update_rental,
        crate::handlers::rentals::delete_rental,

        // Payments
        crate::handlers::payments::list_payments,
        crate::handlers::payments::create_payment,
        crate::handlers::payments::get_payment,
        crate::handlers::payments::update_payment,
        crate::handlers::payments::delete_payment,
        crate::handlers::payments::rental_payments,

        // Health
        crate::handlers::health::health_check,
    ),
    components(
        schemas(
            // Common types
            crate::MessageResponse,
            crate::errors::ErrorResponse,

            // Domain enums
            crate::entities::locker::LockerSize,
            crate::entities::locker::LockerStatus,
            crate::entities::client::ClientStatus,
            crate::entities::rental::RentalStatus,
            crate::entities::rental::PaymentStatus,
            crate::entities::payment::PaymentMethod,
            crate::entities::payment::PaymentRecordStatus,

            // Auth types
            crate::auth::LoginRequest,
            crate::auth::RegisterRequest,
            crate::auth::UserResponse,
            crate::auth::AuthResponse,

            // Locker types
            crate::services::lockers::CreateLockerRequest,
            crate::services::lockers::UpdateLockerRequest,
            crate::services::lockers::LockerResponse,
            crate::services::lockers::LockerStats,

            // Client types
            crate::services::clients::CreateClientRequest,
            crate::services::clients::UpdateClientRequest,
            crate::services::clients::ClientResponse,

            // Rental types
            crate::services::rentals::CreateRentalRequest,
            crate::services::rentals::UpdateRentalRequest,
            crate::services::rentals::RentalResponse,
            crate::services::rentals::LockerSummary,
            crate::services::rentals::ClientSummary,
            crate::services::rentals::RentalQuote,
            crate::services::rentals::RentalStats,

            // Payment types
            crate::services::payments::CreatePaymentRequest,
            crate::services::payments::UpdatePaymentRequest,
            crate::services::payments::PaymentResponse,

            // Dashboard and health
            crate::services::dashboard::DashboardStats,
            crate::handlers::health::HealthResponse,
            crate::handlers::health::DatabaseStatus,
        )
    ),
    modifiers(&BearerAuth)
)]
pub struct ApiDoc;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDoc::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_document_lists_every_resource() {
        let json = ApiDoc::openapi().to_pretty_json().unwrap();
        assert!(json.contains("LockerSys API"));
        for path in [
            "/api/auth/login",
            "/api/lockers/{id}",
            "/api/clients",
            "/api/rentals/quote",
            "/api/payments",
            "/api/dashboard/stats",
            "/api/health",
        ] {
            assert!(json.contains(path), "missing {path}");
        }
        assert!(json.contains("\"Bearer\""));
    }
}
