pub mod auth;
pub mod clients;
pub mod common;
pub mod dashboard;
pub mod health;
pub mod lockers;
pub mod payments;
pub mod rentals;

use crate::{
    auth::{AuthConfig, AuthService},
    config::AppConfig,
    db::DbPool,
    services::{
        clients::ClientService, dashboard::DashboardService, lockers::LockerService,
        payments::PaymentService, rentals::RentalService,
    },
};
use std::sync::Arc;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub lockers: Arc<LockerService>,
    pub clients: Arc<ClientService>,
    pub rentals: Arc<RentalService>,
    pub payments: Arc<PaymentService>,
    pub dashboard: Arc<DashboardService>,
    pub auth: Arc<AuthService>,
}

impl AppServices {
    /// Builds every service over the same shared pool.
    pub fn new(db_pool: Arc<DbPool>, config: &AppConfig) -> Self {
        Self {
            lockers: Arc::new(LockerService::new(db_pool.clone())),
            clients: Arc::new(ClientService::new(db_pool.clone())),
            rentals: Arc::new(RentalService::new(db_pool.clone())),
            payments: Arc::new(PaymentService::new(db_pool.clone())),
            dashboard: Arc::new(DashboardService::new(db_pool.clone())),
            auth: Arc::new(AuthService::new(
                AuthConfig::from_app_config(config),
                db_pool,
            )),
        }
    }
}
