use crate::{
    db::DbPool,
    entities::client::Entity as ClientEntity,
    entities::locker::{self, Entity as LockerEntity, LockerStatus},
    entities::payment::{self, Entity as PaymentEntity, PaymentRecordStatus},
    entities::rental::{self, Entity as RentalEntity, RentalStatus},
    errors::ServiceError,
};
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QuerySelect};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;

use super::rentals::paid_revenue;

/// Summary counters for the back-office landing page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_lockers: u64,
    pub available_lockers: u64,
    pub rented_lockers: u64,
    pub maintenance_lockers: u64,
    pub reserved_lockers: u64,
    pub total_rentals: u64,
    pub active_rentals: u64,
    pub overdue_rentals: u64,
    pub completed_rentals: u64,
    /// Sum of `totalAmount` over paid rentals
    #[schema(value_type = String, example = "1200.00")]
    #[serde(serialize_with = "crate::services::money::serialize")]
    pub revenue: Decimal,
    pub total_clients: u64,
    pub total_payments: u64,
    /// Sum of completed payment amounts
    #[schema(value_type = String, example = "900.00")]
    #[serde(serialize_with = "crate::services::money::serialize")]
    pub payments_received: Decimal,
}

/// Read-only fold over the current tables, recomputed on every call.
#[derive(Clone)]
pub struct DashboardService {
    db_pool: Arc<DbPool>,
}

impl DashboardService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self))]
    pub async fn stats(&self) -> Result<DashboardStats, ServiceError> {
        let db = &*self.db_pool;

        let lockers_with = |status: LockerStatus| {
            LockerEntity::find()
                .filter(locker::Column::Status.eq(status))
                .count(db)
        };
        let rentals_with = |status: RentalStatus| {
            RentalEntity::find()
                .filter(rental::Column::Status.eq(status))
                .count(db)
        };

        let received: Vec<Decimal> = PaymentEntity::find()
            .select_only()
            .column(payment::Column::Amount)
            .filter(payment::Column::Status.eq(PaymentRecordStatus::Completed))
            .into_tuple::<Decimal>()
            .all(db)
            .await?;

        let stats = DashboardStats {
            total_lockers: LockerEntity::find().count(db).await?,
            available_lockers: lockers_with(LockerStatus::Available).await?,
            rented_lockers: lockers_with(LockerStatus::Rented).await?,
            maintenance_lockers: lockers_with(LockerStatus::Maintenance).await?,
            reserved_lockers: lockers_with(LockerStatus::Reserved).await?,
            total_rentals: RentalEntity::find().count(db).await?,
            active_rentals: rentals_with(RentalStatus::Active).await?,
            overdue_rentals: rentals_with(RentalStatus::Overdue).await?,
            completed_rentals: rentals_with(RentalStatus::Completed).await?,
            revenue: paid_revenue(db).await?,
            total_clients: ClientEntity::find().count(db).await?,
            total_payments: PaymentEntity::find().count(db).await?,
            payments_received: received.into_iter().sum(),
        };

        info!(
            total_lockers = stats.total_lockers,
            active_rentals = stats.active_rentals,
            "Dashboard stats computed"
        );
        Ok(stats)
    }
}
