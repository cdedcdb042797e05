use crate::{
    db::DbPool,
    entities::locker::{
        self, ActiveModel as LockerActiveModel, Entity as LockerEntity, LockerSize, LockerStatus,
        Model as LockerModel,
    },
    entities::rental::{self, Entity as RentalEntity, RentalStatus},
    errors::ServiceError,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::{
    contains_pattern, search_term, validate_non_negative_price, Page, PageRequest,
};

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateLockerRequest {
    #[validate(length(min = 1, max = 32, message = "Locker number is required (max 32 characters)"))]
    pub number: String,
    #[validate(length(min = 1, message = "Location is required"))]
    pub location: String,
    pub size: LockerSize,
    #[validate(custom = "validate_non_negative_price")]
    #[schema(value_type = String, example = "300.00")]
    pub monthly_price: Decimal,
    /// Defaults to `available`; `rented` is reserved for the rental ledger
    pub status: Option<LockerStatus>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLockerRequest {
    #[validate(length(min = 1, max = 32, message = "Locker number cannot be empty (max 32 characters)"))]
    pub number: Option<String>,
    #[validate(length(min = 1, message = "Location cannot be empty"))]
    pub location: Option<String>,
    pub size: Option<LockerSize>,
    #[validate(custom = "validate_non_negative_price")]
    #[schema(value_type = Option<String>, example = "350.00")]
    pub monthly_price: Option<Decimal>,
    pub status: Option<LockerStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LockerResponse {
    pub id: Uuid,
    pub number: String,
    pub location: String,
    pub size: LockerSize,
    pub status: LockerStatus,
    #[schema(value_type = String, example = "300.00")]
    #[serde(serialize_with = "crate::services::money::serialize")]
    pub monthly_price: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<LockerModel> for LockerResponse {
    fn from(model: LockerModel) -> Self {
        Self {
            id: model.id,
            number: model.number,
            location: model.location,
            size: model.size,
            status: model.status,
            monthly_price: model.monthly_price,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Optional narrowing applied to locker listings.
#[derive(Debug, Clone, Default)]
pub struct LockerFilter {
    pub status: Option<LockerStatus>,
    pub size: Option<LockerSize>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LockerStats {
    pub total: u64,
    pub available: u64,
    pub rented: u64,
    pub maintenance: u64,
    pub reserved: u64,
}

/// Locker registry backed by the `lockers` table.
#[derive(Clone)]
pub struct LockerService {
    db_pool: Arc<DbPool>,
}

impl LockerService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Registers a new locker.
    #[instrument(skip(self, request), fields(number = %request.number))]
    pub async fn create_locker(
        &self,
        request: CreateLockerRequest,
    ) -> Result<LockerResponse, ServiceError> {
        request.validate()?;

        let status = request.status.unwrap_or(LockerStatus::Available);
        if status == LockerStatus::Rented {
            return Err(ServiceError::ValidationError(
                "A locker can only become rented through a rental".to_string(),
            ));
        }

        let db = &*self.db_pool;
        let now = Utc::now();
        let locker_id = Uuid::new_v4();
        let number = request.number.trim().to_string();

        let model = LockerActiveModel {
            id: Set(locker_id),
            number: Set(number.clone()),
            location: Set(request.location.trim().to_string()),
            size: Set(request.size),
            status: Set(status),
            monthly_price: Set(request.monthly_price),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let locker = model.insert(db).await.map_err(|e| {
            error!(error = %e, locker_id = %locker_id, "Failed to create locker");
            ServiceError::from_write_error(e, format!("Locker number {} already exists", number))
        })?;

        info!(locker_id = %locker_id, number = %locker.number, "Locker created successfully");
        Ok(locker.into())
    }

    #[instrument(skip(self), fields(locker_id = %locker_id))]
    pub async fn get_locker(&self, locker_id: Uuid) -> Result<LockerResponse, ServiceError> {
        let db = &*self.db_pool;
        LockerEntity::find_by_id(locker_id)
            .one(db)
            .await?
            .map(Into::into)
            .ok_or_else(|| ServiceError::NotFound(format!("Locker {} not found", locker_id)))
    }

    /// Lists lockers ordered by number.
    #[instrument(skip(self, filter))]
    pub async fn list_lockers(
        &self,
        filter: LockerFilter,
        page: PageRequest,
    ) -> Result<Page<LockerResponse>, ServiceError> {
        let db = &*self.db_pool;

        let mut query = LockerEntity::find();
        if let Some(status) = filter.status {
            query = query.filter(locker::Column::Status.eq(status));
        }
        if let Some(size) = filter.size {
            query = query.filter(locker::Column::Size.eq(size));
        }
        if let Some(term) = search_term(filter.search.as_deref()) {
            query = query.filter(
                Condition::any()
                    .add(locker::Column::Number.like(contains_pattern(&term)))
                    .add(locker::Column::Location.like(contains_pattern(&term))),
            );
        }

        let paginator = query
            .order_by_asc(locker::Column::Number)
            .paginate(db, page.limit);

        let total = paginator.num_items().await.map_err(|e| {
            error!(error = %e, "Failed to count lockers");
            ServiceError::DatabaseError(e)
        })?;

        let lockers = if page.starts_after(total) {
            Vec::new()
        } else {
            paginator.fetch_page(page.page - 1).await.map_err(|e| {
                error!(error = %e, page = page.page, limit = page.limit, "Failed to fetch lockers page");
                ServiceError::DatabaseError(e)
            })?
        };

        Ok(Page {
            items: lockers.into_iter().map(Into::into).collect(),
            total,
            page: page.page,
            limit: page.limit,
        })
    }

    /// Every locker that can take a new rental right now.
    #[instrument(skip(self))]
    pub async fn list_available(&self) -> Result<Vec<LockerResponse>, ServiceError> {
        let db = &*self.db_pool;
        let lockers = LockerEntity::find()
            .filter(locker::Column::Status.eq(LockerStatus::Available))
            .order_by_asc(locker::Column::Number)
            .all(db)
            .await?;
        Ok(lockers.into_iter().map(Into::into).collect())
    }

    /// Applies an operator edit.
    ///
    /// `rented` cannot be assigned here, and a locker held by an active rental
    /// keeps its `rented` status until the rental ends.
    #[instrument(skip(self, request), fields(locker_id = %locker_id))]
    pub async fn update_locker(
        &self,
        locker_id: Uuid,
        request: UpdateLockerRequest,
    ) -> Result<LockerResponse, ServiceError> {
        request.validate()?;

        let db = &*self.db_pool;
        let txn = db.begin().await.map_err(|e| {
            error!(error = %e, locker_id = %locker_id, "Failed to start transaction for locker update");
            ServiceError::DatabaseError(e)
        })?;

        let locker = LockerEntity::find_by_id(locker_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                warn!(locker_id = %locker_id, "Locker not found for update");
                ServiceError::NotFound(format!("Locker {} not found", locker_id))
            })?;

        if let Some(status) = request.status {
            if status != locker.status {
                if status == LockerStatus::Rented {
                    return Err(ServiceError::ValidationError(
                        "A locker can only become rented through a rental".to_string(),
                    ));
                }
                let active = RentalEntity::find()
                    .filter(rental::Column::LockerId.eq(locker_id))
                    .filter(rental::Column::Status.eq(RentalStatus::Active))
                    .count(&txn)
                    .await?;
                if active > 0 {
                    warn!(locker_id = %locker_id, "Refusing status change on a locker with an active rental");
                    return Err(ServiceError::Conflict(format!(
                        "Locker {} has an active rental",
                        locker.number
                    )));
                }
            }
        }

        let mut model: LockerActiveModel = locker.into();
        if let Some(number) = &request.number {
            model.number = Set(number.trim().to_string());
        }
        if let Some(location) = request.location {
            model.location = Set(location.trim().to_string());
        }
        if let Some(size) = request.size {
            model.size = Set(size);
        }
        if let Some(price) = request.monthly_price {
            model.monthly_price = Set(price);
        }
        if let Some(status) = request.status {
            model.status = Set(status);
        }
        model.updated_at = Set(Utc::now());

        let updated = model.update(&txn).await.map_err(|e| {
            error!(error = %e, locker_id = %locker_id, "Failed to update locker");
            ServiceError::from_write_error(
                e,
                format!(
                    "Locker number {} already exists",
                    request.number.as_deref().unwrap_or_default().trim()
                ),
            )
        })?;

        txn.commit().await.map_err(|e| {
            error!(error = %e, locker_id = %locker_id, "Failed to commit locker update");
            ServiceError::DatabaseError(e)
        })?;

        info!(locker_id = %locker_id, status = ?updated.status, "Locker updated successfully");
        Ok(updated.into())
    }

    /// Removes a locker that no rental references.
    #[instrument(skip(self), fields(locker_id = %locker_id))]
    pub async fn delete_locker(&self, locker_id: Uuid) -> Result<(), ServiceError> {
        let db = &*self.db_pool;
        let txn = db.begin().await.map_err(|e| {
            error!(error = %e, locker_id = %locker_id, "Failed to start transaction for locker deletion");
            ServiceError::DatabaseError(e)
        })?;

        let locker = LockerEntity::find_by_id(locker_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Locker {} not found", locker_id)))?;

        let referencing = RentalEntity::find()
            .filter(rental::Column::LockerId.eq(locker_id))
            .count(&txn)
            .await?;
        if referencing > 0 {
            warn!(locker_id = %locker_id, rentals = referencing, "Refusing to delete a locker with rentals");
            return Err(ServiceError::Conflict(format!(
                "Locker {} has rental history and cannot be deleted",
                locker.number
            )));
        }

        LockerEntity::delete_by_id(locker_id)
            .exec(&txn)
            .await
            .map_err(|e| {
                error!(error = %e, locker_id = %locker_id, "Failed to delete locker");
                ServiceError::from_write_error(
                    e,
                    format!("Locker {} has rental history and cannot be deleted", locker.number),
                )
            })?;

        txn.commit().await.map_err(|e| {
            error!(error = %e, locker_id = %locker_id, "Failed to commit locker deletion");
            ServiceError::DatabaseError(e)
        })?;

        info!(locker_id = %locker_id, "Locker deleted successfully");
        Ok(())
    }

    /// Per-status locker counts.
    #[instrument(skip(self))]
    pub async fn locker_stats(&self) -> Result<LockerStats, ServiceError> {
        let db = &*self.db_pool;
        let count_with = |status: LockerStatus| {
            LockerEntity::find()
                .filter(locker::Column::Status.eq(status))
                .count(db)
        };

        Ok(LockerStats {
            total: LockerEntity::find().count(db).await?,
            available: count_with(LockerStatus::Available).await?,
            rented: count_with(LockerStatus::Rented).await?,
            maintenance: count_with(LockerStatus::Maintenance).await?,
            reserved: count_with(LockerStatus::Reserved).await?,
        })
    }
}
