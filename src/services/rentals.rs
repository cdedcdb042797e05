use crate::{
    db::DbPool,
    entities::client::{self, Entity as ClientEntity, Model as ClientModel},
    entities::locker::{
        self, ActiveModel as LockerActiveModel, Entity as LockerEntity, LockerSize, LockerStatus,
        Model as LockerModel,
    },
    entities::payment::{self, Entity as PaymentEntity},
    entities::rental::{
        self, ActiveModel as RentalActiveModel, Entity as RentalEntity, Model as RentalModel,
        PaymentStatus, RentalStatus,
    },
    errors::ServiceError,
};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseTransaction, EntityTrait,
    JoinType, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::billing;
use super::{
    contains_pattern, search_term, validate_non_negative_price, validate_non_negative_total,
    validate_positive_price, Page, PageRequest,
};

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRentalRequest {
    pub locker_id: Uuid,
    pub client_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[validate(custom = "validate_positive_price")]
    #[schema(value_type = String, example = "300.00")]
    pub monthly_price: Decimal,
    #[validate(custom = "validate_non_negative_total")]
    #[schema(value_type = String, example = "1200.00")]
    pub total_amount: Decimal,
    /// New rentals always start `active`
    pub status: Option<RentalStatus>,
    pub payment_status: Option<PaymentStatus>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRentalRequest {
    pub locker_id: Option<Uuid>,
    pub client_id: Option<Uuid>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[validate(custom = "validate_positive_price")]
    #[schema(value_type = Option<String>)]
    pub monthly_price: Option<Decimal>,
    #[validate(custom = "validate_non_negative_total")]
    #[schema(value_type = Option<String>)]
    pub total_amount: Option<Decimal>,
    pub status: Option<RentalStatus>,
    pub payment_status: Option<PaymentStatus>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LockerSummary {
    pub id: Uuid,
    pub number: String,
    pub location: String,
    pub size: LockerSize,
    pub status: LockerStatus,
}

impl From<LockerModel> for LockerSummary {
    fn from(model: LockerModel) -> Self {
        Self {
            id: model.id,
            number: model.number,
            location: model.location,
            size: model.size,
            status: model.status,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub document: String,
}

impl From<ClientModel> for ClientSummary {
    fn from(model: ClientModel) -> Self {
        Self {
            id: model.id,
            name: model.name,
            email: model.email,
            document: model.document,
        }
    }
}

/// A rental with its locker and client resolved for display.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RentalResponse {
    pub id: Uuid,
    pub locker_id: Uuid,
    pub client_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[schema(value_type = String)]
    #[serde(serialize_with = "crate::services::money::serialize")]
    pub monthly_price: Decimal,
    #[schema(value_type = String)]
    #[serde(serialize_with = "crate::services::money::serialize")]
    pub total_amount: Decimal,
    pub status: RentalStatus,
    pub payment_status: PaymentStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub locker: Option<LockerSummary>,
    pub client: Option<ClientSummary>,
}

impl RentalResponse {
    fn from_parts(
        model: RentalModel,
        locker: Option<LockerSummary>,
        client: Option<ClientSummary>,
    ) -> Self {
        Self {
            id: model.id,
            locker_id: model.locker_id,
            client_id: model.client_id,
            start_date: model.start_date,
            end_date: model.end_date,
            monthly_price: model.monthly_price,
            total_amount: model.total_amount,
            status: model.status,
            payment_status: model.payment_status,
            notes: model.notes,
            created_at: model.created_at,
            updated_at: model.updated_at,
            locker,
            client,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RentalFilter {
    pub search: Option<String>,
    pub status: Option<RentalStatus>,
    pub payment_status: Option<PaymentStatus>,
    pub locker_id: Option<Uuid>,
    pub client_id: Option<Uuid>,
}

/// Price preview for a prospective rental.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RentalQuote {
    pub months: u32,
    #[schema(value_type = String)]
    #[serde(serialize_with = "crate::services::money::serialize")]
    pub total_amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RentalStats {
    pub total: u64,
    pub active: u64,
    pub overdue: u64,
    pub completed: u64,
    pub cancelled: u64,
    /// Sum of `totalAmount` over rentals whose payment status is `paid`
    #[schema(value_type = String)]
    #[serde(serialize_with = "crate::services::money::serialize")]
    pub revenue: Decimal,
}

/// Prices a rental with the billing month rule.
pub fn quote(
    start_date: NaiveDate,
    end_date: NaiveDate,
    monthly_price: Decimal,
) -> Result<RentalQuote, ServiceError> {
    check_dates(start_date, end_date)?;
    validate_non_negative_price(&monthly_price).map_err(|e| {
        ServiceError::ValidationError(
            e.message
                .map(|m| m.into_owned())
                .unwrap_or_else(|| "Invalid monthly price".to_string()),
        )
    })?;

    let total_amount = billing::total_amount(start_date, end_date, monthly_price)
        .ok_or_else(|| ServiceError::ValidationError("Total amount is too large".to_string()))?;
    Ok(RentalQuote {
        months: billing::months_between(start_date, end_date),
        total_amount,
    })
}

fn check_dates(start_date: NaiveDate, end_date: NaiveDate) -> Result<(), ServiceError> {
    if end_date < start_date {
        return Err(ServiceError::ValidationError(
            "End date must be on or after the start date".to_string(),
        ));
    }
    Ok(())
}

fn clean_notes(notes: Option<String>) -> Option<String> {
    notes.map(|n| n.trim().to_string()).filter(|n| !n.is_empty())
}

/// Sum of `total_amount` over rentals marked paid.
pub(crate) async fn paid_revenue<C: ConnectionTrait>(db: &C) -> Result<Decimal, ServiceError> {
    let amounts: Vec<Decimal> = RentalEntity::find()
        .select_only()
        .column(rental::Column::TotalAmount)
        .filter(rental::Column::PaymentStatus.eq(PaymentStatus::Paid))
        .into_tuple::<Decimal>()
        .all(db)
        .await?;
    Ok(amounts.into_iter().sum())
}

/// The rental ledger.
///
/// Owns the coupling between rentals and locker availability: while a rental
/// is `active` its locker is `rented`, and a locker holds at most one active
/// rental. Every write that can break either rule runs in one transaction.
#[derive(Clone)]
pub struct RentalService {
    db_pool: Arc<DbPool>,
}

impl RentalService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Opens a rental and marks its locker rented.
    #[instrument(skip(self, request), fields(locker_id = %request.locker_id, client_id = %request.client_id))]
    pub async fn create_rental(
        &self,
        request: CreateRentalRequest,
    ) -> Result<RentalResponse, ServiceError> {
        request.validate()?;
        check_dates(request.start_date, request.end_date)?;
        if let Some(status) = request.status {
            if status != RentalStatus::Active {
                return Err(ServiceError::ValidationError(
                    "New rentals must start as active".to_string(),
                ));
            }
        }

        let db = &*self.db_pool;
        let now = Utc::now();
        let rental_id = Uuid::new_v4();

        let txn = db.begin().await.map_err(|e| {
            error!(error = %e, "Failed to start transaction for rental creation");
            ServiceError::DatabaseError(e)
        })?;

        let locker = LockerEntity::find_by_id(request.locker_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                warn!(locker_id = %request.locker_id, "Rental references an unknown locker");
                ServiceError::ValidationError(format!("Locker {} does not exist", request.locker_id))
            })?;

        let client = ClientEntity::find_by_id(request.client_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                warn!(client_id = %request.client_id, "Rental references an unknown client");
                ServiceError::ValidationError(format!("Client {} does not exist", request.client_id))
            })?;

        Self::ensure_locker_claimable(&txn, &locker, None).await?;

        let model = RentalActiveModel {
            id: Set(rental_id),
            locker_id: Set(locker.id),
            client_id: Set(client.id),
            start_date: Set(request.start_date),
            end_date: Set(request.end_date),
            monthly_price: Set(request.monthly_price),
            total_amount: Set(request.total_amount),
            status: Set(RentalStatus::Active),
            payment_status: Set(request.payment_status.unwrap_or(PaymentStatus::Pending)),
            notes: Set(clean_notes(request.notes)),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let rental = model.insert(&txn).await.map_err(|e| {
            error!(error = %e, rental_id = %rental_id, "Failed to insert rental");
            ServiceError::from_write_error(
                e,
                format!("Locker {} already has an active rental", locker.number),
            )
        })?;

        let locker = Self::set_locker_status(&txn, locker, LockerStatus::Rented).await?;

        txn.commit().await.map_err(|e| {
            error!(error = %e, rental_id = %rental_id, "Failed to commit rental creation");
            ServiceError::DatabaseError(e)
        })?;

        info!(rental_id = %rental_id, locker_id = %locker.id, client_id = %client.id, "Rental created successfully");
        Ok(RentalResponse::from_parts(
            rental,
            Some(locker.into()),
            Some(client.into()),
        ))
    }

    #[instrument(skip(self), fields(rental_id = %rental_id))]
    pub async fn get_rental(&self, rental_id: Uuid) -> Result<RentalResponse, ServiceError> {
        let db = &*self.db_pool;
        let rental = RentalEntity::find_by_id(rental_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Rental {} not found", rental_id)))?;

        let mut resolved = self.resolve(vec![rental]).await?;
        resolved
            .pop()
            .ok_or_else(|| ServiceError::InternalError("rental vanished while resolving".into()))
    }

    /// Lists rentals newest first with locker and client resolved.
    #[instrument(skip(self, filter))]
    pub async fn list_rentals(
        &self,
        filter: RentalFilter,
        page: PageRequest,
    ) -> Result<Page<RentalResponse>, ServiceError> {
        let db = &*self.db_pool;

        let mut query = RentalEntity::find();
        if let Some(status) = filter.status {
            query = query.filter(rental::Column::Status.eq(status));
        }
        if let Some(payment_status) = filter.payment_status {
            query = query.filter(rental::Column::PaymentStatus.eq(payment_status));
        }
        if let Some(locker_id) = filter.locker_id {
            query = query.filter(rental::Column::LockerId.eq(locker_id));
        }
        if let Some(client_id) = filter.client_id {
            query = query.filter(rental::Column::ClientId.eq(client_id));
        }
        if let Some(term) = search_term(filter.search.as_deref()) {
            query = query
                .join(JoinType::LeftJoin, rental::Relation::Locker.def())
                .join(JoinType::LeftJoin, rental::Relation::Client.def())
                .filter(
                    Condition::any()
                        .add(rental::Column::Notes.like(contains_pattern(&term)))
                        .add(locker::Column::Number.like(contains_pattern(&term)))
                        .add(client::Column::Name.like(contains_pattern(&term))),
                );
        }

        let paginator = query
            .order_by_desc(rental::Column::CreatedAt)
            .order_by_desc(rental::Column::Id)
            .paginate(db, page.limit);

        let total = paginator.num_items().await.map_err(|e| {
            error!(error = %e, "Failed to count rentals");
            ServiceError::DatabaseError(e)
        })?;

        let rentals = if page.starts_after(total) {
            Vec::new()
        } else {
            paginator.fetch_page(page.page - 1).await.map_err(|e| {
                error!(error = %e, page = page.page, limit = page.limit, "Failed to fetch rentals page");
                ServiceError::DatabaseError(e)
            })?
        };

        Ok(Page {
            items: self.resolve(rentals).await?,
            total,
            page: page.page,
            limit: page.limit,
        })
    }

    /// Every rental of one locker, newest first.
    #[instrument(skip(self), fields(locker_id = %locker_id))]
    pub async fn rentals_for_locker(
        &self,
        locker_id: Uuid,
    ) -> Result<Vec<RentalResponse>, ServiceError> {
        let db = &*self.db_pool;
        if LockerEntity::find_by_id(locker_id).one(db).await?.is_none() {
            return Err(ServiceError::NotFound(format!("Locker {} not found", locker_id)));
        }

        let rentals = RentalEntity::find()
            .filter(rental::Column::LockerId.eq(locker_id))
            .order_by_desc(rental::Column::CreatedAt)
            .all(db)
            .await?;
        self.resolve(rentals).await
    }

    /// Every rental of one client, newest first.
    #[instrument(skip(self), fields(client_id = %client_id))]
    pub async fn rentals_for_client(
        &self,
        client_id: Uuid,
    ) -> Result<Vec<RentalResponse>, ServiceError> {
        let db = &*self.db_pool;
        if ClientEntity::find_by_id(client_id).one(db).await?.is_none() {
            return Err(ServiceError::NotFound(format!("Client {} not found", client_id)));
        }

        let rentals = RentalEntity::find()
            .filter(rental::Column::ClientId.eq(client_id))
            .order_by_desc(rental::Column::CreatedAt)
            .all(db)
            .await?;
        self.resolve(rentals).await
    }

    /// Partial update.
    ///
    /// Only status changes into or out of `active`, and moving an active rental
    /// to another locker, touch locker status. Everything else is a plain
    /// overwrite of the supplied fields.
    #[instrument(skip(self, request), fields(rental_id = %rental_id))]
    pub async fn update_rental(
        &self,
        rental_id: Uuid,
        request: UpdateRentalRequest,
    ) -> Result<RentalResponse, ServiceError> {
        request.validate()?;

        let db = &*self.db_pool;
        let txn = db.begin().await.map_err(|e| {
            error!(error = %e, rental_id = %rental_id, "Failed to start transaction for rental update");
            ServiceError::DatabaseError(e)
        })?;

        let current = RentalEntity::find_by_id(rental_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                warn!(rental_id = %rental_id, "Rental not found for update");
                ServiceError::NotFound(format!("Rental {} not found", rental_id))
            })?;

        let start_date = request.start_date.unwrap_or(current.start_date);
        let end_date = request.end_date.unwrap_or(current.end_date);
        check_dates(start_date, end_date)?;

        let old_locker_id = current.locker_id;
        let new_locker_id = request.locker_id.unwrap_or(old_locker_id);
        let was_active = current.status == RentalStatus::Active;
        let new_status = request.status.unwrap_or(current.status);
        let will_be_active = new_status == RentalStatus::Active;
        let locker_changed = new_locker_id != old_locker_id;

        if let Some(client_id) = request.client_id {
            if client_id != current.client_id
                && ClientEntity::find_by_id(client_id).one(&txn).await?.is_none()
            {
                return Err(ServiceError::ValidationError(format!(
                    "Client {} does not exist",
                    client_id
                )));
            }
        }

        let target_locker = if locker_changed {
            Some(
                LockerEntity::find_by_id(new_locker_id)
                    .one(&txn)
                    .await?
                    .ok_or_else(|| {
                        ServiceError::ValidationError(format!(
                            "Locker {} does not exist",
                            new_locker_id
                        ))
                    })?,
            )
        } else {
            None
        };

        let claims_locker = will_be_active && (!was_active || locker_changed);
        let releases_locker = was_active && (!will_be_active || locker_changed);

        let claimed = if claims_locker {
            let locker = match target_locker {
                Some(locker) => locker,
                None => LockerEntity::find_by_id(new_locker_id)
                    .one(&txn)
                    .await?
                    .ok_or_else(|| {
                        ServiceError::ValidationError(format!(
                            "Locker {} does not exist",
                            new_locker_id
                        ))
                    })?,
            };
            Self::ensure_locker_claimable(&txn, &locker, Some(rental_id)).await?;
            Some(locker)
        } else {
            None
        };

        let mut model: RentalActiveModel = current.into();
        model.locker_id = Set(new_locker_id);
        if let Some(client_id) = request.client_id {
            model.client_id = Set(client_id);
        }
        model.start_date = Set(start_date);
        model.end_date = Set(end_date);
        if let Some(price) = request.monthly_price {
            model.monthly_price = Set(price);
        }
        if let Some(total) = request.total_amount {
            model.total_amount = Set(total);
        }
        model.status = Set(new_status);
        if let Some(payment_status) = request.payment_status {
            model.payment_status = Set(payment_status);
        }
        if request.notes.is_some() {
            model.notes = Set(clean_notes(request.notes));
        }
        model.updated_at = Set(Utc::now());

        let updated = model.update(&txn).await.map_err(|e| {
            error!(error = %e, rental_id = %rental_id, "Failed to update rental");
            ServiceError::from_write_error(e, "Locker already has an active rental")
        })?;

        if releases_locker {
            Self::release_locker(&txn, old_locker_id).await?;
        }
        if let Some(locker) = claimed {
            Self::set_locker_status(&txn, locker, LockerStatus::Rented).await?;
        }

        txn.commit().await.map_err(|e| {
            error!(error = %e, rental_id = %rental_id, "Failed to commit rental update");
            ServiceError::DatabaseError(e)
        })?;

        info!(
            rental_id = %rental_id,
            status = ?updated.status,
            released = releases_locker,
            claimed = claims_locker,
            "Rental updated successfully"
        );

        let mut resolved = self.resolve(vec![updated]).await?;
        resolved
            .pop()
            .ok_or_else(|| ServiceError::InternalError("rental vanished while resolving".into()))
    }

    /// Removes a rental and its payments, freeing the locker.
    #[instrument(skip(self), fields(rental_id = %rental_id))]
    pub async fn delete_rental(&self, rental_id: Uuid) -> Result<(), ServiceError> {
        let db = &*self.db_pool;
        let txn = db.begin().await.map_err(|e| {
            error!(error = %e, rental_id = %rental_id, "Failed to start transaction for rental deletion");
            ServiceError::DatabaseError(e)
        })?;

        let rental = RentalEntity::find_by_id(rental_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                warn!(rental_id = %rental_id, "Rental not found for deletion");
                ServiceError::NotFound(format!("Rental {} not found", rental_id))
            })?;

        PaymentEntity::delete_many()
            .filter(payment::Column::RentalId.eq(rental_id))
            .exec(&txn)
            .await
            .map_err(|e| {
                error!(error = %e, rental_id = %rental_id, "Failed to delete rental payments");
                ServiceError::DatabaseError(e)
            })?;

        RentalEntity::delete_by_id(rental_id)
            .exec(&txn)
            .await
            .map_err(|e| {
                error!(error = %e, rental_id = %rental_id, "Failed to delete rental");
                ServiceError::DatabaseError(e)
            })?;

        Self::release_locker(&txn, rental.locker_id).await?;

        txn.commit().await.map_err(|e| {
            error!(error = %e, rental_id = %rental_id, "Failed to commit rental deletion");
            ServiceError::DatabaseError(e)
        })?;

        info!(rental_id = %rental_id, locker_id = %rental.locker_id, "Rental deleted successfully");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn rental_stats(&self) -> Result<RentalStats, ServiceError> {
        let db = &*self.db_pool;
        let count_with = |status: RentalStatus| {
            RentalEntity::find()
                .filter(rental::Column::Status.eq(status))
                .count(db)
        };

        Ok(RentalStats {
            total: RentalEntity::find().count(db).await?,
            active: count_with(RentalStatus::Active).await?,
            overdue: count_with(RentalStatus::Overdue).await?,
            completed: count_with(RentalStatus::Completed).await?,
            cancelled: count_with(RentalStatus::Cancelled).await?,
            revenue: paid_revenue(db).await?,
        })
    }

    /// Refuses lockers under maintenance or already held by another active
    /// rental.
    async fn ensure_locker_claimable(
        txn: &DatabaseTransaction,
        locker: &LockerModel,
        exclude_rental: Option<Uuid>,
    ) -> Result<(), ServiceError> {
        if locker.status == LockerStatus::Maintenance {
            return Err(ServiceError::ValidationError(format!(
                "Locker {} is under maintenance",
                locker.number
            )));
        }

        let mut active = RentalEntity::find()
            .filter(rental::Column::LockerId.eq(locker.id))
            .filter(rental::Column::Status.eq(RentalStatus::Active));
        if let Some(rental_id) = exclude_rental {
            active = active.filter(rental::Column::Id.ne(rental_id));
        }

        if active.count(txn).await? > 0 {
            warn!(locker_id = %locker.id, "Locker already has an active rental");
            return Err(ServiceError::Conflict(format!(
                "Locker {} already has an active rental",
                locker.number
            )));
        }
        Ok(())
    }

    /// Puts a rented locker back to `available` unless another active rental
    /// still holds it. Lockers in maintenance or reserved are left alone.
    async fn release_locker(
        txn: &DatabaseTransaction,
        locker_id: Uuid,
    ) -> Result<(), ServiceError> {
        let Some(locker) = LockerEntity::find_by_id(locker_id).one(txn).await? else {
            return Ok(());
        };
        if locker.status != LockerStatus::Rented {
            return Ok(());
        }

        let still_active = RentalEntity::find()
            .filter(rental::Column::LockerId.eq(locker_id))
            .filter(rental::Column::Status.eq(RentalStatus::Active))
            .count(txn)
            .await?;
        if still_active == 0 {
            Self::set_locker_status(txn, locker, LockerStatus::Available).await?;
        }
        Ok(())
    }

    async fn set_locker_status(
        txn: &DatabaseTransaction,
        locker: LockerModel,
        status: LockerStatus,
    ) -> Result<LockerModel, ServiceError> {
        let locker_id = locker.id;
        let mut model: LockerActiveModel = locker.into();
        model.status = Set(status);
        model.updated_at = Set(Utc::now());
        model.update(txn).await.map_err(|e| {
            error!(error = %e, locker_id = %locker_id, status = ?status, "Failed to update locker status");
            ServiceError::DatabaseError(e)
        })
    }

    /// Attaches locker and client summaries with one query per table.
    async fn resolve(&self, rentals: Vec<RentalModel>) -> Result<Vec<RentalResponse>, ServiceError> {
        if rentals.is_empty() {
            return Ok(Vec::new());
        }
        let db = &*self.db_pool;

        let locker_ids: Vec<Uuid> = rentals.iter().map(|r| r.locker_id).collect();
        let client_ids: Vec<Uuid> = rentals.iter().map(|r| r.client_id).collect();

        let lockers: HashMap<Uuid, LockerModel> = LockerEntity::find()
            .filter(locker::Column::Id.is_in(locker_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|l| (l.id, l))
            .collect();
        let clients: HashMap<Uuid, ClientModel> = ClientEntity::find()
            .filter(client::Column::Id.is_in(client_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|c| (c.id, c))
            .collect();

        Ok(rentals
            .into_iter()
            .map(|rental| {
                let locker = lockers.get(&rental.locker_id).cloned().map(Into::into);
                let client = clients.get(&rental.client_id).cloned().map(Into::into);
                RentalResponse::from_parts(rental, locker, client)
            })
            .collect())
    }
}
