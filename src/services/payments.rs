use crate::{
    db::DbPool,
    entities::payment::{
        self, ActiveModel as PaymentActiveModel, Entity as PaymentEntity, Model as PaymentModel,
        PaymentMethod, PaymentRecordStatus,
    },
    entities::rental::Entity as RentalEntity,
    errors::ServiceError,
};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::{validate_positive_amount, Page, PageRequest};

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentRequest {
    pub rental_id: Uuid,
    #[validate(custom = "validate_positive_amount")]
    #[schema(value_type = String, example = "300.00")]
    pub amount: Decimal,
    /// Defaults to today
    pub payment_date: Option<NaiveDate>,
    pub method: PaymentMethod,
    /// Defaults to `pending`
    pub status: Option<PaymentRecordStatus>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePaymentRequest {
    #[validate(custom = "validate_positive_amount")]
    #[schema(value_type = Option<String>)]
    pub amount: Option<Decimal>,
    pub payment_date: Option<NaiveDate>,
    pub method: Option<PaymentMethod>,
    pub status: Option<PaymentRecordStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResponse {
    pub id: Uuid,
    pub rental_id: Uuid,
    #[schema(value_type = String)]
    #[serde(serialize_with = "crate::services::money::serialize")]
    pub amount: Decimal,
    pub payment_date: NaiveDate,
    pub method: PaymentMethod,
    pub status: PaymentRecordStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PaymentModel> for PaymentResponse {
    fn from(model: PaymentModel) -> Self {
        Self {
            id: model.id,
            rental_id: model.rental_id,
            amount: model.amount,
            payment_date: model.payment_date,
            method: model.method,
            status: model.status,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PaymentFilter {
    pub rental_id: Option<Uuid>,
    pub status: Option<PaymentRecordStatus>,
    pub method: Option<PaymentMethod>,
}

/// Payments recorded against rentals. Recording a payment never changes the
/// rental's own payment status.
#[derive(Clone)]
pub struct PaymentService {
    db_pool: Arc<DbPool>,
}

impl PaymentService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self, request), fields(rental_id = %request.rental_id))]
    pub async fn create_payment(
        &self,
        request: CreatePaymentRequest,
    ) -> Result<PaymentResponse, ServiceError> {
        request.validate()?;

        let db = &*self.db_pool;
        if RentalEntity::find_by_id(request.rental_id)
            .one(db)
            .await?
            .is_none()
        {
            warn!(rental_id = %request.rental_id, "Payment references an unknown rental");
            return Err(ServiceError::ValidationError(format!(
                "Rental {} does not exist",
                request.rental_id
            )));
        }

        let now = Utc::now();
        let payment_id = Uuid::new_v4();
        let model = PaymentActiveModel {
            id: Set(payment_id),
            rental_id: Set(request.rental_id),
            amount: Set(request.amount),
            payment_date: Set(request.payment_date.unwrap_or_else(|| now.date_naive())),
            method: Set(request.method),
            status: Set(request.status.unwrap_or(PaymentRecordStatus::Pending)),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let payment = model.insert(db).await.map_err(|e| {
            error!(error = %e, payment_id = %payment_id, "Failed to record payment");
            ServiceError::from_write_error(e, "Payment references a rental that no longer exists")
        })?;

        info!(payment_id = %payment_id, rental_id = %payment.rental_id, amount = %payment.amount, "Payment recorded successfully");
        Ok(payment.into())
    }

    #[instrument(skip(self), fields(payment_id = %payment_id))]
    pub async fn get_payment(&self, payment_id: Uuid) -> Result<PaymentResponse, ServiceError> {
        let db = &*self.db_pool;
        PaymentEntity::find_by_id(payment_id)
            .one(db)
            .await?
            .map(Into::into)
            .ok_or_else(|| ServiceError::NotFound(format!("Payment {} not found", payment_id)))
    }

    /// Lists payments, most recent payment date first.
    #[instrument(skip(self, filter))]
    pub async fn list_payments(
        &self,
        filter: PaymentFilter,
        page: PageRequest,
    ) -> Result<Page<PaymentResponse>, ServiceError> {
        let db = &*self.db_pool;

        let mut query = PaymentEntity::find();
        if let Some(rental_id) = filter.rental_id {
            query = query.filter(payment::Column::RentalId.eq(rental_id));
        }
        if let Some(status) = filter.status {
            query = query.filter(payment::Column::Status.eq(status));
        }
        if let Some(method) = filter.method {
            query = query.filter(payment::Column::Method.eq(method));
        }

        let paginator = query
            .order_by_desc(payment::Column::PaymentDate)
            .order_by_desc(payment::Column::CreatedAt)
            .paginate(db, page.limit);

        let total = paginator.num_items().await.map_err(|e| {
            error!(error = %e, "Failed to count payments");
            ServiceError::DatabaseError(e)
        })?;

        let payments = if page.starts_after(total) {
            Vec::new()
        } else {
            paginator.fetch_page(page.page - 1).await.map_err(|e| {
                error!(error = %e, page = page.page, limit = page.limit, "Failed to fetch payments page");
                ServiceError::DatabaseError(e)
            })?
        };

        Ok(Page {
            items: payments.into_iter().map(Into::into).collect(),
            total,
            page: page.page,
            limit: page.limit,
        })
    }

    /// Every payment of one rental, most recent first.
    #[instrument(skip(self), fields(rental_id = %rental_id))]
    pub async fn payments_for_rental(
        &self,
        rental_id: Uuid,
    ) -> Result<Vec<PaymentResponse>, ServiceError> {
        let db = &*self.db_pool;
        if RentalEntity::find_by_id(rental_id).one(db).await?.is_none() {
            return Err(ServiceError::NotFound(format!("Rental {} not found", rental_id)));
        }

        let payments = PaymentEntity::find()
            .filter(payment::Column::RentalId.eq(rental_id))
            .order_by_desc(payment::Column::PaymentDate)
            .order_by_desc(payment::Column::CreatedAt)
            .all(db)
            .await?;
        Ok(payments.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self, request), fields(payment_id = %payment_id))]
    pub async fn update_payment(
        &self,
        payment_id: Uuid,
        request: UpdatePaymentRequest,
    ) -> Result<PaymentResponse, ServiceError> {
        request.validate()?;

        let db = &*self.db_pool;
        let payment = PaymentEntity::find_by_id(payment_id)
            .one(db)
            .await?
            .ok_or_else(|| {
                warn!(payment_id = %payment_id, "Payment not found for update");
                ServiceError::NotFound(format!("Payment {} not found", payment_id))
            })?;

        let mut model: PaymentActiveModel = payment.into();
        if let Some(amount) = request.amount {
            model.amount = Set(amount);
        }
        if let Some(payment_date) = request.payment_date {
            model.payment_date = Set(payment_date);
        }
        if let Some(method) = request.method {
            model.method = Set(method);
        }
        if let Some(status) = request.status {
            model.status = Set(status);
        }
        model.updated_at = Set(Utc::now());

        let updated = model.update(db).await.map_err(|e| {
            error!(error = %e, payment_id = %payment_id, "Failed to update payment");
            ServiceError::DatabaseError(e)
        })?;

        info!(payment_id = %payment_id, status = ?updated.status, "Payment updated successfully");
        Ok(updated.into())
    }

    #[instrument(skip(self), fields(payment_id = %payment_id))]
    pub async fn delete_payment(&self, payment_id: Uuid) -> Result<(), ServiceError> {
        let db = &*self.db_pool;
        let result = PaymentEntity::delete_by_id(payment_id)
            .exec(db)
            .await
            .map_err(|e| {
                error!(error = %e, payment_id = %payment_id, "Failed to delete payment");
                ServiceError::DatabaseError(e)
            })?;

        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!("Payment {} not found", payment_id)));
        }

        info!(payment_id = %payment_id, "Payment deleted successfully");
        Ok(())
    }
}
