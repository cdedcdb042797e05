use crate::{
    db::DbPool,
    entities::client::{
        self, ActiveModel as ClientActiveModel, ClientStatus, Entity as ClientEntity,
        Model as ClientModel,
    },
    entities::rental::{self, Entity as RentalEntity},
    errors::ServiceError,
};
use chrono::{DateTime, Utc};
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

use super::{contains_pattern, search_term, Page, PageRequest};

const DUPLICATE_CLIENT: &str = "A client with this email or document already exists";

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateClientRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "A valid email is required"))]
    pub email: String,
    pub phone: Option<String>,
    #[validate(length(min = 1, max = 32, message = "Document is required (max 32 characters)"))]
    pub document: String,
    pub address: Option<String>,
    pub status: Option<ClientStatus>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateClientRequest {
    #[validate(length(min = 1, message = "Name cannot be empty"))]
    pub name: Option<String>,
    #[validate(email(message = "A valid email is required"))]
    pub email: Option<String>,
    pub phone: Option<String>,
    #[validate(length(min = 1, max = 32, message = "Document cannot be empty (max 32 characters)"))]
    pub document: Option<String>,
    pub address: Option<String>,
    pub status: Option<ClientStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub document: String,
    pub address: Option<String>,
    pub status: ClientStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ClientModel> for ClientResponse {
    fn from(model: ClientModel) -> Self {
        Self {
            id: model.id,
            name: model.name,
            email: model.email,
            phone: model.phone,
            document: model.document,
            address: model.address,
            status: model.status,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ClientFilter {
    pub status: Option<ClientStatus>,
    pub search: Option<String>,
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Client registry backed by the `clients` table.
#[derive(Clone)]
pub struct ClientService {
    db_pool: Arc<DbPool>,
}

impl ClientService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn create_client(
        &self,
        request: CreateClientRequest,
    ) -> Result<ClientResponse, ServiceError> {
        request.validate()?;

        let db = &*self.db_pool;
        let now = Utc::now();
        let client_id = Uuid::new_v4();

        let model = ClientActiveModel {
            id: Set(client_id),
            name: Set(request.name.trim().to_string()),
            email: Set(request.email.trim().to_lowercase()),
            phone: Set(blank_to_none(request.phone)),
            document: Set(request.document.trim().to_string()),
            address: Set(blank_to_none(request.address)),
            status: Set(request.status.unwrap_or(ClientStatus::Active)),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let client = model.insert(db).await.map_err(|e| {
            error!(error = %e, client_id = %client_id, "Failed to create client");
            ServiceError::from_write_error(e, DUPLICATE_CLIENT)
        })?;

        info!(client_id = %client_id, "Client created successfully");
        Ok(client.into())
    }

    #[instrument(skip(self), fields(client_id = %client_id))]
    pub async fn get_client(&self, client_id: Uuid) -> Result<ClientResponse, ServiceError> {
        let db = &*self.db_pool;
        ClientEntity::find_by_id(client_id)
            .one(db)
            .await?
            .map(Into::into)
            .ok_or_else(|| ServiceError::NotFound(format!("Client {} not found", client_id)))
    }

    /// Lists clients, newest first.
    #[instrument(skip(self, filter))]
    pub async fn list_clients(
        &self,
        filter: ClientFilter,
        page: PageRequest,
    ) -> Result<Page<ClientResponse>, ServiceError> {
        let db = &*self.db_pool;

        let mut query = ClientEntity::find();
        if let Some(status) = filter.status {
            query = query.filter(client::Column::Status.eq(status));
        }
        if let Some(term) = search_term(filter.search.as_deref()) {
            query = query.filter(
                Condition::any()
                    .add(client::Column::Name.like(contains_pattern(&term)))
                    .add(client::Column::Email.like(contains_pattern(&term)))
                    .add(client::Column::Document.like(contains_pattern(&term))),
            );
        }

        let paginator = query
            .order_by_desc(client::Column::CreatedAt)
            .order_by_asc(client::Column::Name)
            .paginate(db, page.limit);

        let total = paginator.num_items().await.map_err(|e| {
            error!(error = %e, "Failed to count clients");
            ServiceError::DatabaseError(e)
        })?;

        let clients = if page.starts_after(total) {
            Vec::new()
        } else {
            paginator.fetch_page(page.page - 1).await.map_err(|e| {
                error!(error = %e, page = page.page, limit = page.limit, "Failed to fetch clients page");
                ServiceError::DatabaseError(e)
            })?
        };

        Ok(Page {
            items: clients.into_iter().map(Into::into).collect(),
            total,
            page: page.page,
            limit: page.limit,
        })
    }

    #[instrument(skip(self, request), fields(client_id = %client_id))]
    pub async fn update_client(
        &self,
        client_id: Uuid,
        request: UpdateClientRequest,
    ) -> Result<ClientResponse, ServiceError> {
        request.validate()?;

        let db = &*self.db_pool;
        let client = ClientEntity::find_by_id(client_id)
            .one(db)
            .await?
            .ok_or_else(|| {
                warn!(client_id = %client_id, "Client not found for update");
                ServiceError::NotFound(format!("Client {} not found", client_id))
            })?;

        let mut model: ClientActiveModel = client.into();
        if let Some(name) = request.name {
            model.name = Set(name.trim().to_string());
        }
        if let Some(email) = request.email {
            model.email = Set(email.trim().to_lowercase());
        }
        if request.phone.is_some() {
            model.phone = Set(blank_to_none(request.phone));
        }
        if let Some(document) = request.document {
            model.document = Set(document.trim().to_string());
        }
        if request.address.is_some() {
            model.address = Set(blank_to_none(request.address));
        }
        if let Some(status) = request.status {
            model.status = Set(status);
        }
        model.updated_at = Set(Utc::now());

        let updated = model.update(db).await.map_err(|e| {
            error!(error = %e, client_id = %client_id, "Failed to update client");
            ServiceError::from_write_error(e, DUPLICATE_CLIENT)
        })?;

        info!(client_id = %client_id, "Client updated successfully");
        Ok(updated.into())
    }

    /// Removes a client that no rental references.
    #[instrument(skip(self), fields(client_id = %client_id))]
    pub async fn delete_client(&self, client_id: Uuid) -> Result<(), ServiceError> {
        let db = &*self.db_pool;
        let txn = db.begin().await.map_err(|e| {
            error!(error = %e, client_id = %client_id, "Failed to start transaction for client deletion");
            ServiceError::DatabaseError(e)
        })?;

        if ClientEntity::find_by_id(client_id).one(&txn).await?.is_none() {
            return Err(ServiceError::NotFound(format!("Client {} not found", client_id)));
        }

        let referencing = RentalEntity::find()
            .filter(rental::Column::ClientId.eq(client_id))
            .count(&txn)
            .await?;
        if referencing > 0 {
            warn!(client_id = %client_id, rentals = referencing, "Refusing to delete a client with rentals");
            return Err(ServiceError::Conflict(
                "Client has rental history and cannot be deleted".to_string(),
            ));
        }

        ClientEntity::delete_by_id(client_id)
            .exec(&txn)
            .await
            .map_err(|e| {
                error!(error = %e, client_id = %client_id, "Failed to delete client");
                ServiceError::from_write_error(e, "Client has rental history and cannot be deleted")
            })?;

        txn.commit().await.map_err(|e| {
            error!(error = %e, client_id = %client_id, "Failed to commit client deletion");
            ServiceError::DatabaseError(e)
        })?;

        info!(client_id = %client_id, "Client deleted successfully");
        Ok(())
    }
}
