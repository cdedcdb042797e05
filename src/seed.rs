//! Startup bootstrap and demo data.

use crate::{
    auth::create_user,
    entities::client::{ActiveModel as ClientActiveModel, ClientStatus, Entity as ClientEntity},
    entities::locker::{
        ActiveModel as LockerActiveModel, Entity as LockerEntity, LockerSize, LockerStatus,
    },
    entities::user::{self, Entity as UserEntity, ADMIN_ROLE},
    errors::ServiceError,
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, Set,
};
use tracing::info;
use uuid::Uuid;

/// Counts of rows inserted by [`seed_sample_data`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub clients: usize,
    pub lockers: usize,
}

/// Creates the bootstrap operator when no user has that email yet.
/// Returns whether a user was created.
pub async fn ensure_admin_user<C: ConnectionTrait>(
    db: &C,
    email: &str,
    password: &str,
    name: &str,
) -> Result<bool, ServiceError> {
    let email = email.trim().to_lowercase();
    let exists = UserEntity::find()
        .filter(user::Column::Email.eq(email.as_str()))
        .one(db)
        .await?
        .is_some();
    if exists {
        return Ok(false);
    }

    let user = create_user(db, name, &email, password.to_string(), ADMIN_ROLE).await?;
    info!(user_id = %user.id, email = %user.email, "Bootstrap operator created");
    Ok(true)
}

const SAMPLE_CLIENTS: [(&str, &str, &str, &str, &str); 3] = [
    (
        "João Silva",
        "joao.silva@email.com",
        "(11) 99999-1111",
        "123.456.789-01",
        "Rua A, 123 - São Paulo/SP",
    ),
    (
        "Maria Santos",
        "maria.santos@email.com",
        "(11) 99999-2222",
        "987.654.321-02",
        "Rua B, 456 - São Paulo/SP",
    ),
    (
        "Pedro Oliveira",
        "pedro.oliveira@email.com",
        "(11) 99999-3333",
        "456.789.123-03",
        "Rua C, 789 - São Paulo/SP",
    ),
];

const SAMPLE_LOCKERS: [(&str, &str, LockerSize, i64); 5] = [
    ("A001", "Bloco A - 1º Andar", LockerSize::Medium, 300),
    ("A002", "Bloco A - 1º Andar", LockerSize::Large, 400),
    ("A003", "Bloco A - 1º Andar", LockerSize::Small, 200),
    ("B001", "Bloco B - 2º Andar", LockerSize::Medium, 300),
    ("B002", "Bloco B - 2º Andar", LockerSize::Large, 400),
];

/// Inserts sample clients and lockers into tables that are still empty.
pub async fn seed_sample_data<C: ConnectionTrait>(db: &C) -> Result<SeedSummary, ServiceError> {
    let mut summary = SeedSummary::default();
    let now = Utc::now();

    if ClientEntity::find().count(db).await? == 0 {
        for (name, email, phone, document, address) in SAMPLE_CLIENTS {
            ClientActiveModel {
                id: Set(Uuid::new_v4()),
                name: Set(name.to_string()),
                email: Set(email.to_string()),
                phone: Set(Some(phone.to_string())),
                document: Set(document.to_string()),
                address: Set(Some(address.to_string())),
                status: Set(ClientStatus::Active),
                created_at: Set(now),
                updated_at: Set(now),
            }
            .insert(db)
            .await?;
            summary.clients += 1;
        }
    }

    if LockerEntity::find().count(db).await? == 0 {
        for (number, location, size, price) in SAMPLE_LOCKERS {
            LockerActiveModel {
                id: Set(Uuid::new_v4()),
                number: Set(number.to_string()),
                location: Set(location.to_string()),
                size: Set(size),
                status: Set(LockerStatus::Available),
                monthly_price: Set(Decimal::new(price, 0)),
                created_at: Set(now),
                updated_at: Set(now),
            }
            .insert(db)
            .await?;
            summary.lockers += 1;
        }
    }

    info!(clients = summary.clients, lockers = summary.lockers, "Sample data seeded");
    Ok(summary)
}
