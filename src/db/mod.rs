mod memory;
mod postgres;

pub use memory::InMemoryEmployeeStore;
pub use postgres::PgEmployeeStore;

use anyhow::Context;
use async_trait::async_trait;
use log::info;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::config::{AppConfig, StorageKind};
use crate::errors::AppError;
use crate::models::employee::{Employee, EmployeeFields, IdentificationType};
use crate::utils::pagination::PageRequest;

/// Attempts made to reserve a generated email before giving up on concurrent writers.
pub const MAX_EMAIL_ATTEMPTS: usize = 5;

/// Persistence for employee records.
///
/// Implementations own the uniqueness invariants: `insert` picks the
/// corporate email and stores the row in one step, and both `insert` and
/// `update` report a duplicated identification pair as a field error on
/// `numero_identificacion`.
#[async_trait]
pub trait EmployeeStore: Send + Sync {
    /// Newest registrations first, plus the total number of records.
    async fn list(&self, page: Option<PageRequest>) -> Result<(Vec<Employee>, u64), AppError>;

    async fn get(&self, id: Uuid) -> Result<Option<Employee>, AppError>;

    /// Whether another record already uses this identification pair.
    async fn identification_taken(
        &self,
        tipo: IdentificationType,
        numero: &str,
        exclude: Option<Uuid>,
    ) -> Result<bool, AppError>;

    async fn insert(&self, fields: EmployeeFields) -> Result<Employee, AppError>;

    /// `None` if the record does not exist.
    async fn update(&self, id: Uuid, fields: EmployeeFields) -> Result<Option<Employee>, AppError>;

    /// `false` if the record did not exist.
    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;
}

pub async fn create_pool(config: &AppConfig) -> anyhow::Result<PgPool> {
    let database_url = config
        .database_url
        .as_deref()
        .context("DATABASE_URL must be set")?;

    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(database_url)
        .await
        .context("failed to connect to PostgreSQL")?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("failed to run migrations")?;

    Ok(pool)
}

pub async fn connect(config: &AppConfig) -> anyhow::Result<Arc<dyn EmployeeStore>> {
    match config.storage {
        StorageKind::Postgres => {
            let pool = create_pool(config).await?;
            info!("Connected to PostgreSQL, migrations applied");
            Ok(Arc::new(PgEmployeeStore::new(pool)))
        }
        StorageKind::Memory => {
            info!("Using in-memory employee store; records are lost on restart");
            Ok(Arc::new(InMemoryEmployeeStore::new()))
        }
    }
}
