pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::employee::{Employee, EmployeeUpdate};
use crate::models::query::EmployeeQuery;

pub use memory::MemoryStore;
pub use postgres::PgEmployeeStore;

/// Document-store operations the employee model relies on. Each call is
/// atomic; email uniqueness is enforced here, at write time.
#[async_trait]
pub trait EmployeeStore: Send + Sync + 'static {
    /// Fails with `AppError::DuplicateKey` when the email is taken.
    async fn insert(&self, employee: &Employee) -> Result<(), AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Employee>, AppError>;

    async fn find(&self, query: &EmployeeQuery) -> Result<Vec<Employee>, AppError>;

    /// Returns the record as it is after the update, or `None` when no
    /// record has this id.
    async fn update_by_id(
        &self,
        id: Uuid,
        update: &EmployeeUpdate,
    ) -> Result<Option<Employee>, AppError>;

    /// Returns the deleted record, or `None` when no record has this id.
    async fn delete_by_id(&self, id: Uuid) -> Result<Option<Employee>, AppError>;
}

pub async fn create_pool(database_url: &str) -> Result<PgPool, AppError> {
    PgPool::connect(database_url).await.map_err(|err| {
        log::error!("Failed to connect to the database: {:?}", err);
        AppError::DatabaseError(err.to_string())
    })
}
