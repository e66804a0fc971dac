use uuid::Uuid;

use crate::db::EmployeeStore;
use crate::errors::{AppError, ValidationFailure};
use crate::models::employee::{Employee, EmployeeInput, NewEmployee};
use crate::models::hooks::{Hooks, LifecycleEvent};
use crate::models::query::{EmployeeQuery, SortOrder};
use crate::models::schema;

/// Create/read/update/delete entry point for employee records.
///
/// Every write goes through the same sequence: normalize and validate,
/// notify `validate`, stamp timestamps, write, notify `save` (or `remove`).
/// Records read back from the store trigger `init`.
pub struct EmployeeModel<S> {
    store: S,
    hooks: Hooks,
}

impl<S: EmployeeStore> EmployeeModel<S> {
    pub fn new(store: S) -> Self {
        Self::with_hooks(store, Hooks::with_logging())
    }

    pub fn with_hooks(store: S, hooks: Hooks) -> Self {
        Self { store, hooks }
    }

    pub fn validate(&self, candidate: EmployeeInput) -> Result<NewEmployee, ValidationFailure> {
        schema::validate(candidate)
    }

    pub async fn create(&self, candidate: EmployeeInput) -> Result<Employee, AppError> {
        let draft = schema::validate(candidate)?;
        self.hooks.fire(LifecycleEvent::Validated(&draft));

        let employee = schema::stamp_new(Uuid::new_v4(), draft, schema::now());
        self.store.insert(&employee).await?;

        self.hooks.fire(LifecycleEvent::Saved(&employee));
        Ok(employee)
    }

    pub async fn get(&self, id: Uuid) -> Result<Employee, AppError> {
        let employee = self
            .store
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found(id))?;
        self.hooks.fire(LifecycleEvent::Initialized(&employee));
        Ok(employee)
    }

    pub async fn list(&self, query: &EmployeeQuery) -> Result<Vec<Employee>, AppError> {
        let employees = self.store.find(query).await?;
        for employee in &employees {
            self.hooks.fire(LifecycleEvent::Initialized(employee));
        }
        Ok(employees)
    }

    /// The `validate` notification concerns the payload: it fires before the
    /// store is asked for `id`, so an update to a missing record still emits
    /// it and then fails with `NotFound` without a `save`.
    pub async fn update(&self, id: Uuid, fields: EmployeeInput) -> Result<Employee, AppError> {
        let changes = schema::validate_changes(fields)?;
        self.hooks.fire(LifecycleEvent::ChangesValidated(id, &changes));

        let update = schema::stamp_changes(changes, schema::now());
        let employee = self
            .store
            .update_by_id(id, &update)
            .await?
            .ok_or_else(|| not_found(id))?;

        self.hooks.fire(LifecycleEvent::Initialized(&employee));
        self.hooks.fire(LifecycleEvent::Saved(&employee));
        Ok(employee)
    }

    pub async fn remove(&self, id: Uuid) -> Result<(), AppError> {
        let employee = self
            .store
            .delete_by_id(id)
            .await?
            .ok_or_else(|| not_found(id))?;
        self.hooks.fire(LifecycleEvent::Removed(&employee));
        Ok(())
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<Employee>, AppError> {
        let mut found = self.list(&EmployeeQuery::new().by_email(email)).await?;
        Ok(if found.is_empty() {
            None
        } else {
            Some(found.swap_remove(0))
        })
    }

    pub async fn find_by_designation(&self, pattern: &str) -> Result<Vec<Employee>, AppError> {
        self.list(&EmployeeQuery::new().by_designation(pattern)).await
    }

    pub async fn find_by_salary_range(&self, min: i64, max: i64) -> Result<Vec<Employee>, AppError> {
        self.list(&EmployeeQuery::new().by_salary_range(min, max)).await
    }

    pub async fn sort_by_salary(&self, order: SortOrder) -> Result<Vec<Employee>, AppError> {
        self.list(&EmployeeQuery::new().sort_by_salary(order)).await
    }
}

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Employee {} not found", id))
}
