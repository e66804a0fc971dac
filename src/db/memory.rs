use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::db::EmployeeStore;
use crate::errors::AppError;
use crate::models::employee::{Employee, EmployeeUpdate};
use crate::models::query::EmployeeQuery;
use crate::models::schema::advance_updatedat;

/// In-process store. Records keep insertion order; the write lock makes the
/// email check and the write a single step.
#[derive(Default)]
pub struct MemoryStore {
    employees: RwLock<Vec<Employee>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn duplicate_email() -> AppError {
    AppError::DuplicateKey {
        field: "email".to_string(),
    }
}

#[async_trait]
impl EmployeeStore for MemoryStore {
    async fn insert(&self, employee: &Employee) -> Result<(), AppError> {
        let mut employees = self.employees.write().await;
        if employees.iter().any(|e| e.email == employee.email) {
            return Err(duplicate_email());
        }
        employees.push(employee.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Employee>, AppError> {
        let employees = self.employees.read().await;
        Ok(employees.iter().find(|e| e.id == id).cloned())
    }

    async fn find(&self, query: &EmployeeQuery) -> Result<Vec<Employee>, AppError> {
        let mut found: Vec<Employee> = {
            let employees = self.employees.read().await;
            employees.iter().filter(|e| query.matches(e)).cloned().collect()
        };
        query.sort(&mut found);
        Ok(found)
    }

    async fn update_by_id(
        &self,
        id: Uuid,
        update: &EmployeeUpdate,
    ) -> Result<Option<Employee>, AppError> {
        let mut employees = self.employees.write().await;
        let Some(index) = employees.iter().position(|e| e.id == id) else {
            return Ok(None);
        };
        if let Some(email) = &update.changes.email {
            if employees.iter().any(|e| e.id != id && e.email == *email) {
                return Err(duplicate_email());
            }
        }
        let employee = &mut employees[index];
        update.changes.apply_to(employee);
        employee.updatedat = advance_updatedat(employee.updatedat, update.updatedat);
        Ok(Some(employee.clone()))
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<Option<Employee>, AppError> {
        let mut employees = self.employees.write().await;
        Ok(employees
            .iter()
            .position(|e| e.id == id)
            .map(|index| employees.remove(index)))
    }
}
