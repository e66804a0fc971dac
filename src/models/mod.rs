pub mod employee;
pub mod hooks;
pub mod model;
pub mod query;
pub mod schema;

pub use employee::{Employee, EmployeeInput, Gender};
pub use model::EmployeeModel;
pub use query::{EmployeeQuery, SortOrder};
