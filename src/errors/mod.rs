use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// One broken rule on one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub field: String,
    pub rule: String,
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: &str, rule: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            rule: rule.to_string(),
            message: message.into(),
        }
    }
}

/// Every violation found while validating a candidate record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationFailure {
    pub violations: Vec<FieldViolation>,
}

impl ValidationFailure {
    pub fn for_field(&self, field: &str) -> impl Iterator<Item = &FieldViolation> {
        let field = field.to_string();
        self.violations.iter().filter(move |v| v.field == field)
    }

    pub fn has(&self, field: &str) -> bool {
        self.for_field(field).next().is_some()
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let details = self
            .violations
            .iter()
            .map(|v| format!("{}: {}", v.field, v.message))
            .collect::<Vec<_>>()
            .join("; ");
        write!(f, "Validation failed: {}", details)
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(ValidationFailure),
    #[error("Duplicate key: {field} already exists")]
    DuplicateKey { field: String },
    #[error("Not Found: {0}")]
    NotFound(String),
    #[error("Bad Request: {0}")]
    BadRequest(String),
    #[error("Database Error: {0}")]
    DatabaseError(String),
    #[error("Configuration Error: {0}")]
    Config(String),
}

impl From<ValidationFailure> for AppError {
    fn from(failure: ValidationFailure) -> Self {
        AppError::Validation(failure)
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Vec<FieldViolation>>,
}

impl ErrorResponse {
    fn message(error: String) -> Self {
        Self { error, details: None }
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::Validation(failure) => HttpResponse::BadRequest().json(ErrorResponse {
                error: failure.to_string(),
                details: Some(failure.violations.clone()),
            }),
            AppError::DuplicateKey { .. } => {
                HttpResponse::Conflict().json(ErrorResponse::message(self.to_string()))
            }
            AppError::NotFound(msg) => {
                HttpResponse::NotFound().json(ErrorResponse::message(msg.clone()))
            }
            AppError::BadRequest(msg) => {
                HttpResponse::BadRequest().json(ErrorResponse::message(msg.clone()))
            }
            AppError::DatabaseError(_) | AppError::Config(_) => {
                HttpResponse::InternalServerError().json(ErrorResponse::message(self.to_string()))
            }
        }
    }
}
