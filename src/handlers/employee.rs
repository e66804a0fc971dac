use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::db::EmployeeStore;
use crate::errors::AppError;
use crate::models::{EmployeeInput, EmployeeModel, EmployeeQuery, SortOrder};

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeQueryParams {
    email: Option<String>,
    designation: Option<String>,
    city: Option<String>,
    min_salary: Option<i64>,
    max_salary: Option<i64>,
    sort: Option<String>,
}

impl From<EmployeeQueryParams> for EmployeeQuery {
    fn from(params: EmployeeQueryParams) -> Self {
        let mut query = EmployeeQuery::new();
        if let Some(email) = &params.email {
            query = query.by_email(email);
        }
        if let Some(designation) = &params.designation {
            query = query.by_designation(designation);
        }
        if let Some(city) = &params.city {
            query = query.by_city(city);
        }
        if params.min_salary.is_some() || params.max_salary.is_some() {
            query = query.by_salary_range(
                params.min_salary.unwrap_or(i64::MIN),
                params.max_salary.unwrap_or(i64::MAX),
            );
        }
        if let Some(sort) = &params.sort {
            let order: SortOrder = sort.parse().unwrap_or_default();
            query = query.sort_by_salary(order);
        }
        query
    }
}

fn parse_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::BadRequest(format!("Invalid employee ID: {}", raw)))
}

/// Registers the employee routes for a model backed by `S`.
pub fn configure<S: EmployeeStore>(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::QueryConfig::default().error_handler(|err, _req| {
        AppError::BadRequest(err.to_string()).into()
    }))
    .app_data(web::JsonConfig::default().error_handler(|err, _req| {
        AppError::BadRequest(err.to_string()).into()
    }))
    .service(
        web::resource("/employees")
            .route(web::post().to(create_employee::<S>))
            .route(web::get().to(get_employees::<S>)),
    )
    .service(
        web::resource("/employees/{id}")
            .route(web::get().to(get_employee::<S>))
            .route(web::put().to(update_employee::<S>))
            .route(web::patch().to(update_employee::<S>))
            .route(web::delete().to(delete_employee::<S>)),
    );
}

pub async fn create_employee<S: EmployeeStore>(
    model: web::Data<EmployeeModel<S>>,
    new_employee: web::Json<EmployeeInput>,
) -> Result<HttpResponse, AppError> {
    let employee = model.create(new_employee.into_inner()).await?;
    Ok(HttpResponse::Created().json(employee))
}

pub async fn get_employees<S: EmployeeStore>(
    model: web::Data<EmployeeModel<S>>,
    query: web::Query<EmployeeQueryParams>,
) -> Result<HttpResponse, AppError> {
    let query = EmployeeQuery::from(query.into_inner());
    let employees = model.list(&query).await?;
    Ok(HttpResponse::Ok().json(employees))
}

pub async fn get_employee<S: EmployeeStore>(
    model: web::Data<EmployeeModel<S>>,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let employee = model.get(parse_id(&id)?).await?;
    Ok(HttpResponse::Ok().json(employee))
}

pub async fn update_employee<S: EmployeeStore>(
    model: web::Data<EmployeeModel<S>>,
    id: web::Path<String>,
    updates: web::Json<EmployeeInput>,
) -> Result<HttpResponse, AppError> {
    let employee = model.update(parse_id(&id)?, updates.into_inner()).await?;
    Ok(HttpResponse::Ok().json(employee))
}

pub async fn delete_employee<S: EmployeeStore>(
    model: web::Data<EmployeeModel<S>>,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    model.remove(parse_id(&id)?).await?;
    Ok(HttpResponse::Ok().json(json!({
        "message": "Employee deleted successfully",
    })))
}
