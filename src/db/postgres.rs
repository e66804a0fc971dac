use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::db::EmployeeStore;
use crate::errors::AppError;
use crate::models::employee::{Employee, EmployeeUpdate, Gender};
use crate::models::query::{like_pattern, EmployeeQuery, SortOrder};

const UNIQUE_VIOLATION: &str = "23505";

const CREATE_EMPLOYEES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS employees (
    id UUID PRIMARY KEY,
    firstname TEXT NOT NULL,
    lastname TEXT NOT NULL,
    email TEXT NOT NULL,
    gender TEXT,
    city TEXT NOT NULL,
    designation TEXT NOT NULL,
    salary BIGINT,
    created TIMESTAMPTZ NOT NULL,
    updatedat TIMESTAMPTZ NOT NULL,
    CONSTRAINT employees_email_key UNIQUE (email)
)
"#;

#[derive(sqlx::FromRow, Debug)]
struct EmployeeRow {
    id: Uuid,
    firstname: String,
    lastname: String,
    email: String,
    gender: Option<String>,
    city: String,
    designation: String,
    salary: Option<i64>,
    created: DateTime<Utc>,
    updatedat: DateTime<Utc>,
}

impl TryFrom<EmployeeRow> for Employee {
    type Error = AppError;

    fn try_from(row: EmployeeRow) -> Result<Self, Self::Error> {
        let gender = row
            .gender
            .as_deref()
            .map(str::parse::<Gender>)
            .transpose()
            .map_err(AppError::DatabaseError)?;

        Ok(Employee {
            id: row.id,
            firstname: row.firstname,
            lastname: row.lastname,
            email: row.email,
            gender,
            city: row.city,
            designation: row.designation,
            salary: row.salary,
            created: row.created,
            updatedat: row.updatedat,
        })
    }
}

fn into_employees(rows: Vec<EmployeeRow>) -> Result<Vec<Employee>, AppError> {
    rows.into_iter().map(Employee::try_from).collect()
}

fn map_sqlx_error(err: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
            return AppError::DuplicateKey {
                field: "email".to_string(),
            };
        }
    }
    log::error!("Database error: {:?}", err);
    AppError::DatabaseError(err.to_string())
}

pub struct PgEmployeeStore {
    pool: PgPool,
}

impl PgEmployeeStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the employees table and its unique email constraint when
    /// they do not exist yet.
    pub async fn ensure_schema(&self) -> Result<(), AppError> {
        sqlx::query(CREATE_EMPLOYEES_TABLE)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(())
    }
}

fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, query: &EmployeeQuery) {
    builder.push(" WHERE TRUE");
    if let Some(email) = &query.email {
        builder.push(" AND email = ").push_bind(email.clone());
    }
    if let Some(designation) = &query.designation {
        builder
            .push(" AND designation ILIKE ")
            .push_bind(like_pattern(designation));
    }
    if let Some(city) = &query.city {
        builder.push(" AND city ILIKE ").push_bind(like_pattern(city));
    }
    if let Some((min, max)) = query.salary_range {
        builder
            .push(" AND salary >= ")
            .push_bind(min)
            .push(" AND salary <= ")
            .push_bind(max);
    }
    match query.sort {
        Some(SortOrder::Asc) => {
            builder.push(" ORDER BY salary ASC NULLS FIRST");
        }
        Some(SortOrder::Desc) => {
            builder.push(" ORDER BY salary DESC NULLS LAST");
        }
        None => {}
    }
}

#[async_trait]
impl EmployeeStore for PgEmployeeStore {
    async fn insert(&self, employee: &Employee) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO employees (id, firstname, lastname, email, gender, city, designation, salary, created, updatedat) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(employee.id)
        .bind(&employee.firstname)
        .bind(&employee.lastname)
        .bind(&employee.email)
        .bind(employee.gender.map(|g| g.as_str()))
        .bind(&employee.city)
        .bind(&employee.designation)
        .bind(employee.salary)
        .bind(employee.created)
        .bind(employee.updatedat)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Employee>, AppError> {
        sqlx::query_as::<_, EmployeeRow>("SELECT * FROM employees WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?
            .map(Employee::try_from)
            .transpose()
    }

    async fn find(&self, query: &EmployeeQuery) -> Result<Vec<Employee>, AppError> {
        let mut builder: QueryBuilder<'_, Postgres> = QueryBuilder::new("SELECT * FROM employees");
        push_filters(&mut builder, query);

        let rows = builder
            .build_query_as::<EmployeeRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        into_employees(rows)
    }

    async fn update_by_id(
        &self,
        id: Uuid,
        update: &EmployeeUpdate,
    ) -> Result<Option<Employee>, AppError> {
        let changes = &update.changes;
        let mut builder: QueryBuilder<'_, Postgres> = QueryBuilder::new("UPDATE employees SET ");
        {
            let mut separated = builder.separated(", ");
            if let Some(firstname) = &changes.firstname {
                separated.push("firstname = ").push_bind_unseparated(firstname.clone());
            }
            if let Some(lastname) = &changes.lastname {
                separated.push("lastname = ").push_bind_unseparated(lastname.clone());
            }
            if let Some(email) = &changes.email {
                separated.push("email = ").push_bind_unseparated(email.clone());
            }
            if let Some(gender) = changes.gender {
                separated.push("gender = ").push_bind_unseparated(gender.as_str());
            }
            if let Some(city) = &changes.city {
                separated.push("city = ").push_bind_unseparated(city.clone());
            }
            if let Some(designation) = &changes.designation {
                separated.push("designation = ").push_bind_unseparated(designation.clone());
            }
            if let Some(salary) = changes.salary {
                separated.push("salary = ").push_bind_unseparated(salary);
            }
            separated
                .push("updatedat = GREATEST(")
                .push_bind_unseparated(update.updatedat)
                .push_unseparated(", updatedat + INTERVAL '1 microsecond')");
        }
        builder.push(" WHERE id = ").push_bind(id).push(" RETURNING *");

        builder
            .build_query_as::<EmployeeRow>()
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?
            .map(Employee::try_from)
            .transpose()
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<Option<Employee>, AppError> {
        sqlx::query_as::<_, EmployeeRow>("DELETE FROM employees WHERE id = $1 RETURNING *")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?
            .map(Employee::try_from)
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filters_bind_escaped_patterns_and_sort_nulls() {
        let query = EmployeeQuery::new()
            .by_city("tor")
            .by_salary_range(1000, 2000)
            .sort_by_salary(SortOrder::Desc);
        let mut builder: QueryBuilder<'_, Postgres> = QueryBuilder::new("SELECT * FROM employees");
        push_filters(&mut builder, &query);

        assert_eq!(
            builder.sql(),
            "SELECT * FROM employees WHERE TRUE AND city ILIKE $1 AND salary >= $2 AND salary <= $3 ORDER BY salary DESC NULLS LAST"
        );
    }

    #[test]
    fn unknown_gender_in_row_is_a_database_error() {
        let now = Utc::now();
        let row = EmployeeRow {
            id: Uuid::new_v4(),
            firstname: "alice".into(),
            lastname: "walker".into(),
            email: "alice@example.com".into(),
            gender: Some("robot".into()),
            city: "toronto".into(),
            designation: "engineer".into(),
            salary: None,
            created: now,
            updatedat: now,
        };
        assert!(matches!(
            Employee::try_from(row),
            Err(AppError::DatabaseError(_))
        ));
    }
}
