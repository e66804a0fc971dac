use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// Salary above which an employee counts as a high earner.
pub const HIGH_EARNER_THRESHOLD: i64 = 100_000;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Other => "Other",
        }
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Male" => Ok(Gender::Male),
            "Female" => Ok(Gender::Female),
            "Other" => Ok(Gender::Other),
            other => Err(format!("`{}` is not a valid enum value for path `gender`", other)),
        }
    }
}

/// A persisted employee record. Text fields are always stored normalized.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Employee {
    pub id: Uuid,
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub gender: Option<Gender>,
    pub city: String,
    pub designation: String,
    pub salary: Option<i64>,
    pub created: DateTime<Utc>,
    pub updatedat: DateTime<Utc>,
}

impl Employee {
    pub fn fullname(&self) -> String {
        format!("{} {}", self.firstname, self.lastname)
    }

    /// Splits on the first whitespace run. A missing last name becomes empty.
    pub fn set_fullname(&mut self, value: &str) {
        let (first, last) = split_fullname(value);
        self.firstname = first;
        self.lastname = last;
    }

    pub fn is_high_earner(&self) -> bool {
        self.earns_more_than(HIGH_EARNER_THRESHOLD)
    }

    pub fn earns_more_than(&self, threshold: i64) -> bool {
        self.salary.map_or(false, |salary| salary > threshold)
    }

    /// Raises the salary by `percentage` percent and returns the new value.
    ///
    /// The result is not checked against the salary bounds; callers that
    /// need it to stay valid must push it through `update`.
    pub fn apply_raise(&mut self, percentage: f64) -> Option<i64> {
        let salary = self.salary?;
        let raise = (salary as f64 * percentage) / 100.0;
        let raised = (salary as f64 + raise).trunc() as i64;
        self.salary = Some(raised);
        self.salary
    }
}

pub fn split_fullname(value: &str) -> (String, String) {
    let mut parts = value.trim().splitn(2, char::is_whitespace);
    let first = parts.next().unwrap_or_default().to_string();
    let last = parts
        .next()
        .map(|rest| rest.trim_start().to_string())
        .unwrap_or_default();
    (first, last)
}

pub fn current_year() -> i32 {
    Utc::now().year()
}

/// Raw create/update payload, exactly as a caller supplied it.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct EmployeeInput {
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub email: Option<String>,
    pub gender: Option<String>,
    pub city: Option<String>,
    pub designation: Option<String>,
    pub salary: Option<f64>,
    pub fullname: Option<String>,
}

/// A validated, normalized candidate that has not been written yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEmployee {
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub gender: Option<Gender>,
    pub city: String,
    pub designation: String,
    pub salary: Option<i64>,
}

/// Validated, normalized fields of a partial update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmployeeChanges {
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub email: Option<String>,
    pub gender: Option<Gender>,
    pub city: Option<String>,
    pub designation: Option<String>,
    pub salary: Option<i64>,
}

impl EmployeeChanges {
    pub fn apply_to(&self, employee: &mut Employee) {
        if let Some(firstname) = &self.firstname {
            employee.firstname = firstname.clone();
        }
        if let Some(lastname) = &self.lastname {
            employee.lastname = lastname.clone();
        }
        if let Some(email) = &self.email {
            employee.email = email.clone();
        }
        if let Some(gender) = self.gender {
            employee.gender = Some(gender);
        }
        if let Some(city) = &self.city {
            employee.city = city.clone();
        }
        if let Some(designation) = &self.designation {
            employee.designation = designation.clone();
        }
        if let Some(salary) = self.salary {
            employee.salary = Some(salary);
        }
    }
}

/// Changes ready to be written, carrying the refreshed modification time.
#[derive(Debug, Clone, PartialEq)]
pub struct EmployeeUpdate {
    pub changes: EmployeeChanges,
    pub updatedat: DateTime<Utc>,
}

#[cfg(test)]
pub(crate) fn sample_employee() -> Employee {
    let now = Utc::now();
    Employee {
        id: Uuid::new_v4(),
        firstname: "alice".to_string(),
        lastname: "walker".to_string(),
        email: "alice.walker@example.com".to_string(),
        gender: Some(Gender::Female),
        city: "toronto".to_string(),
        designation: "software engineer".to_string(),
        salary: Some(50_000),
        created: now,
        updatedat: now,
    }
}
