//! Field normalization, validation and timestamp stamping for employee
//! records. Everything here is pure; the model drives it in order.

use chrono::{DateTime, SubsecRound, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::errors::{FieldViolation, ValidationFailure};
use crate::models::employee::{
    split_fullname, Employee, EmployeeChanges, EmployeeInput, EmployeeUpdate, Gender, NewEmployee,
};
use crate::utils::validation::collect_violations;

pub const MIN_SALARY: i64 = 1_000;
pub const MAX_SALARY: i64 = 1_000_000;

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r".+@.+\..+").unwrap());

/// Field order used when reporting violations.
const FIELD_ORDER: [&str; 7] = [
    "firstname",
    "lastname",
    "email",
    "gender",
    "city",
    "designation",
    "salary",
];

const REQUIRED_FIELDS: [(&str, &str); 5] = [
    ("firstname", "First Name is required"),
    ("lastname", "Last Name is required"),
    ("email", "Email is required"),
    ("city", "City is required"),
    ("designation", "Designation is required"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Create,
    Update,
}

/// Candidate fields after normalization; the rules run against these.
#[derive(Debug, Clone, Default, Validate)]
struct NormalizedFields {
    #[validate(length(min = 5, message = "First Name must be at least 5 characters long"))]
    firstname: Option<String>,
    #[validate(length(min = 5, message = "Last Name must be at least 5 characters long"))]
    lastname: Option<String>,
    #[validate(regex(path = "EMAIL_PATTERN", message = "Please fill a valid email address"))]
    email: Option<String>,
    #[validate(custom = "validate_gender")]
    gender: Option<String>,
    city: Option<String>,
    designation: Option<String>,
    salary: Option<f64>,
}

impl NormalizedFields {
    fn text(&self, field: &str) -> Option<&str> {
        match field {
            "firstname" => self.firstname.as_deref(),
            "lastname" => self.lastname.as_deref(),
            "email" => self.email.as_deref(),
            "city" => self.city.as_deref(),
            "designation" => self.designation.as_deref(),
            _ => None,
        }
    }
}

fn validate_gender(gender: &str) -> Result<(), ValidationError> {
    gender.parse::<Gender>().map(|_| ()).map_err(|message| {
        let mut err = ValidationError::new("enum");
        err.message = Some(Cow::Owned(message));
        err
    })
}

fn salary_violations(salary: f64) -> Vec<FieldViolation> {
    let mut violations = Vec::new();
    if salary < MIN_SALARY as f64 {
        violations.push(FieldViolation::new("salary", "min", "Salary must be at least 1,000"));
    }
    if salary > MAX_SALARY as f64 {
        violations.push(FieldViolation::new("salary", "max", "Salary must be at most 1,000,000"));
    }
    if !salary.is_finite() || salary.fract() != 0.0 {
        violations.push(FieldViolation::new(
            "salary",
            "integer",
            format!("{} is not an integer value", salary),
        ));
    }
    violations
}

/// Lowercases and trims a text field.
pub fn normalize_text(value: &str) -> String {
    value.trim().to_lowercase()
}

fn normalize(input: EmployeeInput) -> NormalizedFields {
    let mut firstname = None;
    let mut lastname = None;
    if let Some(fullname) = &input.fullname {
        let (first, last) = split_fullname(fullname);
        firstname = Some(first);
        lastname = Some(last);
    }
    let text = |value: Option<String>| value.as_deref().map(normalize_text);

    NormalizedFields {
        firstname: text(input.firstname.or(firstname)),
        lastname: text(input.lastname.or(lastname)),
        email: text(input.email),
        gender: input.gender,
        city: text(input.city),
        designation: text(input.designation),
        salary: input.salary,
    }
}

fn check(fields: &NormalizedFields, mode: Mode) -> Result<(), ValidationFailure> {
    let mut violations = match fields.validate() {
        Ok(()) => Vec::new(),
        Err(errors) => collect_violations(&errors),
    };

    for (field, message) in REQUIRED_FIELDS {
        let missing = match fields.text(field) {
            None => mode == Mode::Create,
            Some(value) => value.is_empty(),
        };
        if missing {
            // Other rules are not evaluated against a missing value.
            violations.retain(|v| v.field != field);
            violations.push(FieldViolation::new(field, "required", message));
        }
    }

    if let Some(salary) = fields.salary {
        violations.extend(salary_violations(salary));
    }

    if violations.is_empty() {
        return Ok(());
    }
    violations.sort_by_key(|v| FIELD_ORDER.iter().position(|f| *f == v.field));
    Err(ValidationFailure { violations })
}

fn parse_gender(gender: Option<String>) -> Option<Gender> {
    gender.and_then(|g| g.parse().ok())
}

/// Normalizes and validates a full candidate record, reporting every
/// violation found.
pub fn validate(candidate: EmployeeInput) -> Result<NewEmployee, ValidationFailure> {
    let fields = normalize(candidate);
    check(&fields, Mode::Create)?;

    Ok(NewEmployee {
        firstname: fields.firstname.unwrap_or_default(),
        lastname: fields.lastname.unwrap_or_default(),
        email: fields.email.unwrap_or_default(),
        gender: parse_gender(fields.gender),
        city: fields.city.unwrap_or_default(),
        designation: fields.designation.unwrap_or_default(),
        salary: fields.salary.map(|s| s as i64),
    })
}

/// Normalizes and validates only the fields present in a partial update.
pub fn validate_changes(input: EmployeeInput) -> Result<EmployeeChanges, ValidationFailure> {
    let fields = normalize(input);
    check(&fields, Mode::Update)?;

    Ok(EmployeeChanges {
        firstname: fields.firstname,
        lastname: fields.lastname,
        email: fields.email,
        gender: parse_gender(fields.gender),
        city: fields.city,
        designation: fields.designation,
        salary: fields.salary.map(|s| s as i64),
    })
}

/// Current time at the precision the database keeps.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Stamps a new record before its first write: `created` and `updatedat`
/// both start at `now`.
pub fn stamp_new(id: Uuid, draft: NewEmployee, now: DateTime<Utc>) -> Employee {
    Employee {
        id,
        firstname: draft.firstname,
        lastname: draft.lastname,
        email: draft.email,
        gender: draft.gender,
        city: draft.city,
        designation: draft.designation,
        salary: draft.salary,
        created: now,
        updatedat: now,
    }
}

/// Stamps a partial update before it is written. `created` is never part
/// of an update.
pub fn stamp_changes(changes: EmployeeChanges, now: DateTime<Utc>) -> EmployeeUpdate {
    EmployeeUpdate {
        changes,
        updatedat: now,
    }
}

/// The stored modification time after an update: never earlier than the
/// previous one plus one microsecond.
pub fn advance_updatedat(previous: DateTime<Utc>, now: DateTime<Utc>) -> DateTime<Utc> {
    let floor = previous + chrono::Duration::microseconds(1);
    if now > floor {
        now
    } else {
        floor
    }
}

#[cfg(test)]
pub(crate) fn valid_input() -> EmployeeInput {
    EmployeeInput {
        firstname: Some("  Alice ".into()),
        lastname: Some("WALKER".into()),
        email: Some(" Alice.Walker@Example.COM ".into()),
        gender: Some("Female".into()),
        city: Some("Toronto".into()),
        designation: Some("Software Engineer".into()),
        salary: Some(50_000.0),
        fullname: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn messages(failure: &ValidationFailure, field: &str) -> Vec<String> {
        failure.for_field(field).map(|v| v.message.clone()).collect()
    }

    #[test]
    fn normalizes_text_fields() {
        let employee = validate(valid_input()).unwrap();
        assert_eq!(employee.firstname, "alice");
        assert_eq!(employee.lastname, "walker");
        assert_eq!(employee.email, "alice.walker@example.com");
        assert_eq!(employee.city, "toronto");
        assert_eq!(employee.designation, "software engineer");
        assert_eq!(employee.gender, Some(Gender::Female));
        assert_eq!(employee.salary, Some(50_000));
    }

    #[test]
    fn short_firstname_is_rejected() {
        let input = EmployeeInput {
            firstname: Some("Al".into()),
            ..valid_input()
        };
        let failure = validate(input).unwrap_err();
        assert_eq!(
            messages(&failure, "firstname"),
            vec!["First Name must be at least 5 characters long"]
        );
    }

    #[test]
    fn min_length_counts_the_trimmed_value() {
        let input = EmployeeInput {
            lastname: Some("  Doe   ".into()),
            ..valid_input()
        };
        let failure = validate(input).unwrap_err();
        assert!(failure.has("lastname"));
    }

    #[test]
    fn reports_every_violation() {
        let failure = validate(EmployeeInput {
            salary: Some(500.0),
            gender: Some("robot".into()),
            ..Default::default()
        })
        .unwrap_err();

        let fields: Vec<&str> = failure.violations.iter().map(|v| v.field.as_str()).collect();
        assert_eq!(
            fields,
            vec!["firstname", "lastname", "email", "gender", "city", "designation", "salary"]
        );
        assert_eq!(messages(&failure, "city"), vec!["City is required"]);
        assert_eq!(
            messages(&failure, "gender"),
            vec!["`robot` is not a valid enum value for path `gender`"]
        );
    }

    #[test]
    fn blank_required_field_reports_only_required() {
        let input = EmployeeInput {
            firstname: Some("   ".into()),
            ..valid_input()
        };
        let failure = validate(input).unwrap_err();
        assert_eq!(messages(&failure, "firstname"), vec!["First Name is required"]);
    }

    #[test]
    fn salary_bounds_and_integrality() {
        let with_salary = |salary| EmployeeInput {
            salary: Some(salary),
            ..valid_input()
        };

        let failure = validate(with_salary(500.0)).unwrap_err();
        assert_eq!(messages(&failure, "salary"), vec!["Salary must be at least 1,000"]);

        let failure = validate(with_salary(1_000_000.5)).unwrap_err();
        assert!(messages(&failure, "salary").contains(&"1000000.5 is not an integer value".to_string()));

        let failure = validate(with_salary(2500.5)).unwrap_err();
        assert_eq!(messages(&failure, "salary"), vec!["2500.5 is not an integer value"]);

        assert!(validate(with_salary(1000.0)).is_ok());
        assert!(validate(with_salary(1_000_000.0)).is_ok());
        assert_eq!(validate(with_salary(50_000.0)).unwrap().salary, Some(50_000));
    }

    #[test]
    fn salary_is_optional() {
        let input = EmployeeInput {
            salary: None,
            gender: None,
            ..valid_input()
        };
        let employee = validate(input).unwrap();
        assert_eq!(employee.salary, None);
        assert_eq!(employee.gender, None);
    }

    #[test]
    fn email_must_look_like_an_address() {
        let input = EmployeeInput {
            email: Some("not-an-email".into()),
            ..valid_input()
        };
        let failure = validate(input).unwrap_err();
        assert_eq!(messages(&failure, "email"), vec!["Please fill a valid email address"]);
    }

    #[test]
    fn fullname_fills_missing_names_and_explicit_names_win() {
        let input = EmployeeInput {
            firstname: None,
            lastname: None,
            fullname: Some("Janet   Doherty".into()),
            ..valid_input()
        };
        let employee = validate(input).unwrap();
        assert_eq!(employee.firstname, "janet");
        assert_eq!(employee.lastname, "doherty");

        let input = EmployeeInput {
            fullname: Some("Janet Doherty".into()),
            ..valid_input()
        };
        let employee = validate(input).unwrap();
        assert_eq!(employee.firstname, "alice");
        assert_eq!(employee.lastname, "walker");
    }

    #[test]
    fn fullname_parts_are_held_to_name_rules() {
        let failure = validate(EmployeeInput {
            firstname: None,
            lastname: None,
            fullname: Some("Jane Doe".into()),
            ..valid_input()
        })
        .unwrap_err();
        assert_eq!(
            messages(&failure, "firstname"),
            vec!["First Name must be at least 5 characters long"]
        );
        assert_eq!(
            messages(&failure, "lastname"),
            vec!["Last Name must be at least 5 characters long"]
        );

        let failure = validate_changes(EmployeeInput {
            fullname: Some("Madonna".into()),
            ..Default::default()
        })
        .unwrap_err();
        assert!(!failure.has("firstname"));
        assert_eq!(messages(&failure, "lastname"), vec!["Last Name is required"]);
    }

    #[test]
    fn partial_update_checks_only_supplied_fields() {
        let changes = validate_changes(EmployeeInput {
            city: Some(" Toronto ".into()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(changes.city.as_deref(), Some("toronto"));
        assert_eq!(changes.firstname, None);

        let failure = validate_changes(EmployeeInput {
            designation: Some("".into()),
            salary: Some(2_000_000.0),
            ..Default::default()
        })
        .unwrap_err();
        assert_eq!(messages(&failure, "designation"), vec!["Designation is required"]);
        assert_eq!(messages(&failure, "salary"), vec!["Salary must be at most 1,000,000"]);
        assert!(!failure.has("firstname"));
    }

    #[test]
    fn updatedat_always_moves_forward() {
        let t = now();
        assert!(advance_updatedat(t, t) > t);
        let later = t + chrono::Duration::seconds(5);
        assert_eq!(advance_updatedat(t, later), later);
    }
}
