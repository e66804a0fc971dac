use std::cmp::Ordering;
use std::str::FromStr;

use crate::models::employee::Employee;
use crate::models::schema::normalize_text;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl FromStr for SortOrder {
    type Err = std::convert::Infallible;

    /// Anything other than `asc` sorts descending.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("asc") {
            Ok(SortOrder::Asc)
        } else {
            Ok(SortOrder::Desc)
        }
    }
}

/// Read-side filter over the employee collection. Every helper narrows
/// the result further; calling one twice replaces its earlier value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmployeeQuery {
    pub email: Option<String>,
    pub designation: Option<String>,
    pub city: Option<String>,
    pub salary_range: Option<(i64, i64)>,
    pub sort: Option<SortOrder>,
}

impl EmployeeQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn by_email(mut self, email: &str) -> Self {
        self.email = Some(normalize_text(email));
        self
    }

    /// Case-insensitive substring match on designation.
    pub fn by_designation(mut self, pattern: &str) -> Self {
        self.designation = Some(pattern.to_string());
        self
    }

    /// Case-insensitive substring match on city.
    pub fn by_city(mut self, pattern: &str) -> Self {
        self.city = Some(pattern.to_string());
        self
    }

    /// Inclusive on both ends.
    pub fn by_salary_range(mut self, min: i64, max: i64) -> Self {
        self.salary_range = Some((min, max));
        self
    }

    pub fn sort_by_salary(mut self, order: SortOrder) -> Self {
        self.sort = Some(order);
        self
    }

    pub fn matches(&self, employee: &Employee) -> bool {
        if let Some(email) = &self.email {
            if employee.email != *email {
                return false;
            }
        }
        if let Some(pattern) = &self.designation {
            if !contains_ignore_case(&employee.designation, pattern) {
                return false;
            }
        }
        if let Some(pattern) = &self.city {
            if !contains_ignore_case(&employee.city, pattern) {
                return false;
            }
        }
        if let Some((min, max)) = self.salary_range {
            match employee.salary {
                Some(salary) if salary >= min && salary <= max => {}
                _ => return false,
            }
        }
        true
    }

    /// Orders by salary when a sort was requested; records without a
    /// salary come first ascending and last descending.
    pub fn sort(&self, employees: &mut [Employee]) {
        if let Some(order) = self.sort {
            employees.sort_by(|a, b| compare_salary(a, b, order));
        }
    }
}

fn compare_salary(a: &Employee, b: &Employee, order: SortOrder) -> Ordering {
    match order {
        SortOrder::Asc => a.salary.cmp(&b.salary),
        SortOrder::Desc => b.salary.cmp(&a.salary),
    }
}

pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Turns caller text into an `ILIKE` substring pattern, escaping the
/// wildcard characters so the text only ever matches literally.
pub fn like_pattern(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len() + 2);
    escaped.push('%');
    for c in text.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::employee::sample_employee;

    fn with_salary(salary: Option<i64>) -> Employee {
        Employee {
            salary,
            ..sample_employee()
        }
    }

    #[test]
    fn helpers_compose_by_conjunction() {
        let employee = sample_employee();
        let query = EmployeeQuery::new().by_city("TOR").by_designation("engineer");
        assert!(query.matches(&employee));

        let query = query.by_salary_range(60_000, 70_000);
        assert!(!query.matches(&employee));
    }

    #[test]
    fn email_lookup_is_normalized() {
        let employee = sample_employee();
        assert!(EmployeeQuery::new()
            .by_email("  ALICE.walker@example.com ")
            .matches(&employee));
    }

    #[test]
    fn salary_range_is_inclusive() {
        let query = EmployeeQuery::new().by_salary_range(1000, 2000);
        assert!(query.matches(&with_salary(Some(1000))));
        assert!(query.matches(&with_salary(Some(2000))));
        assert!(!query.matches(&with_salary(Some(2001))));
        assert!(!query.matches(&with_salary(None)));
    }

    #[test]
    fn pattern_characters_match_literally() {
        let mut employee = sample_employee();
        employee.designation = "qa lead".into();
        assert!(!EmployeeQuery::new().by_designation(".*").matches(&employee));
        assert_eq!(like_pattern("50%_a\\b"), "%50\\%\\_a\\\\b%");
    }

    #[test]
    fn sort_orders_by_salary() {
        let mut employees = vec![
            with_salary(Some(3000)),
            with_salary(None),
            with_salary(Some(1000)),
        ];
        EmployeeQuery::new().sort_by_salary(SortOrder::Asc).sort(&mut employees);
        let salaries: Vec<_> = employees.iter().map(|e| e.salary).collect();
        assert_eq!(salaries, vec![None, Some(1000), Some(3000)]);

        EmployeeQuery::new().sort_by_salary(SortOrder::Desc).sort(&mut employees);
        let salaries: Vec<_> = employees.iter().map(|e| e.salary).collect();
        assert_eq!(salaries, vec![Some(3000), Some(1000), None]);
    }

    #[test]
    fn sort_order_parses_leniently() {
        assert_eq!("asc".parse::<SortOrder>(), Ok(SortOrder::Asc));
        assert_eq!("DESC".parse::<SortOrder>(), Ok(SortOrder::Desc));
        assert_eq!("whatever".parse::<SortOrder>(), Ok(SortOrder::Desc));
    }
}
