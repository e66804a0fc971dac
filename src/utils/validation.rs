use validator::ValidationErrors;

use crate::errors::FieldViolation;

/// Flattens validator's per-field error map into a list of violations.
pub fn collect_violations(errors: &ValidationErrors) -> Vec<FieldViolation> {
    errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                let message = e
                    .message
                    .as_deref()
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("{} is invalid", field));
                FieldViolation::new(field, &e.code, message)
            })
        })
        .collect()
}
