//! Helpers for combining derive-based validation with checks that need runtime
//! context (current year, cross-field rules).

use chrono::{Datelike, Utc};
use validator::{Validate, ValidationErrors};

use crate::error::{AppError, FieldError, Result};

pub const MIN_GRADUATION_YEAR: i32 = 1950;

/// Latest accepted graduation year: five years past the current one.
pub fn max_graduation_year() -> i32 {
    Utc::now().year() + 5
}

pub fn check_graduation_year(year: i32) -> Option<FieldError> {
    if year < MIN_GRADUATION_YEAR {
        Some(FieldError::new("graduationYear", "Graduation year must be valid"))
    } else if year > max_graduation_year() {
        Some(FieldError::new(
            "graduationYear",
            "Graduation year cannot be in the future",
        ))
    } else {
        None
    }
}

pub fn field_errors(result: std::result::Result<(), ValidationErrors>) -> Vec<FieldError> {
    match result {
        Ok(()) => Vec::new(),
        Err(errors) => match AppError::from(errors) {
            AppError::Validation(fields) => fields,
            _ => Vec::new(),
        },
    }
}

/// Runs the derived validators and appends `extra`, failing if anything was collected.
pub fn validate_with<T: Validate>(payload: &T, extra: Vec<FieldError>) -> Result<()> {
    let mut errors = field_errors(payload.validate());
    errors.extend(extra);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(errors))
    }
}

/// Trims every entry and drops the empty ones.
pub fn clean_list(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn graduation_year_bounds() {
        assert!(check_graduation_year(1950).is_none());
        assert!(check_graduation_year(1949).is_some());
        assert!(check_graduation_year(max_graduation_year()).is_none());
        assert!(check_graduation_year(max_graduation_year() + 1).is_some());
    }

    #[test]
    fn clean_list_trims_and_drops_blanks() {
        let cleaned = clean_list(vec![" rust ".into(), "".into(), "  ".into(), "sql".into()]);
        assert_eq!(cleaned, vec!["rust".to_string(), "sql".to_string()]);
    }
}
