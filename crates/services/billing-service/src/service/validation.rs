//! Field checks shared by the office and device services.

use once_cell::sync::Lazy;
use regex::Regex;

use common::{AppError, AppResult};
use domain::NPI_LENGTH;

static NPI_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{10}$").expect("NPI pattern is a valid regex"));

/// Trimmed value of a required text field.
pub(crate) fn required(field: &str, value: String) -> AppResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation(format!("{} is required", field)));
    }
    Ok(trimmed.to_string())
}

/// Trimmed value of an optional text field, empty meaning absent.
pub(crate) fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// National Provider Identifier: exactly ten digits.
pub(crate) fn npi(value: String) -> AppResult<String> {
    let value = value.trim().to_string();
    if !NPI_PATTERN.is_match(&value) {
        return Err(AppError::validation(format!(
            "NPI must be exactly {} digits",
            NPI_LENGTH
        )));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_npi_requires_ten_digits() {
        assert_eq!(npi(" 1234567890 ".to_string()).unwrap(), "1234567890");
        assert!(npi("123456789".to_string()).is_err());
        assert!(npi("12345678901".to_string()).is_err());
        assert!(npi("12345abcde".to_string()).is_err());
    }

    #[test]
    fn test_required_rejects_blank() {
        assert!(matches!(required("Name", "   ".to_string()), Err(AppError::Validation(_))));
        assert_eq!(required("Name", " Lune ".to_string()).unwrap(), "Lune");
    }

    #[test]
    fn test_optional_drops_blank() {
        assert_eq!(optional(Some("  ".to_string())), None);
        assert_eq!(optional(Some(" a@b.c ".to_string())), Some("a@b.c".to_string()));
        assert_eq!(optional(None), None);
    }
}
