//! Strict `YYYY-MM-DD` due-date rule.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

pub const DUE_DATE_MESSAGE: &str = "Due date must be in YYYY-MM-DD format and a valid date";

static DATE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid date regex"));

/// Returns `true` if `value` is empty ("no date") or a real calendar date
/// written exactly as `YYYY-MM-DD`.
///
/// The parsed date must render back to the same string, which rejects
/// values such as `2024-02-30`.
pub fn is_valid_due_date(value: &str) -> bool {
    if value.is_empty() {
        return true;
    }
    if !DATE_PATTERN.is_match(value) {
        return false;
    }
    match NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        Ok(date) => date.format("%Y-%m-%d").to_string() == value,
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_is_accepted() {
        assert!(is_valid_due_date(""));
    }

    #[test]
    fn real_dates_are_accepted() {
        assert!(is_valid_due_date("2024-01-31"));
        assert!(is_valid_due_date("2024-02-29"));
        assert!(is_valid_due_date("1999-12-31"));
    }

    #[test]
    fn impossible_dates_are_rejected() {
        assert!(!is_valid_due_date("2024-02-30"));
        assert!(!is_valid_due_date("2023-02-29"));
        assert!(!is_valid_due_date("2024-13-01"));
        assert!(!is_valid_due_date("2024-00-10"));
    }

    #[test]
    fn loose_formats_are_rejected() {
        assert!(!is_valid_due_date("2024-1-5"));
        assert!(!is_valid_due_date("2024/01/05"));
        assert!(!is_valid_due_date("05-01-2024"));
        assert!(!is_valid_due_date("2024-01-05T00:00:00Z"));
        assert!(!is_valid_due_date(" 2024-01-05"));
        assert!(!is_valid_due_date("tomorrow"));
    }
}
