//! Display helpers.

use chrono::{DateTime, NaiveDate};

/// Render a stored date as a short `"Mon D"` label, e.g. `"Mar 5"`.
///
/// Accepts RFC 3339 timestamps (the calendar day is taken in UTC) and
/// plain `YYYY-MM-DD` dates. Returns `None` for missing, empty or
/// unparseable input.
pub fn format_date(value: Option<&str>) -> Option<String> {
    let value = value.filter(|v| !v.is_empty())?;
    let date = DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.naive_utc().date())
        .or_else(|_| NaiveDate::parse_from_str(value, "%Y-%m-%d"))
        .ok()?;
    Some(date.format("%b %-d").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_and_empty_are_none() {
        assert_eq!(format_date(None), None);
        assert_eq!(format_date(Some("")), None);
    }

    #[test]
    fn formats_timestamps() {
        assert_eq!(format_date(Some("1999-01-15T10:30:00Z")).as_deref(), Some("Jan 15"));
        assert_eq!(format_date(Some("1999-12-31T10:30:00Z")).as_deref(), Some("Dec 31"));
    }

    #[test]
    fn single_digit_day_has_no_padding() {
        assert_eq!(format_date(Some("1999-03-05T10:30:00Z")).as_deref(), Some("Mar 5"));
    }

    #[test]
    fn formats_plain_dates() {
        assert_eq!(format_date(Some("2024-07-04")).as_deref(), Some("Jul 4"));
    }

    #[test]
    fn garbage_is_none() {
        assert_eq!(format_date(Some("not a date")), None);
    }
}
