//! MySQL-style DATETIME strings

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const DATETIME_INPUTS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
];

const DATE_INPUTS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d %B %Y", "%B %d, %Y"];

/// Format a date for a DATETIME (or DATE) column.
///
/// `None` or an empty string formats the current local time. Returns `None`
/// when the input cannot be parsed.
///
/// ```
/// use rust_sql_wrapper::core::datetime::format_datetime;
///
/// assert_eq!(
///     format_datetime(Some("2024/02/29"), true).as_deref(),
///     Some("2024-02-29 00:00:00")
/// );
/// assert_eq!(format_datetime(Some("not a date"), false), None);
/// ```
pub fn format_datetime(date: Option<&str>, with_time: bool) -> Option<String> {
    let format = if with_time { DATETIME_FORMAT } else { DATE_FORMAT };

    let date = date.map(str::trim).unwrap_or_default();
    if date.is_empty() {
        return Some(Local::now().format(format).to_string());
    }

    parse_datetime(date).map(|dt| dt.format(format).to_string())
}

fn parse_datetime(input: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.with_timezone(&Local).naive_local());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(input) {
        return Some(dt.with_timezone(&Local).naive_local());
    }
    DATETIME_INPUTS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
        .or_else(|| {
            DATE_INPUTS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(input, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_shapes() {
        let date = format_datetime(None, false).unwrap();
        assert_eq!(date.len(), 10);
        let datetime = format_datetime(Some(""), true).unwrap();
        assert_eq!(datetime.len(), 19);
    }

    #[test]
    fn test_reformat() {
        assert_eq!(
            format_datetime(Some("2023-07-04 09:30:00"), true).as_deref(),
            Some("2023-07-04 09:30:00")
        );
        assert_eq!(
            format_datetime(Some("2023-07-04 09:30:00"), false).as_deref(),
            Some("2023-07-04")
        );
        assert_eq!(
            format_datetime(Some("07/04/2023"), true).as_deref(),
            Some("2023-07-04 00:00:00")
        );
        assert_eq!(
            format_datetime(Some("4 July 2023"), false).as_deref(),
            Some("2023-07-04")
        );
    }

    #[test]
    fn test_invalid() {
        assert_eq!(format_datetime(Some("2023-02-30"), true), None);
        assert_eq!(format_datetime(Some("yesterday-ish"), true), None);
    }
}
