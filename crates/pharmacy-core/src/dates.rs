//! # Date Codecs
//!
//! The only bit-exact compatibility surface with the legacy files is
//! their date strings:
//!
//! | Field                      | Pattern                | Example               |
//! |----------------------------|------------------------|-----------------------|
//! | `expiry`, `import_date`    | `dd/mm/yyyy`           | `01/05/2025`          |
//! | sale `date`                | `dd/mm/yyyy HH:MM:SS`  | `14/03/2025 08:05:09` |
//!
//! Inside the engine dates are `chrono::NaiveDate` / `NaiveDateTime`
//! (no time zone: the shop runs on local wall-clock time).

use chrono::{NaiveDate, NaiveDateTime};

use crate::error::ValidationError;

/// strftime pattern for calendar dates.
pub const DATE_FORMAT: &str = "%d/%m/%Y";

/// strftime pattern for sale timestamps.
pub const TIMESTAMP_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// Parses a `dd/mm/yyyy` date.
///
/// Surrounding whitespace is ignored.
///
/// ## Example
/// ```rust
/// use pharmacy_core::dates::parse_date;
///
/// let d = parse_date("expiry", "01/05/2025").unwrap();
/// assert_eq!(d.to_string(), "2025-05-01");
/// assert!(parse_date("expiry", "2025-05-01").is_err());
/// ```
pub fn parse_date(field: &str, value: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|e| {
        ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: format!("expected dd/mm/yyyy, got '{}' ({})", value, e),
        }
    })
}

/// Parses a `dd/mm/yyyy HH:MM:SS` timestamp.
pub fn parse_timestamp(field: &str, value: &str) -> Result<NaiveDateTime, ValidationError> {
    NaiveDateTime::parse_from_str(value.trim(), TIMESTAMP_FORMAT).map_err(|e| {
        ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: format!("expected dd/mm/yyyy HH:MM:SS, got '{}' ({})", value, e),
        }
    })
}

/// Formats a date as `dd/mm/yyyy`.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Formats a timestamp as `dd/mm/yyyy HH:MM:SS`.
///
/// Sub-second precision is dropped.
pub fn format_timestamp(at: NaiveDateTime) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date() {
        let d = parse_date("expiry", " 31/12/2026 ").unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2026, 12, 31).unwrap());

        assert!(parse_date("expiry", "").is_err());
        assert!(parse_date("expiry", "31/02/2026").is_err());
        assert!(parse_date("expiry", "12/31/2026").is_err());
    }

    #[test]
    fn test_parse_date_error_names_field() {
        let err = parse_date("import_date", "bogus").unwrap_err();
        assert!(err.to_string().starts_with("import_date has invalid format"));
    }

    #[test]
    fn test_timestamp_round_trip() {
        let at = parse_timestamp("date", "14/03/2025 08:05:09").unwrap();
        assert_eq!(format_timestamp(at), "14/03/2025 08:05:09");
        assert!(parse_timestamp("date", "14/03/2025").is_err());
    }

    #[test]
    fn test_format_date_pads() {
        let d = NaiveDate::from_ymd_opt(2025, 5, 1).unwrap();
        assert_eq!(format_date(d), "01/05/2025");
    }
}
