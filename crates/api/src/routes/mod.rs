//! API route definitions.

use chrono::NaiveDate;

use crate::error::{ApiError, ApiResult};

pub mod health;
pub mod osas;
pub mod pres;

/// Parses an optional `YYYY-MM-DD` field; blank means absent.
pub(crate) fn parse_date(value: Option<&str>) -> ApiResult<Option<NaiveDate>> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(v) => NaiveDate::parse_from_str(v, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| ApiError::bad_request(format!("Invalid date: {v}"))),
    }
}

/// Today's date in UTC.
pub(crate) fn today() -> NaiveDate {
    chrono::Utc::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date(Some("2025-08-01")).unwrap(),
            NaiveDate::from_ymd_opt(2025, 8, 1)
        );
        assert_eq!(parse_date(Some("  ")).unwrap(), None);
        assert_eq!(parse_date(None).unwrap(), None);
        assert!(parse_date(Some("08/01/2025")).is_err());
    }
}
