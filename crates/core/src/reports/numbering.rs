//! Report numbers and the text printed in report headers.

use chrono::{Datelike, Month, NaiveDate};

/// Next report number after `last`.
///
/// Report numbers look like `2025-3`; the part after the last `-` is the
/// running counter. Anything unparseable starts over at 1.
#[must_use]
pub fn next_report_number(last: Option<&str>) -> i64 {
    last.and_then(|no| no.rsplit('-').next())
        .and_then(|tail| tail.trim().parse::<i64>().ok())
        .map_or(1, |n| n.saturating_add(1))
}

/// Header month text such as `AUGUST 2025`.
#[must_use]
pub fn report_month_text(month_name: &str, year: i32) -> String {
    format!("{} {year}", month_name.trim()).to_uppercase()
}

/// College line of the report header.
#[must_use]
pub fn college_name(department: Option<&str>) -> String {
    department
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map_or_else(|| "COLLEGE".to_string(), str::to_uppercase)
}

/// English month name for a 1-based month number.
#[must_use]
pub fn month_name(order: u32) -> Option<&'static str> {
    u8::try_from(order)
        .ok()
        .and_then(|n| Month::try_from(n).ok())
        .map(|m| m.name())
}

/// Folder label `YYYY-MM`.
#[must_use]
pub fn folder_month(year: i32, month_order: u32) -> String {
    format!("{year:04}-{month_order:02}")
}

/// Month folders `(month_order, year)` of the academic year containing `date`.
///
/// The academic year starts in August; dates from June onward belong to the
/// year starting that August, earlier dates to the one that started the
/// previous August.
#[must_use]
pub fn academic_year_folders(date: NaiveDate) -> Vec<(u32, i32)> {
    let start = if date.month() >= 6 {
        date.year()
    } else {
        date.year() - 1
    };
    (8..=12)
        .map(|m| (m, start))
        .chain((1..=5).map(|m| (m, start + 1)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(None, 1)]
    #[case(Some(""), 1)]
    #[case(Some("2025-3"), 4)]
    #[case(Some("LSPU-2025-09"), 10)]
    #[case(Some("12"), 13)]
    #[case(Some("2025-x"), 1)]
    #[case(Some("2025-"), 1)]
    fn test_next_report_number(#[case] last: Option<&str>, #[case] expected: i64) {
        assert_eq!(next_report_number(last), expected);
    }

    #[test]
    fn test_report_month_text() {
        assert_eq!(report_month_text("August", 2025), "AUGUST 2025");
        assert_eq!(report_month_text(" may ", 2026), "MAY 2026");
    }

    #[test]
    fn test_college_name() {
        assert_eq!(
            college_name(Some("College of Computer Studies")),
            "COLLEGE OF COMPUTER STUDIES"
        );
        assert_eq!(college_name(Some("  ")), "COLLEGE");
        assert_eq!(college_name(None), "COLLEGE");
    }

    #[test]
    fn test_month_name() {
        assert_eq!(month_name(1), Some("January"));
        assert_eq!(month_name(12), Some("December"));
        assert_eq!(month_name(0), None);
        assert_eq!(month_name(13), None);
    }

    #[rstest]
    #[case(NaiveDate::from_ymd_opt(2025, 8, 15).unwrap(), 2025)]
    #[case(NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(), 2025)]
    #[case(NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(), 2025)]
    #[case(NaiveDate::from_ymd_opt(2026, 5, 31).unwrap(), 2025)]
    fn test_academic_year_folders(#[case] date: NaiveDate, #[case] start: i32) {
        let folders = academic_year_folders(date);
        assert_eq!(folders.len(), 10);
        assert_eq!(folders[0], (8, start));
        assert_eq!(folders[4], (12, start));
        assert_eq!(folders[5], (1, start + 1));
        assert_eq!(folders[9], (5, start + 1));
    }

    #[test]
    fn test_folder_month() {
        assert_eq!(folder_month(2025, 8), "2025-08");
    }
}
