// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for calendar-date parsing and formatting.

use chrono::NaiveDate;

/// Wire/form format for entry dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a `YYYY-MM-DD` calendar date. A trailing time component
/// (`2024-01-05T00:00:00Z`) is ignored.
pub fn parse_entry_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let date_part = raw.split_once('T').map_or(raw, |(d, _)| d);
    NaiveDate::parse_from_str(date_part, DATE_FORMAT).ok()
}

/// Format a date as `YYYY-MM-DD`.
pub fn format_entry_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Short chart label, e.g. `Jan 5`.
pub fn short_date(date: NaiveDate) -> String {
    date.format("%b %-d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_entry_date() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        assert_eq!(parse_entry_date("2024-01-05"), Some(expected));
        assert_eq!(parse_entry_date(" 2024-01-05T10:00:00Z "), Some(expected));
        assert_eq!(parse_entry_date("05/01/2024"), None);
        assert_eq!(parse_entry_date(""), None);
    }

    #[test]
    fn test_short_date() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        assert_eq!(short_date(date), "Jan 5");
        assert_eq!(format_entry_date(date), "2024-01-05");
    }
}
