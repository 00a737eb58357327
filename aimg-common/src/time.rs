//! Timestamp utilities

use chrono::{Local, NaiveDate};

/// Today's local date in `YYYY-MM-DD` form
pub fn today() -> String {
    Local::now().date_naive().format("%Y-%m-%d").to_string()
}

/// Parse a `YYYY-MM-DD` date, returning None for anything else
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}
