/// Utilities for date parsing and formatting
///
/// Dates travel over the wire as ISO (`YYYY-MM-DD`); users type either ISO or `DD.MM.YYYY`.
use chrono::{DateTime, NaiveDate, Utc};

/// Parse a user-entered date in `YYYY-MM-DD` or `DD.MM.YYYY` form
pub fn parse_user_date(input: &str) -> Option<NaiveDate> {
    let input = input.trim();
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(input, "%d.%m.%Y"))
        .ok()
}

/// Format date as DD.MM.YYYY
pub fn format_date(date: NaiveDate) -> String {
    date.format("%d.%m.%Y").to_string()
}

/// Format UTC timestamp as DD.MM.YYYY HH:MM:SS
pub fn format_datetime(ts: &DateTime<Utc>) -> String {
    ts.format("%d.%m.%Y %H:%M:%S").to_string()
}

/// Today's date as ISO string, for prefilling date inputs
pub fn today_iso() -> String {
    Utc::now().date_naive().format("%Y-%m-%d").to_string()
}
