//! Date parsing and formatting helpers
//!
//! Clients send dates in a handful of shapes (`2000-Nov-11`, `2000-11-11`,
//! `2000-11-11T00:00:00.000Z`, offsets). Everything is normalized to UTC.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
];

/// Whole years between `born` and `today`.
///
/// A 29 February birthday is celebrated on 28 February in common years.
pub fn calculate_age(born: NaiveDate, today: NaiveDate) -> i32 {
    let birthday = born
        .with_year(today.year())
        .or_else(|| NaiveDate::from_ymd_opt(today.year(), born.month(), born.day() - 1))
        .unwrap_or(today);

    let years = today.year() - born.year();
    if birthday > today {
        years - 1
    } else {
        years
    }
}

/// Age as of the current UTC date
pub fn age_today(born: NaiveDate) -> i32 {
    calculate_age(born, Utc::now().date_naive())
}

/// Parse `YYYY-Mon-DD` (e.g. `2000-Nov-11`)
pub fn parse_month_name_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%b-%d").ok()
}

/// Parse an ISO 8601 timestamp into a UTC-normalized naive datetime.
///
/// Accepts a trailing `Z`, a numeric offset, fractional seconds, or no zone at
/// all (interpreted as UTC).
pub fn parse_iso_datetime(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc).naive_utc());
    }
    let without_z = value.strip_suffix('Z').unwrap_or(value);
    NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(without_z, fmt).ok())
}

/// Parse an ISO 8601 date, or the date part of an ISO 8601 timestamp
pub fn parse_iso_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| parse_iso_datetime(value).map(|dt| dt.date()))
}

/// Parse a date of birth in either the month-name or the ISO form
pub fn parse_birth_date(value: &str) -> Option<NaiveDate> {
    parse_month_name_date(value).or_else(|| parse_iso_date(value))
}

/// Parse a stored timestamp (RFC 3339 or SQLite's `YYYY-MM-DD HH:MM:SS`)
pub fn parse_db_timestamp(ts: &str) -> DateTime<Utc> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(ts) {
        return dt.with_timezone(&Utc);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(ts, "%Y-%m-%d %H:%M:%S") {
        return DateTime::<Utc>::from_naive_utc_and_offset(dt, Utc);
    }
    Utc::now()
}

/// Parse a stored naive datetime column
pub fn parse_db_naive_datetime(ts: &str) -> Option<NaiveDateTime> {
    parse_iso_datetime(ts)
}

/// Parse a stored `YYYY-MM-DD` column
pub fn parse_db_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

/// `YYYY-MM-DDTHH:MM:SS`, the form naive datetimes are stored and returned in
pub fn format_naive_datetime(dt: &NaiveDateTime) -> String {
    dt.format("%Y-%m-%dT%H:%M:%S").to_string()
}
