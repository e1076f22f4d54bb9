//! Calendar date parsing for Hubverse tables.
//!
//! Hubs publish dates as ISO strings, but re-exported tables and Parquet
//! timestamps show up in a handful of other shapes. Only the date part is kept.

use chrono::NaiveDate;

use crate::error::{ConvertError, Result};

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// Parse a date, accepting timestamp strings by their date part.
pub fn try_parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Some(date) = parse_date_only(trimmed) {
        return Some(date);
    }
    let date_part = trimmed.split(['T', ' ']).next()?;
    if date_part.len() == trimmed.len() {
        return None;
    }
    parse_date_only(date_part)
}

fn parse_date_only(value: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
}

/// Parse a required date cell, naming the column on failure.
pub fn parse_date(column: &str, raw: &str) -> Result<NaiveDate> {
    try_parse_date(raw).ok_or_else(|| ConvertError::invalid_date(column, raw))
}

/// Format a date the way every output document spells it.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// True when the value is a well-formed `YYYY-MM-DD` string.
pub fn is_iso_date(value: &str) -> bool {
    value.len() == 10 && NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
}
