//! Polars AnyValue utility functions.
//!
//! Parquet cells are flattened to strings so both table formats share one
//! row-parsing path.

use chrono::NaiveDate;
use polars::prelude::AnyValue;

/// Day number of 1970-01-01 counted from 0001-01-01 (CE day 1).
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Converts a Polars AnyValue to a String representation.
/// Returns empty string for Null; dates come out as `YYYY-MM-DD`.
pub fn any_to_string(value: AnyValue<'_>) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::Int8(v) => v.to_string(),
        AnyValue::Int16(v) => v.to_string(),
        AnyValue::Int32(v) => v.to_string(),
        AnyValue::Int64(v) => v.to_string(),
        AnyValue::UInt8(v) => v.to_string(),
        AnyValue::UInt16(v) => v.to_string(),
        AnyValue::UInt32(v) => v.to_string(),
        AnyValue::UInt64(v) => v.to_string(),
        AnyValue::Float32(v) => format_numeric(f64::from(v)),
        AnyValue::Float64(v) => format_numeric(v),
        AnyValue::String(s) => s.to_string(),
        AnyValue::StringOwned(s) => s.to_string(),
        AnyValue::Boolean(b) => b.to_string(),
        AnyValue::Date(days) => epoch_days_to_date(days)
            .map(|date| date.format("%Y-%m-%d").to_string())
            .unwrap_or_default(),
        other => other.to_string(),
    }
}

/// Formats a floating-point number without a trailing fractional zero.
pub fn format_numeric(v: f64) -> String {
    if v.is_nan() {
        return String::new();
    }
    let s = format!("{v}");
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        s
    }
}

fn epoch_days_to_date(days: i32) -> Option<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(days.checked_add(UNIX_EPOCH_DAYS_FROM_CE)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_formatting_keeps_integer_digits() {
        assert_eq!(format_numeric(10.0), "10");
        assert_eq!(format_numeric(0.025), "0.025");
        assert_eq!(format_numeric(1.5), "1.5");
        assert_eq!(format_numeric(f64::NAN), "");
    }

    #[test]
    fn dates_render_as_iso() {
        assert_eq!(any_to_string(AnyValue::Date(0)), "1970-01-01");
        assert_eq!(any_to_string(AnyValue::Date(19_728)), "2024-01-06");
    }

    #[test]
    fn nulls_and_strings() {
        assert_eq!(any_to_string(AnyValue::Null), "");
        assert_eq!(any_to_string(AnyValue::String("06")), "06");
        assert_eq!(any_to_string(AnyValue::Int64(-1)), "-1");
    }
}
