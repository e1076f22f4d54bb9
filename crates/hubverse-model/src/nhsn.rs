//! NHSN surveillance records and the time-series documents built from them.
//!
//! NHSN publishes one flat record per jurisdiction and reporting week; every
//! column other than the two key columns is a numeric series.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

pub const NHSN_JURISDICTION_COLUMN: &str = "jurisdiction";
pub const NHSN_DATE_COLUMN: &str = "weekendingdate";
pub const NHSN_DATASET_LABEL: &str = "NHSN";
pub const NHSN_SERIES_TYPE: &str = "timeseries";
pub const NHSN_FILE_SUFFIX: &str = "nhsn";

/// Jurisdictions that get a document: the states, DC and the national total.
pub const NHSN_JURISDICTIONS: [&str; 52] = [
    "AL", "AK", "AZ", "AR", "CA", "CO", "CT", "DE", "DC", "FL", "GA", "HI", "ID", "IL", "IN",
    "IA", "KS", "KY", "LA", "ME", "MD", "MA", "MI", "MN", "MS", "MO", "MT", "NE", "NV", "NH",
    "NJ", "NM", "NY", "NC", "ND", "OH", "OK", "OR", "PA", "RI", "SC", "SD", "TN", "TX", "UT",
    "VT", "VA", "WA", "WV", "WI", "WY", "US",
];

/// One NHSN record.
#[derive(Debug, Clone, PartialEq)]
pub struct NhsnRecord {
    pub jurisdiction: String,
    pub week_ending_date: NaiveDate,
    /// Value columns in table order.
    pub values: Vec<(String, Option<f64>)>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NhsnMetadata {
    pub location: String,
    pub abbreviation: String,
    pub location_name: String,
    pub population: Option<i64>,
    pub dataset: String,
    pub series_type: String,
}

/// Week-ending dates with one aligned array per value column.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NhsnSeries {
    pub dates: Vec<String>,
    #[serde(flatten)]
    pub columns: BTreeMap<String, Vec<Option<f64>>>,
}

/// A per-jurisdiction NHSN document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NhsnDocument {
    pub metadata: NhsnMetadata,
    pub series: NhsnSeries,
}

/// The NHSN dataset's `metadata.json`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NhsnMetadataDocument {
    pub last_updated: String,
    pub dataset: String,
    /// Every column of the source table, key columns included, under their display names.
    pub columns: Vec<String>,
    /// Abbreviations of the jurisdictions that received a document.
    pub locations: Vec<String>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn series_flattens_columns_after_dates() {
        let mut columns = BTreeMap::new();
        columns.insert("totalconfflunewadm".to_string(), vec![Some(12.0), None]);
        let series = NhsnSeries {
            dates: vec!["2024-01-06".to_string(), "2024-01-13".to_string()],
            columns,
        };
        let text = serde_json::to_string(&series).unwrap();
        assert!(text.starts_with("{\"dates\""));
        assert_eq!(
            serde_json::to_value(&series).unwrap(),
            json!({
                "dates": ["2024-01-06", "2024-01-13"],
                "totalconfflunewadm": [12.0, null]
            })
        );
    }

    #[test]
    fn jurisdiction_list_includes_national_total() {
        assert!(NHSN_JURISDICTIONS.contains(&"US"));
        assert!(NHSN_JURISDICTIONS.contains(&"DC"));
        assert!(!NHSN_JURISDICTIONS.contains(&"PR"));
    }
}
