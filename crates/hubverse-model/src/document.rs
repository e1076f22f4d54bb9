//! Output documents: one per location plus a dataset-level `metadata.json`.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::location::LocationEntry;
use crate::tree::{ForecastTree, PeaksTree};

/// File name of the dataset-level metadata document.
pub const METADATA_FILE_NAME: &str = "metadata.json";

/// Distinct Hubverse keys seen in a location's forecast rows, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HubverseKeys {
    pub models: Vec<String>,
    pub targets: Vec<String>,
    pub horizons: Vec<String>,
    pub output_types: Vec<String>,
}

/// The `metadata` section of a location document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentMetadata {
    pub location: String,
    pub abbreviation: String,
    pub location_name: String,
    pub population: Option<i64>,
    pub dataset: String,
    pub series_type: String,
    pub hubverse_keys: HubverseKeys,
}

/// Date-aligned observations, one array per target.
///
/// Every array in `series` has the same length as `dates`; missing cells are `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GroundTruthSeries {
    pub dates: Vec<String>,
    #[serde(flatten)]
    pub series: BTreeMap<String, Vec<Option<f64>>>,
}

impl GroundTruthSeries {
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn targets(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(String::as_str)
    }
}

/// A complete per-location document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationDocument {
    pub metadata: DocumentMetadata,
    pub ground_truth: GroundTruthSeries,
    pub forecasts: ForecastTree,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peaks: Option<PeaksTree>,
}

/// The dataset-level `metadata.json`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetMetadataDocument {
    /// ISO-8601 UTC timestamp, e.g. `2024-01-08T14:03:00Z`.
    pub last_updated: String,
    pub models: Vec<String>,
    pub locations: Vec<LocationEntry>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn metadata() -> DocumentMetadata {
        DocumentMetadata {
            location: "06".to_string(),
            abbreviation: "CA".to_string(),
            location_name: "California".to_string(),
            population: Some(39_000_000),
            dataset: "flusight forecasts".to_string(),
            series_type: "projection".to_string(),
            hubverse_keys: HubverseKeys::default(),
        }
    }

    #[test]
    fn peaks_key_is_omitted_when_absent() {
        let document = LocationDocument {
            metadata: metadata(),
            ground_truth: GroundTruthSeries::default(),
            forecasts: ForecastTree::new(),
            peaks: None,
        };
        let value = serde_json::to_value(&document).unwrap();
        let object = value.as_object().unwrap();
        assert!(!object.contains_key("peaks"));
        assert_eq!(value["ground_truth"], json!({ "dates": [] }));
        assert_eq!(value["metadata"]["population"], json!(39_000_000));
    }

    #[test]
    fn ground_truth_flattens_targets() {
        let mut series = BTreeMap::new();
        series.insert("wk inc flu hosp".to_string(), vec![Some(3.0), None]);
        let truth = GroundTruthSeries {
            dates: vec!["2024-01-06".to_string(), "2024-01-13".to_string()],
            series,
        };
        assert_eq!(
            serde_json::to_value(&truth).unwrap(),
            json!({
                "dates": ["2024-01-06", "2024-01-13"],
                "wk inc flu hosp": [3.0, null]
            })
        );
    }
}
