use serde::Serialize;

/// A row of a hub's `locations.csv`.
///
/// Metro hubs keep the human-readable slug in `location` and the numeric
/// code in `original_location_code`; `abbreviation` is unused there.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationRecord {
    pub location: String,
    pub abbreviation: Option<String>,
    pub location_name: String,
    pub population: Option<f64>,
    pub original_location_code: Option<String>,
}

/// Location entry of `metadata.json`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationEntry {
    pub location: String,
    pub abbreviation: String,
    pub location_name: String,
    pub population: Option<f64>,
}
