//! Dataset profiles: the per-hub parameters of the conversion.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{ConvertError, Result};

/// Built-in hub families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DatasetKind {
    Flu,
    FluMetro,
    Rsv,
    Covid,
}

impl DatasetKind {
    pub const ALL: [DatasetKind; 4] = [Self::Flu, Self::FluMetro, Self::Rsv, Self::Covid];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Flu => "flu",
            Self::FluMetro => "flu-metro",
            Self::Rsv => "rsv",
            Self::Covid => "covid",
        }
    }

    pub fn profile(self) -> DatasetProfile {
        match self {
            Self::Flu => DatasetProfile {
                file_suffix: "flusight".to_string(),
                dataset_label: "flusight forecasts".to_string(),
                ground_truth_value_key: Some("wk inc flu hosp".to_string()),
                ground_truth_date_column: "target_end_date".to_string(),
                ground_truth_min_date: season_start(),
                output_dir: "flusight".to_string(),
                ..DatasetProfile::default()
            },
            Self::FluMetro => DatasetProfile {
                file_suffix: "flu_metrocast".to_string(),
                dataset_label: "flu metrocast forecasts".to_string(),
                ground_truth_value_key: None,
                ground_truth_date_column: "target_end_date".to_string(),
                ground_truth_min_date: metrocast_cutover(),
                is_metro: true,
                min_reference_date: metrocast_cutover(),
                output_dir: "flu_metrocast".to_string(),
                ..DatasetProfile::default()
            },
            Self::Rsv => DatasetProfile {
                file_suffix: "rsv".to_string(),
                dataset_label: "rsv forecast hub".to_string(),
                ground_truth_value_key: Some("wk inc rsv hosp".to_string()),
                ground_truth_date_column: "date".to_string(),
                ground_truth_min_date: season_start(),
                output_dir: "rsv".to_string(),
                ..DatasetProfile::default()
            },
            Self::Covid => DatasetProfile {
                file_suffix: "covid19".to_string(),
                dataset_label: "covid19 forecasts".to_string(),
                ground_truth_value_key: Some("wk inc covid hosp".to_string()),
                ground_truth_date_column: "date".to_string(),
                ground_truth_min_date: season_start(),
                output_dir: "covid19".to_string(),
                ..DatasetProfile::default()
            },
        }
    }
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DatasetKind {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ConvertError::InvalidProfile {
                message: format!("unknown dataset '{s}'"),
            })
    }
}

fn season_start() -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(2023, 10, 1)
}

/// First reference date with usable metrocast submissions.
fn metrocast_cutover() -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(2025, 11, 19)
}

/// Parameters that distinguish one hub family's conversion from another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetProfile {
    /// Output files are named `{abbreviation}_{file_suffix}.json`.
    pub file_suffix: String,
    pub dataset_label: String,
    /// Target assigned to ground truth rows when the table has no `target` column.
    pub ground_truth_value_key: Option<String>,
    pub ground_truth_date_column: String,
    pub ground_truth_min_date: Option<NaiveDate>,
    pub series_type: String,
    pub observation_column: String,
    pub drop_output_types: Vec<String>,
    /// Metro hubs key rows by slug and swap the location/abbreviation roles.
    pub is_metro: bool,
    /// Forecast rows issued before this date are discarded.
    pub min_reference_date: Option<NaiveDate>,
    /// Directory under the output root that receives this dataset's files.
    pub output_dir: String,
}

impl Default for DatasetProfile {
    fn default() -> Self {
        Self {
            file_suffix: String::new(),
            dataset_label: String::new(),
            ground_truth_value_key: None,
            ground_truth_date_column: "date".to_string(),
            ground_truth_min_date: None,
            series_type: "projection".to_string(),
            observation_column: "observation".to_string(),
            drop_output_types: vec!["sample".to_string()],
            is_metro: false,
            min_reference_date: None,
            output_dir: String::new(),
        }
    }
}

impl DatasetProfile {
    /// Parse a profile from TOML; omitted fields keep their defaults.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let profile: Self = toml::from_str(contents).map_err(|error| {
            ConvertError::InvalidProfile {
                message: error.to_string(),
            }
        })?;
        profile.validated()
    }

    fn validated(mut self) -> Result<Self> {
        if self.file_suffix.trim().is_empty() {
            return Err(ConvertError::InvalidProfile {
                message: "file_suffix must not be empty".to_string(),
            });
        }
        if self.output_dir.trim().is_empty() {
            self.output_dir = self.file_suffix.clone();
        }
        Ok(self)
    }

    pub fn drops(&self, output_type: &str) -> bool {
        self.drop_output_types
            .iter()
            .any(|dropped| dropped == output_type)
    }

    pub fn file_name(&self, abbreviation: &str) -> String {
        format!("{abbreviation}_{}.json", self.file_suffix)
    }
}
