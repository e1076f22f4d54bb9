//! Forecast rows in the Hubverse long format.

use std::fmt;

use chrono::NaiveDate;
use serde::{Serialize, Serializer};

/// Seasonal peak magnitude target.
pub const PEAK_INC_TARGET: &str = "peak inc flu hosp";

/// Seasonal peak timing target.
pub const PEAK_WEEK_TARGET: &str = "peak week inc flu hosp";

/// Targets without a natural horizon axis.
pub const PEAK_TARGETS: [&str; 2] = [PEAK_INC_TARGET, PEAK_WEEK_TARGET];

/// Horizon written onto peak rows so horizon coercion keeps them.
pub const PEAK_HORIZON_SENTINEL: i64 = 50;

pub fn is_peak_target(target: &str) -> bool {
    PEAK_TARGETS.contains(&target)
}

/// Forecast representation declared by a row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OutputType {
    Quantile,
    Pmf,
    Sample,
    /// Anything else a hub submits; rejected when grouping.
    Other(String),
}

impl OutputType {
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "quantile" => Self::Quantile,
            "pmf" => Self::Pmf,
            "sample" => Self::Sample,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Quantile => "quantile",
            Self::Pmf => "pmf",
            Self::Sample => "sample",
            Self::Other(value) => value,
        }
    }
}

impl fmt::Display for OutputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The `output_type_id` cell: a quantile level once coerced, otherwise the raw label.
#[derive(Debug, Clone, PartialEq)]
pub enum OutputTypeId {
    Level(f64),
    Label(String),
}

impl OutputTypeId {
    pub fn as_level(&self) -> Option<f64> {
        match self {
            Self::Level(level) => Some(*level),
            Self::Label(_) => None,
        }
    }
}

impl fmt::Display for OutputTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Level(level) => write!(f, "{level}"),
            Self::Label(label) => f.write_str(label),
        }
    }
}

impl Serialize for OutputTypeId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Level(level) => serializer.serialize_f64(*level),
            Self::Label(label) => serializer.serialize_str(label),
        }
    }
}

/// A forecast row as read from a hub, before preprocessing.
#[derive(Debug, Clone, PartialEq)]
pub struct RawForecastRow {
    pub reference_date: NaiveDate,
    pub location: String,
    pub target: String,
    /// Horizon cell as submitted; may be empty or fractional text.
    pub horizon: Option<String>,
    pub output_type: OutputType,
    pub output_type_id: Option<String>,
    pub value: Option<f64>,
    pub target_end_date: NaiveDate,
    pub model_id: String,
}

/// A forecast row after preprocessing.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastRow {
    pub reference_date: NaiveDate,
    pub location: String,
    pub target: String,
    pub horizon: i64,
    pub output_type: OutputType,
    pub output_type_id: OutputTypeId,
    pub value: Option<f64>,
    pub target_end_date: NaiveDate,
    pub model_id: String,
}

impl ForecastRow {
    pub fn is_peak(&self) -> bool {
        is_peak_target(&self.target)
    }
}
