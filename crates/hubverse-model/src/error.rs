use thiserror::Error;

/// Errors raised while turning Hubverse tables into output documents.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// An input table lacks one or more required columns.
    #[error("{table} is missing required columns: {}", columns.join(", "))]
    MissingColumns { table: String, columns: Vec<String> },

    /// A date cell could not be parsed.
    #[error("invalid date in column '{column}': '{value}'")]
    InvalidDate { column: String, value: String },

    /// A horizon cell is not an integer.
    #[error("horizon value '{value}' cannot be coerced to an integer")]
    InvalidHorizon { value: String },

    /// A numeric cell could not be parsed.
    #[error("invalid number in column '{column}': '{value}'")]
    InvalidNumber { column: String, value: String },

    /// A required cell is empty.
    #[error("missing value in required column '{column}'")]
    MissingValue { column: String },

    /// Forecast rows must be quantile or pmf once dropped types are removed.
    #[error("`output_type` of input data must either be 'quantile' or 'pmf', received '{output_type}'")]
    UnsupportedOutputType { output_type: String },

    /// A location id has no entry in the location directory.
    #[error("could not find location {location} in location data")]
    UnknownLocation { location: String },

    /// Metro directories need the original code to build metadata.
    #[error("location {location} has no original_location_code")]
    MissingOriginalLocationCode { location: String },

    /// Ground truth without a `target` column needs a configured key.
    #[error(
        "a 'target' column is missing from the ground truth data, and no \
         'ground_truth_value_key' is configured to serve as a default"
    )]
    MissingGroundTruthTarget,

    /// Quantile and pmf rows were mixed under one model entry.
    #[error(
        "{model_id} has both {existing} and {incoming} predictions for \
         target '{target}' on {reference_date}"
    )]
    PredictionTypeConflict {
        reference_date: String,
        target: String,
        model_id: String,
        existing: &'static str,
        incoming: &'static str,
    },

    /// A dataset profile could not be parsed or is not known.
    #[error("invalid dataset profile: {message}")]
    InvalidProfile { message: String },
}

impl ConvertError {
    pub fn missing_columns(table: impl Into<String>, columns: Vec<String>) -> Self {
        Self::MissingColumns {
            table: table.into(),
            columns,
        }
    }

    pub fn invalid_date(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidDate {
            column: column.into(),
            value: value.into(),
        }
    }

    pub fn invalid_number(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidNumber {
            column: column.into(),
            value: value.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ConvertError>;
