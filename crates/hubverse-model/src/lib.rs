//! Data model for converting Hubverse forecast hubs into per-location JSON documents.

pub mod dates;
pub mod document;
pub mod error;
pub mod forecast;
pub mod ground_truth;
pub mod location;
pub mod nhsn;
pub mod options;
pub mod profile;
pub mod tree;

pub use dates::{format_date, is_iso_date, parse_date, try_parse_date};
pub use document::{
    DatasetMetadataDocument, DocumentMetadata, GroundTruthSeries, HubverseKeys,
    LocationDocument, METADATA_FILE_NAME,
};
pub use error::{ConvertError, Result};
pub use forecast::{
    ForecastRow, OutputType, OutputTypeId, PEAK_HORIZON_SENTINEL, PEAK_INC_TARGET,
    PEAK_TARGETS, PEAK_WEEK_TARGET, RawForecastRow, is_peak_target,
};
pub use ground_truth::GroundTruthRow;
pub use location::{LocationEntry, LocationRecord};
pub use nhsn::{
    NHSN_DATASET_LABEL, NHSN_DATE_COLUMN, NHSN_FILE_SUFFIX, NHSN_JURISDICTION_COLUMN,
    NHSN_JURISDICTIONS, NHSN_SERIES_TYPE, NhsnDocument, NhsnMetadata, NhsnMetadataDocument,
    NhsnRecord, NhsnSeries,
};
pub use options::{KEPT_CATEGORIES, KEPT_QUANTILES, PreprocessOptions};
pub use profile::{DatasetKind, DatasetProfile};
pub use tree::{
    ForecastTree, ModelForecast, PeakForecast, PeakQuantiles, PeakWeeks, PeaksTree,
    PmfPrediction, PredictionEntry, QuantilePrediction,
};
