//! The Hubverse-to-JSON transformation.
//!
//! Raw forecast rows pass through [`preprocess`], are partitioned by location
//! and turned into one [`LocationDocument`](hubverse_model::LocationDocument)
//! each by [`LocationDocumentBuilder`]. NHSN surveillance records become
//! per-jurisdiction time series through [`NhsnBuilder`].

pub mod builder;
pub mod ground_truth;
pub mod grouping;
pub mod locations;
pub mod nhsn;
pub mod preprocess;

pub use builder::{BuildOutput, LAST_UPDATED_FORMAT, LocationDocumentBuilder, build};
pub use ground_truth::GroundTruthReshaper;
pub use grouping::{ForecastGrouper, GroupedForecasts};
pub use locations::{LocationDirectory, ResolvedLocation};
pub use nhsn::{NHSN_LAST_UPDATED_FORMAT, NhsnBuilder, NhsnOutput};
pub use preprocess::{
    PreprocessStats, coerce_horizon, keeps_output_type_id, preprocess, preprocess_with_stats,
};
