//! Configuration options for forecast preprocessing.

use serde::{Deserialize, Serialize};

/// Categorical `output_type_id` values kept by the output-type-id filter.
pub const KEPT_CATEGORIES: [&str; 5] = [
    "decrease",
    "increase",
    "large_decrease",
    "large_increase",
    "stable",
];

/// Quantile levels kept by the output-type-id filter.
pub const KEPT_QUANTILES: [f64; 5] = [0.025, 0.25, 0.5, 0.75, 0.975];

/// Options controlling which forecast rows survive preprocessing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreprocessOptions {
    /// Keep only the canonical quantile levels and categories.
    pub filter_output_type_ids: bool,
    /// Drop rows with a negative horizon.
    pub drop_nowcasts: bool,
}

impl Default for PreprocessOptions {
    fn default() -> Self {
        Self {
            filter_output_type_ids: true,
            drop_nowcasts: true,
        }
    }
}

impl PreprocessOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_output_type_id_filter(mut self, enable: bool) -> Self {
        self.filter_output_type_ids = enable;
        self
    }

    pub fn with_nowcast_filter(mut self, enable: bool) -> Self {
        self.drop_nowcasts = enable;
        self
    }
}
