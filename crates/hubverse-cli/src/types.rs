use std::path::PathBuf;

use hubverse_core::PreprocessStats;
use hubverse_validate::SchemaViolation;

/// Outcome of one `convert` run.
#[derive(Debug)]
pub struct ConversionResult {
    pub dataset: String,
    /// Directory the files went to; `None` for dry runs.
    pub output_dir: Option<PathBuf>,
    pub forecast_files: usize,
    pub preprocess: PreprocessStats,
    pub models: Vec<String>,
    pub directory_locations: usize,
    pub documents: Vec<DocumentSummary>,
    pub has_errors: bool,
}

impl ConversionResult {
    pub fn invalid_documents(&self) -> impl Iterator<Item = &DocumentSummary> {
        self.documents.iter().filter(|doc| doc.violation.is_some())
    }
}

#[derive(Debug)]
pub struct DocumentSummary {
    pub file_name: String,
    pub location: String,
    pub forecast_entries: usize,
    pub peak_entries: usize,
    pub ground_truth_dates: usize,
    pub violation: Option<SchemaViolation>,
    pub written: bool,
}

/// Outcome of one `nhsn` run.
#[derive(Debug)]
pub struct NhsnResult {
    pub output_dir: Option<PathBuf>,
    pub records: usize,
    pub columns: Vec<String>,
    pub series: Vec<NhsnSeriesSummary>,
}

#[derive(Debug)]
pub struct NhsnSeriesSummary {
    pub file_name: String,
    pub location: String,
    pub weeks: usize,
}
