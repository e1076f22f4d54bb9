//! Conversion pipeline with explicit stages.
//!
//! The pipeline follows these stages in order:
//! 1. **Ingest**: Read forecast, ground truth and location tables
//! 2. **Preprocess**: Normalize forecast rows
//! 3. **Build**: Assemble per-location documents and `metadata.json`
//! 4. **Validate**: Check every location document's shape
//! 5. **Gate**: Apply the invalid-document policy
//! 6. **Output**: Write the surviving documents and `metadata.json`
//!
//! Each stage takes the output of the previous stage and returns typed results.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result, anyhow};
use tracing::{info, info_span};

use hubverse_core::{
    BuildOutput, LocationDirectory, LocationDocumentBuilder, NhsnBuilder, NhsnOutput,
    PreprocessStats,
};
use hubverse_ingest::{
    HubInputs, InputPaths, NhsnInputs, load_hub, load_inputs, load_nhsn, read_column_labels,
};
use hubverse_model::{DatasetProfile, ForecastRow, PreprocessOptions, RawForecastRow};
use hubverse_output::{WriteOptions, WriteReport, write_dataset, write_nhsn};
use hubverse_validate::{
    DocumentValidation, GatingDecision, InvalidDocumentPolicy, gate_documents, invalid_count,
    validate_build,
};

use crate::types::{ConversionResult, DocumentSummary, NhsnResult, NhsnSeriesSummary};

/// Where the input tables come from.
#[derive(Debug, Clone)]
pub enum InputSource {
    /// A Hubverse hub clone.
    Hub(PathBuf),
    /// Three explicitly named tables.
    Files(InputPaths),
}

#[derive(Debug, Clone)]
pub struct ConvertConfig {
    pub profile: DatasetProfile,
    pub source: InputSource,
    /// Output root; the profile's directory is created beneath it.
    pub output_dir: Option<PathBuf>,
    pub dry_run: bool,
    pub preprocess: PreprocessOptions,
    pub write: WriteOptions,
    pub on_invalid: InvalidDocumentPolicy,
}

// ============================================================================
// Stage 1: Ingest
// ============================================================================

/// Read all input tables.
///
/// Unknown locations are only reported by the build stage, once rows that
/// preprocessing or the reference-date cutover discard are gone.
pub fn ingest(source: &InputSource, profile: &DatasetProfile) -> Result<HubInputs> {
    match source {
        InputSource::Hub(path) => {
            load_hub(path, profile).with_context(|| format!("load hub {}", path.display()))
        }
        InputSource::Files(paths) => load_inputs(paths, profile).context("load input tables"),
    }
}

// ============================================================================
// Stage 2: Preprocess
// ============================================================================

pub fn preprocess(
    rows: Vec<RawForecastRow>,
    options: PreprocessOptions,
) -> Result<(Vec<ForecastRow>, PreprocessStats)> {
    hubverse_core::preprocess_with_stats(rows, options).context("preprocess forecasts")
}

// ============================================================================
// Stage 3: Build
// ============================================================================

pub fn build(inputs: &HubInputs, rows: &[ForecastRow], profile: &DatasetProfile) -> Result<BuildOutput> {
    let directory = LocationDirectory::new(inputs.locations.clone());
    LocationDocumentBuilder::new(&directory, profile)
        .build(rows, &inputs.ground_truth)
        .context("build documents")
}

// ============================================================================
// Stage 4: Validate
// ============================================================================

pub fn validate(output: &BuildOutput) -> Vec<DocumentValidation> {
    validate_build(output)
}

// ============================================================================
// Stage 5: Gate
// ============================================================================

pub fn gate(policy: InvalidDocumentPolicy, validations: &[DocumentValidation]) -> GatingDecision {
    gate_documents(policy, validations)
}

// ============================================================================
// Stage 6: Output
// ============================================================================

pub fn output(
    output_dir: &Path,
    profile: &DatasetProfile,
    build: &BuildOutput,
    decision: &GatingDecision,
    options: WriteOptions,
) -> Result<WriteReport> {
    write_dataset(output_dir, profile, build, &decision.blocked_files, options)
        .with_context(|| format!("write outputs to {}", output_dir.display()))
}

/// Run every stage for one dataset.
pub fn run_conversion(config: &ConvertConfig) -> Result<ConversionResult> {
    let profile = &config.profile;
    let run_span = info_span!("convert", dataset = %profile.dataset_label);
    let _run_guard = run_span.enter();

    let ingest_start = Instant::now();
    let mut inputs = info_span!("ingest").in_scope(|| ingest(&config.source, profile))?;
    info!(
        forecast_rows = inputs.forecasts.len(),
        ground_truth_rows = inputs.ground_truth.len(),
        location_count = inputs.locations.len(),
        duration_ms = ingest_start.elapsed().as_millis(),
        "ingest complete"
    );

    let preprocess_start = Instant::now();
    let raw_rows = std::mem::take(&mut inputs.forecasts);
    let (rows, stats) =
        info_span!("preprocess").in_scope(|| preprocess(raw_rows, config.preprocess))?;
    info!(
        input_rows = stats.input_rows,
        output_rows = stats.output_rows,
        duration_ms = preprocess_start.elapsed().as_millis(),
        "preprocess complete"
    );

    let build_start = Instant::now();
    let built = info_span!("build").in_scope(|| build(&inputs, &rows, profile))?;
    info!(
        document_count = built.documents.len(),
        duration_ms = build_start.elapsed().as_millis(),
        "build complete"
    );

    let validate_start = Instant::now();
    let validations = info_span!("validate").in_scope(|| validate(&built));
    let invalid = invalid_count(&validations);
    info!(
        invalid_count = invalid,
        duration_ms = validate_start.elapsed().as_millis(),
        "validate complete"
    );

    let decision = info_span!("gate", policy = %config.on_invalid)
        .in_scope(|| gate(config.on_invalid, &validations));
    info!(blocked = decision.blocked_files.len(), "gate complete");

    let report = match (&config.output_dir, config.dry_run) {
        (Some(output_dir), false) => {
            let output_start = Instant::now();
            let report = info_span!("output", output_dir = %output_dir.display()).in_scope(|| {
                output(output_dir, profile, &built, &decision, config.write)
            })?;
            info!(
                written = report.written.len(),
                skipped = report.skipped.len(),
                duration_ms = output_start.elapsed().as_millis(),
                "output complete"
            );
            Some(report)
        }
        (None, false) => {
            return Err(anyhow!("--output-dir is required unless --dry-run is set"));
        }
        (_, true) => {
            info!("dry run, no files written");
            None
        }
    };

    Ok(summarize(profile, &inputs, stats, &built, validations, report))
}

fn summarize(
    profile: &DatasetProfile,
    inputs: &HubInputs,
    preprocess: PreprocessStats,
    built: &BuildOutput,
    validations: Vec<DocumentValidation>,
    report: Option<WriteReport>,
) -> ConversionResult {
    let documents: Vec<DocumentSummary> = validations
        .into_iter()
        .filter_map(|validation| {
            let document = built.documents.get(&validation.file_name)?;
            let written = report.as_ref().is_some_and(|report| {
                !report.skipped.contains(&validation.file_name)
            });
            Some(DocumentSummary {
                location: document.metadata.location.clone(),
                forecast_entries: document.forecasts.model_entry_count(),
                peak_entries: document
                    .peaks
                    .as_ref()
                    .map_or(0, |peaks| peaks.model_entry_count()),
                ground_truth_dates: document.ground_truth.dates.len(),
                violation: validation.violation,
                written,
                file_name: validation.file_name,
            })
        })
        .collect();
    let has_errors = documents.iter().any(|doc| doc.violation.is_some());
    ConversionResult {
        dataset: profile.dataset_label.clone(),
        output_dir: report.map(|report| report.directory),
        forecast_files: inputs.forecast_files.len(),
        preprocess,
        models: built.metadata.models.clone(),
        directory_locations: inputs.locations.len(),
        documents,
        has_errors,
    }
}

// ============================================================================
// NHSN time series
// ============================================================================

#[derive(Debug, Clone)]
pub struct NhsnConfig {
    /// NHSN export (CSV or Parquet).
    pub data: PathBuf,
    pub locations: PathBuf,
    /// Socrata view metadata supplying column display names.
    pub column_metadata: Option<PathBuf>,
    /// Output root; files go to its `nhsn/` directory.
    pub output_dir: Option<PathBuf>,
    pub dry_run: bool,
    pub write: WriteOptions,
}

pub fn build_nhsn(inputs: &NhsnInputs, column_metadata: Option<&Path>) -> Result<NhsnOutput> {
    let directory = LocationDirectory::new(inputs.locations.clone());
    let mut builder = NhsnBuilder::new(&directory);
    if let Some(path) = column_metadata {
        let labels = read_column_labels(path)
            .with_context(|| format!("load column metadata {}", path.display()))?;
        builder = builder.with_column_labels(labels);
    }
    builder
        .build(&inputs.records, &inputs.columns)
        .context("build NHSN documents")
}

/// Convert an NHSN export into per-jurisdiction time series.
pub fn run_nhsn(config: &NhsnConfig) -> Result<NhsnResult> {
    let run_span = info_span!("nhsn");
    let _run_guard = run_span.enter();
    if config.output_dir.is_none() && !config.dry_run {
        return Err(anyhow!("--output-dir is required unless --dry-run is set"));
    }

    let ingest_start = Instant::now();
    let inputs = info_span!("ingest").in_scope(|| {
        load_nhsn(&config.data, &config.locations).context("load NHSN tables")
    })?;
    info!(
        record_count = inputs.records.len(),
        duration_ms = ingest_start.elapsed().as_millis(),
        "ingest complete"
    );

    let build_start = Instant::now();
    let built = info_span!("build")
        .in_scope(|| build_nhsn(&inputs, config.column_metadata.as_deref()))?;
    info!(
        document_count = built.documents.len(),
        duration_ms = build_start.elapsed().as_millis(),
        "build complete"
    );

    let output_dir = match (&config.output_dir, config.dry_run) {
        (Some(output_dir), false) => {
            let report = info_span!("output", output_dir = %output_dir.display())
                .in_scope(|| write_nhsn(output_dir, &built, config.write))
                .with_context(|| format!("write outputs to {}", output_dir.display()))?;
            info!(written = report.written.len(), "output complete");
            Some(report.directory)
        }
        _ => {
            info!("dry run, no files written");
            None
        }
    };

    Ok(NhsnResult {
        output_dir,
        records: inputs.records.len(),
        columns: built.metadata.columns.clone(),
        series: built
            .documents
            .iter()
            .map(|(file_name, document)| NhsnSeriesSummary {
                file_name: file_name.clone(),
                location: document.metadata.location.clone(),
                weeks: document.series.dates.len(),
            })
            .collect(),
    })
}
