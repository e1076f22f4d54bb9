//! Loading the three input tables of a conversion run.

use std::path::{Path, PathBuf};

use hubverse_model::{DatasetProfile, GroundTruthRow, LocationRecord, RawForecastRow};
use tracing::{debug, info};

use crate::discovery::{discover_model_outputs, locations_path, target_data_path};
use crate::error::{IngestError, Result};
use crate::rows::{forecast_rows, ground_truth_rows, location_records};
use crate::table::{RawTable, read_table};

/// Explicit paths to the three input tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputPaths {
    pub forecast: PathBuf,
    pub target: PathBuf,
    pub locations: PathBuf,
}

/// Typed rows of all three input tables.
#[derive(Debug, Clone, Default)]
pub struct HubInputs {
    pub forecasts: Vec<RawForecastRow>,
    pub ground_truth: Vec<GroundTruthRow>,
    pub locations: Vec<LocationRecord>,
    /// Files the forecast rows were read from.
    pub forecast_files: Vec<PathBuf>,
}

/// Load inputs from explicitly named files.
pub fn load_inputs(paths: &InputPaths, profile: &DatasetProfile) -> Result<HubInputs> {
    let table = read_table(&paths.forecast)?;
    let forecasts = forecast_rows(&table)
        .map_err(|source| IngestError::invalid_data(&paths.forecast, source))?;
    let (ground_truth, locations) = load_reference_tables(&paths.target, &paths.locations, profile)?;
    Ok(HubInputs {
        forecasts,
        ground_truth,
        locations,
        forecast_files: vec![paths.forecast.clone()],
    })
}

/// Load inputs from a Hubverse hub clone.
///
/// Submission files without a `model_id` column take it from their directory name.
pub fn load_hub(hub: &Path, profile: &DatasetProfile) -> Result<HubInputs> {
    let outputs = discover_model_outputs(hub)?;
    let mut forecasts = Vec::new();
    let mut forecast_files = Vec::with_capacity(outputs.len());
    for output in outputs {
        let mut table = read_table(&output.path)?;
        table.fill_column("model_id", &output.model_id);
        let rows = forecast_rows(&table)
            .map_err(|source| IngestError::invalid_data(&output.path, source))?;
        debug!(
            model_id = %output.model_id,
            path = %output.path.display(),
            row_count = rows.len(),
            "model output loaded"
        );
        forecasts.extend(rows);
        forecast_files.push(output.path);
    }
    info!(
        hub = %hub.display(),
        file_count = forecast_files.len(),
        row_count = forecasts.len(),
        "model outputs discovered"
    );

    let target = target_data_path(hub)?;
    let (ground_truth, locations) = load_reference_tables(&target, &locations_path(hub), profile)?;
    Ok(HubInputs {
        forecasts,
        ground_truth,
        locations,
        forecast_files,
    })
}

fn load_reference_tables(
    target: &Path,
    locations: &Path,
    profile: &DatasetProfile,
) -> Result<(Vec<GroundTruthRow>, Vec<LocationRecord>)> {
    let target_table: RawTable = read_table(target)?;
    let ground_truth = ground_truth_rows(&target_table, profile)
        .map_err(|source| IngestError::invalid_data(target, source))?;
    let location_table = read_table(locations)?;
    let records = location_records(&location_table, profile.is_metro)
        .map_err(|source| IngestError::invalid_data(locations, source))?;
    Ok((ground_truth, records))
}
