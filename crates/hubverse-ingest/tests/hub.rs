//! Integration tests for hub directory loading.

use std::fs;
use std::path::Path;

use hubverse_ingest::{IngestError, load_hub};
use hubverse_model::{ConvertError, DatasetKind, OutputType};
use tempfile::TempDir;

fn write(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn sample_hub() -> TempDir {
    let hub = TempDir::new().unwrap();
    let root = hub.path();
    write(
        root,
        "model-output/teamB-model/2024-01-06-teamB-model.csv",
        "reference_date,location,horizon,target_end_date,target,output_type,output_type_id,value\n\
         2024-01-06,06,1,2024-01-13,wk inc flu hosp,quantile,0.5,20\n",
    );
    write(
        root,
        "model-output/teamA-model/2024-01-06-teamA-model.csv",
        "reference_date,location,horizon,target_end_date,target,output_type,output_type_id,value\n\
         2024-01-06,06,1,2024-01-13,wk inc flu hosp,quantile,0.5,18\n\
         2024-01-06,06,1,2024-01-13,wk inc flu hosp,sample,1,17\n",
    );
    write(root, "model-output/README.md", "ignored");
    write(
        root,
        "target-data/time-series.csv",
        "target_end_date,location,as_of,observation\n\
         2024-01-06,06,2024-01-10,100\n",
    );
    write(
        root,
        "auxiliary-data/locations.csv",
        "location,abbreviation,location_name,population\n\
         06,CA,California,39000000\n\
         US,US,United States,333000000\n",
    );
    hub
}

#[test]
fn loads_every_model_directory_in_order() {
    let hub = sample_hub();
    let inputs = load_hub(hub.path(), &DatasetKind::Flu.profile()).unwrap();

    assert_eq!(inputs.forecast_files.len(), 2);
    let models: Vec<&str> = inputs.forecasts.iter().map(|r| r.model_id.as_str()).collect();
    assert_eq!(models, vec!["teamA-model", "teamA-model", "teamB-model"]);
    assert_eq!(inputs.forecasts[1].output_type, OutputType::Sample);
    assert_eq!(inputs.ground_truth.len(), 1);
    assert_eq!(inputs.locations.len(), 2);
    assert_eq!(inputs.forecasts[0].location, "06");
}

#[test]
fn missing_target_data_is_reported() {
    let hub = sample_hub();
    fs::remove_file(hub.path().join("target-data/time-series.csv")).unwrap();
    let error = load_hub(hub.path(), &DatasetKind::Flu.profile()).unwrap_err();
    assert!(matches!(error, IngestError::FileNotFound { .. }));
}

#[test]
fn contract_errors_name_the_file() {
    let hub = sample_hub();
    write(
        hub.path(),
        "auxiliary-data/locations.csv",
        "location,location_name\n06,California\n",
    );
    let error = load_hub(hub.path(), &DatasetKind::Flu.profile()).unwrap_err();
    let IngestError::InvalidData { path, source } = error else {
        panic!("expected InvalidData");
    };
    assert!(path.ends_with("auxiliary-data/locations.csv"));
    assert!(matches!(source, ConvertError::MissingColumns { ref columns, .. }
        if columns == &vec!["population".to_string(), "abbreviation".to_string()]));
}

#[test]
fn missing_hub_directory_is_reported() {
    let error = load_hub(Path::new("/nonexistent/hub"), &DatasetKind::Rsv.profile()).unwrap_err();
    assert!(matches!(error, IngestError::DirectoryNotFound { .. }));
}
