//! Hub directory discovery.
//!
//! A Hubverse hub clone keeps submissions under `model-output/<model_id>/`,
//! observations under `target-data/` and the location table under
//! `auxiliary-data/`.

use std::path::{Path, PathBuf};

use crate::error::{IngestError, Result};

pub const MODEL_OUTPUT_DIR: &str = "model-output";
pub const TARGET_DATA_CANDIDATES: [&str; 2] =
    ["target-data/time-series.parquet", "target-data/time-series.csv"];
pub const LOCATIONS_FILE: &str = "auxiliary-data/locations.csv";

/// A submission file and the model directory it was found in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelOutputFile {
    pub model_id: String,
    pub path: PathBuf,
}

/// Lists `.csv` and `.parquet` files directly inside `dir`, sorted by path.
pub fn list_table_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in read_dir_paths(dir)? {
        if !path.is_file() {
            continue;
        }
        let is_table = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                ext.eq_ignore_ascii_case("csv") || ext.eq_ignore_ascii_case("parquet")
            });
        if is_table {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Finds every submission file under `<hub>/model-output/<model_id>/`.
pub fn discover_model_outputs(hub: &Path) -> Result<Vec<ModelOutputFile>> {
    let root = hub.join(MODEL_OUTPUT_DIR);
    let mut model_dirs: Vec<PathBuf> = read_dir_paths(&root)?
        .into_iter()
        .filter(|path| path.is_dir())
        .collect();
    model_dirs.sort();

    let mut outputs = Vec::new();
    for dir in model_dirs {
        let Some(model_id) = dir.file_name().and_then(|name| name.to_str()) else {
            continue;
        };
        for path in list_table_files(&dir)? {
            outputs.push(ModelOutputFile {
                model_id: model_id.to_string(),
                path,
            });
        }
    }
    Ok(outputs)
}

/// Locates the hub's ground truth table, preferring Parquet.
pub fn target_data_path(hub: &Path) -> Result<PathBuf> {
    TARGET_DATA_CANDIDATES
        .iter()
        .map(|candidate| hub.join(candidate))
        .find(|path| path.is_file())
        .ok_or_else(|| IngestError::FileNotFound {
            path: hub.join(TARGET_DATA_CANDIDATES[1]),
        })
}

pub fn locations_path(hub: &Path) -> PathBuf {
    hub.join(LOCATIONS_FILE)
}

fn read_dir_paths(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(IngestError::DirectoryNotFound {
            path: dir.to_path_buf(),
        });
    }
    let entries = std::fs::read_dir(dir).map_err(|e| IngestError::DirectoryRead {
        path: dir.to_path_buf(),
        source: e,
    })?;
    entries
        .map(|entry| {
            entry.map(|entry| entry.path()).map_err(|e| IngestError::DirectoryRead {
                path: dir.to_path_buf(),
                source: e,
            })
        })
        .collect()
}
