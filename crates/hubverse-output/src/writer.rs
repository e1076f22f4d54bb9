//! JSON file writing.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Serializer;
use serde_json::ser::PrettyFormatter;
use tracing::{debug, info, warn};

use hubverse_core::{BuildOutput, NhsnOutput};
use hubverse_model::{DatasetProfile, METADATA_FILE_NAME};

use crate::error::{OutputError, Result};

const INDENT: &[u8] = b"    ";

/// Subdirectory of the output root holding NHSN files.
pub const NHSN_OUTPUT_DIR: &str = "nhsn";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOptions {
    /// Replace files that already exist.
    pub overwrite: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self { overwrite: true }
    }
}

/// Files written by [`write_dataset`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteReport {
    pub directory: PathBuf,
    pub written: Vec<PathBuf>,
    /// Documents left out because the caller blocked them.
    pub skipped: Vec<String>,
}

/// Serialize a value with four-space indentation.
pub fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<Vec<u8>> {
    let mut buffer = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(INDENT));
    value.serialize(&mut serializer)?;
    Ok(buffer)
}

/// Write one JSON document, creating parent directories as needed.
pub fn write_json_file<T: Serialize + ?Sized>(
    path: &Path,
    value: &T,
    options: WriteOptions,
) -> Result<()> {
    if !options.overwrite && path.exists() {
        return Err(OutputError::FileExists {
            path: path.to_path_buf(),
        });
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| OutputError::Io {
            operation: "create directory",
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let bytes = to_pretty_json(value).map_err(|source| OutputError::Serialization {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, bytes).map_err(|source| OutputError::Io {
        operation: "write",
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), "json written");
    Ok(())
}

/// Directory receiving one dataset's files.
pub fn dataset_dir(output_root: &Path, profile: &DatasetProfile) -> PathBuf {
    output_root.join(&profile.output_dir)
}

/// Write every unblocked location document and `metadata.json`.
pub fn write_dataset(
    output_root: &Path,
    profile: &DatasetProfile,
    output: &BuildOutput,
    blocked_files: &[String],
    options: WriteOptions,
) -> Result<WriteReport> {
    write_documents(
        &dataset_dir(output_root, profile),
        &output.documents,
        &output.metadata,
        blocked_files,
        options,
    )
}

/// Directory receiving the NHSN time series.
pub fn nhsn_dir(output_root: &Path) -> PathBuf {
    output_root.join(NHSN_OUTPUT_DIR)
}

/// Write every NHSN jurisdiction document and its `metadata.json`.
pub fn write_nhsn(
    output_root: &Path,
    output: &NhsnOutput,
    options: WriteOptions,
) -> Result<WriteReport> {
    write_documents(
        &nhsn_dir(output_root),
        &output.documents,
        &output.metadata,
        &[],
        options,
    )
}

/// Write documents keyed by file name into `directory`, then `metadata.json`.
pub fn write_documents<D: Serialize, M: Serialize>(
    directory: &Path,
    documents: &BTreeMap<String, D>,
    metadata: &M,
    blocked_files: &[String],
    options: WriteOptions,
) -> Result<WriteReport> {
    let mut report = WriteReport {
        directory: directory.to_path_buf(),
        ..WriteReport::default()
    };
    for (file_name, document) in documents {
        if blocked_files.contains(file_name) {
            warn!(%file_name, "invalid document not written");
            report.skipped.push(file_name.clone());
            continue;
        }
        let path = directory.join(file_name);
        write_json_file(&path, document, options)?;
        report.written.push(path);
    }
    let metadata_path = directory.join(METADATA_FILE_NAME);
    write_json_file(&metadata_path, metadata, options)?;
    report.written.push(metadata_path);
    info!(
        directory = %directory.display(),
        written = report.written.len(),
        skipped = report.skipped.len(),
        "dataset written"
    );
    Ok(report)
}
