//! Error types for Hubverse table ingestion.

use std::path::PathBuf;

use hubverse_model::ConvertError;
use thiserror::Error;

/// Errors that can occur while loading hub tables.
#[derive(Debug, Error)]
pub enum IngestError {
    // === File System Errors ===
    /// Directory not found or not a directory.
    #[error("directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    /// Table file not found.
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Failed to read directory entries.
    #[error("failed to read directory {path}: {source}")]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to open a file.
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Only `.csv` and `.parquet` tables are supported.
    #[error("{path} must be a .csv or .parquet file")]
    UnsupportedFormat { path: PathBuf },

    // === Parsing Errors ===
    /// Failed to parse a CSV file.
    #[error("failed to parse CSV {path}: {message}")]
    CsvParse { path: PathBuf, message: String },

    /// Failed to read a Parquet file.
    #[error("failed to read Parquet {path}: {message}")]
    ParquetRead { path: PathBuf, message: String },

    // === Contract Errors ===
    /// A table was read but violates the input contract.
    #[error("invalid data in {path}: {source}")]
    InvalidData {
        path: PathBuf,
        #[source]
        source: ConvertError,
    },

    /// Column metadata JSON could not be parsed.
    #[error("failed to parse column metadata {path}: {source}")]
    ColumnMetadata {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl IngestError {
    pub(crate) fn invalid_data(path: impl Into<PathBuf>, source: ConvertError) -> Self {
        Self::InvalidData {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, IngestError>;
