//! Persisting converted documents to disk.

pub mod error;
pub mod writer;

pub use error::{OutputError, Result};
pub use writer::{
    NHSN_OUTPUT_DIR, WriteOptions, WriteReport, dataset_dir, nhsn_dir, to_pretty_json,
    write_dataset, write_documents, write_json_file, write_nhsn,
};
