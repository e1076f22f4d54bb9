//! Reading Hubverse hub tables into typed rows.

pub mod discovery;
pub mod error;
pub mod hub;
pub mod nhsn;
pub mod polars_utils;
pub mod rows;
pub mod table;

pub use discovery::{ModelOutputFile, discover_model_outputs, list_table_files};
pub use error::{IngestError, Result};
pub use hub::{HubInputs, InputPaths, load_hub, load_inputs};
pub use nhsn::{NhsnInputs, load_nhsn, read_column_labels};
pub use rows::{FORECAST_COLUMNS, forecast_rows, ground_truth_rows, location_records, nhsn_records};
pub use table::{MISSING_TOKENS, RawTable, is_missing_value, read_table};
