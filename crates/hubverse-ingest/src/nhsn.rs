//! Loading NHSN surveillance exports.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::info;

use hubverse_model::{LocationRecord, NhsnRecord};

use crate::error::{IngestError, Result};
use crate::rows::{location_records, nhsn_records};
use crate::table::read_table;

/// Records of one NHSN export plus the standard location directory.
#[derive(Debug, Clone, Default)]
pub struct NhsnInputs {
    pub records: Vec<NhsnRecord>,
    /// Source column names in table order.
    pub columns: Vec<String>,
    pub locations: Vec<LocationRecord>,
}

pub fn load_nhsn(data: &Path, locations: &Path) -> Result<NhsnInputs> {
    let table = read_table(data)?;
    let records = nhsn_records(&table).map_err(|source| IngestError::invalid_data(data, source))?;
    let location_table = read_table(locations)?;
    let locations_data = location_records(&location_table, false)
        .map_err(|source| IngestError::invalid_data(locations, source))?;
    info!(
        path = %data.display(),
        row_count = records.len(),
        column_count = table.headers.len(),
        "NHSN data loaded"
    );
    Ok(NhsnInputs {
        records,
        columns: table.headers,
        locations: locations_data,
    })
}

#[derive(Debug, Deserialize)]
struct ViewMetadata {
    columns: Vec<ViewColumn>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ViewColumn {
    field_name: String,
    name: String,
}

/// Read display names from a Socrata view metadata document.
///
/// Returns a `fieldName -> name` map, e.g. `weekendingdate -> Week Ending Date`.
pub fn read_column_labels(path: &Path) -> Result<BTreeMap<String, String>> {
    let contents = fs::read_to_string(path).map_err(|source| IngestError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let metadata: ViewMetadata =
        serde_json::from_str(&contents).map_err(|source| IngestError::ColumnMetadata {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(metadata
        .columns
        .into_iter()
        .map(|column| (column.field_name, column.name))
        .collect())
}
