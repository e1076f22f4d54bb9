//! Raw string tables read from CSV or Parquet.

use std::fs::File;
use std::path::Path;

use csv::ReaderBuilder;
use hubverse_model::ConvertError;
use polars::prelude::{DataFrame, ParquetReader, SerReader};
use tracing::debug;

use crate::error::{IngestError, Result};
use crate::polars_utils::any_to_string;

/// Cell spellings treated as missing in every column.
pub const MISSING_TOKENS: [&str; 6] = ["", "NA", "NaN", "nan", "null", "None"];

pub fn is_missing_value(value: &str) -> bool {
    MISSING_TOKENS.contains(&value.trim())
}

/// A table of string cells; every row has one cell per header.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|header| header == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Check that every required column is present, reporting all that are missing.
    pub fn require_columns(
        &self,
        table: &str,
        required: &[&str],
    ) -> std::result::Result<(), ConvertError> {
        let missing: Vec<String> = required
            .iter()
            .filter(|column| !self.has_column(column))
            .map(|column| (*column).to_string())
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ConvertError::missing_columns(table, missing))
        }
    }

    /// The cell at `(row, column)`, or `None` when it holds a missing token.
    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        let value = self.rows.get(row)?.get(column)?.as_str();
        if is_missing_value(value) {
            None
        } else {
            Some(value)
        }
    }

    /// Add a column holding the same value on every row, unless it already exists.
    pub fn fill_column(&mut self, name: &str, value: &str) {
        if self.has_column(name) {
            return;
        }
        self.headers.push(name.to_string());
        for row in &mut self.rows {
            row.push(value.to_string());
        }
    }

    /// Append another table's rows, aligning columns by name.
    ///
    /// Columns present on only one side are filled with empty cells.
    pub fn append(&mut self, other: RawTable) {
        if self.headers.is_empty() && self.rows.is_empty() {
            *self = other;
            return;
        }
        for header in &other.headers {
            if !self.has_column(header) {
                self.headers.push(header.clone());
                for row in &mut self.rows {
                    row.push(String::new());
                }
            }
        }
        let positions: Vec<Option<usize>> = self
            .headers
            .iter()
            .map(|header| other.column_index(header))
            .collect();
        for mut source in other.rows {
            let row = positions
                .iter()
                .map(|position| {
                    position
                        .and_then(|idx| source.get_mut(idx).map(std::mem::take))
                        .unwrap_or_default()
                })
                .collect();
            self.rows.push(row);
        }
    }
}

fn normalize_header(raw: &str) -> String {
    raw.trim().trim_matches('\u{feff}').to_string()
}

fn normalize_cell(raw: &str) -> String {
    raw.trim().trim_matches('\u{feff}').to_string()
}

/// Read a `.csv` or `.parquet` table, chosen by extension.
pub fn read_table(path: &Path) -> Result<RawTable> {
    if !path.is_file() {
        return Err(IngestError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    let table = match extension.as_deref() {
        Some("csv") => read_csv_table(path)?,
        Some("parquet") => read_parquet_table(path)?,
        _ => {
            return Err(IngestError::UnsupportedFormat {
                path: path.to_path_buf(),
            });
        }
    };
    debug!(
        path = %path.display(),
        rows = table.height(),
        columns = table.headers.len(),
        "table loaded"
    );
    Ok(table)
}

/// Read a CSV file with every cell kept as text.
///
/// Location codes such as `06` keep their leading zeros.
pub fn read_csv_table(path: &Path) -> Result<RawTable> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(|error| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: error.to_string(),
        })?;
    let headers: Vec<String> = reader
        .headers()
        .map_err(|error| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: error.to_string(),
        })?
        .iter()
        .map(normalize_header)
        .collect();
    let mut table = RawTable::new(headers);
    for record in reader.records() {
        let record = record.map_err(|error| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: error.to_string(),
        })?;
        if record.iter().all(|value| value.trim().is_empty()) {
            continue;
        }
        let row = (0..table.headers.len())
            .map(|idx| record.get(idx).map(normalize_cell).unwrap_or_default())
            .collect();
        table.rows.push(row);
    }
    Ok(table)
}

/// Read a Parquet file through Polars and flatten it to text cells.
pub fn read_parquet_table(path: &Path) -> Result<RawTable> {
    let file = File::open(path).map_err(|source| IngestError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let df = ParquetReader::new(file)
        .finish()
        .map_err(|error| IngestError::ParquetRead {
            path: path.to_path_buf(),
            message: error.to_string(),
        })?;
    Ok(table_from_frame(&df))
}

/// Flatten a DataFrame into a [`RawTable`].
pub fn table_from_frame(df: &DataFrame) -> RawTable {
    let headers = df
        .get_column_names()
        .iter()
        .map(|name| normalize_header(name.as_str()))
        .collect();
    let mut table = RawTable::new(headers);
    let columns = df.get_columns();
    table.rows.reserve(df.height());
    for idx in 0..df.height() {
        let row = columns
            .iter()
            .map(|column| {
                column
                    .get(idx)
                    .map(any_to_string)
                    .unwrap_or_default()
            })
            .collect();
        table.rows.push(row);
    }
    table
}
