//! Conversion of raw tables into typed rows.

use hubverse_model::{
    ConvertError, DatasetProfile, GroundTruthRow, LocationRecord, NHSN_DATE_COLUMN,
    NHSN_JURISDICTION_COLUMN, NhsnRecord, OutputType, RawForecastRow, parse_date,
};

use crate::table::RawTable;

type ConvertResult<T> = std::result::Result<T, ConvertError>;

pub const FORECAST_COLUMNS: [&str; 9] = [
    "reference_date",
    "location",
    "horizon",
    "target_end_date",
    "target",
    "output_type",
    "output_type_id",
    "value",
    "model_id",
];

/// Column indices resolved once per table.
struct Columns<'a> {
    table: &'a RawTable,
    label: &'a str,
}

impl<'a> Columns<'a> {
    fn new(table: &'a RawTable, label: &'a str, required: &[&str]) -> ConvertResult<Self> {
        table.require_columns(label, required)?;
        Ok(Self { table, label })
    }

    fn index(&self, name: &str) -> ConvertResult<usize> {
        self.table
            .column_index(name)
            .ok_or_else(|| ConvertError::missing_columns(self.label, vec![name.to_string()]))
    }

    fn optional(&self, row: usize, column: usize) -> Option<String> {
        self.table.cell(row, column).map(str::to_string)
    }

    fn required(&self, row: usize, column: usize, name: &str) -> ConvertResult<String> {
        self.optional(row, column)
            .ok_or_else(|| ConvertError::MissingValue {
                column: name.to_string(),
            })
    }

    fn date(&self, row: usize, column: usize, name: &str) -> ConvertResult<chrono::NaiveDate> {
        let raw = self.required(row, column, name)?;
        parse_date(name, &raw)
    }

    fn number(&self, row: usize, column: usize, name: &str) -> ConvertResult<Option<f64>> {
        self.table
            .cell(row, column)
            .map(|raw| parse_number(name, raw))
            .transpose()
    }
}

fn parse_number(column: &str, raw: &str) -> ConvertResult<f64> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| ConvertError::invalid_number(column, raw))
}

/// Convert a long-format forecast table into rows.
pub fn forecast_rows(table: &RawTable) -> ConvertResult<Vec<RawForecastRow>> {
    let columns = Columns::new(table, "forecast data", &FORECAST_COLUMNS)?;
    let reference_date = columns.index("reference_date")?;
    let location = columns.index("location")?;
    let horizon = columns.index("horizon")?;
    let target_end_date = columns.index("target_end_date")?;
    let target = columns.index("target")?;
    let output_type = columns.index("output_type")?;
    let output_type_id = columns.index("output_type_id")?;
    let value = columns.index("value")?;
    let model_id = columns.index("model_id")?;

    (0..table.height())
        .map(|row| {
            Ok(RawForecastRow {
                reference_date: columns.date(row, reference_date, "reference_date")?,
                location: columns.required(row, location, "location")?,
                target: columns.required(row, target, "target")?,
                horizon: columns.optional(row, horizon),
                output_type: OutputType::parse(&columns.required(
                    row,
                    output_type,
                    "output_type",
                )?),
                output_type_id: columns.optional(row, output_type_id),
                value: columns.number(row, value, "value")?,
                target_end_date: columns.date(row, target_end_date, "target_end_date")?,
                model_id: columns.required(row, model_id, "model_id")?,
            })
        })
        .collect()
}

/// Convert a ground truth table into rows, using the profile's column names.
pub fn ground_truth_rows(
    table: &RawTable,
    profile: &DatasetProfile,
) -> ConvertResult<Vec<GroundTruthRow>> {
    let date_column = profile.ground_truth_date_column.as_str();
    let observation_column = profile.observation_column.as_str();
    let columns = Columns::new(
        table,
        "ground truth data",
        &["location", "as_of", date_column, observation_column],
    )?;
    let location = columns.index("location")?;
    let as_of = columns.index("as_of")?;
    let date = columns.index(date_column)?;
    let observation = columns.index(observation_column)?;
    let target = table.column_index("target");

    (0..table.height())
        .map(|row| {
            Ok(GroundTruthRow {
                location: columns.required(row, location, "location")?,
                target: target.and_then(|idx| columns.optional(row, idx)),
                date: columns.date(row, date, date_column)?,
                as_of: columns.date(row, as_of, "as_of")?,
                observation: columns.number(row, observation, observation_column)?,
            })
        })
        .collect()
}

/// Convert a locations table into records.
///
/// Metro tables must carry `original_location_code`; standard tables `abbreviation`.
pub fn location_records(table: &RawTable, is_metro: bool) -> ConvertResult<Vec<LocationRecord>> {
    let mut required = vec!["location", "location_name", "population"];
    required.push(if is_metro {
        "original_location_code"
    } else {
        "abbreviation"
    });
    let columns = Columns::new(table, "location data", &required)?;
    let location = columns.index("location")?;
    let location_name = columns.index("location_name")?;
    let population = columns.index("population")?;
    let abbreviation = table.column_index("abbreviation");
    let original_code = table.column_index("original_location_code");

    (0..table.height())
        .map(|row| {
            Ok(LocationRecord {
                location: columns.required(row, location, "location")?,
                abbreviation: abbreviation.and_then(|idx| columns.optional(row, idx)),
                location_name: columns.optional(row, location_name).unwrap_or_default(),
                population: columns.number(row, population, "population")?,
                original_location_code: original_code.and_then(|idx| columns.optional(row, idx)),
            })
        })
        .collect()
}

/// Convert a flat NHSN table into records; every non-key column must be numeric.
pub fn nhsn_records(table: &RawTable) -> ConvertResult<Vec<NhsnRecord>> {
    let columns = Columns::new(
        table,
        "NHSN data",
        &[NHSN_JURISDICTION_COLUMN, NHSN_DATE_COLUMN],
    )?;
    let jurisdiction = columns.index(NHSN_JURISDICTION_COLUMN)?;
    let date = columns.index(NHSN_DATE_COLUMN)?;
    let value_columns: Vec<(usize, &str)> = table
        .headers
        .iter()
        .enumerate()
        .filter(|(idx, _)| *idx != jurisdiction && *idx != date)
        .map(|(idx, name)| (idx, name.as_str()))
        .collect();

    (0..table.height())
        .map(|row| {
            let values = value_columns
                .iter()
                .map(|&(idx, name)| Ok((name.to_string(), columns.number(row, idx, name)?)))
                .collect::<ConvertResult<Vec<_>>>()?;
            Ok(NhsnRecord {
                jurisdiction: columns.required(row, jurisdiction, NHSN_JURISDICTION_COLUMN)?,
                week_ending_date: columns.date(row, date, NHSN_DATE_COLUMN)?,
                values,
            })
        })
        .collect()
}
