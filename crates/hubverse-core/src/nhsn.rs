//! Per-jurisdiction time series from NHSN surveillance records.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use hubverse_model::{
    NHSN_DATASET_LABEL, NHSN_FILE_SUFFIX, NHSN_JURISDICTIONS, NHSN_SERIES_TYPE, NhsnDocument,
    NhsnMetadata, NhsnMetadataDocument, NhsnRecord, NhsnSeries, Result, format_date,
};
use tracing::{debug, info};

use crate::locations::LocationDirectory;

/// Format of the NHSN `metadata.json`'s `last_updated`.
pub const NHSN_LAST_UPDATED_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// NHSN documents keyed by output file name, plus `metadata.json`.
#[derive(Debug, Clone, PartialEq)]
pub struct NhsnOutput {
    pub documents: BTreeMap<String, NhsnDocument>,
    pub metadata: NhsnMetadataDocument,
}

#[derive(Debug, Clone)]
pub struct NhsnBuilder<'a> {
    directory: &'a LocationDirectory,
    labels: BTreeMap<String, String>,
    timestamp: Option<DateTime<Utc>>,
}

impl<'a> NhsnBuilder<'a> {
    pub fn new(directory: &'a LocationDirectory) -> Self {
        Self {
            directory,
            labels: BTreeMap::new(),
            timestamp: None,
        }
    }

    /// Rename columns in the output, keyed by source column name.
    pub fn with_column_labels(mut self, labels: BTreeMap<String, String>) -> Self {
        self.labels = labels;
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    fn label<'n>(&'n self, column: &'n str) -> &'n str {
        self.labels.get(column).map_or(column, String::as_str)
    }

    /// Build one document per reported jurisdiction.
    ///
    /// `columns` lists every source column in table order and only feeds
    /// `metadata.json`. Records outside the reported jurisdictions are dropped.
    pub fn build(&self, records: &[NhsnRecord], columns: &[String]) -> Result<NhsnOutput> {
        let mut by_jurisdiction: BTreeMap<&str, Vec<&NhsnRecord>> = BTreeMap::new();
        let mut dropped = 0usize;
        for record in records {
            match reported_jurisdiction(&record.jurisdiction) {
                Some(jurisdiction) => by_jurisdiction.entry(jurisdiction).or_default().push(record),
                None => dropped += 1,
            }
        }
        if dropped > 0 {
            debug!(dropped, "records outside reported jurisdictions dropped");
        }

        let mut documents = BTreeMap::new();
        for (jurisdiction, mut rows) in by_jurisdiction {
            rows.sort_by_key(|record| record.week_ending_date);
            let resolved = self.directory.resolve_abbreviation(jurisdiction)?;
            let document = NhsnDocument {
                metadata: NhsnMetadata {
                    location: resolved.location,
                    abbreviation: resolved.abbreviation,
                    location_name: resolved.location_name,
                    population: resolved.population,
                    dataset: NHSN_DATASET_LABEL.to_string(),
                    series_type: NHSN_SERIES_TYPE.to_string(),
                },
                series: self.series(&rows),
            };
            documents.insert(format!("{jurisdiction}_{NHSN_FILE_SUFFIX}.json"), document);
        }

        let timestamp = self.timestamp.unwrap_or_else(Utc::now);
        let metadata = NhsnMetadataDocument {
            last_updated: timestamp.format(NHSN_LAST_UPDATED_FORMAT).to_string(),
            dataset: NHSN_DATASET_LABEL.to_string(),
            columns: columns
                .iter()
                .map(|column| self.label(column).to_string())
                .collect(),
            locations: documents
                .values()
                .map(|document| document.metadata.abbreviation.clone())
                .collect(),
        };
        info!(document_count = documents.len(), "NHSN documents built");
        Ok(NhsnOutput {
            documents,
            metadata,
        })
    }

    fn series(&self, rows: &[&NhsnRecord]) -> NhsnSeries {
        let mut series = NhsnSeries {
            dates: Vec::with_capacity(rows.len()),
            columns: BTreeMap::new(),
        };
        for record in rows {
            series.dates.push(format_date(record.week_ending_date));
            for (column, value) in &record.values {
                series
                    .columns
                    .entry(self.label(column).to_string())
                    .or_insert_with(|| Vec::with_capacity(rows.len()))
                    .push(*value);
            }
        }
        series
    }
}

/// The abbreviation a record is reported under, if any. NHSN spells the
/// national total `USA`.
fn reported_jurisdiction(raw: &str) -> Option<&'static str> {
    let jurisdiction = if raw.eq_ignore_ascii_case("usa") {
        "US"
    } else {
        raw
    };
    NHSN_JURISDICTIONS
        .iter()
        .copied()
        .find(|known| *known == jurisdiction)
}
