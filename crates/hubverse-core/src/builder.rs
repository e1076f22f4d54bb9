//! Assembling per-location documents and the dataset metadata document.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use hubverse_model::{
    DatasetMetadataDocument, DatasetProfile, DocumentMetadata, ForecastRow, GroundTruthRow,
    HubverseKeys, LocationDocument, METADATA_FILE_NAME, Result,
};
use tracing::{debug, info, warn};

use crate::ground_truth::GroundTruthReshaper;
use crate::grouping::ForecastGrouper;
use crate::locations::LocationDirectory;

/// Format of `metadata.json`'s `last_updated`.
pub const LAST_UPDATED_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Everything a conversion run produces, keyed by output file name.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildOutput {
    pub documents: BTreeMap<String, LocationDocument>,
    pub metadata: DatasetMetadataDocument,
}

impl BuildOutput {
    /// Location document file names followed by `metadata.json`.
    pub fn file_names(&self) -> Vec<&str> {
        self.documents
            .keys()
            .map(String::as_str)
            .chain(std::iter::once(METADATA_FILE_NAME))
            .collect()
    }
}

/// Builds all documents of one dataset.
#[derive(Debug, Clone)]
pub struct LocationDocumentBuilder<'a> {
    directory: &'a LocationDirectory,
    profile: &'a DatasetProfile,
    timestamp: Option<DateTime<Utc>>,
}

impl<'a> LocationDocumentBuilder<'a> {
    pub fn new(directory: &'a LocationDirectory, profile: &'a DatasetProfile) -> Self {
        Self {
            directory,
            profile,
            timestamp: None,
        }
    }

    /// Fix the `last_updated` timestamp instead of reading the clock.
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Build every location document plus `metadata.json`.
    ///
    /// Fails on the first location that is missing from the directory.
    pub fn build(
        &self,
        forecasts: &[ForecastRow],
        ground_truth: &[GroundTruthRow],
    ) -> Result<BuildOutput> {
        let forecasts: Vec<&ForecastRow> = forecasts
            .iter()
            .filter(|row| {
                self.profile
                    .min_reference_date
                    .is_none_or(|min| row.reference_date >= min)
            })
            .collect();

        let mut partitions: BTreeMap<&str, Vec<&ForecastRow>> = BTreeMap::new();
        for row in forecasts.iter().copied() {
            partitions.entry(row.location.as_str()).or_default().push(row);
        }
        let mut truth_by_location: BTreeMap<&str, Vec<&GroundTruthRow>> = BTreeMap::new();
        for row in ground_truth {
            truth_by_location
                .entry(row.location.as_str())
                .or_default()
                .push(row);
        }

        let reshaper = GroundTruthReshaper::from_profile(self.profile);
        let grouper = ForecastGrouper::new(&self.profile.drop_output_types);
        let mut documents = BTreeMap::new();
        for (location, rows) in &partitions {
            let truth = truth_by_location
                .get(location)
                .map(Vec::as_slice)
                .unwrap_or_default();
            let (file_name, document) =
                self.build_location(location, rows, truth, &reshaper, &grouper)?;
            if documents.insert(file_name.clone(), document).is_some() {
                warn!(%file_name, %location, "two locations resolve to the same file name");
            }
        }

        let models: BTreeSet<&str> = forecasts.iter().map(|row| row.model_id.as_str()).collect();
        let timestamp = self.timestamp.unwrap_or_else(Utc::now);
        let metadata = DatasetMetadataDocument {
            last_updated: timestamp.format(LAST_UPDATED_FORMAT).to_string(),
            models: models.into_iter().map(str::to_string).collect(),
            locations: self.directory.metadata_entries(self.profile.is_metro)?,
        };
        info!(
            dataset = %self.profile.dataset_label,
            document_count = documents.len(),
            model_count = metadata.models.len(),
            "documents built"
        );
        Ok(BuildOutput {
            documents,
            metadata,
        })
    }

    fn build_location(
        &self,
        location: &str,
        rows: &[&ForecastRow],
        truth: &[&GroundTruthRow],
        reshaper: &GroundTruthReshaper,
        grouper: &ForecastGrouper<'_>,
    ) -> Result<(String, LocationDocument)> {
        let resolved = self.directory.resolve(location, self.profile.is_metro)?;
        let file_name = self.profile.file_name(&resolved.abbreviation);

        let ground_truth = reshaper.reshape(truth.iter().copied())?;
        let grouped = grouper.group(rows.iter().copied())?;
        let metadata = DocumentMetadata {
            location: resolved.location,
            abbreviation: resolved.abbreviation,
            location_name: resolved.location_name,
            population: resolved.population,
            dataset: self.profile.dataset_label.clone(),
            series_type: self.profile.series_type.clone(),
            hubverse_keys: self.hubverse_keys(rows),
        };
        debug!(
            %location,
            %file_name,
            row_count = rows.len(),
            ground_truth_dates = ground_truth.dates.len(),
            has_peaks = grouped.peaks.is_some(),
            "location document built"
        );
        Ok((
            file_name,
            LocationDocument {
                metadata,
                ground_truth,
                forecasts: grouped.forecasts,
                peaks: grouped.peaks,
            },
        ))
    }

    fn hubverse_keys(&self, rows: &[&ForecastRow]) -> HubverseKeys {
        let mut keys = HubverseKeys::default();
        for row in rows {
            push_unique(&mut keys.models, &row.model_id);
            push_unique(&mut keys.targets, &row.target);
            push_unique(&mut keys.horizons, &row.horizon.to_string());
            if !self.profile.drops(row.output_type.as_str()) {
                push_unique(&mut keys.output_types, row.output_type.as_str());
            }
        }
        keys
    }
}

fn push_unique(values: &mut Vec<String>, value: &str) {
    if !values.iter().any(|existing| existing == value) {
        values.push(value.to_string());
    }
}

/// Build all documents with the clock's current time as `last_updated`.
pub fn build(
    forecasts: &[ForecastRow],
    ground_truth: &[GroundTruthRow],
    directory: &LocationDirectory,
    profile: &DatasetProfile,
) -> Result<BuildOutput> {
    LocationDocumentBuilder::new(directory, profile).build(forecasts, ground_truth)
}
