//! Location directory lookups.

use std::collections::BTreeMap;

use hubverse_model::{ConvertError, LocationEntry, LocationRecord, Result};

/// Identity of one output document's location.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedLocation {
    /// Value of `metadata.location`.
    pub location: String,
    /// File name stem and `metadata.abbreviation`.
    pub abbreviation: String,
    pub location_name: String,
    pub population: Option<i64>,
}

/// Lookup table over the full locations table, keyed by the `location` column.
#[derive(Debug, Clone, Default)]
pub struct LocationDirectory {
    records: Vec<LocationRecord>,
    index: BTreeMap<String, usize>,
}

impl LocationDirectory {
    pub fn new(records: Vec<LocationRecord>) -> Self {
        let mut index = BTreeMap::new();
        for (position, record) in records.iter().enumerate() {
            index.entry(record.location.clone()).or_insert(position);
        }
        Self { records, index }
    }

    pub fn get(&self, location: &str) -> Option<&LocationRecord> {
        self.index.get(location).map(|&position| &self.records[position])
    }

    pub fn records(&self) -> &[LocationRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Resolve the document identity of a forecast location.
    ///
    /// Metro rows already carry the slug used for file naming; the numeric
    /// code comes from `original_location_code`.
    pub fn resolve(&self, location: &str, is_metro: bool) -> Result<ResolvedLocation> {
        let record = self
            .get(location)
            .ok_or_else(|| ConvertError::UnknownLocation {
                location: location.to_string(),
            })?;
        let (code, abbreviation) = identity(record, is_metro)?;
        Ok(ResolvedLocation {
            location: code,
            abbreviation,
            location_name: record.location_name.clone(),
            population: record.population.map(whole_population),
        })
    }

    /// Resolve a location by its abbreviation column, e.g. `CA` or `US`.
    pub fn resolve_abbreviation(&self, abbreviation: &str) -> Result<ResolvedLocation> {
        let record = self
            .records
            .iter()
            .find(|record| record.abbreviation.as_deref() == Some(abbreviation))
            .ok_or_else(|| ConvertError::UnknownLocation {
                location: abbreviation.to_string(),
            })?;
        Ok(ResolvedLocation {
            location: record.location.clone(),
            abbreviation: abbreviation.to_string(),
            location_name: record.location_name.clone(),
            population: record.population.map(whole_population),
        })
    }

    /// Project every record into a `metadata.json` location entry.
    pub fn metadata_entries(&self, is_metro: bool) -> Result<Vec<LocationEntry>> {
        self.records
            .iter()
            .map(|record| {
                let (location, abbreviation) = identity(record, is_metro)?;
                Ok(LocationEntry {
                    location,
                    abbreviation,
                    location_name: record.location_name.clone(),
                    population: record.population,
                })
            })
            .collect()
    }
}

fn identity(record: &LocationRecord, is_metro: bool) -> Result<(String, String)> {
    if is_metro {
        let code = record.original_location_code.clone().ok_or_else(|| {
            ConvertError::MissingOriginalLocationCode {
                location: record.location.clone(),
            }
        })?;
        Ok((code, record.location.clone()))
    } else {
        let abbreviation = record
            .abbreviation
            .clone()
            .ok_or_else(|| ConvertError::MissingValue {
                column: "abbreviation".to_string(),
            })?;
        Ok((record.location.clone(), abbreviation))
    }
}

#[allow(clippy::cast_possible_truncation)]
fn whole_population(population: f64) -> i64 {
    population.round() as i64
}
