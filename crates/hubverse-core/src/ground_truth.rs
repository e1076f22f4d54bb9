//! Reshaping revised observation rows into a date-aligned wide series.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use hubverse_model::{
    ConvertError, DatasetProfile, GroundTruthRow, GroundTruthSeries, Result, format_date,
};

/// Turns one location's observation rows into a [`GroundTruthSeries`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroundTruthReshaper {
    default_target: Option<String>,
    min_date: Option<NaiveDate>,
}

impl GroundTruthReshaper {
    pub fn new(default_target: Option<String>, min_date: Option<NaiveDate>) -> Self {
        Self {
            default_target,
            min_date,
        }
    }

    pub fn from_profile(profile: &DatasetProfile) -> Self {
        Self::new(
            profile.ground_truth_value_key.clone(),
            profile.ground_truth_min_date,
        )
    }

    /// Resolve revisions, drop empty observations, then pivot by target.
    ///
    /// The latest `as_of` wins for each `(date, target)`; ties keep the later row.
    pub fn reshape<'a, I>(&self, rows: I) -> Result<GroundTruthSeries>
    where
        I: IntoIterator<Item = &'a GroundTruthRow>,
    {
        let mut revisions: Vec<(NaiveDate, NaiveDate, String, Option<f64>)> = Vec::new();
        for row in rows {
            let target = match (&row.target, &self.default_target) {
                (Some(target), _) | (None, Some(target)) => target.clone(),
                (None, None) => return Err(ConvertError::MissingGroundTruthTarget),
            };
            revisions.push((row.as_of, row.date, target, row.observation));
        }
        revisions.sort_by_key(|(as_of, ..)| *as_of);

        let mut latest: BTreeMap<(NaiveDate, String), Option<f64>> = BTreeMap::new();
        for (_, date, target, observation) in revisions {
            latest.insert((date, target), observation);
        }

        let mut dates = BTreeSet::new();
        let mut cells: BTreeMap<String, BTreeMap<NaiveDate, f64>> = BTreeMap::new();
        for ((date, target), observation) in latest {
            let Some(value) = observation else {
                continue;
            };
            if self.min_date.is_some_and(|min| date < min) {
                continue;
            }
            dates.insert(date);
            cells.entry(target).or_default().insert(date, value);
        }

        let series = cells
            .into_iter()
            .map(|(target, values)| {
                let aligned = dates.iter().map(|date| values.get(date).copied()).collect();
                (target, aligned)
            })
            .collect();
        Ok(GroundTruthSeries {
            dates: dates.into_iter().map(format_date).collect(),
            series,
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn ymd(value: &str) -> NaiveDate {
        NaiveDate::parse_from_str(value, "%Y-%m-%d").unwrap()
    }

    fn row(target: Option<&str>, date: &str, as_of: &str, observation: Option<f64>) -> GroundTruthRow {
        GroundTruthRow {
            location: "06".to_string(),
            target: target.map(str::to_string),
            date: ymd(date),
            as_of: ymd(as_of),
            observation,
        }
    }

    #[test]
    fn latest_revision_wins() {
        let reshaper = GroundTruthReshaper::new(Some("wk inc flu hosp".into()), None);
        let rows = vec![
            row(None, "2024-01-06", "2024-01-20", Some(12.0)),
            row(None, "2024-01-06", "2024-01-10", Some(10.0)),
            row(None, "2024-01-13", "2024-01-20", Some(7.0)),
        ];
        let series = reshaper.reshape(&rows).unwrap();
        assert_eq!(
            serde_json::to_value(&series).unwrap(),
            json!({
                "dates": ["2024-01-06", "2024-01-13"],
                "wk inc flu hosp": [12.0, 7.0]
            })
        );
    }

    #[test]
    fn null_latest_revision_drops_the_date() {
        let reshaper = GroundTruthReshaper::new(Some("t".into()), None);
        let rows = vec![
            row(None, "2024-01-06", "2024-01-10", Some(10.0)),
            row(None, "2024-01-06", "2024-01-20", None),
        ];
        let series = reshaper.reshape(&rows).unwrap();
        assert!(series.is_empty());
        assert!(series.series.is_empty());
    }

    #[test]
    fn targets_are_aligned_with_nulls() {
        let reshaper = GroundTruthReshaper::new(None, ymd("2024-01-01").into());
        let rows = vec![
            row(Some("wk inc flu hosp"), "2023-12-30", "2024-01-20", Some(1.0)),
            row(Some("wk inc flu hosp"), "2024-01-06", "2024-01-20", Some(2.0)),
            row(Some("wk flu hosp rate"), "2024-01-13", "2024-01-20", Some(0.5)),
        ];
        let series = reshaper.reshape(&rows).unwrap();
        assert_eq!(series.dates, vec!["2024-01-06", "2024-01-13"]);
        assert_eq!(series.series["wk inc flu hosp"], vec![Some(2.0), None]);
        assert_eq!(series.series["wk flu hosp rate"], vec![None, Some(0.5)]);
    }

    #[test]
    fn empty_input_has_no_target_keys() {
        let reshaper = GroundTruthReshaper::new(Some("t".into()), None);
        let series = reshaper.reshape(&Vec::<GroundTruthRow>::new()).unwrap();
        assert_eq!(serde_json::to_value(&series).unwrap(), json!({ "dates": [] }));
    }

    #[test]
    fn missing_target_without_default_fails() {
        let reshaper = GroundTruthReshaper::new(None, None);
        let rows = vec![row(None, "2024-01-06", "2024-01-10", Some(1.0))];
        assert!(matches!(
            reshaper.reshape(&rows),
            Err(ConvertError::MissingGroundTruthTarget)
        ));
    }
}
