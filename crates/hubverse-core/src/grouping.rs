//! Grouping long forecast rows into the nested forecast and peak trees.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use hubverse_model::{
    ConvertError, ForecastRow, ForecastTree, OutputType, OutputTypeId, PEAK_INC_TARGET,
    PEAK_WEEK_TARGET, PeakForecast, PeakQuantiles, PeakWeeks, PeaksTree, PmfPrediction,
    PredictionEntry, QuantilePrediction, Result, format_date,
};
use tracing::trace;

type GroupKey<'a> = (NaiveDate, &'a str, &'a str, i64, &'a OutputType);

/// Trees built for one location.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupedForecasts {
    pub forecasts: ForecastTree,
    /// `None` when the location has no peak rows.
    pub peaks: Option<PeaksTree>,
}

/// Builds forecast trees, skipping the configured output types.
#[derive(Debug, Clone, Copy)]
pub struct ForecastGrouper<'p> {
    drop_output_types: &'p [String],
}

impl<'p> ForecastGrouper<'p> {
    pub fn new(drop_output_types: &'p [String]) -> Self {
        Self { drop_output_types }
    }

    fn drops(&self, output_type: &OutputType) -> bool {
        self.drop_output_types
            .iter()
            .any(|dropped| dropped == output_type.as_str())
    }

    /// Group one location's rows.
    ///
    /// Rows sharing `(reference_date, target, model_id, horizon, output_type)`
    /// become one prediction, with arrays in input row order.
    pub fn group<'a, I>(&self, rows: I) -> Result<GroupedForecasts>
    where
        I: IntoIterator<Item = &'a ForecastRow>,
    {
        let mut standard: BTreeMap<GroupKey<'a>, Vec<&'a ForecastRow>> = BTreeMap::new();
        let mut peak_rows: Vec<&'a ForecastRow> = Vec::new();
        for row in rows {
            if row.is_peak() {
                peak_rows.push(row);
                continue;
            }
            let key = (
                row.reference_date,
                row.target.as_str(),
                row.model_id.as_str(),
                row.horizon,
                &row.output_type,
            );
            standard.entry(key).or_default().push(row);
        }

        let mut forecasts = ForecastTree::new();
        for ((reference_date, target, model_id, horizon, output_type), group) in standard {
            if self.drops(output_type) {
                continue;
            }
            let entry = prediction_entry(output_type, &group)?;
            forecasts.insert(
                &format_date(reference_date),
                target,
                model_id,
                horizon,
                entry,
            )?;
        }

        let peaks = if peak_rows.is_empty() {
            None
        } else {
            Some(self.group_peaks(&peak_rows)?)
        };
        trace!(
            forecast_entries = forecasts.model_entry_count(),
            peak_rows = peak_rows.len(),
            "forecasts grouped"
        );
        Ok(GroupedForecasts { forecasts, peaks })
    }

    fn group_peaks(&self, rows: &[&ForecastRow]) -> Result<PeaksTree> {
        let mut groups: BTreeMap<(&str, NaiveDate, &str), Vec<&ForecastRow>> = BTreeMap::new();
        for row in rows {
            if self.drops(&row.output_type) {
                continue;
            }
            groups
                .entry((row.target.as_str(), row.reference_date, row.model_id.as_str()))
                .or_default()
                .push(*row);
        }

        let mut peaks = PeaksTree::new();
        for ((target, reference_date, model_id), group) in groups {
            let forecast = match target {
                PEAK_INC_TARGET => PeakForecast::Quantile {
                    predictions: PeakQuantiles {
                        quantiles: levels(&group)?,
                        values: values(&group),
                    },
                },
                PEAK_WEEK_TARGET => PeakForecast::Pmf {
                    predictions: PeakWeeks {
                        peak_week: labels(&group),
                        probabilities: values(&group),
                    },
                },
                _ => continue,
            };
            peaks.insert(&format_date(reference_date), target, model_id, forecast);
        }
        Ok(peaks)
    }
}

fn prediction_entry(output_type: &OutputType, group: &[&ForecastRow]) -> Result<PredictionEntry> {
    let date = group
        .first()
        .map(|row| format_date(row.target_end_date))
        .unwrap_or_default();
    match output_type {
        OutputType::Quantile => Ok(PredictionEntry::Quantile(QuantilePrediction {
            date,
            quantiles: levels(group)?,
            values: values(group),
        })),
        OutputType::Pmf => Ok(PredictionEntry::Pmf(PmfPrediction {
            date,
            categories: labels(group),
            probabilities: values(group),
        })),
        other => Err(ConvertError::UnsupportedOutputType {
            output_type: other.to_string(),
        }),
    }
}

fn levels(group: &[&ForecastRow]) -> Result<Vec<f64>> {
    group
        .iter()
        .map(|row| match &row.output_type_id {
            OutputTypeId::Level(level) => Ok(*level),
            OutputTypeId::Label(label) => label
                .trim()
                .parse::<f64>()
                .map_err(|_| ConvertError::invalid_number("output_type_id", label.as_str())),
        })
        .collect()
}

fn labels(group: &[&ForecastRow]) -> Vec<String> {
    group
        .iter()
        .map(|row| row.output_type_id.to_string())
        .collect()
}

fn values(group: &[&ForecastRow]) -> Vec<Option<f64>> {
    group.iter().map(|row| row.value).collect()
}
