//! Nested forecast trees: `reference_date -> target -> model_id -> forecast`.
//!
//! Both trees serialize straight into the `forecasts` and `peaks` keys of a
//! location document. Horizon keys are integers internally so they order
//! numerically, and become strings in JSON.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::{ConvertError, Result};

/// Quantile forecast for one horizon.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuantilePrediction {
    pub date: String,
    pub quantiles: Vec<f64>,
    pub values: Vec<Option<f64>>,
}

/// Probability mass forecast for one horizon.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PmfPrediction {
    pub date: String,
    pub categories: Vec<String>,
    pub probabilities: Vec<Option<f64>>,
}

/// One horizon's worth of predictions, ready for insertion.
#[derive(Debug, Clone, PartialEq)]
pub enum PredictionEntry {
    Quantile(QuantilePrediction),
    Pmf(PmfPrediction),
}

impl PredictionEntry {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Quantile(_) => "quantile",
            Self::Pmf(_) => "pmf",
        }
    }
}

/// All horizons of one model's forecast; a model entry holds a single type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ModelForecast {
    Quantile {
        predictions: BTreeMap<i64, QuantilePrediction>,
    },
    Pmf {
        predictions: BTreeMap<i64, PmfPrediction>,
    },
}

impl ModelForecast {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Quantile { .. } => "quantile",
            Self::Pmf { .. } => "pmf",
        }
    }

    pub fn horizon_count(&self) -> usize {
        match self {
            Self::Quantile { predictions } => predictions.len(),
            Self::Pmf { predictions } => predictions.len(),
        }
    }
}

type Branches<T> = BTreeMap<String, BTreeMap<String, BTreeMap<String, T>>>;

/// The `forecasts` section of a location document.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ForecastTree {
    entries: Branches<ModelForecast>,
}

impl ForecastTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert one horizon's predictions.
    ///
    /// Fails when the model entry already holds predictions of the other type.
    pub fn insert(
        &mut self,
        reference_date: &str,
        target: &str,
        model_id: &str,
        horizon: i64,
        entry: PredictionEntry,
    ) -> Result<()> {
        let is_quantile = matches!(entry, PredictionEntry::Quantile(_));
        let forecast = self
            .entries
            .entry(reference_date.to_string())
            .or_default()
            .entry(target.to_string())
            .or_default()
            .entry(model_id.to_string())
            .or_insert_with(|| {
                if is_quantile {
                    ModelForecast::Quantile {
                        predictions: BTreeMap::new(),
                    }
                } else {
                    ModelForecast::Pmf {
                        predictions: BTreeMap::new(),
                    }
                }
            });
        match (forecast, entry) {
            (ModelForecast::Quantile { predictions }, PredictionEntry::Quantile(prediction)) => {
                predictions.insert(horizon, prediction);
                Ok(())
            }
            (ModelForecast::Pmf { predictions }, PredictionEntry::Pmf(prediction)) => {
                predictions.insert(horizon, prediction);
                Ok(())
            }
            (existing, incoming) => Err(ConvertError::PredictionTypeConflict {
                reference_date: reference_date.to_string(),
                target: target.to_string(),
                model_id: model_id.to_string(),
                existing: existing.kind(),
                incoming: incoming.kind(),
            }),
        }
    }

    pub fn get(&self, reference_date: &str, target: &str, model_id: &str) -> Option<&ModelForecast> {
        self.entries.get(reference_date)?.get(target)?.get(model_id)
    }

    pub fn reference_dates(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Number of `(reference_date, target, model_id)` entries.
    pub fn model_entry_count(&self) -> usize {
        count_leaves(&self.entries)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Peak magnitude quantiles.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeakQuantiles {
    pub quantiles: Vec<f64>,
    pub values: Vec<Option<f64>>,
}

/// Peak timing distribution over calendar weeks.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeakWeeks {
    #[serde(rename = "peak week")]
    pub peak_week: Vec<String>,
    pub probabilities: Vec<Option<f64>>,
}

/// A seasonal peak forecast; no horizon axis.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PeakForecast {
    Quantile { predictions: PeakQuantiles },
    Pmf { predictions: PeakWeeks },
}

/// The optional `peaks` section of a location document.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PeaksTree {
    entries: Branches<PeakForecast>,
}

impl PeaksTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        reference_date: &str,
        target: &str,
        model_id: &str,
        forecast: PeakForecast,
    ) {
        self.entries
            .entry(reference_date.to_string())
            .or_default()
            .entry(target.to_string())
            .or_default()
            .insert(model_id.to_string(), forecast);
    }

    pub fn get(&self, reference_date: &str, target: &str, model_id: &str) -> Option<&PeakForecast> {
        self.entries.get(reference_date)?.get(target)?.get(model_id)
    }

    pub fn model_entry_count(&self) -> usize {
        count_leaves(&self.entries)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn count_leaves<T>(entries: &Branches<T>) -> usize {
    entries
        .values()
        .flat_map(BTreeMap::values)
        .map(BTreeMap::len)
        .sum()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn quantile(date: &str, levels: &[f64], values: &[f64]) -> PredictionEntry {
        PredictionEntry::Quantile(QuantilePrediction {
            date: date.to_string(),
            quantiles: levels.to_vec(),
            values: values.iter().copied().map(Some).collect(),
        })
    }

    fn pmf(date: &str) -> PredictionEntry {
        PredictionEntry::Pmf(PmfPrediction {
            date: date.to_string(),
            categories: vec!["stable".to_string()],
            probabilities: vec![Some(1.0)],
        })
    }

    #[test]
    fn horizons_serialize_as_numeric_ordered_strings() {
        let mut tree = ForecastTree::new();
        for horizon in [10, 2, 0] {
            tree.insert(
                "2024-01-06",
                "wk inc flu hosp",
                "m",
                horizon,
                quantile("2024-01-13", &[0.5], &[1.0]),
            )
            .unwrap();
        }
        let value = serde_json::to_value(&tree).unwrap();
        let keys: Vec<&String> = value["2024-01-06"]["wk inc flu hosp"]["m"]["predictions"]
            .as_object()
            .unwrap()
            .keys()
            .collect();
        // serde_json maps sort their keys, so check presence rather than order here
        assert_eq!(keys.len(), 3);
        assert_eq!(value["2024-01-06"]["wk inc flu hosp"]["m"]["type"], json!("quantile"));
        assert!(value["2024-01-06"]["wk inc flu hosp"]["m"]["predictions"]["10"].is_object());

        let text = serde_json::to_string(&tree).unwrap();
        let zero = text.find("\"0\"").unwrap();
        let two = text.find("\"2\"").unwrap();
        let ten = text.find("\"10\"").unwrap();
        assert!(zero < two && two < ten);
    }

    #[test]
    fn mixing_types_under_one_model_is_rejected() {
        let mut tree = ForecastTree::new();
        tree.insert("2024-01-06", "wk flu hosp rate change", "m", 0, pmf("2024-01-06"))
            .unwrap();
        let error = tree
            .insert(
                "2024-01-06",
                "wk flu hosp rate change",
                "m",
                1,
                quantile("2024-01-13", &[0.5], &[1.0]),
            )
            .unwrap_err();
        assert!(matches!(
            error,
            ConvertError::PredictionTypeConflict {
                existing: "pmf",
                incoming: "quantile",
                ..
            }
        ));
        assert_eq!(tree.model_entry_count(), 1);
    }

    #[test]
    fn peak_weeks_use_spaced_key() {
        let mut peaks = PeaksTree::new();
        peaks.insert(
            "2024-01-06",
            "peak week inc flu hosp",
            "m",
            PeakForecast::Pmf {
                predictions: PeakWeeks {
                    peak_week: vec!["2024-01-27".to_string()],
                    probabilities: vec![Some(1.0)],
                },
            },
        );
        let value = serde_json::to_value(&peaks).unwrap();
        assert_eq!(
            value,
            json!({
                "2024-01-06": {
                    "peak week inc flu hosp": {
                        "m": {
                            "type": "pmf",
                            "predictions": {
                                "peak week": ["2024-01-27"],
                                "probabilities": [1.0]
                            }
                        }
                    }
                }
            })
        );
    }
}
