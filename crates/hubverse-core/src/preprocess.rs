//! Row-level normalization of the raw forecast table.
//!
//! Steps run in a fixed order; the peak horizon patch must precede horizon
//! coercion or peak rows would be dropped for lacking a horizon.

use hubverse_model::{
    ConvertError, ForecastRow, KEPT_CATEGORIES, KEPT_QUANTILES, OutputType,
    OutputTypeId, PEAK_HORIZON_SENTINEL, PEAK_WEEK_TARGET, PreprocessOptions, RawForecastRow,
    Result, is_peak_target, try_parse_date,
};
use tracing::debug;

/// Row counts removed by each filtering step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PreprocessStats {
    pub input_rows: usize,
    pub missing_horizon: usize,
    pub nowcasts: usize,
    pub samples: usize,
    pub filtered_output_type_ids: usize,
    pub output_rows: usize,
}

/// Normalize raw forecast rows.
pub fn preprocess(rows: Vec<RawForecastRow>, options: PreprocessOptions) -> Result<Vec<ForecastRow>> {
    preprocess_with_stats(rows, options).map(|(rows, _)| rows)
}

/// Normalize raw forecast rows and report how many each step removed.
pub fn preprocess_with_stats(
    rows: Vec<RawForecastRow>,
    options: PreprocessOptions,
) -> Result<(Vec<ForecastRow>, PreprocessStats)> {
    let mut stats = PreprocessStats {
        input_rows: rows.len(),
        ..PreprocessStats::default()
    };
    let mut output = Vec::with_capacity(rows.len());

    for mut row in rows {
        if is_peak_target(&row.target) {
            row.horizon = Some(PEAK_HORIZON_SENTINEL.to_string());
        }

        let Some(horizon) = row.horizon.as_deref().map(coerce_horizon).transpose()? else {
            stats.missing_horizon += 1;
            continue;
        };

        if options.drop_nowcasts && horizon < 0 {
            stats.nowcasts += 1;
            continue;
        }

        if row.output_type == OutputType::Sample {
            stats.samples += 1;
            continue;
        }

        if options.filter_output_type_ids
            && !keeps_output_type_id(row.output_type_id.as_deref(), &row.target)
        {
            stats.filtered_output_type_ids += 1;
            continue;
        }

        let output_type_id = typed_output_type_id(&row.output_type, row.output_type_id)?;
        output.push(ForecastRow {
            reference_date: row.reference_date,
            location: row.location,
            target: row.target,
            horizon,
            output_type: row.output_type,
            output_type_id,
            value: row.value,
            target_end_date: row.target_end_date,
            model_id: row.model_id,
        });
    }

    stats.output_rows = output.len();
    debug!(
        input_rows = stats.input_rows,
        missing_horizon = stats.missing_horizon,
        nowcasts = stats.nowcasts,
        samples = stats.samples,
        filtered_output_type_ids = stats.filtered_output_type_ids,
        output_rows = stats.output_rows,
        "forecast rows preprocessed"
    );
    Ok((output, stats))
}

/// Cast a horizon cell to an integer; integral floats such as `1.0` are accepted.
pub fn coerce_horizon(raw: &str) -> Result<i64> {
    let trimmed = raw.trim();
    if let Ok(horizon) = trimmed.parse::<i64>() {
        return Ok(horizon);
    }
    match trimmed.parse::<f64>() {
        Ok(value) if value.fract() == 0.0 => float_to_horizon(value).ok_or_else(|| {
            ConvertError::InvalidHorizon {
                value: raw.to_string(),
            }
        }),
        _ => Err(ConvertError::InvalidHorizon {
            value: raw.to_string(),
        }),
    }
}

/// `None` outside the `i64` range; `2^63` itself is excluded.
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn float_to_horizon(value: f64) -> Option<i64> {
    (value >= i64::MIN as f64 && value < i64::MAX as f64).then(|| value as i64)
}

/// Canonical categories, canonical quantile levels, or a calendar week for peak timing.
pub fn keeps_output_type_id(output_type_id: Option<&str>, target: &str) -> bool {
    let Some(id) = output_type_id.map(str::trim) else {
        return false;
    };
    if KEPT_CATEGORIES.contains(&id) {
        return true;
    }
    if id
        .parse::<f64>()
        .is_ok_and(|level| KEPT_QUANTILES.contains(&level))
    {
        return true;
    }
    target == PEAK_WEEK_TARGET && try_parse_date(id).is_some()
}

fn typed_output_type_id(
    output_type: &OutputType,
    output_type_id: Option<String>,
) -> Result<OutputTypeId> {
    let id = output_type_id.ok_or_else(|| ConvertError::MissingValue {
        column: "output_type_id".to_string(),
    })?;
    if *output_type == OutputType::Quantile {
        id.trim()
            .parse::<f64>()
            .map(OutputTypeId::Level)
            .map_err(|_| ConvertError::invalid_number("output_type_id", id.as_str()))
    } else {
        Ok(OutputTypeId::Label(id))
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn raw(target: &str, horizon: Option<&str>, output_type: &str, id: &str) -> RawForecastRow {
        RawForecastRow {
            reference_date: NaiveDate::from_ymd_opt(2024, 1, 6).unwrap(),
            location: "06".to_string(),
            target: target.to_string(),
            horizon: horizon.map(str::to_string),
            output_type: OutputType::parse(output_type),
            output_type_id: Some(id.to_string()),
            value: Some(1.0),
            target_end_date: NaiveDate::from_ymd_opt(2024, 1, 13).unwrap(),
            model_id: "m".to_string(),
        }
    }

    fn run(rows: Vec<RawForecastRow>, options: PreprocessOptions) -> Vec<ForecastRow> {
        preprocess(rows, options).unwrap()
    }

    #[test]
    fn peak_rows_get_sentinel_horizon() {
        let rows = run(
            vec![
                raw("peak week inc flu hosp", None, "pmf", "2024-01-27"),
                raw("peak inc flu hosp", Some(""), "quantile", "0.5"),
            ],
            PreprocessOptions::default(),
        );
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|row| row.horizon == PEAK_HORIZON_SENTINEL));
        assert_eq!(rows[0].output_type_id, OutputTypeId::Label("2024-01-27".into()));
        assert_eq!(rows[1].output_type_id, OutputTypeId::Level(0.5));
    }

    #[test]
    fn missing_horizons_and_nowcasts_are_dropped() {
        let input = vec![
            raw("wk inc flu hosp", None, "quantile", "0.5"),
            raw("wk inc flu hosp", Some("-1"), "quantile", "0.5"),
            raw("wk inc flu hosp", Some("2.0"), "quantile", "0.5"),
        ];
        let (rows, stats) = preprocess_with_stats(input.clone(), PreprocessOptions::default()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].horizon, 2);
        assert_eq!(stats.missing_horizon, 1);
        assert_eq!(stats.nowcasts, 1);

        let kept = run(input, PreprocessOptions::default().with_nowcast_filter(false));
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].horizon, -1);
    }

    #[test]
    fn fractional_horizon_is_fatal() {
        let error = preprocess(
            vec![raw("wk inc flu hosp", Some("1.5"), "quantile", "0.5")],
            PreprocessOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(error, ConvertError::InvalidHorizon { ref value } if value == "1.5"));
    }

    #[test]
    fn output_type_id_filter_keeps_canonical_values() {
        let rows = run(
            vec![
                raw("wk inc flu hosp", Some("1"), "quantile", "0.6"),
                raw("wk inc flu hosp", Some("1"), "quantile", "0.5"),
                raw("wk inc flu hosp", Some("1"), "quantile", "0.250"),
                raw("wk flu hosp rate change", Some("1"), "pmf", "stable"),
                raw("wk flu hosp rate change", Some("1"), "pmf", "moderate"),
                raw("wk inc flu hosp", Some("1"), "pmf", "2024-01-27"),
            ],
            PreprocessOptions::default(),
        );
        let ids: Vec<String> = rows.iter().map(|row| row.output_type_id.to_string()).collect();
        assert_eq!(ids, vec!["0.5", "0.25", "stable"]);
    }

    #[test]
    fn unfiltered_quantile_ids_must_be_numeric() {
        let error = preprocess(
            vec![raw("wk inc flu hosp", Some("1"), "quantile", "median")],
            PreprocessOptions::default().with_output_type_id_filter(false),
        )
        .unwrap_err();
        assert!(matches!(error, ConvertError::InvalidNumber { .. }));
    }

    #[test]
    fn samples_are_removed_regardless_of_options() {
        let options = PreprocessOptions::default()
            .with_output_type_id_filter(false)
            .with_nowcast_filter(false);
        let (rows, stats) = preprocess_with_stats(
            vec![
                raw("wk inc flu hosp", Some("1"), "sample", "1"),
                raw("wk inc flu hosp", Some("1"), "quantile", "0.5"),
            ],
            options,
        )
        .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].output_type, OutputType::Quantile);
        assert_eq!(stats.samples, 1);
    }

    #[test]
    fn out_of_range_horizon_is_fatal() {
        for raw in ["1e20", "-1e20", "9223372036854775808.0", "inf", "NaN"] {
            assert!(
                matches!(coerce_horizon(raw), Err(ConvertError::InvalidHorizon { ref value }) if value == raw),
                "{raw} should be rejected"
            );
        }
        assert_eq!(coerce_horizon("-9223372036854775808.0").unwrap(), i64::MIN);
    }

    #[test]
    fn horizon_coercion_accepts_integral_text() {
        assert_eq!(coerce_horizon("3").unwrap(), 3);
        assert_eq!(coerce_horizon(" 0.0 ").unwrap(), 0);
        assert_eq!(coerce_horizon("-1").unwrap(), -1);
        assert!(coerce_horizon("one").is_err());
    }
}
