//! The fixed shape of a per-location document.
//!
//! Walks a JSON value and stops at the first violation, reporting a
//! JSON-pointer path to the offending node.

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use hubverse_model::is_iso_date;

const TOP_LEVEL_KEYS: [&str; 4] = ["metadata", "ground_truth", "forecasts", "peaks"];
const METADATA_STRINGS: [&str; 5] = [
    "location",
    "abbreviation",
    "location_name",
    "dataset",
    "series_type",
];
const HUBVERSE_KEY_LISTS: [&str; 4] = ["models", "targets", "horizons", "output_types"];

/// First schema error found in a document.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{path}: {message}")]
pub struct SchemaViolation {
    /// JSON pointer, `""` for the document root.
    pub path: String,
    pub message: String,
}

type Check = Result<(), SchemaViolation>;

/// Check a serialized location document against the fixed document shape.
pub fn validate_document(document: &Value) -> Check {
    let root = Pointer::root();
    let object = expect_object(&root, document)?;
    for key in object.keys() {
        if !TOP_LEVEL_KEYS.contains(&key.as_str()) {
            return Err(root.child(key).violation("additional property is not allowed"));
        }
    }
    check_metadata(&root.child("metadata"), required(&root, object, "metadata")?)?;
    check_ground_truth(
        &root.child("ground_truth"),
        required(&root, object, "ground_truth")?,
    )?;
    check_tree(
        &root.child("forecasts"),
        required(&root, object, "forecasts")?,
        check_forecast_leaf,
    )?;
    if let Some(peaks) = object.get("peaks") {
        check_tree(&root.child("peaks"), peaks, check_peak_leaf)?;
    }
    Ok(())
}

#[derive(Debug, Clone)]
struct Pointer(String);

impl Pointer {
    fn root() -> Self {
        Self(String::new())
    }

    fn child(&self, key: &str) -> Self {
        let escaped = key.replace('~', "~0").replace('/', "~1");
        Self(format!("{}/{escaped}", self.0))
    }

    fn index(&self, idx: usize) -> Self {
        Self(format!("{}/{idx}", self.0))
    }

    fn violation(&self, message: impl Into<String>) -> SchemaViolation {
        SchemaViolation {
            path: self.0.clone(),
            message: message.into(),
        }
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn expect_object<'v>(at: &Pointer, value: &'v Value) -> Result<&'v Map<String, Value>, SchemaViolation> {
    value
        .as_object()
        .ok_or_else(|| at.violation(format!("expected object, found {}", type_name(value))))
}

fn expect_array<'v>(at: &Pointer, value: &'v Value) -> Result<&'v Vec<Value>, SchemaViolation> {
    value
        .as_array()
        .ok_or_else(|| at.violation(format!("expected array, found {}", type_name(value))))
}

fn expect_string<'v>(at: &Pointer, value: &'v Value) -> Result<&'v str, SchemaViolation> {
    value
        .as_str()
        .ok_or_else(|| at.violation(format!("expected string, found {}", type_name(value))))
}

fn expect_number_or_null(at: &Pointer, value: &Value) -> Check {
    if value.is_number() || value.is_null() {
        Ok(())
    } else {
        Err(at.violation(format!("expected number or null, found {}", type_name(value))))
    }
}

fn required<'v>(at: &Pointer, object: &'v Map<String, Value>, key: &str) -> Result<&'v Value, SchemaViolation> {
    object
        .get(key)
        .ok_or_else(|| at.violation(format!("'{key}' is a required property")))
}

fn expect_date(at: &Pointer, value: &Value) -> Check {
    let text = expect_string(at, value)?;
    if is_iso_date(text) {
        Ok(())
    } else {
        Err(at.violation(format!("'{text}' is not a YYYY-MM-DD date")))
    }
}

fn string_array(at: &Pointer, value: &Value) -> Result<usize, SchemaViolation> {
    let items = expect_array(at, value)?;
    for (idx, item) in items.iter().enumerate() {
        expect_string(&at.index(idx), item)?;
    }
    Ok(items.len())
}

fn number_array(at: &Pointer, value: &Value, nullable: bool) -> Result<usize, SchemaViolation> {
    let items = expect_array(at, value)?;
    for (idx, item) in items.iter().enumerate() {
        let item_at = at.index(idx);
        if nullable {
            expect_number_or_null(&item_at, item)?;
        } else if !item.is_number() {
            return Err(item_at.violation(format!("expected number, found {}", type_name(item))));
        }
    }
    Ok(items.len())
}

fn same_length(at: &Pointer, expected: usize, found: usize, other: &str) -> Check {
    if expected == found {
        Ok(())
    } else {
        Err(at.violation(format!(
            "array has {found} items but '{other}' has {expected}"
        )))
    }
}

fn check_metadata(at: &Pointer, value: &Value) -> Check {
    let object = expect_object(at, value)?;
    for key in METADATA_STRINGS {
        expect_string(&at.child(key), required(at, object, key)?)?;
    }
    expect_number_or_null(&at.child("population"), required(at, object, "population")?)?;
    let keys_at = at.child("hubverse_keys");
    let keys = expect_object(&keys_at, required(at, object, "hubverse_keys")?)?;
    for key in HUBVERSE_KEY_LISTS {
        string_array(&keys_at.child(key), required(&keys_at, keys, key)?)?;
    }
    Ok(())
}

fn check_ground_truth(at: &Pointer, value: &Value) -> Check {
    let object = expect_object(at, value)?;
    let dates_at = at.child("dates");
    let dates = expect_array(&dates_at, required(at, object, "dates")?)?;
    for (idx, date) in dates.iter().enumerate() {
        expect_date(&dates_at.index(idx), date)?;
    }
    for (target, series) in object.iter().filter(|(key, _)| key.as_str() != "dates") {
        let series_at = at.child(target);
        let len = number_array(&series_at, series, true)?;
        same_length(&series_at, dates.len(), len, "dates")?;
    }
    Ok(())
}

/// `reference_date -> target -> model_id -> leaf`.
fn check_tree(at: &Pointer, value: &Value, leaf: fn(&Pointer, &Map<String, Value>) -> Check) -> Check {
    for (reference_date, targets) in expect_object(at, value)? {
        let date_at = at.child(reference_date);
        if !is_iso_date(reference_date) {
            return Err(date_at.violation(format!("'{reference_date}' is not a YYYY-MM-DD date")));
        }
        for (target, models) in expect_object(&date_at, targets)? {
            let target_at = date_at.child(target);
            for (model_id, entry) in expect_object(&target_at, models)? {
                let model_at = target_at.child(model_id);
                leaf(&model_at, expect_object(&model_at, entry)?)?;
            }
        }
    }
    Ok(())
}

fn entry_type<'v>(at: &Pointer, entry: &'v Map<String, Value>) -> Result<&'v str, SchemaViolation> {
    let type_at = at.child("type");
    let kind = expect_string(&type_at, required(at, entry, "type")?)?;
    match kind {
        "quantile" | "pmf" => Ok(kind),
        other => Err(type_at.violation(format!("'{other}' is not one of 'quantile', 'pmf'"))),
    }
}

fn check_forecast_leaf(at: &Pointer, entry: &Map<String, Value>) -> Check {
    let kind = entry_type(at, entry)?;
    let predictions_at = at.child("predictions");
    let predictions = expect_object(&predictions_at, required(at, entry, "predictions")?)?;
    for (horizon, prediction) in predictions {
        let horizon_at = predictions_at.child(horizon);
        if horizon.parse::<i64>().is_err() {
            return Err(horizon_at.violation(format!("'{horizon}' is not an integer horizon")));
        }
        let object = expect_object(&horizon_at, prediction)?;
        expect_date(&horizon_at.child("date"), required(&horizon_at, object, "date")?)?;
        let (ids, values) = if kind == "quantile" {
            ("quantiles", "values")
        } else {
            ("categories", "probabilities")
        };
        parallel_arrays(&horizon_at, object, ids, values, kind == "quantile")?;
    }
    Ok(())
}

fn check_peak_leaf(at: &Pointer, entry: &Map<String, Value>) -> Check {
    let kind = entry_type(at, entry)?;
    let predictions_at = at.child("predictions");
    let predictions = expect_object(&predictions_at, required(at, entry, "predictions")?)?;
    if kind == "quantile" {
        parallel_arrays(&predictions_at, predictions, "quantiles", "values", true)
    } else {
        parallel_arrays(&predictions_at, predictions, "peak week", "probabilities", false)
    }
}

/// An id array and a value array of equal length.
fn parallel_arrays(
    at: &Pointer,
    object: &Map<String, Value>,
    ids: &str,
    values: &str,
    numeric_ids: bool,
) -> Check {
    let ids_at = at.child(ids);
    let ids_value = required(at, object, ids)?;
    let id_count = if numeric_ids {
        number_array(&ids_at, ids_value, false)?
    } else {
        string_array(&ids_at, ids_value)?
    };
    let values_at = at.child(values);
    let value_count = number_array(&values_at, required(at, object, values)?, true)?;
    same_length(&values_at, id_count, value_count, ids)
}
