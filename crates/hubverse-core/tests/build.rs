//! End-to-end tests of document building.

use chrono::{NaiveDate, TimeZone, Utc};
use hubverse_core::{LocationDirectory, LocationDocumentBuilder, build, preprocess};
use hubverse_model::{
    ConvertError, DatasetKind, DatasetProfile, GroundTruthRow, LocationRecord, OutputType,
    PreprocessOptions, RawForecastRow,
};
use serde_json::{Value, json};

fn ymd(value: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").unwrap()
}

fn raw(location: &str, target: &str, horizon: &str, output_type: &str, id: &str, value: f64) -> RawForecastRow {
    RawForecastRow {
        reference_date: ymd("2024-01-06"),
        location: location.to_string(),
        target: target.to_string(),
        horizon: Some(horizon.to_string()),
        output_type: OutputType::parse(output_type),
        output_type_id: Some(id.to_string()),
        value: Some(value),
        target_end_date: ymd("2024-01-13"),
        model_id: "modelA".to_string(),
    }
}

fn location(code: &str, abbreviation: &str, name: &str, population: f64) -> LocationRecord {
    LocationRecord {
        location: code.to_string(),
        abbreviation: Some(abbreviation.to_string()),
        location_name: name.to_string(),
        population: Some(population),
        original_location_code: None,
    }
}

fn directory() -> LocationDirectory {
    LocationDirectory::new(vec![
        location("06", "CA", "California", 39_000_000.0),
        location("48", "TX", "Texas", 30_000_000.0),
        location("US", "US", "United States", 333_000_000.0),
    ])
}

fn truth(location: &str, date: &str, as_of: &str, observation: f64) -> GroundTruthRow {
    GroundTruthRow {
        location: location.to_string(),
        target: None,
        date: ymd(date),
        as_of: ymd(as_of),
        observation: Some(observation),
    }
}

fn california_rows() -> Vec<RawForecastRow> {
    vec![
        raw("06", "wk inc flu hosp", "1", "quantile", "0.25", 10.0),
        raw("06", "wk inc flu hosp", "1", "quantile", "0.5", 20.0),
        raw("06", "wk inc flu hosp", "1", "quantile", "0.75", 30.0),
    ]
}

fn document_json(profile: &DatasetProfile, rows: Vec<RawForecastRow>, file: &str) -> Value {
    let rows = preprocess(rows, PreprocessOptions::default()).unwrap();
    let output = build(&rows, &[], &directory(), profile).unwrap();
    serde_json::to_value(&output.documents[file]).unwrap()
}

#[test]
fn california_quantile_scenario() {
    let profile = DatasetKind::Flu.profile();
    let document = document_json(&profile, california_rows(), "CA_flusight.json");

    assert_eq!(
        document["forecasts"]["2024-01-06"]["wk inc flu hosp"]["modelA"],
        json!({
            "type": "quantile",
            "predictions": {
                "1": {
                    "date": "2024-01-13",
                    "quantiles": [0.25, 0.5, 0.75],
                    "values": [10.0, 20.0, 30.0]
                }
            }
        })
    );
    assert_eq!(
        document["metadata"],
        json!({
            "location": "06",
            "abbreviation": "CA",
            "location_name": "California",
            "population": 39_000_000,
            "dataset": "flusight forecasts",
            "series_type": "projection",
            "hubverse_keys": {
                "models": ["modelA"],
                "targets": ["wk inc flu hosp"],
                "horizons": ["1"],
                "output_types": ["quantile"]
            }
        })
    );
    assert_eq!(document["ground_truth"], json!({ "dates": [] }));
    assert!(document.get("peaks").is_none());
}

#[test]
fn non_canonical_quantiles_are_filtered() {
    let profile = DatasetKind::Flu.profile();
    let rows = vec![
        raw("06", "wk inc flu hosp", "1", "quantile", "0.6", 25.0),
        raw("06", "wk inc flu hosp", "1", "quantile", "0.5", 20.0),
    ];
    let document = document_json(&profile, rows, "CA_flusight.json");
    let prediction = &document["forecasts"]["2024-01-06"]["wk inc flu hosp"]["modelA"]["predictions"]["1"];
    assert_eq!(prediction["quantiles"], json!([0.5]));
    assert_eq!(prediction["values"], json!([20.0]));
}

#[test]
fn peaks_key_present_only_with_peak_rows() {
    let profile = DatasetKind::Flu.profile();
    let mut rows = california_rows();
    let mut peak = raw("48", "peak inc flu hosp", "", "quantile", "0.5", 900.0);
    peak.horizon = None;
    rows.push(raw("48", "wk inc flu hosp", "0", "quantile", "0.5", 5.0));
    rows.push(peak);

    let rows = preprocess(rows, PreprocessOptions::default()).unwrap();
    let output = build(&rows, &[], &directory(), &profile).unwrap();
    let texas = serde_json::to_value(&output.documents["TX_flusight.json"]).unwrap();
    let california = serde_json::to_value(&output.documents["CA_flusight.json"]).unwrap();

    assert!(texas.get("peaks").is_some());
    assert!(california.get("peaks").is_none());
    assert_eq!(texas["metadata"]["hubverse_keys"]["horizons"], json!(["0", "50"]));
    assert_eq!(
        texas["peaks"]["2024-01-06"]["peak inc flu hosp"]["modelA"]["predictions"]["values"],
        json!([900.0])
    );
}

#[test]
fn one_document_per_forecast_location() {
    let profile = DatasetKind::Flu.profile();
    let mut rows = california_rows();
    rows.push(raw("US", "wk inc flu hosp", "2", "quantile", "0.5", 500.0));
    let rows = preprocess(rows, PreprocessOptions::default()).unwrap();
    let output = build(&rows, &[], &directory(), &profile).unwrap();

    insta::assert_snapshot!(output.file_names().join("\n"), @r"
    CA_flusight.json
    US_flusight.json
    metadata.json
    ");
    assert_eq!(output.metadata.locations.len(), 3);
    assert_eq!(output.metadata.locations[1].abbreviation, "TX");
    assert_eq!(output.metadata.locations[1].population, Some(30_000_000.0));
}

#[test]
fn ground_truth_is_attached_per_location() {
    let profile = DatasetKind::Flu.profile();
    let rows = preprocess(california_rows(), PreprocessOptions::default()).unwrap();
    let truth_rows = vec![
        truth("06", "2024-01-06", "2024-01-10", 100.0),
        truth("06", "2024-01-06", "2024-01-17", 120.0),
        truth("06", "2023-09-30", "2024-01-17", 1.0),
        truth("48", "2024-01-06", "2024-01-17", 70.0),
    ];
    let output = build(&rows, &truth_rows, &directory(), &profile).unwrap();
    let document = serde_json::to_value(&output.documents["CA_flusight.json"]).unwrap();
    assert_eq!(
        document["ground_truth"],
        json!({ "dates": ["2024-01-06"], "wk inc flu hosp": [120.0] })
    );
}

#[test]
fn unknown_location_aborts_the_build() {
    let profile = DatasetKind::Flu.profile();
    let rows = preprocess(
        vec![raw("72", "wk inc flu hosp", "1", "quantile", "0.5", 1.0)],
        PreprocessOptions::default(),
    )
    .unwrap();
    let error = build(&rows, &[], &directory(), &profile).unwrap_err();
    assert!(matches!(error, ConvertError::UnknownLocation { ref location } if location == "72"));
}

#[test]
fn builds_are_deterministic() {
    let profile = DatasetKind::Flu.profile();
    let rows = preprocess(california_rows(), PreprocessOptions::default()).unwrap();
    let directory = directory();
    let stamp = Utc.with_ymd_and_hms(2024, 1, 8, 14, 3, 0).unwrap();
    let first = LocationDocumentBuilder::new(&directory, &profile)
        .with_timestamp(stamp)
        .build(&rows, &[])
        .unwrap();
    let second = LocationDocumentBuilder::new(&directory, &profile)
        .with_timestamp(stamp)
        .build(&rows, &[])
        .unwrap();
    assert_eq!(
        serde_json::to_string(&first.documents).unwrap(),
        serde_json::to_string(&second.documents).unwrap()
    );
    assert_eq!(first.metadata.last_updated, "2024-01-08T14:03:00Z");
}

#[test]
fn metro_documents_use_slugs() {
    let profile = DatasetKind::FluMetro.profile();
    let directory = LocationDirectory::new(vec![LocationRecord {
        location: "nyc".to_string(),
        abbreviation: None,
        location_name: "New York City".to_string(),
        population: None,
        original_location_code: Some("3651000".to_string()),
    }]);
    let mut early = raw("nyc", "wk inc flu hosp", "1", "quantile", "0.5", 1.0);
    early.model_id = "earlyModel".to_string();
    let mut late = raw("nyc", "wk inc flu hosp", "1", "quantile", "0.5", 2.0);
    late.reference_date = ymd("2025-11-22");
    let rows = preprocess(vec![early, late], PreprocessOptions::default()).unwrap();

    let output = build(&rows, &[], &directory, &profile).unwrap();
    let document = &output.documents["nyc_flu_metrocast.json"];
    assert_eq!(document.metadata.location, "3651000");
    assert_eq!(document.metadata.abbreviation, "nyc");
    assert_eq!(document.metadata.population, None);
    assert_eq!(document.forecasts.reference_dates().collect::<Vec<_>>(), vec!["2025-11-22"]);
    assert_eq!(output.metadata.models, vec!["modelA"]);
    assert_eq!(output.metadata.locations[0].location, "3651000");
}

#[test]
fn sample_rows_never_reach_the_tree_with_custom_drop_list() {
    let profile = DatasetProfile::from_toml(
        "file_suffix = \"custom\"\ndataset_label = \"custom hub\"\ndrop_output_types = []",
    )
    .unwrap();
    let mut rows = california_rows();
    rows.push(raw("06", "wk inc flu hosp", "1", "sample", "1", 12.0));

    let rows = preprocess(rows, PreprocessOptions::default().with_output_type_id_filter(false))
        .unwrap();
    let output = build(&rows, &[], &directory(), &profile).unwrap();
    let document = serde_json::to_value(&output.documents["CA_custom.json"]).unwrap();

    assert_eq!(document["metadata"]["hubverse_keys"]["output_types"], json!(["quantile"]));
    assert_eq!(
        document["forecasts"]["2024-01-06"]["wk inc flu hosp"]["modelA"]["predictions"]["1"]
            ["values"],
        json!([10.0, 20.0, 30.0])
    );
}
