//! Validation of real builds and gating decisions.

use chrono::{NaiveDate, TimeZone, Utc};
use hubverse_core::{LocationDirectory, LocationDocumentBuilder};
use hubverse_model::{
    DatasetKind, ForecastRow, GroundTruthRow, LocationRecord, OutputType, OutputTypeId,
    PEAK_WEEK_TARGET,
};
use hubverse_validate::{
    DocumentValidation, InvalidDocumentPolicy, SchemaViolation, gate_documents, invalid_count,
    validate_build,
};

fn ymd(value: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").unwrap()
}

fn forecast(location: &str, target: &str, output_type: OutputType, id: OutputTypeId) -> ForecastRow {
    ForecastRow {
        reference_date: ymd("2024-01-06"),
        location: location.to_string(),
        target: target.to_string(),
        horizon: 1,
        output_type,
        output_type_id: id,
        value: Some(0.5),
        target_end_date: ymd("2024-01-13"),
        model_id: "m".to_string(),
    }
}

#[test]
fn built_documents_pass_validation() {
    let profile = DatasetKind::Flu.profile();
    let directory = LocationDirectory::new(vec![
        LocationRecord {
            location: "06".to_string(),
            abbreviation: Some("CA".to_string()),
            location_name: "California".to_string(),
            population: Some(39_000_000.0),
            original_location_code: None,
        },
        LocationRecord {
            location: "US".to_string(),
            abbreviation: Some("US".to_string()),
            location_name: "United States".to_string(),
            population: None,
            original_location_code: None,
        },
    ]);
    let rows = vec![
        forecast("06", "wk inc flu hosp", OutputType::Quantile, OutputTypeId::Level(0.5)),
        forecast(
            "06",
            "wk flu hosp rate change",
            OutputType::Pmf,
            OutputTypeId::Label("stable".into()),
        ),
        forecast(
            "US",
            PEAK_WEEK_TARGET,
            OutputType::Pmf,
            OutputTypeId::Label("2024-01-27".into()),
        ),
    ];
    let truth = vec![GroundTruthRow {
        location: "06".to_string(),
        target: None,
        date: ymd("2024-01-06"),
        as_of: ymd("2024-01-10"),
        observation: Some(3.0),
    }];
    let output = LocationDocumentBuilder::new(&directory, &profile)
        .with_timestamp(Utc.with_ymd_and_hms(2024, 1, 8, 0, 0, 0).unwrap())
        .build(&rows, &truth)
        .unwrap();

    let results = validate_build(&output);
    assert_eq!(results.len(), 2);
    assert!(results.iter().all(DocumentValidation::is_valid), "{results:?}");
    assert_eq!(invalid_count(&results), 0);
}

fn results() -> Vec<DocumentValidation> {
    vec![
        DocumentValidation {
            file_name: "CA_flusight.json".to_string(),
            violation: None,
        },
        DocumentValidation {
            file_name: "TX_flusight.json".to_string(),
            violation: Some(SchemaViolation {
                path: "/ground_truth/dates/0".to_string(),
                message: "'2024-1-6' is not a YYYY-MM-DD date".to_string(),
            }),
        },
    ]
}

#[test]
fn save_policy_blocks_nothing() {
    let decision = gate_documents(InvalidDocumentPolicy::Save, &results());
    assert!(decision.blocked_files.is_empty());
}

#[test]
fn skip_policy_blocks_invalid_documents() {
    let decision = gate_documents(InvalidDocumentPolicy::Skip, &results());
    assert_eq!(decision.blocked_files, vec!["TX_flusight.json"]);
    assert!(decision.is_blocked("TX_flusight.json"));
    assert!(!decision.is_blocked("CA_flusight.json"));
}

#[test]
fn policy_parses_from_text() {
    assert_eq!("SKIP".parse::<InvalidDocumentPolicy>(), Ok(InvalidDocumentPolicy::Skip));
    assert!("block".parse::<InvalidDocumentPolicy>().is_err());
    assert_eq!(InvalidDocumentPolicy::default().to_string(), "save");
}
