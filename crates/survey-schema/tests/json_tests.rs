//! Loading surveys from JSON documents and running submissions against them.

#![cfg(feature = "json")]

use std::io::Write;

use survey_condition_executor::{ConditionExecutorError, ResponseMap, ResponseValue};
use survey_schema::{SchemaError, Survey, SurveyDocument};

const MEDICATION: &str = r#"{
    "id": "medication",
    "items": [
        { "id": "took_dose", "prompt_type": "single_choice",
          "choices": [{ "key": 0, "label": "no" }, { "key": 1, "label": "yes" }] },
        { "id": "hours_ago", "prompt_type": "hours_before_now", "min": "0", "max": "24",
          "condition": "took_dose == 1" },
        { "id": "side_effects", "prompt_type": "multi_choice", "skippable": true,
          "choices": [{ "key": 0, "label": "nausea" }, { "key": 1, "label": "headache" }],
          "condition": "took_dose == 1 AND hours_ago <= 6" },
        { "id": "photo", "prompt_type": "photo", "skippable": true }
    ]
}"#;

#[test]
fn test_load_and_submit() {
    let survey = Survey::from_json(MEDICATION).unwrap();

    let answers: ResponseMap = serde_json::from_str(
        r#"{ "took_dose": 1, "hours_ago": 3, "side_effects": [1] }"#,
    )
    .unwrap();
    let submission = survey.process_submission(&answers).unwrap();

    assert_eq!(
        submission.get("side_effects"),
        Some(&ResponseValue::Choices(vec![1]))
    );
    assert_eq!(submission.get("photo").map(ToString::to_string).as_deref(), Some("SKIPPED"));
}

#[test]
fn test_load_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(MEDICATION.as_bytes()).unwrap();

    let survey = Survey::from_path(file.path()).unwrap();
    assert_eq!(survey.id(), "medication");
    assert_eq!(survey.len(), 4);
}

#[test]
fn test_saved_document_reloads() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("medication.json");

    let survey = Survey::from_json(MEDICATION).unwrap();
    survey.save(&path).unwrap();

    let document: SurveyDocument =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(document, survey.to_document());
    assert_eq!(
        document.items[2].condition.as_deref(),
        Some("took_dose == 1 AND hours_ago <= 6")
    );
}

#[test]
fn test_invalid_condition_in_document() {
    let json = r#"{
        "id": "s",
        "items": [
            { "id": "a", "prompt_type": "number", "min": 0, "max": 10 },
            { "id": "b", "prompt_type": "text", "condition": "a == 11" }
        ]
    }"#;
    let err = Survey::from_json(json).unwrap_err();
    assert!(matches!(
        err,
        SchemaError::Condition {
            source: ConditionExecutorError::OutOfRange { value: 11, .. },
            ..
        }
    ));
}

#[test]
fn test_unparseable_condition_in_document() {
    let json = r#"{
        "id": "s",
        "items": [
            { "id": "a", "prompt_type": "number", "min": 0, "max": 10 },
            { "id": "b", "prompt_type": "text", "condition": "(a == 1" }
        ]
    }"#;
    let err = Survey::from_json(json).unwrap_err();
    assert_eq!(err.item(), Some("b"));
}

#[test]
fn test_duplicate_choice_keys() {
    let json = r#"{
        "id": "s",
        "items": [
            { "id": "a", "prompt_type": "single_choice",
              "choices": [{ "key": 0, "label": "x" }, { "key": 0, "label": "y" }] }
        ]
    }"#;
    assert!(matches!(
        Survey::from_json(json),
        Err(SchemaError::InvalidPrompt { .. })
    ));
}
