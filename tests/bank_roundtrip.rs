//! End-to-end tests for the classifier bank and its model store.

use std::fs::OpenOptions;
use std::path::PathBuf;

use tempfile::TempDir;

use labelbank::bank::{self, AVG_F1_KEY, BankError};
use labelbank::frame::{Column, Frame};
use labelbank::ml::metrics::round2;
use labelbank::ml::pipeline::{PipelineOptions, train_pipeline};
use labelbank::store::{StoreError, StoreReader, StoreWriter, write_record};

fn premises() -> Vec<String> {
    [
        "universal healthcare protects vulnerable families",
        "public hospitals need stable funding",
        "lower taxes accelerate business growth",
        "free markets reward productive investment",
        "strong encryption keeps personal data private",
        "surveillance programs erode citizen privacy",
    ]
    .iter()
    .map(|premise| premise.to_string())
    .collect()
}

fn labeled_frame() -> Frame {
    Frame::from_columns([
        ("Premise".to_string(), Column::Text(premises())),
        ("welfare".to_string(), Column::Values(vec![1, 1, 0, 0, 0, 0])),
        ("economy".to_string(), Column::Values(vec![0, 0, 1, 1, 0, 0])),
        ("privacy".to_string(), Column::Values(vec![0, 0, 0, 0, 1, 1])),
    ])
    .unwrap()
}

fn labels() -> Vec<String> {
    vec![
        "welfare".to_string(),
        "economy".to_string(),
        "privacy".to_string(),
    ]
}

fn store_path(dir: &TempDir) -> PathBuf {
    dir.path().join("bank.models")
}

#[test]
fn train_without_validation_returns_none() {
    let dir = tempfile::tempdir().unwrap();
    let path = store_path(&dir);
    let report = bank::train(&labeled_frame(), &labels(), &path, None).unwrap();
    assert!(report.is_none());
    assert!(std::fs::metadata(&path).unwrap().len() > 0);
}

#[test]
fn train_with_validation_reports_per_label_and_average() {
    let _ = labelbank::logging::init();
    let dir = tempfile::tempdir().unwrap();
    let path = store_path(&dir);
    let frame = labeled_frame();
    let report = bank::train(&frame, &labels(), &path, Some(&frame))
        .unwrap()
        .unwrap();

    assert_eq!(report.len(), labels().len() + 1);
    let mut label_scores = Vec::new();
    for label in labels() {
        let score = *report.get(&label).unwrap();
        assert!((0.0..=1.0).contains(&score));
        label_scores.push(score);
    }
    let expected_average =
        round2(label_scores.iter().sum::<f32>() / label_scores.len() as f32);
    assert_eq!(*report.get(AVG_F1_KEY).unwrap(), expected_average);
}

#[test]
fn predict_returns_label_columns_in_order_with_input_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = store_path(&dir);
    bank::train(&labeled_frame(), &labels(), &path, None).unwrap();

    let input = Frame::from_columns([(
        "Premise".to_string(),
        Column::Text(vec![
            "hospitals protect vulnerable families".to_string(),
            "taxes shape business investment".to_string(),
            "encryption keeps data private".to_string(),
            "unrelated premise text".to_string(),
        ]),
    )])
    .unwrap();

    let output = bank::predict(&input, &labels(), &path).unwrap();
    assert_eq!(
        output.column_names().collect::<Vec<_>>(),
        vec!["welfare", "economy", "privacy"]
    );
    assert_eq!(output.n_rows(), input.n_rows());
    for label in labels() {
        assert_eq!(output.values(&label).unwrap().len(), input.n_rows());
    }
}

#[test]
fn predict_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = store_path(&dir);
    let frame = labeled_frame();
    bank::train(&frame, &labels(), &path, None).unwrap();

    let first = bank::predict(&frame, &labels(), &path).unwrap();
    let second = bank::predict(&frame, &labels(), &path).unwrap();
    assert_eq!(first, second);
}

#[test]
fn short_store_yields_fewer_columns_than_labels() {
    let dir = tempfile::tempdir().unwrap();
    let path = store_path(&dir);
    let trained = &labels()[..2];
    bank::train(&labeled_frame(), trained, &path, None).unwrap();

    let output = bank::predict(&labeled_frame(), &labels(), &path).unwrap();
    assert_eq!(
        output.column_names().collect::<Vec<_>>(),
        vec!["welfare", "economy"]
    );
}

#[test]
fn foreign_record_fails_closed_with_no_partial_result() {
    let dir = tempfile::tempdir().unwrap();
    let path = store_path(&dir);
    bank::train(&labeled_frame(), &labels()[..1], &path, None).unwrap();

    let mut file = OpenOptions::new().append(true).open(&path).unwrap();
    write_record(&mut file, 7, b"just a string").unwrap();

    let result = bank::predict(&labeled_frame(), &labels(), &path);
    assert!(matches!(
        result,
        Err(BankError::Store(StoreError::UntrustedRecord(7)))
    ));
}

#[test]
fn stored_models_reproduce_pretrain_predictions() {
    let dir = tempfile::tempdir().unwrap();
    let path = store_path(&dir);
    let frame = labeled_frame();
    let texts = frame.text("Premise").unwrap();
    let options = PipelineOptions::default();

    let welfare = train_pipeline(texts, frame.values("welfare").unwrap(), &options).unwrap();
    let privacy = train_pipeline(texts, frame.values("privacy").unwrap(), &options).unwrap();

    let mut writer = StoreWriter::create(&path).unwrap();
    writer.append(&welfare).unwrap();
    writer.append(&privacy).unwrap();
    writer.finish().unwrap();

    let probe = premises();
    let restored: Vec<_> = StoreReader::open(&path)
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(restored.len(), 2);
    assert_eq!(restored[0].predict(&probe), welfare.predict(&probe));
    assert_eq!(restored[1].predict(&probe), privacy.predict(&probe));
}
