//! Two-stage text-classification pipeline: TF-IDF features feeding a
//! one-vs-rest linear classifier.

use serde::{Deserialize, Serialize};

use crate::ml::linear::LinearSvcOptions;
use crate::ml::ovr::{OvrModel, train_ovr};
use crate::ml::tfidf::TfidfModel;

/// Model format version written into serialized pipelines.
pub const PIPELINE_VERSION: i64 = 1;

/// Options for fitting one pipeline.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Options forwarded to each underlying classifier.
    pub svc: LinearSvcOptions,
}

impl Default for PipelineOptions {
    /// The bank's fixed parameterization: class-balanced hinge loss,
    /// C = 18, at most 10_000 epochs.
    fn default() -> Self {
        Self {
            svc: LinearSvcOptions {
                penalty_c: 18.0,
                max_iter: 10_000,
                balance_classes: true,
                ..LinearSvcOptions::default()
            },
        }
    }
}

/// Serialized bundle of a fitted vectorizer and classifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineModel {
    /// Model format version.
    pub model_version: i64,
    /// Fitted text-feature extraction stage.
    pub tfidf: TfidfModel,
    /// Fitted classification stage.
    pub clf: OvrModel,
}

impl PipelineModel {
    /// Predict one target value per input text.
    pub fn predict(&self, texts: &[String]) -> Vec<i64> {
        texts
            .iter()
            .map(|text| self.clf.predict(&self.tfidf.transform(text)))
            .collect()
    }

    /// Validate structural invariants of the model.
    pub fn validate(&self) -> Result<(), String> {
        self.tfidf.validate()?;
        self.clf.validate()?;
        for estimator in &self.clf.estimators {
            if estimator.weights.len() != self.tfidf.n_features() {
                return Err("classifier weight length does not match feature count".to_string());
            }
        }
        Ok(())
    }
}

/// Fit a fresh pipeline on raw texts and their target values.
pub fn train_pipeline(
    texts: &[String],
    targets: &[i64],
    options: &PipelineOptions,
) -> Result<PipelineModel, String> {
    if texts.len() != targets.len() {
        return Err("Mismatched texts/targets".to_string());
    }
    let tfidf = TfidfModel::fit(texts);
    let rows = tfidf.transform_all(texts);
    let clf = train_ovr(&rows, targets, tfidf.n_features(), &options.svc)?;
    let model = PipelineModel {
        model_version: PIPELINE_VERSION,
        tfidf,
        clf,
    };
    model.validate()?;
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn training_texts() -> (Vec<String>, Vec<i64>) {
        let texts = vec![
            "great fantastic wonderful".to_string(),
            "awesome brilliant superb".to_string(),
            "terrible awful horrid".to_string(),
            "dreadful rotten nasty".to_string(),
        ];
        let targets = vec![1, 1, 0, 0];
        (texts, targets)
    }

    #[test]
    fn default_options_match_the_bank_parameterization() {
        let options = PipelineOptions::default();
        assert_eq!(options.svc.penalty_c, 18.0);
        assert_eq!(options.svc.max_iter, 10_000);
        assert!(options.svc.balance_classes);
    }

    #[test]
    fn fits_and_separates_simple_texts() {
        let (texts, targets) = training_texts();
        let model = train_pipeline(&texts, &targets, &PipelineOptions::default()).unwrap();
        model.validate().unwrap();
        let probe = vec![
            "fantastic brilliant".to_string(),
            "awful rotten".to_string(),
        ];
        assert_eq!(model.predict(&probe), vec![1, 0]);
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        let (texts, _) = training_texts();
        let result = train_pipeline(&texts, &[1, 0], &PipelineOptions::default());
        assert!(result.is_err());
    }
}
