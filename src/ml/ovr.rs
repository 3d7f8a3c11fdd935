//! One-vs-rest reduction over binary linear classifiers.

use serde::{Deserialize, Serialize};

use crate::ml::linear::{LinearSvcModel, LinearSvcOptions, train_linear_svc};
use crate::ml::tfidf::SparseRow;

/// One-vs-rest ensemble of binary linear classifiers.
///
/// Two distinct target values collapse to a single underlying
/// estimator; more than two produce one estimator per class with
/// argmax prediction over decision values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OvrModel {
    /// Distinct target values, ascending.
    pub classes: Vec<i64>,
    /// One estimator for the binary case, `classes.len()` otherwise.
    pub estimators: Vec<LinearSvcModel>,
}

impl OvrModel {
    /// Predict the target value for one row.
    pub fn predict(&self, row: &SparseRow) -> i64 {
        if self.classes.len() == 2 {
            self.estimators[0].predict(row)
        } else {
            let mut best = 0usize;
            let mut best_value = f32::NEG_INFINITY;
            for (idx, estimator) in self.estimators.iter().enumerate() {
                let value = estimator.decision_function(row);
                if value > best_value {
                    best_value = value;
                    best = idx;
                }
            }
            self.classes[best]
        }
    }

    /// Validate structural invariants of the ensemble.
    pub fn validate(&self) -> Result<(), String> {
        if self.classes.len() < 2 {
            return Err("Ensemble must cover at least 2 classes".to_string());
        }
        if self.classes.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err("Ensemble classes must be distinct and ascending".to_string());
        }
        let expected = if self.classes.len() == 2 {
            1
        } else {
            self.classes.len()
        };
        if self.estimators.len() != expected {
            return Err(format!(
                "Ensemble holds {} estimators but expected {expected}",
                self.estimators.len()
            ));
        }
        for estimator in &self.estimators {
            estimator.validate()?;
        }
        Ok(())
    }
}

/// Fit a one-vs-rest ensemble over arbitrary target values.
pub fn train_ovr(
    rows: &[SparseRow],
    targets: &[i64],
    n_features: usize,
    options: &LinearSvcOptions,
) -> Result<OvrModel, String> {
    let mut classes: Vec<i64> = targets.to_vec();
    classes.sort_unstable();
    classes.dedup();
    match classes.len() {
        0 | 1 => Err(format!(
            "Need at least 2 target classes, found {}",
            classes.len()
        )),
        2 => {
            let estimator = train_linear_svc(rows, targets, n_features, options)?;
            Ok(OvrModel {
                classes,
                estimators: vec![estimator],
            })
        }
        _ => {
            let mut estimators = Vec::with_capacity(classes.len());
            for &class in &classes {
                let binary: Vec<i64> = targets
                    .iter()
                    .map(|&target| i64::from(target == class))
                    .collect();
                estimators.push(train_linear_svc(rows, &binary, n_features, options)?);
            }
            Ok(OvrModel { classes, estimators })
        }
    }
}
