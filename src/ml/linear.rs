//! Binary linear support vector classifier.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng, seq::SliceRandom};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::ml::tfidf::SparseRow;

/// Training options for the hinge-loss classifier.
#[derive(Debug, Clone)]
pub struct LinearSvcOptions {
    /// Inverse regularization strength.
    pub penalty_c: f32,
    /// Step size for subgradient updates.
    pub learning_rate: f32,
    /// Hard cap on training epochs.
    pub max_iter: usize,
    /// Stop once the largest update in an epoch drops below this.
    pub tol: f32,
    /// Weight samples inversely to their class frequency.
    pub balance_classes: bool,
    /// RNG seed for shuffling and weight initialization.
    pub seed: u64,
}

impl Default for LinearSvcOptions {
    fn default() -> Self {
        Self {
            penalty_c: 1.0,
            learning_rate: 0.1,
            max_iter: 1000,
            tol: 1e-4,
            balance_classes: false,
            seed: 42,
        }
    }
}

/// Fitted binary linear classifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearSvcModel {
    /// Dense weight vector over the feature space.
    pub weights: Vec<f32>,
    /// Intercept.
    pub bias: f32,
    /// The two target values, ascending; a positive decision value
    /// predicts `classes[1]`.
    pub classes: [i64; 2],
}

impl LinearSvcModel {
    /// Signed distance from the separating hyperplane.
    pub fn decision_function(&self, row: &SparseRow) -> f32 {
        sparse_dot(&self.weights, row) + self.bias
    }

    /// Predict the target value for one row.
    pub fn predict(&self, row: &SparseRow) -> i64 {
        if self.decision_function(row) > 0.0 {
            self.classes[1]
        } else {
            self.classes[0]
        }
    }

    /// Validate structural invariants of the model.
    pub fn validate(&self) -> Result<(), String> {
        if self.classes[0] >= self.classes[1] {
            return Err("classes must be two distinct values in ascending order".to_string());
        }
        if !self.bias.is_finite() {
            return Err("bias must be finite".to_string());
        }
        if self.weights.iter().any(|weight| !weight.is_finite()) {
            return Err("weights must be finite".to_string());
        }
        Ok(())
    }
}

/// Fit a binary classifier with hinge-loss subgradient descent.
///
/// Training stops early once an entire epoch makes no update larger
/// than `tol`; hitting `max_iter` first logs a warning and keeps the
/// model as-is.
pub fn train_linear_svc(
    rows: &[SparseRow],
    targets: &[i64],
    n_features: usize,
    options: &LinearSvcOptions,
) -> Result<LinearSvcModel, String> {
    if rows.is_empty() {
        return Err("Empty training set".to_string());
    }
    if rows.len() != targets.len() {
        return Err("Mismatched training rows/targets".to_string());
    }
    for row in rows {
        if row.iter().any(|&(index, _)| index as usize >= n_features) {
            return Err(format!("Feature index out of range (max {n_features})"));
        }
    }
    let mut distinct: Vec<i64> = targets.to_vec();
    distinct.sort_unstable();
    distinct.dedup();
    if distinct.len() != 2 {
        return Err(format!(
            "Expected exactly 2 target classes, found {}",
            distinct.len()
        ));
    }
    let classes = [distinct[0], distinct[1]];
    let signs: Vec<f32> = targets
        .iter()
        .map(|&target| if target == classes[1] { 1.0 } else { -1.0 })
        .collect();

    let sample_weights: Vec<f32> = if options.balance_classes {
        let total = rows.len() as f32;
        let n_pos = signs.iter().filter(|&&sign| sign > 0.0).count() as f32;
        let n_neg = total - n_pos;
        signs
            .iter()
            .map(|&sign| {
                if sign > 0.0 {
                    total / (2.0 * n_pos)
                } else {
                    total / (2.0 * n_neg)
                }
            })
            .collect()
    } else {
        vec![1.0; rows.len()]
    };

    let mut rng = StdRng::seed_from_u64(options.seed);
    let mut weights = vec![0.0f32; n_features];
    for weight in &mut weights {
        *weight = (rng.random::<f32>() - 0.5) * 0.01;
    }
    let mut bias = 0.0f32;
    let mut indices: Vec<usize> = (0..rows.len()).collect();
    let lr = options.learning_rate;
    // L2 shrinkage once per epoch, scaled by 1/C.
    let shrink = 1.0 - lr / options.penalty_c.max(f32::EPSILON);
    let mut converged = false;

    for _epoch in 0..options.max_iter {
        indices.shuffle(&mut rng);
        let mut max_update = 0.0f32;
        for &idx in &indices {
            let row = &rows[idx];
            let margin = signs[idx] * (sparse_dot(&weights, row) + bias);
            if margin < 1.0 {
                let step = lr * sample_weights[idx] * signs[idx];
                for &(index, value) in row {
                    weights[index as usize] += step * value;
                    max_update = max_update.max((step * value).abs());
                }
                bias += step;
                max_update = max_update.max(step.abs());
            }
        }
        if max_update < options.tol {
            converged = true;
            break;
        }
        if shrink > 0.0 {
            for weight in &mut weights {
                *weight *= shrink;
            }
        }
    }
    if !converged {
        warn!(
            max_iter = options.max_iter,
            "hinge-loss descent stopped at the iteration cap without converging"
        );
    }

    let model = LinearSvcModel {
        weights,
        bias,
        classes,
    };
    model.validate()?;
    Ok(model)
}

fn sparse_dot(weights: &[f32], row: &SparseRow) -> f32 {
    row.iter()
        .map(|&(index, value)| weights.get(index as usize).copied().unwrap_or(0.0) * value)
        .sum()
}
