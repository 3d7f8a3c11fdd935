//! Validation metrics for binary classifiers.

use std::collections::BTreeMap;

/// Positive class value used by binary F1 scoring.
pub const POSITIVE_CLASS: i64 = 1;

/// Binary F1 score with a zero-division policy of zero.
///
/// A class absent from either side never raises; the affected ratio
/// contributes 0.0 instead.
pub fn f1_score(y_true: &[i64], y_pred: &[i64]) -> f32 {
    let mut tp = 0u32;
    let mut fp = 0u32;
    let mut fn_ = 0u32;
    for (&truth, &predicted) in y_true.iter().zip(y_pred) {
        match (truth == POSITIVE_CLASS, predicted == POSITIVE_CLASS) {
            (true, true) => tp += 1,
            (false, true) => fp += 1,
            (true, false) => fn_ += 1,
            (false, false) => {}
        }
    }
    let denominator = (2 * tp + fp + fn_) as f32;
    if denominator == 0.0 {
        0.0
    } else {
        2.0 * tp as f32 / denominator
    }
}

/// Round to two decimals.
pub fn round2(value: f32) -> f32 {
    (value * 100.0).round() / 100.0
}

/// Arithmetic mean of recorded scores.
///
/// An empty map is not defended against; the trainer always records at
/// least one score before averaging.
pub fn mean_scores(scores: &BTreeMap<String, f32>) -> f32 {
    scores.values().sum::<f32>() / scores.len() as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perfect_predictions_score_one() {
        let truth = [1, 0, 1, 0];
        assert_eq!(f1_score(&truth, &truth), 1.0);
    }

    #[test]
    fn inverted_predictions_score_zero() {
        let truth = [1, 0, 1, 0];
        let predicted = [0, 1, 0, 1];
        assert_eq!(f1_score(&truth, &predicted), 0.0);
    }

    #[test]
    fn absent_positive_class_scores_zero_instead_of_raising() {
        let truth = [0, 0, 0];
        let predicted = [0, 0, 0];
        assert_eq!(f1_score(&truth, &predicted), 0.0);
    }

    #[test]
    fn partial_overlap_scores_between_zero_and_one() {
        let truth = [1, 1, 0, 0];
        let predicted = [1, 0, 1, 0];
        // tp = 1, fp = 1, fn = 1.
        assert!((f1_score(&truth, &predicted) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn rounding_keeps_two_decimals() {
        assert_eq!(round2(0.666_666), 0.67);
        assert_eq!(round2(0.125), 0.13);
        assert_eq!(round2(1.0), 1.0);
    }

    #[test]
    fn mean_of_recorded_scores() {
        let mut scores = BTreeMap::new();
        scores.insert("a".to_string(), 0.80);
        scores.insert("b".to_string(), 0.60);
        assert_eq!(round2(mean_scores(&scores)), 0.70);
    }
}
