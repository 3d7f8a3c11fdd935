//! Per-label training loop streaming fitted pipelines into the store.

use std::collections::BTreeMap;
use std::path::Path;

use tracing::info;

use crate::bank::{AVG_F1_KEY, BankError, TEXT_COLUMN};
use crate::frame::Frame;
use crate::ml::metrics::{f1_score, mean_scores, round2};
use crate::ml::pipeline::{PipelineOptions, train_pipeline};
use crate::store::StoreWriter;

/// Train one binary classifier per label and stream each fitted
/// pipeline into the store at `store_path`, in label order.
///
/// Any existing store content is truncated first. The store is not
/// transactional: a failure partway through leaves a store holding
/// fewer models than labels.
///
/// When `validation` is supplied the returned report holds one
/// rounded F1 score per label plus their mean under `avg-f1-score`;
/// `None` signals that no scoring was performed.
pub fn train(
    train_frame: &Frame,
    labels: &[String],
    store_path: &Path,
    validation: Option<&Frame>,
) -> Result<Option<BTreeMap<String, f32>>, BankError> {
    let train_texts = train_frame.text(TEXT_COLUMN)?;
    let validation = match validation {
        Some(frame) => Some((frame, frame.text(TEXT_COLUMN)?)),
        None => None,
    };
    let mut scores: BTreeMap<String, f32> = BTreeMap::new();

    let mut writer = StoreWriter::create(store_path)?;
    for label in labels {
        let targets = train_frame.values(label)?;
        let options = PipelineOptions::default();
        let model = train_pipeline(train_texts, targets, &options).map_err(|reason| {
            BankError::Fit {
                label: label.clone(),
                reason,
            }
        })?;
        if let Some((validation_frame, validation_texts)) = validation {
            let truth = validation_frame.values(label)?;
            let predicted = model.predict(validation_texts);
            let score = round2(f1_score(truth, &predicted));
            scores.insert(label.clone(), score);
            info!(label = %label, f1 = score, "fitted pipeline");
        } else {
            info!(label = %label, "fitted pipeline");
        }
        writer.append(&model)?;
    }
    writer.finish()?;

    if validation.is_some() {
        let average = round2(mean_scores(&scores));
        scores.insert(AVG_F1_KEY.to_string(), average);
        info!(labels = labels.len(), avg_f1 = average, "training complete");
        Ok(Some(scores))
    } else {
        info!(labels = labels.len(), "training complete");
        Ok(None)
    }
}
