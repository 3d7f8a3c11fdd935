//! Prediction over every stored pipeline, assembled per label.

use std::path::Path;

use crate::bank::{BankError, TEXT_COLUMN};
use crate::frame::{Column, Frame};
use crate::store::StoreReader;

/// Classify `frame`'s text column with the models stored at
/// `store_path`, pairing the i-th stored model with the i-th label.
///
/// The output frame holds one value column per produced label, in
/// `labels` order, row-aligned with `frame`. A store holding fewer
/// models than labels yields fewer columns; surplus stored models are
/// never read. Any malformed or foreign record aborts the whole
/// prediction with no partial result.
pub fn predict(frame: &Frame, labels: &[String], store_path: &Path) -> Result<Frame, BankError> {
    let texts = frame.text(TEXT_COLUMN)?;
    let reader = StoreReader::open(store_path)?;

    let mut output = Frame::new();
    for (label, model) in labels.iter().zip(reader) {
        let model = model?;
        let predicted = model.predict(texts);
        output.push_column(label.clone(), Column::Values(predicted))?;
    }
    Ok(output)
}
