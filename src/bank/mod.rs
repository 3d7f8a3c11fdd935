//! Training and prediction over a bank of per-label premise
//! classifiers sharing one model store.

use thiserror::Error;

use crate::frame::FrameError;
use crate::store::StoreError;

mod predict;
mod train;

pub use predict::predict;
pub use train::train;

/// Name of the shared free-text column consumed by the bank.
pub const TEXT_COLUMN: &str = "Premise";

/// Key under which the averaged validation score is reported.
pub const AVG_F1_KEY: &str = "avg-f1-score";

/// Errors surfaced by bank training and prediction.
#[derive(Debug, Error)]
pub enum BankError {
    /// Frame column access failed.
    #[error(transparent)]
    Frame(#[from] FrameError),
    /// Model store I/O or decoding failed.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// A per-label pipeline failed to fit.
    #[error("failed to fit pipeline for label \"{label}\": {reason}")]
    Fit { label: String, reason: String },
}
