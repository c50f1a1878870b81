use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Failure taxonomy for the whole toolkit. `Connect` aborts a generation
/// run before any sampling; `Solver` is recoverable per iteration and turns
/// into a skipped sample; the dataset and model variants are fatal only for
/// the operation that raised them.
#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot reach solver: {0}")]
    Connect(String),

    #[error("bound spec: {0}")]
    Bounds(String),

    #[error("solver evaluation failed: {0}")]
    Solver(String),

    #[error("dataset not found at {0}")]
    DatasetMissing(PathBuf),

    #[error("dataset {path}: {detail}")]
    Dataset { path: PathBuf, detail: String },

    #[error("need at least {needed} usable samples to train, found {found}")]
    InsufficientData { found: usize, needed: usize },

    #[error("model not found at {0}; train one first")]
    ModelMissing(PathBuf),

    #[error("model training failed: {0}")]
    Training(String),

    #[error("model artifact: {0}")]
    ModelCodec(#[from] bincode::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
