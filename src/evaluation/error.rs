use std::path::PathBuf;
use thiserror::Error;

use crate::engine::EngineError;

#[derive(Debug, Error)]
pub enum EvaluationError {
    #[error("dataset not found: {path}")]
    NotFound { path: PathBuf },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("dataset is missing required column '{column}'")]
    MissingColumn { column: &'static str },

    #[error("recommendation failed for query '{query}': {source}")]
    Engine {
        query: String,
        #[source]
        source: EngineError,
    },
}

pub type EvaluationResult<T> = Result<T, EvaluationError>;
