use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog not found at path: {path}")]
    NotFound { path: PathBuf },

    #[error("failed to read catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse catalog CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to parse catalog JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("catalog is missing required column '{column}'")]
    MissingColumn { column: &'static str },

    #[error("catalog row {row} has no '{field}' field")]
    MissingField { row: usize, field: &'static str },
}

pub type CatalogResult<T> = Result<T, CatalogError>;
