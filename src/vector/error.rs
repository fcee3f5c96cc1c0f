use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VectorError {
    #[error("row {row} has dimension {actual}, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("buffer of {len} values does not hold {rows} rows of dimension {dim}")]
    ShapeMismatch { len: usize, rows: usize, dim: usize },
}
