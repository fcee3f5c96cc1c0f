use super::error::VectorError;
use super::{dot, normalize_in_place};

/// Catalog embeddings, one `dim`-wide row per catalog entry, stored row-major as `f32`.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingMatrix {
    data: Vec<f32>,
    rows: usize,
    dim: usize,
}

impl EmbeddingMatrix {
    /// Wraps a row-major buffer; `data.len()` must equal `rows * dim`.
    pub fn new(rows: usize, dim: usize, data: Vec<f32>) -> Result<Self, VectorError> {
        if rows.checked_mul(dim) != Some(data.len()) {
            return Err(VectorError::ShapeMismatch {
                len: data.len(),
                rows,
                dim,
            });
        }
        Ok(Self { data, rows, dim })
    }

    /// Zero-row matrix with a fixed dimension.
    pub fn empty(dim: usize) -> Self {
        Self {
            data: Vec::new(),
            rows: 0,
            dim,
        }
    }

    /// Stacks per-row vectors, rejecting any row whose length differs from `dim`.
    pub fn from_rows(rows: Vec<Vec<f32>>, dim: usize) -> Result<Self, VectorError> {
        let mut data = Vec::with_capacity(rows.len() * dim);
        for (idx, row) in rows.iter().enumerate() {
            if row.len() != dim {
                return Err(VectorError::RaggedRow {
                    row: idx,
                    expected: dim,
                    actual: row.len(),
                });
            }
            data.extend_from_slice(row);
        }
        Ok(Self {
            rows: rows.len(),
            dim,
            data,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    pub fn row(&self, index: usize) -> Option<&[f32]> {
        if index >= self.rows {
            return None;
        }
        let start = index * self.dim;
        Some(&self.data[start..start + self.dim])
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = &[f32]> {
        // chunks_exact panics on a zero chunk size
        self.data.chunks_exact(self.dim.max(1)).take(self.rows)
    }

    /// Raw row-major values.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// L2-normalizes every row independently.
    pub fn normalize_rows(&mut self) {
        if self.dim == 0 {
            return;
        }
        for row in self.data.chunks_exact_mut(self.dim) {
            normalize_in_place(row);
        }
    }

    /// Dot product of `query` against every row, in row order.
    pub fn scores(&self, query: &[f32]) -> Vec<f32> {
        self.iter_rows().map(|row| dot(row, query)).collect()
    }
}
