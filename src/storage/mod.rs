//! Persisted catalog embeddings.
//!
//! # File Layout
//!
//! Little-endian, no padding:
//!
//! | offset | size | field |
//! |---|---|---|
//! | 0 | 8 | magic `RECEMB01` |
//! | 8 | 8 | `u64` rows |
//! | 16 | 8 | `u64` dim |
//! | 24 | `rows * dim * 4` | `f32` values, row-major |
//!
//! Rows are aligned 1:1 with catalog rows. The file stores raw (unnormalized) provider output.

/// Embedding cache error types.
pub mod error;


pub use error::{EmbeddingStoreError, StoreResult};

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use memmap2::Mmap;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::constants::DimConfig;
use crate::vector::EmbeddingMatrix;

pub const MAGIC: &[u8; 8] = b"RECEMB01";

pub const HEADER_LEN: usize = 24;

#[derive(Debug, Clone)]
/// Reads and atomically writes the catalog embedding matrix.
pub struct EmbeddingStore {
    path: PathBuf,
}

impl EmbeddingStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns `true` if a cache file is present.
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Loads the matrix, or `None` if no cache file exists yet.
    pub fn load(&self) -> StoreResult<Option<EmbeddingMatrix>> {
        if !self.exists() {
            debug!(path = %self.path.display(), "No embedding cache on disk");
            return Ok(None);
        }

        let file = File::open(&self.path)?;
        let actual = file.metadata()?.len();
        if actual < HEADER_LEN as u64 {
            return Err(EmbeddingStoreError::SizeMismatch {
                path: self.path.clone(),
                expected: HEADER_LEN as u64,
                actual,
            });
        }

        // SAFETY: the map is read-only and dropped before this function returns; the cache file
        // is only ever replaced by rename, never rewritten in place.
        let mmap = unsafe { Mmap::map(&file)? };
        let matrix = decode(&mmap, &self.path)?;

        info!(
            path = %self.path.display(),
            rows = matrix.rows(),
            dim = matrix.dim(),
            "Embedding cache loaded"
        );

        Ok(Some(matrix))
    }

    /// Writes `matrix` to a temp file next to the target, fsyncs, then renames over it.
    pub fn store(&self, matrix: &EmbeddingMatrix) -> StoreResult<()> {
        let parent = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            Some(_) => PathBuf::from("."),
            None => {
                return Err(EmbeddingStoreError::StorageUnavailable {
                    path: self.path.clone(),
                });
            }
        };
        fs::create_dir_all(&parent)?;

        let bytes = encode(matrix);

        let mut temp = NamedTempFile::new_in(&parent)?;
        temp.write_all(&bytes)?;
        temp.as_file().sync_all()?;
        temp.persist(&self.path).map_err(|e| EmbeddingStoreError::Io(e.error))?;

        info!(
            path = %self.path.display(),
            rows = matrix.rows(),
            dim = matrix.dim(),
            bytes = bytes.len(),
            "Embedding cache written"
        );

        Ok(())
    }

    /// Deletes the cache file; returns whether one existed.
    pub fn remove(&self) -> StoreResult<bool> {
        if !self.exists() {
            return Ok(false);
        }
        fs::remove_file(&self.path)?;
        Ok(true)
    }
}

/// Serializes a matrix into the cache layout.
pub fn encode(matrix: &EmbeddingMatrix) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(HEADER_LEN + matrix.as_slice().len() * size_of::<f32>());
    bytes.extend_from_slice(MAGIC);
    bytes.extend_from_slice(&(matrix.rows() as u64).to_le_bytes());
    bytes.extend_from_slice(&(matrix.dim() as u64).to_le_bytes());
    for value in matrix.as_slice() {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    bytes
}

/// Parses the cache layout; `path` is only used for error context.
pub fn decode(bytes: &[u8], path: &Path) -> StoreResult<EmbeddingMatrix> {
    if bytes.len() < HEADER_LEN {
        return Err(EmbeddingStoreError::SizeMismatch {
            path: path.to_path_buf(),
            expected: HEADER_LEN as u64,
            actual: bytes.len() as u64,
        });
    }

    if &bytes[..8] != MAGIC {
        return Err(EmbeddingStoreError::BadMagic {
            path: path.to_path_buf(),
        });
    }

    let rows = read_u64(&bytes[8..16]);
    let dim = read_u64(&bytes[16..24]);

    let invalid = |reason: &str| EmbeddingStoreError::InvalidHeader {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    };

    let rows = usize::try_from(rows).map_err(|_| invalid("row count overflows usize"))?;
    let dim = usize::try_from(dim).map_err(|_| invalid("dimension overflows usize"))?;
    if rows > 0 {
        DimConfig::new(dim)
            .validate()
            .map_err(|e| invalid(&e.to_string()))?;
    }

    let payload = rows
        .checked_mul(DimConfig::new(dim).f32_bytes())
        .ok_or_else(|| invalid("payload size overflows usize"))?;

    let expected = HEADER_LEN as u64 + payload as u64;
    if bytes.len() as u64 != expected {
        return Err(EmbeddingStoreError::SizeMismatch {
            path: path.to_path_buf(),
            expected,
            actual: bytes.len() as u64,
        });
    }

    let data: Vec<f32> = bytes[HEADER_LEN..]
        .chunks_exact(size_of::<f32>())
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect();

    EmbeddingMatrix::new(rows, dim, data).map_err(|e| invalid(&e.to_string()))
}

fn read_u64(bytes: &[u8]) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(bytes);
    u64::from_le_bytes(buf)
}
