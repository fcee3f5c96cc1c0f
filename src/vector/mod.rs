//! Dense vector math: L2 normalization, the catalog embedding matrix, and top-N search.
//!
//! Every score produced here is a plain dot product. Callers are expected to normalize both
//! operands first, at which point the dot product is exactly the cosine similarity.

mod error;
/// Row-major catalog embedding matrix.
pub mod matrix;
/// Top-N selection over a normalized matrix.
pub mod search;


pub use error::VectorError;
pub use matrix::EmbeddingMatrix;
pub use search::{Candidate, top_n};

use crate::constants::NORM_EPSILON;

/// Returns `v / (‖v‖₂ + ε)`.
pub fn normalize(v: &[f32]) -> Vec<f32> {
    let mut out = v.to_vec();
    normalize_in_place(&mut out);
    out
}

/// Normalizes `v` in place (zero vectors stay zero).
#[inline]
pub fn normalize_in_place(v: &mut [f32]) {
    let denom = l2_norm(v) + NORM_EPSILON;
    for x in v.iter_mut() {
        *x /= denom;
    }
}

#[inline]
pub fn l2_norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

/// Dot product over the common prefix of `a` and `b`.
#[inline]
pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// Cosine similarity of two unnormalized vectors (`0.0` for empty, mismatched or zero input).
#[inline]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let (dot, norm_a_sq, norm_b_sq) =
        a.iter()
            .zip(b.iter())
            .fold((0.0f32, 0.0f32, 0.0f32), |(dot, na, nb), (av, bv)| {
                (dot + av * bv, na + av * av, nb + bv * bv)
            });

    let norm_a = norm_a_sq.sqrt();
    let norm_b = norm_b_sq.sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}
