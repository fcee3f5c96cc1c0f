use std::cmp::Ordering;

/// A scored catalog row produced for a single query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    /// Index of the row in catalog order.
    pub index: usize,
    /// Cosine similarity to the query.
    pub score: f32,
}

impl Candidate {
    pub fn new(index: usize, score: f32) -> Self {
        Self { index, score }
    }
}

/// Score descending, then catalog order ascending.
///
/// `total_cmp` keeps this a total order even if a NaN slips in, which the selection and
/// sort routines below require.
#[inline]
fn rank_order(a: &Candidate, b: &Candidate) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.index.cmp(&b.index))
}

/// Returns the `n` highest-scoring rows, fully sorted.
///
/// Selection is a partial `select_nth_unstable_by`; only the selected prefix is sorted. Equal
/// scores keep catalog order because the row index is part of the comparison key.
pub fn top_n(scores: &[f32], n: usize) -> Vec<Candidate> {
    let n = n.min(scores.len());
    if n == 0 {
        return Vec::new();
    }

    let mut candidates: Vec<Candidate> = scores
        .iter()
        .enumerate()
        .map(|(index, &score)| Candidate::new(index, score))
        .collect();

    if n < candidates.len() {
        candidates.select_nth_unstable_by(n - 1, rank_order);
        candidates.truncate(n);
    }

    candidates.sort_unstable_by(rank_order);
    candidates
}
