use std::collections::HashSet;

use crate::catalog::Catalog;
use crate::vector::Candidate;

use super::intent::Intent;

/// Bucket a catalog row falls into for balancing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Technical,
    Behavioral,
    Other,
}

impl Category {
    /// Case-insensitive prefix match on the row's `type`.
    pub fn of(assessment_type: &str) -> Self {
        let normalized = assessment_type.trim_start().to_lowercase();
        if normalized.starts_with("knowledge") {
            Category::Technical
        } else if normalized.starts_with("personality") {
            Category::Behavioral
        } else {
            Category::Other
        }
    }
}

/// Cuts `candidates` (already in similarity order) to `top_k`, mixing categories when the
/// intent is ambiguous.
///
/// For [`Intent::Both`] the result starts with up to `min_each` technical rows, then up to
/// `min_each` behavioral rows, then the remaining candidates in their original order. A row
/// index never appears twice. Candidates whose index is outside `catalog` count as
/// [`Category::Other`].
pub fn balance(
    intent: Intent,
    candidates: &[Candidate],
    catalog: &Catalog,
    top_k: usize,
    min_each: usize,
) -> Vec<Candidate> {
    if !intent.is_both() {
        return candidates.iter().take(top_k).copied().collect();
    }

    let category = |candidate: &Candidate| {
        catalog
            .get(candidate.index)
            .map(|row| Category::of(&row.assessment_type))
            .unwrap_or(Category::Other)
    };

    let technical = candidates
        .iter()
        .filter(|c| category(c) == Category::Technical)
        .take(min_each);
    let behavioral = candidates
        .iter()
        .filter(|c| category(c) == Category::Behavioral)
        .take(min_each);

    let mut seen = HashSet::with_capacity(candidates.len());
    let mut selected = Vec::with_capacity(top_k.min(candidates.len()));

    for candidate in technical.chain(behavioral).chain(candidates.iter()) {
        if selected.len() >= top_k {
            break;
        }
        if seen.insert(candidate.index) {
            selected.push(*candidate);
        }
    }

    selected
}
