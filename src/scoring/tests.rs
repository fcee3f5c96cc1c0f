use super::*;
use crate::catalog::{Catalog, CatalogRow};
use crate::embedding::MockEmbedder;
use crate::vector::Candidate;

fn row(name: &str, assessment_type: &str) -> CatalogRow {
    CatalogRow::new(name, format!("https://example.com/{name}"), "", assessment_type)
}

/// T1..T4 technical, B1..B2 behavioral, one untyped row.
fn mixed_catalog() -> Catalog {
    Catalog::new(vec![
        row("T1", "Knowledge & Skills"),
        row("T2", "Knowledge & Skills"),
        row("T3", "knowledge & skills"),
        row("T4", "Knowledge & Skills"),
        row("B1", "Personality & Behavior"),
        row("B2", "  PERSONALITY & Behavior"),
        row("O1", ""),
    ])
}

fn ranked(indices: &[usize]) -> Vec<Candidate> {
    indices
        .iter()
        .enumerate()
        .map(|(rank, &index)| Candidate::new(index, 1.0 - rank as f32 * 0.01))
        .collect()
}

fn indices(candidates: &[Candidate]) -> Vec<usize> {
    candidates.iter().map(|c| c.index).collect()
}

#[test]
fn test_margin_boundary_is_inclusive() {
    assert_eq!(classify_scores(0.0, 0.05), Intent::Both);
    assert_eq!(classify_scores(0.05, 0.0), Intent::Both);
    assert_eq!(classify_scores(0.0501, 0.0), Intent::Knowledge);
    assert_eq!(classify_scores(0.0, 0.0501), Intent::Personality);
}

#[test]
fn test_clear_winner() {
    assert_eq!(classify_scores(0.8, 0.2), Intent::Knowledge);
    assert_eq!(classify_scores(0.1, 0.6), Intent::Personality);
    assert_eq!(classify_scores(0.4, 0.4), Intent::Both);
}

#[test]
fn test_intent_labels() {
    assert_eq!(Intent::Knowledge.label(), Some(KNOWLEDGE_LABEL));
    assert_eq!(Intent::Personality.label(), Some(PERSONALITY_LABEL));
    assert_eq!(Intent::Both.label(), None);
    assert_eq!(Intent::Both.to_string(), "both");
}

#[test]
fn test_prototypes_are_normalized() {
    let prototypes = PrototypeVectors::new(&[3.0, 4.0], &[0.0, 2.0]);
    assert!((prototypes.technical()[0] - 0.6).abs() < 1e-6);
    assert!((prototypes.technical()[1] - 0.8).abs() < 1e-6);
    assert!((prototypes.behavioral()[1] - 1.0).abs() < 1e-6);
    assert_eq!(prototypes.dim(), 2);
}

#[test]
fn test_prototypes_classify() {
    let prototypes = PrototypeVectors::new(&[1.0, 0.0], &[0.0, 1.0]);
    assert_eq!(prototypes.classify(&[1.0, 0.0]), Intent::Knowledge);
    assert_eq!(prototypes.classify(&[0.0, 1.0]), Intent::Personality);
    let diagonal = crate::vector::normalize(&[1.0, 1.0]);
    assert_eq!(prototypes.classify(&diagonal), Intent::Both);
}

#[test]
fn test_prototypes_embed_uses_fixed_sentences() {
    let mock = MockEmbedder::new(2)
        .with_vector(TECHNICAL_PROTOTYPE, vec![2.0, 0.0])
        .with_vector(BEHAVIORAL_PROTOTYPE, vec![0.0, 5.0]);

    let prototypes = PrototypeVectors::embed(&mock).unwrap();
    assert_eq!(prototypes.technical(), &[1.0, 0.0]);
    assert_eq!(prototypes.behavioral(), &[0.0, 1.0]);
    assert_eq!(mock.call_count(), 2);
}

#[test]
fn test_prototypes_embed_propagates_failure() {
    let mock = MockEmbedder::new(2).failing();
    assert!(PrototypeVectors::embed(&mock).is_err());
}

#[test]
fn test_category_prefix_match() {
    assert_eq!(Category::of("Knowledge & Skills"), Category::Technical);
    assert_eq!(Category::of("  KNOWLEDGE"), Category::Technical);
    assert_eq!(Category::of("Personality & Behavior"), Category::Behavioral);
    assert_eq!(Category::of("Ability & Aptitude"), Category::Other);
    assert_eq!(Category::of(""), Category::Other);
}

#[test]
fn test_clear_intent_keeps_order() {
    let catalog = mixed_catalog();
    let candidates = ranked(&[0, 1, 2, 3, 4, 5]);

    let result = balance(Intent::Knowledge, &candidates, &catalog, 4, 3);
    assert_eq!(indices(&result), vec![0, 1, 2, 3]);

    let result = balance(Intent::Personality, &candidates, &catalog, 10, 3);
    assert_eq!(result, candidates);
}

#[test]
fn test_ambiguous_intent_mixes_categories() {
    let catalog = mixed_catalog();
    let candidates = ranked(&[0, 1, 2, 3, 4, 5]);

    let result = balance(Intent::Both, &candidates, &catalog, 6, 3);
    assert_eq!(indices(&result), vec![0, 1, 2, 4, 5, 3]);
}

#[test]
fn test_minimum_guarantee_pulls_low_ranked_rows() {
    let catalog = mixed_catalog();
    // Behavioral rows sit at the very end of the similarity order.
    let candidates = ranked(&[0, 1, 2, 3, 6, 4, 5]);

    let result = balance(Intent::Both, &candidates, &catalog, 5, 2);
    assert_eq!(indices(&result), vec![0, 1, 4, 5, 2]);
}

#[test]
fn test_short_category_is_filled_from_original_order() {
    let catalog = mixed_catalog();
    let candidates = ranked(&[6, 4, 0]);

    let result = balance(Intent::Both, &candidates, &catalog, 3, 3);
    assert_eq!(indices(&result), vec![0, 4, 6]);
}

#[test]
fn test_no_duplicates_and_bounded() {
    let catalog = mixed_catalog();
    let candidates = ranked(&[4, 0, 5, 1, 6, 2, 3]);

    for top_k in 0..10 {
        let result = balance(Intent::Both, &candidates, &catalog, top_k, 3);
        assert_eq!(result.len(), top_k.min(candidates.len()));

        let mut seen = std::collections::HashSet::new();
        assert!(result.iter().all(|c| seen.insert(c.index)));
    }
}

#[test]
fn test_scores_are_preserved() {
    let catalog = mixed_catalog();
    let candidates = ranked(&[0, 1, 2, 3, 4]);

    let result = balance(Intent::Both, &candidates, &catalog, 5, 3);
    let b1 = result.iter().find(|c| c.index == 4).unwrap();
    assert_eq!(b1.score, candidates[4].score);
}

#[test]
fn test_unknown_index_counts_as_other() {
    let catalog = mixed_catalog();
    let candidates = ranked(&[99, 0]);

    let result = balance(Intent::Both, &candidates, &catalog, 2, 1);
    assert_eq!(indices(&result), vec![0, 99]);
}
