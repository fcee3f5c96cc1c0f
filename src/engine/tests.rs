use super::*;
use crate::catalog::{Catalog, CatalogRow};
use crate::embedding::MockEmbedder;
use crate::scoring::{BEHAVIORAL_PROTOTYPE, TECHNICAL_PROTOTYPE};
use crate::storage::EmbeddingStore;
use tempfile::TempDir;

const VOCABULARY: &[&str] = &[
    "java",
    "coding",
    "developer",
    "skills",
    "leadership",
    "style",
    "inventory",
    "general",
    "aptitude",
    "test",
    "technical",
    "knowledge",
    "personality",
    "behavioral",
];

fn three_row_catalog() -> Catalog {
    Catalog::new(vec![
        CatalogRow::new(
            "Java Coding",
            "https://example.com/a",
            "Java coding test",
            "Knowledge & Skills",
        ),
        CatalogRow::new(
            "Leadership Style",
            "https://example.com/b",
            "leadership style inventory",
            "Personality & Behavior",
        ),
        CatalogRow::new(
            "General Aptitude",
            "https://example.com/c",
            "general aptitude",
            "",
        ),
    ])
}

fn temp_store(dir: &TempDir) -> EmbeddingStore {
    EmbeddingStore::new(dir.path().join("embeddings.bin"))
}

fn build_engine(dir: &TempDir) -> RetrievalEngine<MockEmbedder> {
    RetrievalEngine::build(
        three_row_catalog(),
        MockEmbedder::with_vocabulary(VOCABULARY),
        &temp_store(dir),
    )
    .expect("engine should build")
}

#[test]
fn test_build_writes_cache() {
    let dir = TempDir::new().unwrap();
    let engine = build_engine(&dir);

    assert_eq!(engine.len(), 3);
    // Three descriptions plus two prototype sentences.
    assert_eq!(engine.embedder().call_count(), 5);

    let cached = temp_store(&dir).load().unwrap().expect("cache written");
    assert_eq!(cached.rows(), 3);
    assert_eq!(cached.dim(), VOCABULARY.len());
}

#[test]
fn test_second_build_reads_cache() {
    let dir = TempDir::new().unwrap();
    let first = build_engine(&dir);
    let second = build_engine(&dir);

    assert_eq!(second.embedder().call_count(), 2);
    assert_eq!(
        first.search("java", 3).unwrap(),
        second.search("java", 3).unwrap()
    );
}

#[test]
fn test_cache_stores_raw_vectors() {
    let dir = TempDir::new().unwrap();
    let _engine = build_engine(&dir);

    let cached = temp_store(&dir).load().unwrap().unwrap();
    let java = VOCABULARY.iter().position(|w| *w == "java").unwrap();
    // Unnormalized word count, not 1/sqrt(3).
    assert_eq!(cached.row(0).unwrap()[java], 1.0);
}

#[test]
fn test_misaligned_cache_is_configuration_error() {
    let dir = TempDir::new().unwrap();
    let store = temp_store(&dir);
    let dim = VOCABULARY.len();
    store
        .store(&EmbeddingMatrix::new(2, dim, vec![0.0; 2 * dim]).unwrap())
        .unwrap();

    let err = RetrievalEngine::build(
        three_row_catalog(),
        MockEmbedder::with_vocabulary(VOCABULARY),
        &store,
    )
    .unwrap_err();

    assert!(matches!(
        err,
        EngineError::MisalignedCache {
            cache_rows: 2,
            catalog_rows: 3
        }
    ));
    assert!(err.is_configuration());
}

#[test]
fn test_cache_dimension_mismatch_rejected() {
    let dir = TempDir::new().unwrap();
    let store = temp_store(&dir);
    store
        .store(&EmbeddingMatrix::new(3, 2, vec![1.0; 6]).unwrap())
        .unwrap();

    let err = RetrievalEngine::build(
        three_row_catalog(),
        MockEmbedder::with_vocabulary(VOCABULARY),
        &store,
    )
    .unwrap_err();

    assert!(matches!(
        err,
        EngineError::DimensionMismatch {
            expected: 14,
            actual: 2
        }
    ));
    assert!(err.is_configuration());
}

#[test]
fn test_corrupt_cache_is_not_rebuilt() {
    let dir = TempDir::new().unwrap();
    let store = temp_store(&dir);
    std::fs::write(store.path(), b"definitely not a cache file").unwrap();

    let err = RetrievalEngine::build(
        three_row_catalog(),
        MockEmbedder::with_vocabulary(VOCABULARY),
        &store,
    )
    .unwrap_err();

    assert!(matches!(err, EngineError::Store(_)));
    assert!(err.is_configuration());
    assert_eq!(
        std::fs::read(store.path()).unwrap(),
        b"definitely not a cache file"
    );
}

#[test]
fn test_failing_provider_surfaces_error() {
    let dir = TempDir::new().unwrap();
    let err = RetrievalEngine::build(
        three_row_catalog(),
        MockEmbedder::new(4).failing(),
        &temp_store(&dir),
    )
    .unwrap_err();

    assert!(matches!(err, EngineError::Embedding(_)));
    assert!(!err.is_configuration());
    assert!(!temp_store(&dir).exists());
}

#[test]
fn test_search_ranks_lexical_overlap_first() {
    let dir = TempDir::new().unwrap();
    let engine = build_engine(&dir);

    let results = engine.search("Java developer skills", 10).unwrap();
    assert_eq!(results.len(), 3);
    assert_eq!(results[0].index, 0);
    assert!(results[0].score > results[1].score);
    // B and C tie at zero; catalog order breaks the tie.
    assert_eq!(results[1].index, 1);
    assert_eq!(results[2].index, 2);
}

#[test]
fn test_search_bound() {
    let dir = TempDir::new().unwrap();
    let engine = build_engine(&dir);

    assert_eq!(engine.search("java", 1).unwrap().len(), 1);
    assert_eq!(engine.search("java", 100).unwrap().len(), 3);
    assert!(engine.search("java", 0).unwrap().is_empty());
}

#[test]
fn test_blank_query_skips_provider() {
    let dir = TempDir::new().unwrap();
    let engine = build_engine(&dir);
    let before = engine.embedder().call_count();

    assert!(engine.search("   ", 10).unwrap().is_empty());
    assert!(engine.recommend("", 10).unwrap().is_empty());
    assert_eq!(engine.embedder().call_count(), before);
}

#[test]
fn test_validate_query() {
    assert_eq!(validate_query("  java developer \n").unwrap(), "java developer");

    let err = validate_query(" \t ").unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput { .. }));
    assert!(!err.is_configuration());
    assert!(err.to_string().contains("query must not be empty"));
}

#[test]
fn test_recommend_embeds_query_once() {
    let dir = TempDir::new().unwrap();
    let engine = build_engine(&dir);
    let before = engine.embedder().call_count();

    engine.recommend("java", 2).unwrap();
    assert_eq!(engine.embedder().call_count(), before + 1);
}

#[test]
fn test_infer_intent() {
    let dir = TempDir::new().unwrap();
    let engine = build_engine(&dir);

    assert_eq!(
        engine.infer_intent("technical knowledge").unwrap(),
        Intent::Knowledge
    );
    assert_eq!(
        engine.infer_intent("personality behavioral").unwrap(),
        Intent::Personality
    );
    // No overlap with either prototype: both scores are zero.
    assert_eq!(engine.infer_intent("leadership").unwrap(), Intent::Both);
}

#[test]
fn test_rebalance_respects_intent() {
    let dir = TempDir::new().unwrap();
    let engine = build_engine(&dir);
    let candidates = vec![
        Candidate::new(2, 0.9),
        Candidate::new(0, 0.8),
        Candidate::new(1, 0.7),
    ];

    let clear = engine
        .rebalance("technical skills", &candidates, 2, 1)
        .unwrap();
    assert_eq!(clear, candidates[..2].to_vec());

    let mixed = engine.rebalance("leadership", &candidates, 2, 1).unwrap();
    let indices: Vec<usize> = mixed.iter().map(|c| c.index).collect();
    assert_eq!(indices, vec![0, 1]);
}

#[test]
fn test_assemble_defaults() {
    let dir = TempDir::new().unwrap();
    let engine = build_engine(&dir);

    let records = engine.assemble(&[Candidate::new(2, 0.5), Candidate::new(0, 0.4)]);
    assert_eq!(records.len(), 2);

    let untyped = &records[0];
    assert_eq!(untyped.url, "https://example.com/c");
    assert_eq!(untyped.test_type, vec!["Knowledge & Skills".to_string()]);
    assert_eq!(untyped.duration, 60);
    assert_eq!(untyped.adaptive_support, Support::No);
    assert_eq!(untyped.remote_support, Support::Yes);

    assert_eq!(records[1].name, "Java Coding");
    assert_eq!(records[1].description, "Java coding test");
}

#[test]
fn test_assemble_skips_unknown_rows() {
    let dir = TempDir::new().unwrap();
    let engine = build_engine(&dir);
    assert!(engine.assemble(&[Candidate::new(42, 1.0)]).is_empty());
}

#[test]
fn test_record_overrides_from_row() {
    let mut row = CatalogRow::new("Excel", "https://example.com/x", "", "Simulations");
    row.duration = Some(25);
    row.adaptive_support = Some("yes".to_string());
    row.remote_support = Some("No".to_string());

    let record = AssessmentRecord::from_row(&row);
    assert_eq!(record.duration, 25);
    assert_eq!(record.adaptive_support, Support::Yes);
    assert_eq!(record.remote_support, Support::No);
    assert_eq!(record.test_type, vec!["Simulations".to_string()]);
}

#[test]
fn test_record_ignores_unusable_overrides() {
    let mut row = CatalogRow::new("Excel", "https://example.com/x", "", "");
    row.duration = Some(0);
    row.adaptive_support = Some("maybe".to_string());

    let record = AssessmentRecord::from_row(&row);
    assert_eq!(record.duration, 60);
    assert_eq!(record.adaptive_support, Support::No);
}

#[test]
fn test_record_json_shape() {
    let record = AssessmentRecord::from_row(&CatalogRow::new("N", "U", "D", ""));
    let json = serde_json::to_value(&record).unwrap();

    assert_eq!(json["adaptive_support"], "No");
    assert_eq!(json["remote_support"], "Yes");
    assert_eq!(json["duration"], 60);
    assert_eq!(json["test_type"], serde_json::json!(["Knowledge & Skills"]));
}

#[test]
fn test_ambiguous_query_gets_both_categories() {
    let dir = TempDir::new().unwrap();
    let catalog = Catalog::new(vec![
        CatalogRow::new("T1", "u/t1", "t1", "Knowledge & Skills"),
        CatalogRow::new("T2", "u/t2", "t2", "Knowledge & Skills"),
        CatalogRow::new("T3", "u/t3", "t3", "Knowledge & Skills"),
        CatalogRow::new("T4", "u/t4", "t4", "Knowledge & Skills"),
        CatalogRow::new("B1", "u/b1", "b1", "Personality & Behavior"),
        CatalogRow::new("B2", "u/b2", "b2", "Personality & Behavior"),
    ]);
    let mock = MockEmbedder::new(4)
        .with_vector(TECHNICAL_PROTOTYPE, vec![1.0, 0.0, 0.0, 0.0])
        .with_vector(BEHAVIORAL_PROTOTYPE, vec![0.0, 1.0, 0.0, 0.0])
        .with_vector("mixed query", vec![1.0, 1.0, 0.0, 0.0])
        .with_vector("t1", vec![1.0, 1.0, 0.0, 0.0])
        .with_vector("t2", vec![1.0, 1.0, 0.5, 0.0])
        .with_vector("t3", vec![1.0, 1.0, 1.0, 0.0])
        .with_vector("t4", vec![1.0, 1.0, 1.5, 0.0])
        .with_vector("b1", vec![1.0, 1.0, 2.0, 0.0])
        .with_vector("b2", vec![1.0, 1.0, 2.5, 0.0]);

    let engine = RetrievalEngine::build(catalog, mock, &temp_store(&dir)).unwrap();
    assert_eq!(engine.infer_intent("mixed query").unwrap(), Intent::Both);

    let names: Vec<String> = engine
        .recommend("mixed query", 6)
        .unwrap()
        .into_iter()
        .map(|r| r.name)
        .collect();
    assert_eq!(names, vec!["T1", "T2", "T3", "B1", "B2", "T4"]);
}
