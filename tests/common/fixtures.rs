//! Shared catalogs and embedders for integration tests.

use std::path::{Path, PathBuf};

use recommender::catalog::{Catalog, CatalogRow};
use recommender::embedding::MockEmbedder;

/// Words the mock embedder knows; everything else embeds to zero.
pub const VOCABULARY: &[&str] = &[
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

pub const URL_A: &str = "https://catalog.example.com/java-coding";
pub const URL_B: &str = "https://catalog.example.com/leadership-style";
pub const URL_C: &str = "https://catalog.example.com/general-aptitude";

pub const THREE_ROW_CSV: &str = "\
name,url,description,type
Java Coding,https://catalog.example.com/java-coding,Java coding test,Knowledge & Skills
Leadership Style,https://catalog.example.com/leadership-style,leadership style inventory,Personality & Behavior
General Aptitude,https://catalog.example.com/general-aptitude,general aptitude,
";

/// A: Java coding (technical), B: leadership (behavioral), C: untyped aptitude.
pub fn three_row_catalog() -> Catalog {
    Catalog::new(vec![
        CatalogRow::new("Java Coding", URL_A, "Java coding test", "Knowledge & Skills"),
        CatalogRow::new(
            "Leadership Style",
            URL_B,
            "leadership style inventory",
            "Personality & Behavior",
        ),
        CatalogRow::new("General Aptitude", URL_C, "general aptitude", ""),
    ])
}

pub fn vocabulary_embedder() -> MockEmbedder {
    MockEmbedder::with_vocabulary(VOCABULARY)
}

/// Writes `contents` to `dir/name` and returns the path.
pub fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).expect("write fixture");
    path
}
