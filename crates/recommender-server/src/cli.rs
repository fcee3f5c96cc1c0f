//! Command-line surface of the `recommender` binary.

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::info;

use recommender::catalog::Catalog;
use recommender::config::Config;
use recommender::embedding::{EmbeddingProvider, SentenceEmbedder};
use recommender::engine::{EngineResult, RetrievalEngine, catalog_embeddings};
use recommender::evaluation::{
    EvaluationReport, LabeledQueries, evaluate, predict, write_predictions,
};
use recommender::storage::EmbeddingStore;

#[derive(Parser, Debug)]
#[command(
    name = "recommender",
    version,
    about = "Semantic recommendations over an assessment catalog",
    disable_help_subcommand = true
)]
pub struct Cli {
    /// Check a running server's /health and exit 0 (healthy) or 1
    #[arg(long = "health-check")]
    pub health_check: bool,

    /// Catalog file, overrides RECOMMENDER_CATALOG_PATH
    #[arg(long = "catalog", global = true, value_name = "PATH")]
    pub catalog: Option<PathBuf>,

    /// Embedding cache file, overrides RECOMMENDER_EMBEDDINGS_PATH
    #[arg(long = "embeddings", global = true, value_name = "PATH")]
    pub embeddings: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Run the HTTP service (default)
    Serve,

    /// Embed the catalog and write the embedding cache
    PrepareEmbeddings {
        /// Rebuild even if a cache file already exists
        #[arg(short = 'f', long = "force")]
        force: bool,
    },

    /// Report recall@k over a labeled Query,Assessment_url CSV
    Evaluate {
        #[arg(value_name = "DATASET")]
        dataset: PathBuf,

        #[arg(short = 'k', long = "k", default_value_t = 10)]
        k: usize,
    },

    /// Write top-k predictions for every query in a CSV
    Predict {
        #[arg(value_name = "DATASET")]
        dataset: PathBuf,

        #[arg(short = 'o', long = "output", default_value = "predictions.csv")]
        output: PathBuf,

        #[arg(short = 'k', long = "k", default_value_t = 10)]
        k: usize,
    },
}

impl Cli {
    /// Applies path overrides on top of the environment configuration.
    pub fn apply(&self, mut config: Config) -> Config {
        if let Some(ref path) = self.catalog {
            config.catalog_path = path.clone();
        }
        if let Some(ref path) = self.embeddings {
            config.embeddings_path = path.clone();
        }
        config
    }
}

pub fn load_embedder(config: &Config) -> anyhow::Result<SentenceEmbedder> {
    if config.model_path.is_none() {
        tracing::warn!(
            "No RECOMMENDER_MODEL_PATH configured, running embedder in stub mode"
        );
    }
    Ok(SentenceEmbedder::load(config.embedder_config())?)
}

pub fn build_engine<E: EmbeddingProvider>(
    config: &Config,
    embedder: E,
) -> EngineResult<RetrievalEngine<E>> {
    RetrievalEngine::from_paths(&config.catalog_path, &config.embeddings_path, embedder)
}

/// Writes the embedding cache; returns the number of rows embedded.
pub fn prepare_embeddings<E: EmbeddingProvider>(
    config: &Config,
    embedder: &E,
    force: bool,
) -> anyhow::Result<usize> {
    let catalog = Catalog::load(&config.catalog_path)?;
    let store = EmbeddingStore::new(&config.embeddings_path);

    if force && store.remove()? {
        info!(path = %store.path().display(), "Removed existing embedding cache");
    }

    let matrix = catalog_embeddings(&catalog, embedder, &store)?;
    info!(
        rows = matrix.rows(),
        dim = matrix.dim(),
        path = %store.path().display(),
        "Embedding cache ready"
    );
    Ok(matrix.rows())
}

pub fn run_evaluate<E: EmbeddingProvider>(
    engine: &RetrievalEngine<E>,
    dataset: &std::path::Path,
    k: usize,
) -> anyhow::Result<EvaluationReport> {
    let dataset = LabeledQueries::from_csv(dataset)?;
    Ok(evaluate(engine, &dataset, k)?)
}

/// Writes predictions for every distinct query; returns the number of CSV lines written.
pub fn run_predict<E: EmbeddingProvider>(
    engine: &RetrievalEngine<E>,
    dataset: &std::path::Path,
    output: &std::path::Path,
    k: usize,
) -> anyhow::Result<usize> {
    let dataset = LabeledQueries::from_csv(dataset)?;
    let predictions = predict(engine, dataset.queries(), k)?;

    let writer = BufWriter::new(File::create(output)?);
    write_predictions(writer, &predictions)?;

    let lines = predictions.iter().map(|p| p.urls.len()).sum();
    info!(
        queries = predictions.len(),
        lines,
        output = %output.display(),
        "Predictions written"
    );
    Ok(lines)
}

/// Human-readable summary printed by `evaluate`.
pub fn format_report(report: &EvaluationReport) -> String {
    let mut out = String::new();
    for (i, query) in report.per_query.iter().enumerate() {
        out.push_str(&format!(
            "Query {}: {}\n  relevant={} recommended={} hits={} recall@{}={:.4}\n",
            i + 1,
            query.query.chars().take(80).collect::<String>(),
            query.relevant,
            query.recommended,
            query.hits.len(),
            report.k,
            query.recall
        ));
    }
    out.push_str(&format!(
        "MEAN RECALL@{}: {:.4}\nBest: {:.4}\nWorst: {:.4}\n",
        report.k, report.mean_recall, report.best, report.worst
    ));
    out
}
