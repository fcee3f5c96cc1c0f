//! Offline quality measurement against a labeled query set.
//!
//! The dataset is a CSV with one `(Query, Assessment_url)` pair per line; a query with several
//! relevant assessments appears on several lines.

mod error;


pub use error::{EvaluationError, EvaluationResult};

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::Path;

use serde::Serialize;
use tracing::{debug, info};

use crate::embedding::EmbeddingProvider;
use crate::engine::RetrievalEngine;

pub const QUERY_COLUMN: &str = "Query";
pub const URL_COLUMN: &str = "Assessment_url";

/// Fraction of `relevant` found in the first `k` of `recommended`.
///
/// Both sides are compared as sets; an empty `relevant` scores `0.0`.
pub fn recall_at_k<S: AsRef<str>>(recommended: &[S], relevant: &[S], k: usize) -> f32 {
    let relevant: HashSet<&str> = relevant.iter().map(AsRef::as_ref).collect();
    if relevant.is_empty() {
        return 0.0;
    }

    let hits = recommended
        .iter()
        .take(k)
        .map(AsRef::as_ref)
        .collect::<HashSet<&str>>()
        .intersection(&relevant)
        .count();

    hits as f32 / relevant.len() as f32
}

/// One query and every URL labeled relevant for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabeledQuery {
    pub query: String,
    pub relevant: Vec<String>,
}

/// Labeled queries in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabeledQueries {
    queries: Vec<LabeledQuery>,
}

impl LabeledQueries {
    pub fn from_csv<P: AsRef<Path>>(path: P) -> EvaluationResult<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(EvaluationError::NotFound {
                path: path.to_path_buf(),
            });
        }
        let dataset = Self::from_reader(BufReader::new(File::open(path)?))?;
        info!(
            path = %path.display(),
            queries = dataset.len(),
            "Labeled dataset loaded"
        );
        Ok(dataset)
    }

    /// Groups rows by trimmed query; rows with a blank query or URL are skipped.
    pub fn from_reader<R: Read>(reader: R) -> EvaluationResult<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        let headers = reader.headers()?.clone();
        let column = |name: &'static str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or(EvaluationError::MissingColumn { column: name })
        };
        let query_idx = column(QUERY_COLUMN)?;
        let url_idx = column(URL_COLUMN)?;

        let mut queries: Vec<LabeledQuery> = Vec::new();
        let mut positions: HashMap<String, usize> = HashMap::new();

        for record in reader.records() {
            let record = record?;
            let query = record.get(query_idx).unwrap_or_default();
            let url = record.get(url_idx).unwrap_or_default();
            if query.is_empty() || url.is_empty() {
                continue;
            }

            let position = *positions.entry(query.to_string()).or_insert_with(|| {
                queries.push(LabeledQuery {
                    query: query.to_string(),
                    relevant: Vec::new(),
                });
                queries.len() - 1
            });

            queries[position].relevant.push(url.to_string());
        }

        Ok(Self { queries })
    }

    pub fn len(&self) -> usize {
        self.queries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LabeledQuery> {
        self.queries.iter()
    }

    pub fn queries(&self) -> impl Iterator<Item = &str> {
        self.queries.iter().map(|q| q.query.as_str())
    }
}

impl FromIterator<LabeledQuery> for LabeledQueries {
    fn from_iter<I: IntoIterator<Item = LabeledQuery>>(iter: I) -> Self {
        Self {
            queries: iter.into_iter().collect(),
        }
    }
}

/// Recall for a single labeled query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryRecall {
    pub query: String,
    pub relevant: usize,
    pub recommended: usize,
    pub hits: Vec<String>,
    pub recall: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationReport {
    pub k: usize,
    pub per_query: Vec<QueryRecall>,
    pub mean_recall: f32,
    pub best: f32,
    pub worst: f32,
}

impl EvaluationReport {
    fn from_recalls(k: usize, per_query: Vec<QueryRecall>) -> Self {
        if per_query.is_empty() {
            return Self {
                k,
                per_query,
                mean_recall: 0.0,
                best: 0.0,
                worst: 0.0,
            };
        }

        let recalls = per_query.iter().map(|q| q.recall);
        let mean_recall = recalls.clone().sum::<f32>() / per_query.len() as f32;
        let best = recalls.clone().fold(f32::MIN, f32::max);
        let worst = recalls.fold(f32::MAX, f32::min);

        Self {
            k,
            per_query,
            mean_recall,
            best,
            worst,
        }
    }
}

/// Runs every labeled query through `engine` and scores recall@`k`.
pub fn evaluate<E: EmbeddingProvider>(
    engine: &RetrievalEngine<E>,
    dataset: &LabeledQueries,
    k: usize,
) -> EvaluationResult<EvaluationReport> {
    let mut per_query = Vec::with_capacity(dataset.len());

    for labeled in dataset.iter() {
        let urls = recommend_urls(engine, &labeled.query, k)?;
        let recall = recall_at_k(&urls, &labeled.relevant, k);

        let relevant: HashSet<&str> = labeled.relevant.iter().map(String::as_str).collect();
        let hits: Vec<String> = urls
            .iter()
            .take(k)
            .filter(|url| relevant.contains(url.as_str()))
            .cloned()
            .collect();

        debug!(
            query = %labeled.query,
            relevant = relevant.len(),
            hits = hits.len(),
            recall,
            "Query evaluated"
        );

        per_query.push(QueryRecall {
            query: labeled.query.clone(),
            relevant: relevant.len(),
            recommended: urls.len(),
            hits,
            recall,
        });
    }

    let report = EvaluationReport::from_recalls(k, per_query);
    info!(
        queries = report.per_query.len(),
        k,
        mean_recall = report.mean_recall,
        best = report.best,
        worst = report.worst,
        "Evaluation finished"
    );
    Ok(report)
}

/// Recommended URLs for one query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Prediction {
    pub query: String,
    pub urls: Vec<String>,
}

pub fn predict<'a, E, I>(
    engine: &RetrievalEngine<E>,
    queries: I,
    k: usize,
) -> EvaluationResult<Vec<Prediction>>
where
    E: EmbeddingProvider,
    I: IntoIterator<Item = &'a str>,
{
    queries
        .into_iter()
        .map(|query| {
            Ok(Prediction {
                query: query.to_string(),
                urls: recommend_urls(engine, query, k)?,
            })
        })
        .collect()
}

/// Writes one `Query,Assessment_url` line per recommended URL.
pub fn write_predictions<W: Write>(writer: W, predictions: &[Prediction]) -> EvaluationResult<()> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record([QUERY_COLUMN, URL_COLUMN])?;
    for prediction in predictions {
        for url in &prediction.urls {
            writer.write_record([prediction.query.as_str(), url.as_str()])?;
        }
    }
    writer.flush()?;
    Ok(())
}

fn recommend_urls<E: EmbeddingProvider>(
    engine: &RetrievalEngine<E>,
    query: &str,
    k: usize,
) -> EvaluationResult<Vec<String>> {
    let records = engine
        .recommend(query, k)
        .map_err(|source| EvaluationError::Engine {
            query: query.to_string(),
            source,
        })?;
    Ok(records.into_iter().map(|r| r.url).collect())
}
