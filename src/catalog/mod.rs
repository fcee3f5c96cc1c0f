//! Assessment catalog store.
//!
//! The catalog is read once at startup and never mutated afterwards; a row's identity is its
//! position in the file, which is also its row in the embedding cache.

mod error;


pub use error::{CatalogError, CatalogResult};

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, info};

/// Columns every catalog file must provide (`type` is optional).
pub const REQUIRED_COLUMNS: [&str; 3] = ["name", "url", "description"];

/// One assessment as scraped from the vendor catalog.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogRow {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub url: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    /// Category label such as `"Knowledge & Skills"`; empty when the scraper found none.
    #[serde(default, rename = "type", deserialize_with = "null_as_empty")]
    pub assessment_type: String,
    /// Optional override for the reported duration in minutes.
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub duration: Option<u32>,
    /// Optional `"Yes"`/`"No"` override.
    #[serde(default)]
    pub adaptive_support: Option<String>,
    /// Optional `"Yes"`/`"No"` override.
    #[serde(default)]
    pub remote_support: Option<String>,
}

impl CatalogRow {
    pub fn new(
        name: impl Into<String>,
        url: impl Into<String>,
        description: impl Into<String>,
        assessment_type: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            description: description.into(),
            assessment_type: assessment_type.into(),
            ..Default::default()
        }
    }
}

/// Ordered, read-only set of catalog rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    rows: Vec<CatalogRow>,
}

impl Catalog {
    pub fn new(rows: Vec<CatalogRow>) -> Self {
        Self { rows }
    }

    /// Loads a catalog file: `.json` as an array of rows, anything else as headed CSV.
    pub fn load<P: AsRef<Path>>(path: P) -> CatalogResult<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(CatalogError::NotFound {
                path: path.to_path_buf(),
            });
        }

        let reader = BufReader::new(File::open(path)?);
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        let catalog = if is_json {
            Self::from_json_reader(reader)?
        } else {
            Self::from_csv_reader(reader)?
        };

        info!(
            path = %path.display(),
            rows = catalog.len(),
            untyped = catalog.rows.iter().filter(|r| r.assessment_type.is_empty()).count(),
            "Catalog loaded"
        );

        Ok(catalog)
    }

    /// Parses headed CSV, trimming every cell.
    pub fn from_csv_reader<R: Read>(reader: R) -> CatalogResult<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        let headers = reader.headers()?.clone();
        for column in REQUIRED_COLUMNS {
            if !headers.iter().any(|h| h == column) {
                return Err(CatalogError::MissingColumn { column });
            }
        }
        debug!(columns = ?headers, "Catalog CSV headers");

        let rows = reader
            .deserialize::<CatalogRow>()
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { rows })
    }

    /// Parses a JSON array of rows.
    ///
    /// Every object must carry the [`REQUIRED_COLUMNS`] keys; a `null` value reads as empty.
    pub fn from_json_reader<R: Read>(reader: R) -> CatalogResult<Self> {
        let objects: Vec<serde_json::Map<String, serde_json::Value>> =
            serde_json::from_reader(reader)?;

        let mut rows = Vec::with_capacity(objects.len());
        for (row, object) in objects.into_iter().enumerate() {
            if let Some(field) = REQUIRED_COLUMNS
                .into_iter()
                .find(|field| !object.contains_key(*field))
            {
                return Err(CatalogError::MissingField { row, field });
            }
            rows.push(serde_json::from_value(serde_json::Value::Object(object))?);
        }

        Ok(Self { rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&CatalogRow> {
        self.rows.get(index)
    }

    pub fn rows(&self) -> &[CatalogRow] {
        &self.rows
    }

    pub fn iter(&self) -> impl Iterator<Item = &CatalogRow> {
        self.rows.iter()
    }

    /// Descriptions in row order, as fed to the embedding provider.
    pub fn descriptions(&self) -> Vec<&str> {
        self.rows.iter().map(|r| r.description.as_str()).collect()
    }
}

/// Reads a missing cell or a JSON `null` as the empty string.
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl FromIterator<CatalogRow> for Catalog {
    fn from_iter<I: IntoIterator<Item = CatalogRow>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
