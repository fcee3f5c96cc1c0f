use std::fmt;

use serde::{Deserialize, Serialize};

use crate::catalog::CatalogRow;
use crate::constants::DEFAULT_DURATION_MINUTES;
use crate::scoring::KNOWLEDGE_LABEL;

/// `"Yes"` / `"No"` flag as it appears on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Support {
    Yes,
    No,
}

impl Support {
    /// Case-insensitive `yes`/`no`; anything else is `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "yes" | "y" | "true" => Some(Support::Yes),
            "no" | "n" | "false" => Some(Support::No),
            _ => None,
        }
    }

    fn or_default(value: Option<&str>, default: Support) -> Support {
        value.and_then(Support::parse).unwrap_or(default)
    }
}

impl fmt::Display for Support {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Support::Yes => write!(f, "Yes"),
            Support::No => write!(f, "No"),
        }
    }
}

/// One recommended assessment, shaped for the HTTP response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessmentRecord {
    pub url: String,
    pub name: String,
    pub adaptive_support: Support,
    pub description: String,
    /// Minutes; always positive.
    pub duration: u32,
    pub remote_support: Support,
    /// Never empty.
    pub test_type: Vec<String>,
}

impl AssessmentRecord {
    pub const DEFAULT_ADAPTIVE_SUPPORT: Support = Support::No;
    pub const DEFAULT_REMOTE_SUPPORT: Support = Support::Yes;

    /// Builds the response record for a catalog row, applying defaults where the row is silent.
    pub fn from_row(row: &CatalogRow) -> Self {
        let assessment_type = row.assessment_type.trim();
        let test_type = if assessment_type.is_empty() {
            KNOWLEDGE_LABEL.to_string()
        } else {
            assessment_type.to_string()
        };

        Self {
            url: row.url.clone(),
            name: row.name.clone(),
            adaptive_support: Support::or_default(
                row.adaptive_support.as_deref(),
                Self::DEFAULT_ADAPTIVE_SUPPORT,
            ),
            description: row.description.clone(),
            duration: row
                .duration
                .filter(|&minutes| minutes > 0)
                .unwrap_or(DEFAULT_DURATION_MINUTES),
            remote_support: Support::or_default(
                row.remote_support.as_deref(),
                Self::DEFAULT_REMOTE_SUPPORT,
            ),
            test_type: vec![test_type],
        }
    }
}
