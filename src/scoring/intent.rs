use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::INTENT_MARGIN;
use crate::embedding::{EmbeddingError, EmbeddingProvider};
use crate::vector::{dot, normalize};

pub const KNOWLEDGE_LABEL: &str = "Knowledge & Skills";
pub const PERSONALITY_LABEL: &str = "Personality & Behavior";

/// Prototype sentence for the technical category.
pub const TECHNICAL_PROTOTYPE: &str =
    "technical knowledge and skills assessment for job candidates";
/// Prototype sentence for the behavioral category.
pub const BEHAVIORAL_PROTOTYPE: &str = "personality and behavioral assessment for job candidates";

/// Which assessment category a query is asking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    Knowledge,
    Personality,
    /// Scores were within [`INTENT_MARGIN`] of each other.
    Both,
}

impl Intent {
    /// Category label, or `None` for [`Intent::Both`].
    pub fn label(&self) -> Option<&'static str> {
        match self {
            Intent::Knowledge => Some(KNOWLEDGE_LABEL),
            Intent::Personality => Some(PERSONALITY_LABEL),
            Intent::Both => None,
        }
    }

    pub fn is_both(&self) -> bool {
        matches!(self, Intent::Both)
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Intent::Knowledge => write!(f, "knowledge"),
            Intent::Personality => write!(f, "personality"),
            Intent::Both => write!(f, "both"),
        }
    }
}

/// Maps the two prototype scores to an intent.
///
/// A gap of at most [`INTENT_MARGIN`] (inclusive) is ambiguous.
pub fn classify_scores(technical: f32, behavioral: f32) -> Intent {
    if (technical - behavioral).abs() <= INTENT_MARGIN {
        Intent::Both
    } else if technical > behavioral {
        Intent::Knowledge
    } else {
        Intent::Personality
    }
}

/// Normalized embeddings of the two prototype sentences.
#[derive(Debug, Clone, PartialEq)]
pub struct PrototypeVectors {
    technical: Vec<f32>,
    behavioral: Vec<f32>,
}

impl PrototypeVectors {
    pub fn new(technical: &[f32], behavioral: &[f32]) -> Self {
        Self {
            technical: normalize(technical),
            behavioral: normalize(behavioral),
        }
    }

    /// Embeds both prototype sentences with `provider`.
    pub fn embed<P: EmbeddingProvider + ?Sized>(provider: &P) -> Result<Self, EmbeddingError> {
        let vectors = provider.embed_batch(&[TECHNICAL_PROTOTYPE, BEHAVIORAL_PROTOTYPE])?;
        match vectors.as_slice() {
            [technical, behavioral] => Ok(Self::new(technical, behavioral)),
            other => Err(EmbeddingError::InferenceFailed {
                reason: format!("expected 2 prototype embeddings, got {}", other.len()),
            }),
        }
    }

    pub fn technical(&self) -> &[f32] {
        &self.technical
    }

    pub fn behavioral(&self) -> &[f32] {
        &self.behavioral
    }

    pub fn dim(&self) -> usize {
        self.technical.len()
    }

    /// `(technical, behavioral)` similarity for an already-normalized query.
    pub fn scores(&self, query: &[f32]) -> (f32, f32) {
        (dot(query, &self.technical), dot(query, &self.behavioral))
    }

    /// Intent of an already-normalized query.
    pub fn classify(&self, query: &[f32]) -> Intent {
        let (technical, behavioral) = self.scores(query);
        classify_scores(technical, behavioral)
    }
}
