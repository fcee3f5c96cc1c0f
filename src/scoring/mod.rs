//! Query intent and category balancing.
//!
//! Intent is decided by comparing the query against two fixed prototype sentences, one per
//! category. When neither side clearly wins, [`balance`] guarantees a minimum number of
//! results from each category before falling back to pure similarity order.

mod balance;
mod intent;

#[cfg(test)]
mod tests;

pub use balance::{Category, balance};
pub use intent::{
    BEHAVIORAL_PROTOTYPE, Intent, KNOWLEDGE_LABEL, PERSONALITY_LABEL, PrototypeVectors,
    TECHNICAL_PROTOTYPE, classify_scores,
};
