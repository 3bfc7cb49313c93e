//! AI-generated summaries.

use serde::{Deserialize, Serialize};

/// Model name recorded when no model produced the summaries.
pub const NO_MODEL: &str = "none";

/// Generated text for one paper.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    /// One-sentence summary.
    pub short: String,

    /// Multi-paragraph summary.
    pub detailed: String,

    /// Short description of the proposed architecture or method.
    pub architecture_note: String,
}

impl Summary {
    /// Stand-in when no summary was generated for a paper.
    #[must_use]
    pub fn placeholder() -> Self {
        Self { short: "No summary available".to_string(), ..Self::default() }
    }

    /// Stand-in when the AI answer could not be parsed.
    #[must_use]
    pub fn failed() -> Self {
        Self { short: "Batch summary failed".to_string(), ..Self::default() }
    }
}

/// Summaries for a batch of papers, index-aligned with the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryBatch {
    /// One entry per input record.
    pub summaries: Vec<Summary>,

    /// Model that produced the batch, or [`NO_MODEL`].
    pub model: String,
}

impl SummaryBatch {
    /// `n` placeholders attributed to no model.
    #[must_use]
    pub fn placeholders(n: usize) -> Self {
        Self { summaries: vec![Summary::placeholder(); n], model: NO_MODEL.to_string() }
    }

    /// Summary for record `index`, or a placeholder past the end.
    #[must_use]
    pub fn get(&self, index: usize) -> Summary {
        self.summaries.get(index).cloned().unwrap_or_else(Summary::placeholder)
    }

    /// Number of summaries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.summaries.len()
    }

    /// True when there are no summaries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.summaries.is_empty()
    }
}
