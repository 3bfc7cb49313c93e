//! AI collaborators: batch summaries and query adaptation.
//!
//! Both traits are infallible by contract. Implementations degrade to
//! placeholders or the raw query instead of returning errors.

mod gemini;
mod query;
mod summarize;

pub use gemini::{GeminiClient, Generation};
pub use query::GeminiQueryAdapter;
pub use summarize::GeminiSummarizer;

use async_trait::async_trait;

use crate::models::{PaperRecord, SourceQueries, SummaryBatch};

/// Produces summaries for a batch of papers.
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Summaries index-aligned with `records`.
    async fn summarize_batch(&self, records: &[PaperRecord]) -> SummaryBatch;
}

/// Rewrites a raw query for each source.
#[async_trait]
pub trait QueryAdapter: Send + Sync {
    /// Per-source queries; never fails.
    async fn adapt(&self, raw: &str) -> SourceQueries;
}
