//! The search run: adapt, aggregate, summarize, persist.

use tracing::{info, warn};

use crate::aggregate::{Aggregator, SourceOutcome};
use crate::formatters;
use crate::llm::{QueryAdapter, Summarizer};
use crate::models::{NO_MODEL, PageHandle, PaperRecord, SourceQueries, SummaryBatch};
use crate::notion::Workspace;

/// Result of one run.
#[derive(Debug)]
pub struct RunReport {
    /// Queries each source received.
    pub queries: SourceQueries,

    /// Per-source counts.
    pub outcomes: Vec<SourceOutcome>,

    /// Merged records, in listing order.
    pub records: Vec<PaperRecord>,

    /// Model that wrote the summaries, or `"none"`.
    pub model: String,

    /// Pages created, in record order.
    pub saved: Vec<PageHandle>,

    /// Titles that failed to persist.
    pub failed: Vec<String>,
}

/// Sequential search pipeline.
pub struct Pipeline {
    aggregator: Aggregator,
    workspace: Box<dyn Workspace>,
    summarizer: Option<Box<dyn Summarizer>>,
    query_adapter: Option<Box<dyn QueryAdapter>>,
    quiet: bool,
}

impl Pipeline {
    /// Pipeline without AI collaborators.
    #[must_use]
    pub fn new(aggregator: Aggregator, workspace: Box<dyn Workspace>) -> Self {
        Self { aggregator, workspace, summarizer: None, query_adapter: None, quiet: false }
    }

    /// Enable batch summaries.
    #[must_use]
    pub fn with_summarizer(mut self, summarizer: Box<dyn Summarizer>) -> Self {
        self.summarizer = Some(summarizer);
        self
    }

    /// Enable query adaptation.
    #[must_use]
    pub fn with_query_adapter(mut self, adapter: Box<dyn QueryAdapter>) -> Self {
        self.query_adapter = Some(adapter);
        self
    }

    /// Suppress progress output on stdout.
    #[must_use]
    pub fn quiet(mut self) -> Self {
        self.quiet = true;
        self
    }

    fn progress(&self, text: &str) {
        if !self.quiet {
            println!("{text}");
        }
    }

    /// Run one search end to end.
    ///
    /// Never fails as a whole: source, summary and persistence failures
    /// are logged and reflected in the report.
    pub async fn run(&self, query: &str, limit: usize) -> RunReport {
        let queries = match &self.query_adapter {
            Some(adapter) => adapter.adapt(query).await,
            None => SourceQueries::uniform(query),
        };

        let rule = "=".repeat(60);
        self.progress(&format!("\n{rule}\nQuery: {query}\n{rule}\n"));

        let (records, outcomes) = self.aggregator.aggregate_detailed(&queries, limit).await;
        if !outcomes.is_empty() {
            self.progress(&formatters::format_outcomes(&outcomes));
        }
        self.progress(&formatters::format_listing(&records));

        if records.is_empty() {
            return RunReport {
                queries,
                outcomes,
                records,
                model: NO_MODEL.to_string(),
                saved: Vec::new(),
                failed: Vec::new(),
            };
        }

        let batch = match &self.summarizer {
            Some(summarizer) => {
                self.progress(&format!("Generating summaries for {} papers (batch mode)...", records.len()));
                let batch = summarizer.summarize_batch(&records).await;
                self.progress(&format!("Summaries generated using {}", batch.model));
                batch
            }
            None => SummaryBatch::placeholders(records.len()),
        };

        let mut saved = Vec::new();
        let mut failed = Vec::new();
        for (i, record) in records.iter().enumerate() {
            self.progress(&format!("Saving {}/{}: {}", i + 1, records.len(), record.title));
            match self.workspace.persist(record, &batch.get(i), &batch.model).await {
                Ok(page) => {
                    info!(page = %page.id, title = %record.title, "Saved");
                    saved.push(page);
                }
                Err(e) => {
                    warn!(title = %record.title, error = %e, "Failed to save");
                    self.progress(&format!("  Failed to save: {e}"));
                    failed.push(record.title.clone());
                }
            }
        }

        RunReport { queries, outcomes, records, model: batch.model, saved, failed }
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("aggregator", &self.aggregator)
            .field("summarizer", &self.summarizer.is_some())
            .field("query_adapter", &self.query_adapter.is_some())
            .finish()
    }
}
