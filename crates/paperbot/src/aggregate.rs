//! Multi-source aggregation.
//!
//! Sources are queried one after another in priority order. A record is
//! kept only if no earlier record has the same lower-cased title, so when
//! two sources return the same paper the higher-priority one wins. The
//! merged list is truncated to the requested limit at the end.

use std::collections::HashSet;

use tracing::{info, warn};

use crate::models::{PaperRecord, Source, SourceQueries};
use crate::sources::PaperSource;

/// What one source contributed to an aggregation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceOutcome {
    /// The source.
    pub source: Source,

    /// Records the source returned.
    pub fetched: usize,

    /// Records that survived deduplication.
    pub added: usize,

    /// Error message when the source failed.
    pub error: Option<String>,
}

/// Merge lists in order, keeping the first record for each lower-cased title.
#[must_use]
pub fn merge_unique<I>(lists: I) -> Vec<PaperRecord>
where
    I: IntoIterator<Item = Vec<PaperRecord>>,
{
    let mut seen = HashSet::new();
    let mut merged = Vec::new();
    for list in lists {
        push_unique(&mut seen, &mut merged, list);
    }
    merged
}

/// Append records with unseen keys; returns how many were appended.
fn push_unique(seen: &mut HashSet<String>, merged: &mut Vec<PaperRecord>, records: Vec<PaperRecord>) -> usize {
    let before = merged.len();
    for record in records {
        if seen.insert(record.dedup_key()) {
            merged.push(record);
        }
    }
    merged.len() - before
}

/// Queries every source and merges the results.
pub struct Aggregator {
    sources: Vec<Box<dyn PaperSource>>,
}

impl Aggregator {
    /// Create an aggregator; sources are ordered by [`Source::priority`].
    #[must_use]
    pub fn new(mut sources: Vec<Box<dyn PaperSource>>) -> Self {
        sources.sort_by_key(|s| s.source().priority());
        Self { sources }
    }

    /// Sources in query order.
    #[must_use]
    pub fn sources(&self) -> Vec<Source> {
        self.sources.iter().map(|s| s.source()).collect()
    }

    /// Merged, deduplicated and truncated records.
    pub async fn aggregate(&self, queries: &SourceQueries, limit: usize) -> Vec<PaperRecord> {
        self.aggregate_detailed(queries, limit).await.0
    }

    /// Like [`aggregate`](Self::aggregate), with per-source outcomes.
    pub async fn aggregate_detailed(
        &self,
        queries: &SourceQueries,
        limit: usize,
    ) -> (Vec<PaperRecord>, Vec<SourceOutcome>) {
        if limit == 0 {
            return (Vec::new(), Vec::new());
        }

        let mut seen = HashSet::new();
        let mut merged = Vec::new();
        let mut outcomes = Vec::with_capacity(self.sources.len());

        for source in &self.sources {
            let kind = source.source();
            let query = queries.for_source(kind);
            info!(source = %kind, query, limit, "Searching");

            let outcome = match source.search(query, limit).await {
                Ok(records) => {
                    let fetched = records.len();
                    let added = push_unique(&mut seen, &mut merged, records);
                    info!(source = %kind, fetched, added, "Source finished");
                    SourceOutcome { source: kind, fetched, added, error: None }
                }
                Err(e) => {
                    warn!(source = %kind, error = %e, "Source failed, continuing without it");
                    SourceOutcome { source: kind, fetched: 0, added: 0, error: Some(e.to_string()) }
                }
            };
            outcomes.push(outcome);
        }

        merged.truncate(limit);
        (merged, outcomes)
    }
}

impl std::fmt::Debug for Aggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Aggregator").field("sources", &self.sources()).finish()
    }
}
