//! Aggregation tests with mock sources.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use paperbot::error::{ClientError, ClientResult};
use paperbot::models::{PaperRecord, Source, SourceQueries};
use paperbot::sources::PaperSource;
use paperbot::{Aggregator, merge_unique};

/// Source returning canned titles, or failing.
struct MockSource {
    kind: Source,
    titles: Vec<&'static str>,
    fail: bool,
    calls: Arc<AtomicUsize>,
    queries: Arc<Mutex<Vec<(String, usize)>>>,
}

impl MockSource {
    fn new(kind: Source, titles: &[&'static str]) -> Self {
        Self {
            kind,
            titles: titles.to_vec(),
            fail: false,
            calls: Arc::new(AtomicUsize::new(0)),
            queries: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn failing(kind: Source) -> Self {
        Self { fail: true, ..Self::new(kind, &[]) }
    }
}

#[async_trait]
impl PaperSource for MockSource {
    fn source(&self) -> Source {
        self.kind
    }

    async fn search(&self, query: &str, limit: usize) -> ClientResult<Vec<PaperRecord>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.queries.lock().unwrap().push((query.to_string(), limit));
        if self.fail {
            return Err(ClientError::server(503, "unavailable"));
        }
        Ok(self.titles.iter().map(|t| PaperRecord::new(*t, self.kind)).collect())
    }
}

fn titles(records: &[PaperRecord]) -> Vec<&str> {
    records.iter().map(|r| r.title.as_str()).collect()
}

fn boxed(sources: Vec<MockSource>) -> Vec<Box<dyn PaperSource>> {
    sources.into_iter().map(|s| Box::new(s) as Box<dyn PaperSource>).collect()
}

// =============================================================================
// Dedup and ordering
// =============================================================================

#[tokio::test]
async fn test_mixed_case_duplicate_scenario() {
    let aggregator = Aggregator::new(boxed(vec![
        MockSource::new(Source::SemanticScholar, &["A", "B"]),
        MockSource::new(Source::Arxiv, &["a", "C"]),
        MockSource::new(Source::DuckDuckGo, &[]),
    ]));

    let records = aggregator.aggregate(&SourceQueries::uniform("q"), 3).await;
    assert_eq!(titles(&records), vec!["A", "B", "C"]);
    assert_eq!(records[0].source, Source::SemanticScholar);
    assert_eq!(records[2].source, Source::Arxiv);
}

#[tokio::test]
async fn test_higher_priority_source_wins_regardless_of_input_order() {
    let aggregator = Aggregator::new(boxed(vec![
        MockSource::new(Source::DuckDuckGo, &["Shared Title"]),
        MockSource::new(Source::Arxiv, &["shared title"]),
        MockSource::new(Source::SemanticScholar, &["SHARED TITLE"]),
    ]));
    assert_eq!(aggregator.sources(), Source::ALL.to_vec());

    let records = aggregator.aggregate(&SourceQueries::uniform("q"), 10).await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].source, Source::SemanticScholar);
    assert_eq!(records[0].title, "SHARED TITLE");
}

#[tokio::test]
async fn test_order_is_preserved_across_sources() {
    let aggregator = Aggregator::new(boxed(vec![
        MockSource::new(Source::SemanticScholar, &["S1", "S2"]),
        MockSource::new(Source::Arxiv, &["X1", "S1", "X2"]),
        MockSource::new(Source::DuckDuckGo, &["W1"]),
    ]));

    let records = aggregator.aggregate(&SourceQueries::uniform("q"), 10).await;
    assert_eq!(titles(&records), vec!["S1", "S2", "X1", "X2", "W1"]);
}

// =============================================================================
// Truncation and limits
// =============================================================================

#[tokio::test]
async fn test_truncates_to_limit_after_merge() {
    let aggregator = Aggregator::new(boxed(vec![
        MockSource::new(Source::SemanticScholar, &["A", "B", "C"]),
        MockSource::new(Source::Arxiv, &["D", "E", "F"]),
    ]));

    let records = aggregator.aggregate(&SourceQueries::uniform("q"), 4).await;
    assert_eq!(titles(&records), vec!["A", "B", "C", "D"]);
}

#[tokio::test]
async fn test_limit_zero_calls_nothing() {
    let source = MockSource::new(Source::Arxiv, &["A"]);
    let calls = Arc::clone(&source.calls);
    let aggregator = Aggregator::new(boxed(vec![source]));

    let (records, outcomes) = aggregator.aggregate_detailed(&SourceQueries::uniform("q"), 0).await;
    assert!(records.is_empty());
    assert!(outcomes.is_empty());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_each_source_gets_its_query_and_the_limit() {
    let graph = MockSource::new(Source::SemanticScholar, &[]);
    let eprint = MockSource::new(Source::Arxiv, &[]);
    let web = MockSource::new(Source::DuckDuckGo, &[]);
    let (gq, eq, wq) = (Arc::clone(&graph.queries), Arc::clone(&eprint.queries), Arc::clone(&web.queries));

    let mut queries = SourceQueries::uniform("raw");
    queries.semantic_scholar = "natural language".into();
    queries.arxiv = "keywords".into();
    queries.duckduckgo = "web style".into();

    Aggregator::new(boxed(vec![web, graph, eprint])).aggregate(&queries, 7).await;

    assert_eq!(*gq.lock().unwrap(), vec![("natural language".to_string(), 7)]);
    assert_eq!(*eq.lock().unwrap(), vec![("keywords".to_string(), 7)]);
    assert_eq!(*wq.lock().unwrap(), vec![("web style".to_string(), 7)]);
}

// =============================================================================
// Partial failure
// =============================================================================

#[tokio::test]
async fn test_failing_source_is_skipped() {
    let aggregator = Aggregator::new(boxed(vec![
        MockSource::new(Source::SemanticScholar, &["A"]),
        MockSource::failing(Source::Arxiv),
        MockSource::new(Source::DuckDuckGo, &["B"]),
    ]));

    let (records, outcomes) = aggregator.aggregate_detailed(&SourceQueries::uniform("q"), 10).await;
    assert_eq!(titles(&records), vec!["A", "B"]);

    assert_eq!(outcomes.len(), 3);
    assert!(outcomes[1].error.as_deref().unwrap().contains("503"));
    assert_eq!(outcomes[1].fetched, 0);
    assert_eq!(outcomes[2].added, 1);
}

#[tokio::test]
async fn test_all_sources_failing_yields_empty() {
    let aggregator = Aggregator::new(boxed(vec![
        MockSource::failing(Source::SemanticScholar),
        MockSource::failing(Source::Arxiv),
        MockSource::failing(Source::DuckDuckGo),
    ]));

    assert!(aggregator.aggregate(&SourceQueries::uniform("q"), 5).await.is_empty());
}

#[tokio::test]
async fn test_outcomes_count_duplicates() {
    let aggregator = Aggregator::new(boxed(vec![
        MockSource::new(Source::SemanticScholar, &["A", "B"]),
        MockSource::new(Source::Arxiv, &["b", "C"]),
    ]));

    let (_, outcomes) = aggregator.aggregate_detailed(&SourceQueries::uniform("q"), 10).await;
    assert_eq!((outcomes[1].fetched, outcomes[1].added), (2, 1));
}

// =============================================================================
// Pure merge
// =============================================================================

#[test]
fn test_merge_unique_matches_aggregate_semantics() {
    let merged = merge_unique(vec![
        vec![PaperRecord::new("A", Source::SemanticScholar), PaperRecord::new("B", Source::SemanticScholar)],
        vec![PaperRecord::new("a", Source::Arxiv), PaperRecord::new("C", Source::Arxiv)],
    ]);
    assert_eq!(titles(&merged), vec!["A", "B", "C"]);
}
