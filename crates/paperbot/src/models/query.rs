//! Per-source query strings.

use super::Source;

/// One query per source, plus the query the user typed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceQueries {
    /// Query for Semantic Scholar.
    pub semantic_scholar: String,

    /// Query for arXiv.
    pub arxiv: String,

    /// Query for DuckDuckGo.
    pub duckduckgo: String,

    /// The raw query.
    pub original: String,
}

impl SourceQueries {
    /// Same query for every source.
    #[must_use]
    pub fn uniform(query: &str) -> Self {
        Self {
            semantic_scholar: query.to_string(),
            arxiv: query.to_string(),
            duckduckgo: query.to_string(),
            original: query.to_string(),
        }
    }

    /// Query for the given source.
    #[must_use]
    pub fn for_source(&self, source: Source) -> &str {
        match source {
            Source::SemanticScholar => &self.semantic_scholar,
            Source::Arxiv => &self.arxiv,
            Source::DuckDuckGo => &self.duckduckgo,
        }
    }

    /// True when every source uses the raw query.
    #[must_use]
    pub fn is_uniform(&self) -> bool {
        Source::ALL.iter().all(|s| self.for_source(*s) == self.original)
    }
}
