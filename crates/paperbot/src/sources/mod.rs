//! Paper sources.
//!
//! Each source owns an explicit response schema and converts it into
//! [`PaperRecord`] at the boundary:
//! - [`SemanticScholarSource`]: Graph API JSON
//! - [`ArxivSource`]: Atom XML via `quick-xml` serde
//! - [`DuckDuckGoSource`]: HTML results via `scraper`

mod arxiv;
mod duckduckgo;
mod semantic_scholar;

pub use arxiv::ArxivSource;
pub use duckduckgo::{DuckDuckGoSource, WebHit};
pub use semantic_scholar::SemanticScholarSource;

use async_trait::async_trait;

use crate::config::Config;
use crate::error::ClientResult;
use crate::models::{PaperRecord, Source};

/// A paper-discovery service.
#[async_trait]
pub trait PaperSource: Send + Sync {
    /// Which service this is.
    fn source(&self) -> Source;

    /// Search for up to `limit` papers.
    ///
    /// # Errors
    ///
    /// Returns the last error once retries are exhausted.
    async fn search(&self, query: &str, limit: usize) -> ClientResult<Vec<PaperRecord>>;
}

/// Build all three sources from one configuration, in priority order.
///
/// # Errors
///
/// Returns error if an HTTP client cannot be built.
pub fn all_sources(config: &Config) -> ClientResult<Vec<Box<dyn PaperSource>>> {
    Ok(vec![
        Box::new(SemanticScholarSource::new(config)?),
        Box::new(ArxivSource::new(config)?),
        Box::new(DuckDuckGoSource::new(config)?),
    ])
}
