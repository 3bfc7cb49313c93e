//! Semantic Scholar Graph API source.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info};

use super::PaperSource;
use crate::client::{ApiClient, RetryPolicy};
use crate::config::Config;
use crate::error::ClientResult;
use crate::models::{PaperRecord, Source, Year};

/// Fields requested from `/paper/search`.
const SEARCH_FIELDS: &str =
    "title,authors,year,abstract,venue,publicationVenue,externalIds,openAccessPdf,citationCount";

/// Largest page the search endpoint accepts.
const MAX_LIMIT: usize = 100;

const NO_ABSTRACT: &str = "No abstract available";
const UNKNOWN_VENUE: &str = "Unknown";

/// Search response wrapper.
#[derive(Debug, Default, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<GraphPaper>,
}

/// A paper as returned by the Graph API.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GraphPaper {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    r#abstract: Option<String>,
    #[serde(default)]
    authors: Vec<GraphAuthor>,
    #[serde(default)]
    year: Option<i32>,
    #[serde(default)]
    venue: Option<String>,
    #[serde(default)]
    publication_venue: Option<PublicationVenue>,
    #[serde(default)]
    external_ids: Option<ExternalIds>,
    #[serde(default)]
    open_access_pdf: Option<OpenAccessPdf>,
    #[serde(default)]
    citation_count: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
struct GraphAuthor {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct PublicationVenue {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ExternalIds {
    #[serde(rename = "DOI", default)]
    doi: Option<String>,
    #[serde(rename = "ArXiv", default)]
    arxiv: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct OpenAccessPdf {
    #[serde(default)]
    url: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl GraphPaper {
    fn link(&self) -> Option<String> {
        if let Some(url) = non_empty(self.open_access_pdf.as_ref().and_then(|p| p.url.clone())) {
            return Some(url);
        }
        let ids = self.external_ids.as_ref()?;
        if let Some(arxiv) = non_empty(ids.arxiv.clone()) {
            return Some(format!("https://arxiv.org/pdf/{arxiv}.pdf"));
        }
        non_empty(ids.doi.clone()).map(|doi| format!("https://doi.org/{doi}"))
    }

    fn into_record(self) -> PaperRecord {
        let link = self.link();
        let publisher = non_empty(self.venue)
            .or_else(|| non_empty(self.publication_venue.and_then(|v| v.name)))
            .unwrap_or_else(|| UNKNOWN_VENUE.to_string());

        let mut record = PaperRecord::new(self.title.unwrap_or_default(), Source::SemanticScholar)
            .with_summary(non_empty(self.r#abstract).unwrap_or_else(|| NO_ABSTRACT.to_string()))
            .with_authors(self.authors.into_iter().filter_map(|a| non_empty(a.name)).collect())
            .with_year(Year::from(self.year))
            .with_link(link);

        if publisher != UNKNOWN_VENUE {
            record = record.with_category(publisher.clone());
        }
        record.citation_count = self.citation_count;
        record.with_publisher(publisher)
    }
}

/// Semantic Scholar search client.
#[derive(Debug, Clone)]
pub struct SemanticScholarSource {
    client: ApiClient,
    base_url: String,
    retry: RetryPolicy,
}

impl SemanticScholarSource {
    /// Create a source from configuration; sends `x-api-key` when a key is set.
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client creation fails.
    pub fn new(config: &Config) -> ClientResult<Self> {
        let headers: Vec<(&'static str, String)> =
            config.semantic_scholar_api_key.iter().map(|key| ("x-api-key", key.clone())).collect();
        if config.has_semantic_scholar_key() {
            info!("Using Semantic Scholar API key");
        }

        Ok(Self {
            client: ApiClient::new(&headers, config.request_timeout, config.connect_timeout)?,
            base_url: config.graph_api_url.clone(),
            retry: config.graph_retry,
        })
    }
}

#[async_trait]
impl PaperSource for SemanticScholarSource {
    fn source(&self) -> Source {
        Source::SemanticScholar
    }

    async fn search(&self, query: &str, limit: usize) -> ClientResult<Vec<PaperRecord>> {
        let url = format!("{}/paper/search", self.base_url);
        let params = [
            ("query", query.to_string()),
            ("limit", limit.clamp(1, MAX_LIMIT).to_string()),
            ("fields", SEARCH_FIELDS.to_string()),
        ];

        let response: SearchResponse = self
            .retry
            .run("semantic_scholar", || self.client.get_json(&url, &params))
            .await?;

        let records: Vec<PaperRecord> = response.data.into_iter().map(GraphPaper::into_record).collect();
        debug!(count = records.len(), "Semantic Scholar results");
        Ok(records)
    }
}
