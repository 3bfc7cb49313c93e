//! arXiv Atom API source.

use async_trait::async_trait;
use chrono::{DateTime, Datelike};
use serde::Deserialize;
use tracing::debug;

use super::PaperSource;
use crate::client::{ApiClient, RetryPolicy};
use crate::config::Config;
use crate::error::ClientResult;
use crate::models::{PaperRecord, Source, Year};

/// Atom feed returned by `/query`.
#[derive(Debug, Deserialize)]
struct Feed {
    #[serde(rename = "entry", default)]
    entries: Vec<Entry>,
}

/// One paper in the feed.
#[derive(Debug, Deserialize)]
struct Entry {
    /// Abstract page URL, e.g. `http://arxiv.org/abs/1706.03762v7`.
    #[serde(default)]
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    summary: String,
    /// RFC 3339 timestamp of the first version.
    #[serde(default)]
    published: Option<String>,
    #[serde(rename = "author", default)]
    authors: Vec<Author>,
    #[serde(rename = "link", default)]
    links: Vec<Link>,
    /// `<arxiv:primary_category term="cs.CL"/>`
    #[serde(default)]
    primary_category: Option<Category>,
}

#[derive(Debug, Deserialize)]
struct Author {
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct Link {
    #[serde(rename = "@href", default)]
    href: String,
    #[serde(rename = "@title", default)]
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Category {
    #[serde(rename = "@term", default)]
    term: String,
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

impl Entry {
    fn pdf_link(&self) -> Option<String> {
        self.links
            .iter()
            .find(|l| l.title.as_deref() == Some("pdf") && !l.href.is_empty())
            .map(|l| l.href.clone())
    }

    fn year(&self) -> Year {
        self.published
            .as_deref()
            .and_then(|p| DateTime::parse_from_rfc3339(p.trim()).ok())
            .map_or(Year::Unknown, |dt| Year::Known(dt.year()))
    }

    fn into_record(self) -> PaperRecord {
        let link = self.pdf_link().or_else(|| Some(self.id.trim().to_string()));
        let year = self.year();
        let category = self.primary_category.map(|c| c.term).filter(|t| !t.is_empty());

        let mut record = PaperRecord::new(collapse_whitespace(&self.title), Source::Arxiv)
            .with_summary(self.summary.trim().replace('\n', " "))
            .with_authors(self.authors.into_iter().map(|a| a.name.trim().to_string()).collect())
            .with_year(year)
            .with_link(link);

        if let Some(category) = category {
            record = record.with_publisher(category.clone()).with_category(category);
        }
        record
    }
}

/// Parse an Atom feed body into records.
fn parse_feed(body: &str) -> ClientResult<Vec<PaperRecord>> {
    let feed: Feed = quick_xml::de::from_str(body)?;
    Ok(feed.entries.into_iter().map(Entry::into_record).collect())
}

/// arXiv search client.
#[derive(Debug, Clone)]
pub struct ArxivSource {
    client: ApiClient,
    base_url: String,
    retry: RetryPolicy,
}

impl ArxivSource {
    /// Create a source from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client creation fails.
    pub fn new(config: &Config) -> ClientResult<Self> {
        Ok(Self {
            client: ApiClient::new(&[], config.request_timeout, config.connect_timeout)?,
            base_url: config.arxiv_api_url.clone(),
            retry: config.arxiv_retry,
        })
    }
}

#[async_trait]
impl PaperSource for ArxivSource {
    fn source(&self) -> Source {
        Source::Arxiv
    }

    async fn search(&self, query: &str, limit: usize) -> ClientResult<Vec<PaperRecord>> {
        let url = format!("{}/query", self.base_url);
        let params = [
            ("search_query", query.to_string()),
            ("start", "0".to_string()),
            ("max_results", limit.to_string()),
            ("sortBy", "relevance".to_string()),
            ("sortOrder", "descending".to_string()),
        ];

        let body = self.retry.run("arxiv", || self.client.get_text(&url, &params)).await?;
        let records = parse_feed(&body)?;
        debug!(count = records.len(), "arXiv results");
        Ok(records)
    }
}
