//! DuckDuckGo web search source.
//!
//! Uses the HTML-only endpoint, which needs no JavaScript. Results are
//! filtered down to academic-looking hits and the missing metadata
//! (year, authors, venue) is guessed from the title and snippet.

use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use scraper::{Html, Selector};
use tracing::{debug, trace};
use url::Url;

use super::PaperSource;
use crate::client::{ApiClient, RetryPolicy};
use crate::config::Config;
use crate::error::{ClientError, ClientResult};
use crate::models::{PaperRecord, Source, Year};

/// Domains that almost always host papers.
const ACADEMIC_DOMAINS: &[&str] = &[
    "arxiv.org",
    "doi.org",
    "scholar.google",
    "researchgate.net",
    "semanticscholar.org",
    "ieee.org",
    "acm.org",
    "springer.com",
    "sciencedirect.com",
    "nature.com",
    "plos.org",
    "biorxiv.org",
    "medrxiv.org",
    "openreview.net",
    "proceedings.mlr.press",
    "jmlr.org",
    "neurips.cc",
    "aclweb.org",
    "cvf.com",
];

/// Title words that suggest a paper.
const ACADEMIC_KEYWORDS: &[&str] = &["paper", "research", "study", "analysis", "conference", "journal"];

/// Domain to publisher label, checked in order.
const PUBLISHERS: &[(&str, &str)] = &[
    ("arxiv.org", "arXiv"),
    ("ieee.org", "IEEE"),
    ("acm.org", "ACM"),
    ("springer.com", "Springer"),
    ("sciencedirect.com", "ScienceDirect"),
    ("nature.com", "Nature"),
    ("researchgate.net", "ResearchGate"),
    ("semanticscholar.org", "Semantic Scholar"),
    ("openreview.net", "OpenReview"),
    ("neurips.cc", "NeurIPS"),
    ("proceedings.mlr.press", "PMLR"),
    ("cvf.com", "CVF"),
];

/// Snippet words that name a venue.
const VENUE_KEYWORDS: &[&str] = &["conference", "proceedings", "journal", "symposium", "workshop"];

const SNIPPET_CHARS: usize = 500;
const MAX_AUTHORS: usize = 3;
const NO_SUMMARY: &str = "No summary available";
const WEB_CATEGORY: &str = "Web Search";

/// One organic result from the HTML page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebHit {
    /// Result title.
    pub title: String,
    /// Target URL with the redirect wrapper removed.
    pub url: String,
    /// Result snippet.
    pub snippet: String,
}

impl WebHit {
    /// True when the hit looks like a paper: academic domain, a PDF, or an
    /// academic word in the title.
    #[must_use]
    pub fn is_academic(&self) -> bool {
        let url = self.url.to_lowercase();
        let title = self.title.to_lowercase();

        ACADEMIC_DOMAINS.iter().any(|d| url.contains(d))
            || url.contains("pdf")
            || ACADEMIC_KEYWORDS.iter().any(|k| title.contains(k))
    }
}

/// Extract the actual URL from DuckDuckGo's redirect wrapper.
///
/// DDG wraps URLs like `//duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com&rut=...`.
fn unwrap_redirect(href: &str) -> Option<String> {
    let full_href = if href.starts_with("//") { format!("https:{href}") } else { href.to_string() };
    let parsed = Url::parse(&full_href).ok()?;

    if parsed.host_str().is_some_and(|h| h.ends_with("duckduckgo.com")) && parsed.path().starts_with("/l/") {
        parsed.query_pairs().find(|(key, _)| key == "uddg").map(|(_, value)| value.into_owned())
    } else {
        Some(full_href)
    }
}

/// Compiled selectors and patterns.
#[derive(Debug, Clone)]
struct Extractor {
    result: Selector,
    title: Selector,
    snippet: Selector,
    year: Regex,
    author: Regex,
    venues: Vec<(&'static str, Regex)>,
}

fn selector(css: &str) -> ClientResult<Selector> {
    Selector::parse(css).map_err(|e| ClientError::Html(format!("invalid selector {css}: {e:?}")))
}

fn pattern(re: &str) -> ClientResult<Regex> {
    Regex::new(re).map_err(|e| ClientError::Html(format!("invalid pattern {re}: {e}")))
}

impl Extractor {
    fn new() -> ClientResult<Self> {
        let venues = VENUE_KEYWORDS
            .iter()
            .map(|kw| pattern(&format!(r"(?i)(\w+\s+{kw})")).map(|re| (*kw, re)))
            .collect::<ClientResult<Vec<_>>>()?;

        Ok(Self {
            result: selector(
                ".result.results_links.results_links_deep:not(.result--ad), .web-result:not(.result--ad)",
            )?,
            title: selector(".result__a")?,
            snippet: selector(".result__snippet")?,
            year: pattern(r"\b(199\d|20[0-3]\d)\b")?,
            author: pattern(r"by\s+([A-Z][a-z]+(?:\s+[A-Z][a-z]+)*)")?,
            venues,
        })
    }

    /// Parse up to `max` organic results.
    fn parse_hits(&self, html: &str, max: usize) -> Vec<WebHit> {
        let document = Html::parse_document(html);
        let mut hits = Vec::new();

        for element in document.select(&self.result) {
            let Some(title_el) = element.select(&self.title).next() else {
                continue;
            };
            let title = title_el.text().collect::<String>().trim().to_string();
            if title.is_empty() {
                continue;
            }
            let Some(url) = title_el.value().attr("href").and_then(unwrap_redirect) else {
                continue;
            };
            let snippet = element
                .select(&self.snippet)
                .next()
                .map(|el| el.text().collect::<String>().trim().to_string())
                .unwrap_or_default();

            hits.push(WebHit { title, url, snippet });
            if hits.len() >= max {
                break;
            }
        }

        trace!(count = hits.len(), "DuckDuckGo hits parsed");
        hits
    }

    /// Latest year between 1990 and 2039 mentioned in the text.
    fn year(&self, text: &str) -> Year {
        self.year.find_iter(text).filter_map(|m| m.as_str().parse::<i32>().ok()).max().into()
    }

    /// Up to three `by Name Name` matches, or `["Unknown"]`.
    fn authors(&self, text: &str) -> Vec<String> {
        let authors: Vec<String> =
            self.author.captures_iter(text).take(MAX_AUTHORS).map(|c| c[1].to_string()).collect();
        if authors.is_empty() { vec!["Unknown".to_string()] } else { authors }
    }

    fn publisher(&self, url: &str, snippet: &str) -> String {
        let url = url.to_lowercase();
        if let Some((_, label)) = PUBLISHERS.iter().find(|(domain, _)| url.contains(domain)) {
            return (*label).to_string();
        }

        let lower = snippet.to_lowercase();
        for (keyword, re) in &self.venues {
            if lower.contains(keyword) {
                if let Some(m) = re.captures(snippet) {
                    return m[1].to_string();
                }
            }
        }
        "Web".to_string()
    }

    fn record(&self, hit: WebHit) -> PaperRecord {
        let year = self.year(&format!("{} {}", hit.title, hit.snippet));
        let authors = self.authors(&hit.snippet);
        let publisher = self.publisher(&hit.url, &hit.snippet);
        let summary = if hit.snippet.is_empty() {
            NO_SUMMARY.to_string()
        } else {
            hit.snippet.chars().take(SNIPPET_CHARS).collect()
        };

        PaperRecord::new(hit.title, Source::DuckDuckGo)
            .with_summary(summary)
            .with_authors(authors)
            .with_year(year)
            .with_publisher(publisher)
            .with_category(WEB_CATEGORY)
            .with_link(Some(hit.url))
    }

    /// Parse a results page into at most `limit` academic records.
    fn extract(&self, html: &str, limit: usize) -> Vec<PaperRecord> {
        self.parse_hits(html, limit.saturating_mul(3))
            .into_iter()
            .filter(WebHit::is_academic)
            .take(limit)
            .map(|hit| self.record(hit))
            .collect()
    }
}

/// DuckDuckGo search client.
#[derive(Debug, Clone)]
pub struct DuckDuckGoSource {
    client: ApiClient,
    url: String,
    retry: RetryPolicy,
    pacing: Duration,
    extractor: Extractor,
}

impl DuckDuckGoSource {
    /// Create a source from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client creation fails.
    pub fn new(config: &Config) -> ClientResult<Self> {
        Ok(Self {
            client: ApiClient::new(
                &[("accept-language", "en-US,en;q=0.9".to_string())],
                config.request_timeout,
                config.connect_timeout,
            )?,
            url: config.duckduckgo_url.clone(),
            retry: config.web_retry,
            pacing: config.web_pacing,
            extractor: Extractor::new()?,
        })
    }
}

#[async_trait]
impl PaperSource for DuckDuckGoSource {
    fn source(&self) -> Source {
        Source::DuckDuckGo
    }

    async fn search(&self, query: &str, limit: usize) -> ClientResult<Vec<PaperRecord>> {
        let params = [("q", format!("{query} research paper pdf"))];

        let result = self.retry.run("duckduckgo", || self.client.get_text(&self.url, &params)).await;
        tokio::time::sleep(self.pacing).await;

        let records = self.extractor.extract(&result?, limit);
        debug!(count = records.len(), "DuckDuckGo results");
        Ok(records)
    }
}
