//! The normalized paper record shared by every source.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Title used when a source returns none.
pub const UNKNOWN_TITLE: &str = "Unknown Title";

/// One of the three paper-discovery services.
///
/// Variant order is the deduplication priority: when two sources return
/// the same title, the earlier variant wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Source {
    /// Semantic Scholar graph API.
    SemanticScholar,
    /// arXiv e-print repository.
    Arxiv,
    /// DuckDuckGo web search.
    DuckDuckGo,
}

impl Source {
    /// All sources in priority order.
    pub const ALL: [Self; 3] = [Self::SemanticScholar, Self::Arxiv, Self::DuckDuckGo];

    /// Display name, also written to the workspace.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::SemanticScholar => "Semantic Scholar",
            Self::Arxiv => "arXiv",
            Self::DuckDuckGo => "DuckDuckGo",
        }
    }

    /// Lower is queried first and wins ties.
    #[must_use]
    pub const fn priority(self) -> u8 {
        match self {
            Self::SemanticScholar => 0,
            Self::Arxiv => 1,
            Self::DuckDuckGo => 2,
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Publication year, or the `Unknown` sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Year {
    /// A known year.
    Known(i32),
    /// The source did not say.
    #[default]
    Unknown,
}

impl From<Option<i32>> for Year {
    fn from(year: Option<i32>) -> Self {
        year.map_or(Self::Unknown, Self::Known)
    }
}

impl fmt::Display for Year {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Known(year) => write!(f, "{year}"),
            Self::Unknown => f.write_str("Unknown"),
        }
    }
}

/// A discovered paper, normalized across sources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperRecord {
    /// Paper title; never empty.
    pub title: String,

    /// Abstract or search snippet.
    pub summary: String,

    /// Author names in order.
    pub authors: Vec<String>,

    /// Publication year.
    pub year: Year,

    /// Venue, category or domain-derived label.
    pub publisher: String,

    /// Tags for the workspace.
    pub categories: BTreeSet<String>,

    /// Canonical URL.
    pub link: Option<String>,

    /// Where the record came from.
    pub source: Source,

    /// Citation count (Semantic Scholar only).
    pub citation_count: Option<u32>,
}

impl PaperRecord {
    /// Create a record with the given title; a blank title becomes
    /// [`UNKNOWN_TITLE`].
    #[must_use]
    pub fn new(title: impl Into<String>, source: Source) -> Self {
        let title = title.into();
        let title = if title.trim().is_empty() { UNKNOWN_TITLE.to_string() } else { title };
        Self {
            title,
            summary: String::new(),
            authors: Vec::new(),
            year: Year::Unknown,
            publisher: String::new(),
            categories: BTreeSet::new(),
            link: None,
            source,
            citation_count: None,
        }
    }

    /// Deduplication key: the lower-cased title.
    #[must_use]
    pub fn dedup_key(&self) -> String {
        self.title.to_lowercase()
    }

    /// Workspace tags: the categories, or the publisher when there are none.
    #[must_use]
    pub fn tags(&self) -> Vec<String> {
        if self.categories.is_empty() && !self.publisher.is_empty() {
            return vec![self.publisher.clone()];
        }
        self.categories.iter().cloned().collect()
    }

    /// `"<publisher> (<year>)"`.
    #[must_use]
    pub fn publisher_year(&self) -> String {
        let publisher = if self.publisher.is_empty() { "Unknown" } else { &self.publisher };
        format!("{publisher} ({})", self.year)
    }

    /// First `n` author names.
    #[must_use]
    pub fn lead_authors(&self, n: usize) -> String {
        self.authors.iter().take(n).map(String::as_str).collect::<Vec<_>>().join(", ")
    }

    /// Builder-style summary setter.
    #[must_use]
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    /// Builder-style authors setter.
    #[must_use]
    pub fn with_authors(mut self, authors: Vec<String>) -> Self {
        self.authors = authors;
        self
    }

    /// Builder-style year setter.
    #[must_use]
    pub fn with_year(mut self, year: Year) -> Self {
        self.year = year;
        self
    }

    /// Builder-style publisher setter.
    #[must_use]
    pub fn with_publisher(mut self, publisher: impl Into<String>) -> Self {
        self.publisher = publisher.into();
        self
    }

    /// Builder-style category adder.
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.categories.insert(category.into());
        self
    }

    /// Builder-style link setter.
    #[must_use]
    pub fn with_link(mut self, link: Option<String>) -> Self {
        self.link = link.filter(|l| !l.is_empty());
        self
    }
}
