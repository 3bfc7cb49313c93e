//! Configuration for paperbot.
//!
//! Everything the collaborators need is read once at startup into a
//! [`Config`] and handed to each client constructor.

use std::time::Duration;

use crate::client::RetryPolicy;
use crate::error::ConfigError;

/// API configuration constants.
pub mod api {
    use std::time::Duration;

    /// Semantic Scholar Graph API endpoint.
    pub const GRAPH_API: &str = "https://api.semanticscholar.org/graph/v1";

    /// arXiv export API endpoint.
    pub const ARXIV_API: &str = "https://export.arxiv.org/api";

    /// DuckDuckGo HTML-only search endpoint.
    pub const DUCKDUCKGO_HTML: &str = "https://html.duckduckgo.com/html/";

    /// Gemini models endpoint.
    pub const GEMINI_API: &str = "https://generativelanguage.googleapis.com/v1beta/models";

    /// Notion API endpoint.
    pub const NOTION_API: &str = "https://api.notion.com/v1";

    /// Notion API version (data sources).
    pub const NOTION_VERSION: &str = "2025-09-03";

    /// Request timeout for search and workspace calls.
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

    /// Request timeout for AI generation (batch prompts are slow).
    pub const LLM_REQUEST_TIMEOUT: Duration = Duration::from_secs(180);

    /// Connection timeout.
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Pause after each successful generation.
    pub const LLM_PACING: Duration = Duration::from_secs(4);

    /// Pause after each web search.
    pub const WEB_PACING: Duration = Duration::from_millis(500);

    /// Primary summarization model.
    pub const PRIMARY_MODEL: &str = "gemini-3-flash-preview";

    /// Fallback model once the primary is rate limited.
    pub const FALLBACK_MODEL: &str = "gemini-2.5-pro";

    /// Model used to rewrite queries.
    pub const QUERY_MODEL: &str = "gemini-2.5-pro";

    /// Language the summaries are written in.
    pub const SUMMARY_LANGUAGE: &str = "Korean";

    /// Character cap for every rich-text value sent to the workspace.
    pub const MAX_TEXT_CHARS: usize = 2000;
}

/// Per-collaborator retry policies.
pub mod retry {
    use std::time::Duration;

    use crate::client::RetryPolicy;

    /// Semantic Scholar: 3 attempts, 2s apart.
    pub const GRAPH: RetryPolicy = RetryPolicy::fixed(3, Duration::from_secs(2));

    /// arXiv: 3 attempts, 3s apart.
    pub const ARXIV: RetryPolicy = RetryPolicy::fixed(3, Duration::from_secs(3));

    /// DuckDuckGo: 3 attempts, 2s apart.
    pub const WEB: RetryPolicy = RetryPolicy::fixed(3, Duration::from_secs(2));

    /// Gemini: 3 attempts, waiting 10s then 20s.
    pub const LLM: RetryPolicy = RetryPolicy::linear(3, Duration::from_secs(10));
}

/// Runtime configuration.
#[derive(Clone)]
pub struct Config {
    /// Notion integration token (required).
    pub notion_api_key: String,

    /// Parent page the run's database is created under (required).
    pub notion_parent_id: String,

    /// Gemini API key (optional, enables summaries and query adaptation).
    pub gemini_api_key: Option<String>,

    /// Semantic Scholar API key (optional, raises rate limits).
    pub semantic_scholar_api_key: Option<String>,

    /// Primary summarization model.
    pub gemini_model: String,

    /// Fallback summarization model.
    pub gemini_fallback_model: String,

    /// Query adaptation model.
    pub gemini_query_model: String,

    /// Language for generated summaries.
    pub summary_language: String,

    /// Base URL for Graph API (for testing with mock servers).
    pub graph_api_url: String,

    /// Base URL for the arXiv API.
    pub arxiv_api_url: String,

    /// DuckDuckGo HTML endpoint.
    pub duckduckgo_url: String,

    /// Base URL for Gemini models.
    pub gemini_api_url: String,

    /// Base URL for Notion.
    pub notion_api_url: String,

    /// Request timeout.
    pub request_timeout: Duration,

    /// Request timeout for AI generation.
    pub llm_request_timeout: Duration,

    /// Connection timeout.
    pub connect_timeout: Duration,

    /// Pause after each successful generation.
    pub llm_pacing: Duration,

    /// Pause after each web search.
    pub web_pacing: Duration,

    /// Retry policy for Semantic Scholar.
    pub graph_retry: RetryPolicy,

    /// Retry policy for arXiv.
    pub arxiv_retry: RetryPolicy,

    /// Retry policy for DuckDuckGo.
    pub web_retry: RetryPolicy,

    /// Retry policy for Gemini.
    pub llm_retry: RetryPolicy,
}

impl Config {
    /// Create a configuration with production endpoints and defaults.
    #[must_use]
    pub fn new(notion_api_key: impl Into<String>, notion_parent_id: impl Into<String>) -> Self {
        Self {
            notion_api_key: notion_api_key.into(),
            notion_parent_id: notion_parent_id.into(),
            gemini_api_key: None,
            semantic_scholar_api_key: None,
            gemini_model: api::PRIMARY_MODEL.to_string(),
            gemini_fallback_model: api::FALLBACK_MODEL.to_string(),
            gemini_query_model: api::QUERY_MODEL.to_string(),
            summary_language: api::SUMMARY_LANGUAGE.to_string(),
            graph_api_url: api::GRAPH_API.to_string(),
            arxiv_api_url: api::ARXIV_API.to_string(),
            duckduckgo_url: api::DUCKDUCKGO_HTML.to_string(),
            gemini_api_url: api::GEMINI_API.to_string(),
            notion_api_url: api::NOTION_API.to_string(),
            request_timeout: api::REQUEST_TIMEOUT,
            llm_request_timeout: api::LLM_REQUEST_TIMEOUT,
            connect_timeout: api::CONNECT_TIMEOUT,
            llm_pacing: api::LLM_PACING,
            web_pacing: api::WEB_PACING,
            graph_retry: retry::GRAPH,
            arxiv_retry: retry::ARXIV,
            web_retry: retry::WEB,
            llm_retry: retry::LLM,
        }
    }

    /// Create a test configuration with custom URLs for mock servers.
    #[must_use]
    pub fn for_testing(base_url: &str) -> Self {
        Self {
            gemini_api_key: Some("test-gemini-key".to_string()),
            graph_api_url: format!("{}/graph/v1", base_url),
            arxiv_api_url: format!("{}/arxiv", base_url),
            duckduckgo_url: format!("{}/html/", base_url),
            gemini_api_url: format!("{}/v1beta/models", base_url),
            notion_api_url: format!("{}/notion/v1", base_url),
            request_timeout: Duration::from_secs(5),
            llm_request_timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(2),
            llm_pacing: Duration::ZERO,
            web_pacing: Duration::ZERO, // No delay in tests
            graph_retry: retry::GRAPH.without_delay(),
            arxiv_retry: retry::ARXIV.without_delay(),
            web_retry: retry::WEB.without_delay(),
            llm_retry: retry::LLM.without_delay(),
            ..Self::new("test-notion-key", "test-parent-page")
        }
    }

    /// Create configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Create configuration from an arbitrary variable lookup.
    ///
    /// Blank values are treated as absent. `NOTION_DB_ID` is accepted as a
    /// legacy alias for `NOTION_PAGE_ID`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
        };

        let notion_api_key =
            get("NOTION_API_KEY").ok_or(ConfigError::Missing { name: "NOTION_API_KEY" })?;
        let notion_parent_id = get("NOTION_PAGE_ID")
            .or_else(|| get("NOTION_DB_ID"))
            .ok_or(ConfigError::Missing { name: "NOTION_PAGE_ID (or NOTION_DB_ID)" })?;

        let mut config = Self::new(notion_api_key, notion_parent_id);
        config.gemini_api_key = get("GEMINI_API_KEY");
        config.semantic_scholar_api_key = get("SEMANTIC_SCHOLAR_API_KEY");
        if let Some(model) = get("GEMINI_MODEL") {
            config.gemini_model = model;
        }
        if let Some(model) = get("GEMINI_FALLBACK_MODEL") {
            config.gemini_fallback_model = model;
        }
        if let Some(model) = get("GEMINI_QUERY_MODEL") {
            config.gemini_query_model = model;
        }
        if let Some(language) = get("SUMMARY_LANGUAGE") {
            config.summary_language = language;
        }
        Ok(config)
    }

    /// Check if an AI credential is configured.
    #[must_use]
    pub const fn has_gemini_key(&self) -> bool {
        self.gemini_api_key.is_some()
    }

    /// Check if a Semantic Scholar key is configured.
    #[must_use]
    pub const fn has_semantic_scholar_key(&self) -> bool {
        self.semantic_scholar_api_key.is_some()
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("notion_parent_id", &self.notion_parent_id)
            .field("has_gemini_key", &self.has_gemini_key())
            .field("has_semantic_scholar_key", &self.has_semantic_scholar_key())
            .field("gemini_model", &self.gemini_model)
            .field("gemini_fallback_model", &self.gemini_fallback_model)
            .field("summary_language", &self.summary_language)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            vars.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_required_variables() {
        let config = Config::from_lookup(lookup(&[
            ("NOTION_API_KEY", "secret"),
            ("NOTION_PAGE_ID", "page-1"),
        ]))
        .unwrap();
        assert_eq!(config.notion_parent_id, "page-1");
        assert!(!config.has_gemini_key());
        assert!(!config.has_semantic_scholar_key());
        assert_eq!(config.gemini_model, api::PRIMARY_MODEL);
    }

    #[test]
    fn test_missing_notion_key() {
        let err = Config::from_lookup(lookup(&[("NOTION_PAGE_ID", "page-1")])).unwrap_err();
        assert_eq!(err, ConfigError::Missing { name: "NOTION_API_KEY" });
    }

    #[test]
    fn test_missing_parent_page() {
        let err = Config::from_lookup(lookup(&[("NOTION_API_KEY", "secret")])).unwrap_err();
        assert!(err.to_string().contains("NOTION_PAGE_ID"));
    }

    #[test]
    fn test_legacy_database_alias() {
        let config = Config::from_lookup(lookup(&[
            ("NOTION_API_KEY", "secret"),
            ("NOTION_DB_ID", "legacy"),
        ]))
        .unwrap();
        assert_eq!(config.notion_parent_id, "legacy");
    }

    #[test]
    fn test_page_id_wins_over_alias() {
        let config = Config::from_lookup(lookup(&[
            ("NOTION_API_KEY", "secret"),
            ("NOTION_PAGE_ID", "page"),
            ("NOTION_DB_ID", "legacy"),
        ]))
        .unwrap();
        assert_eq!(config.notion_parent_id, "page");
    }

    #[test]
    fn test_blank_values_are_absent() {
        let config = Config::from_lookup(lookup(&[
            ("NOTION_API_KEY", "secret"),
            ("NOTION_PAGE_ID", "page"),
            ("GEMINI_API_KEY", "   "),
            ("GEMINI_MODEL", ""),
        ]))
        .unwrap();
        assert!(!config.has_gemini_key());
        assert_eq!(config.gemini_model, api::PRIMARY_MODEL);
    }

    #[test]
    fn test_optional_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("NOTION_API_KEY", "secret"),
            ("NOTION_PAGE_ID", "page"),
            ("GEMINI_API_KEY", "g"),
            ("SEMANTIC_SCHOLAR_API_KEY", "s2"),
            ("GEMINI_MODEL", "gemini-x"),
            ("SUMMARY_LANGUAGE", "English"),
        ]))
        .unwrap();
        assert!(config.has_gemini_key());
        assert!(config.has_semantic_scholar_key());
        assert_eq!(config.gemini_model, "gemini-x");
        assert_eq!(config.summary_language, "English");
    }

    #[test]
    fn test_debug_hides_secrets() {
        let mut config = Config::new("notion-secret", "page");
        config.gemini_api_key = Some("gemini-secret".into());
        let debug = format!("{config:?}");
        assert!(!debug.contains("notion-secret"));
        assert!(!debug.contains("gemini-secret"));
        assert!(debug.contains("has_gemini_key"));
    }

    #[test]
    fn test_testing_config_has_no_delays() {
        let config = Config::for_testing("http://localhost:1234");
        assert_eq!(config.graph_retry.base_delay, Duration::ZERO);
        assert_eq!(config.llm_pacing, Duration::ZERO);
        assert!(config.graph_api_url.starts_with("http://localhost:1234"));
    }
}
