//! Query adaptation: one raw query rewritten for each search engine.

use async_trait::async_trait;
use serde_json::Value;
use tracing::{info, warn};

use super::summarize::strip_code_fences;
use super::{GeminiClient, QueryAdapter};
use crate::models::SourceQueries;

/// Query adapter backed by [`GeminiClient`].
#[derive(Debug, Clone)]
pub struct GeminiQueryAdapter {
    client: GeminiClient,
}

impl GeminiQueryAdapter {
    /// Create an adapter; the client should already use the query model.
    #[must_use]
    pub fn new(client: GeminiClient) -> Self {
        Self { client }
    }
}

/// Build the rewrite prompt.
#[must_use]
pub fn build_prompt(raw: &str) -> String {
    format!(
        r#"You are a research paper search query optimizer. Given a user's search query, generate optimized search queries for three different academic search engines.

User Query: "{raw}"

1. Semantic Scholar: accepts natural language queries well. Include key concepts and context.
2. arXiv: needs concise, keyword-based queries. Use technical terms and focus on the core research topic.
3. DuckDuckGo: a web search engine. Write a natural query that includes "research paper" or "academic paper".

If the query is not in English, translate it to English. Keep the queries focused. For recent or latest requests, include temporal keywords.

Return ONLY a JSON object with this exact structure:
{{"semantic_scholar": "...", "arxiv": "...", "duckduckgo": "..."}}"#
    )
}

/// Read the rewritten queries, keeping `raw` for any missing or blank key.
#[must_use]
pub fn parse_queries(text: &str, raw: &str) -> SourceQueries {
    let mut queries = SourceQueries::uniform(raw);
    let object = match serde_json::from_str::<Value>(strip_code_fences(text)) {
        Ok(Value::Object(object)) => object,
        Ok(_) => {
            warn!("Query rewrite was not a JSON object, using the original query");
            return queries;
        }
        Err(e) => {
            warn!(error = %e, "Could not parse query rewrite, using the original query");
            return queries;
        }
    };

    let pick = |key: &str| {
        object.get(key).and_then(Value::as_str).map(str::trim).filter(|q| !q.is_empty()).map(str::to_string)
    };
    if let Some(q) = pick("semantic_scholar") {
        queries.semantic_scholar = q;
    }
    if let Some(q) = pick("arxiv") {
        queries.arxiv = q;
    }
    if let Some(q) = pick("duckduckgo") {
        queries.duckduckgo = q;
    }
    queries
}

#[async_trait]
impl QueryAdapter for GeminiQueryAdapter {
    async fn adapt(&self, raw: &str) -> SourceQueries {
        match self.client.generate(&build_prompt(raw)).await {
            Ok(generation) => {
                let queries = parse_queries(&generation.text, raw);
                info!(
                    semantic_scholar = %queries.semantic_scholar,
                    arxiv = %queries.arxiv,
                    duckduckgo = %queries.duckduckgo,
                    "Adapted query"
                );
                queries
            }
            Err(e) => {
                warn!(error = %e, "Query adaptation failed, using the original query");
                SourceQueries::uniform(raw)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_object() {
        let text = r#"```json
{"semantic_scholar": "graph neural networks for molecules", "arxiv": "GNN molecule", "duckduckgo": "graph neural network molecule research paper"}
```"#;
        let queries = parse_queries(text, "분자 그래프 신경망");
        assert_eq!(queries.semantic_scholar, "graph neural networks for molecules");
        assert_eq!(queries.arxiv, "GNN molecule");
        assert_eq!(queries.duckduckgo, "graph neural network molecule research paper");
        assert_eq!(queries.original, "분자 그래프 신경망");
    }

    #[test]
    fn test_missing_and_blank_keys_fall_back() {
        let queries = parse_queries(r#"{"arxiv": "  ", "duckduckgo": 42}"#, "raw");
        assert_eq!(queries, SourceQueries::uniform("raw"));

        let queries = parse_queries(r#"{"arxiv": "kw"}"#, "raw");
        assert_eq!(queries.arxiv, "kw");
        assert_eq!(queries.semantic_scholar, "raw");
    }

    #[test]
    fn test_garbage_falls_back() {
        assert_eq!(parse_queries("sorry", "raw"), SourceQueries::uniform("raw"));
        assert_eq!(parse_queries("[1, 2]", "raw"), SourceQueries::uniform("raw"));
    }

    #[test]
    fn test_prompt_quotes_query() {
        assert!(build_prompt("diffusion models").contains(r#"User Query: "diffusion models""#));
    }
}
