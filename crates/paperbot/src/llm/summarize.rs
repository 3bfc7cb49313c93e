//! Batch summarization: every paper in one prompt, one JSON array back.

use async_trait::async_trait;
use serde_json::Value;
use tracing::{info, warn};

use super::{GeminiClient, Summarizer};
use crate::models::{PaperRecord, Summary, SummaryBatch};

/// Authors listed per paper in the prompt.
const PROMPT_AUTHORS: usize = 3;

/// Summarizer backed by [`GeminiClient`].
#[derive(Debug, Clone)]
pub struct GeminiSummarizer {
    client: GeminiClient,
    language: String,
}

impl GeminiSummarizer {
    /// Create a summarizer writing in `language`.
    #[must_use]
    pub fn new(client: GeminiClient, language: impl Into<String>) -> Self {
        Self { client, language: language.into() }
    }
}

/// Build the batch prompt; papers are numbered from 1.
#[must_use]
pub fn build_prompt(records: &[PaperRecord], language: &str) -> String {
    let mut papers = String::new();
    for (idx, record) in records.iter().enumerate() {
        papers.push_str(&format!(
            "\n---\nPaper {}:\nTitle: {}\nAuthors: {}\nAbstract: {}\n",
            idx + 1,
            record.title,
            record.lead_authors(PROMPT_AUTHORS),
            record.summary,
        ));
    }

    format!(
        r#"Analyze each of the following {count} papers and answer with a JSON array only.
{papers}
For each paper produce a JSON object with these keys:
1. "paper_index": the paper number (starting at 1)
2. "short_summary": the core contribution in one sentence ({language})
3. "detailed_summary": a detailed summary in 2-3 paragraphs covering the problem, method and results ({language})
4. "architecture": a short description of the proposed architecture or method in 2-3 sentences ({language})

Output format (JSON array):
[
  {{"paper_index": 1, "short_summary": "...", "detailed_summary": "...", "architecture": "..."}},
  {{"paper_index": 2, "short_summary": "...", "detailed_summary": "...", "architecture": "..."}}
]
"#,
        count = records.len(),
    )
}

/// Remove markdown code fences around a JSON answer.
#[must_use]
pub fn strip_code_fences(text: &str) -> &str {
    let text = text.trim();
    let text = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"))
        .unwrap_or(text);
    text.strip_suffix("```").unwrap_or(text).trim()
}

fn string_field(item: &Value, key: &str) -> Option<String> {
    item.get(key).and_then(Value::as_str).map(str::to_string)
}

/// Map an AI answer onto `n` summaries.
///
/// Entries with an index outside `1..=n` are ignored and papers the
/// answer skipped keep a placeholder.
///
/// # Errors
///
/// Returns error if the answer is not a JSON array.
pub fn parse_summaries(text: &str, n: usize) -> Result<Vec<Summary>, serde_json::Error> {
    let items: Vec<Value> = serde_json::from_str(strip_code_fences(text))?;
    let mut summaries = vec![Summary::placeholder(); n];

    for item in &items {
        let Some(index) = item.get("paper_index").and_then(Value::as_u64) else {
            continue;
        };
        let Some(slot) = usize::try_from(index).ok().and_then(|i| i.checked_sub(1)).and_then(|i| summaries.get_mut(i))
        else {
            continue;
        };
        *slot = Summary {
            short: string_field(item, "short_summary").unwrap_or_else(|| Summary::failed().short),
            detailed: string_field(item, "detailed_summary").unwrap_or_default(),
            architecture_note: string_field(item, "architecture").unwrap_or_default(),
        };
    }
    Ok(summaries)
}

#[async_trait]
impl Summarizer for GeminiSummarizer {
    async fn summarize_batch(&self, records: &[PaperRecord]) -> SummaryBatch {
        if records.is_empty() {
            return SummaryBatch::placeholders(0);
        }

        info!(count = records.len(), model = %self.client.model(), "Summarizing papers in one batch");
        let prompt = build_prompt(records, &self.language);

        let generation = match self.client.generate(&prompt).await {
            Ok(generation) => generation,
            Err(e) => {
                warn!(error = %e, "Batch summary request failed");
                return SummaryBatch::placeholders(records.len());
            }
        };

        match parse_summaries(&generation.text, records.len()) {
            Ok(summaries) => SummaryBatch { summaries, model: generation.model },
            Err(e) => {
                let preview: String = generation.text.chars().take(500).collect();
                warn!(error = %e, response = %preview, "Could not parse batch summary");
                SummaryBatch { summaries: vec![Summary::failed(); records.len()], model: generation.model }
            }
        }
    }
}
