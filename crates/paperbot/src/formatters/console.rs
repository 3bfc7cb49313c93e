//! Plain-text formatting of records and run summaries.

use crate::aggregate::SourceOutcome;
use crate::client::truncate_chars;
use crate::models::PaperRecord;

/// Characters of a link shown in the listing.
const LINK_PREVIEW: usize = 50;

const RULE_WIDTH: usize = 60;

/// Format one record as a numbered listing entry.
#[must_use]
pub fn format_paper_line(record: &PaperRecord, index: usize) -> String {
    let mut output = format!("{index}. [{}] {}\n", record.source, record.title);

    let mut meta = vec![format!("Publisher: {}", record.publisher_year())];
    if let Some(citations) = record.citation_count {
        meta.push(format!("Citations: {citations}"));
    }
    output.push_str(&format!("   {}\n", meta.join(" | ")));

    if let Some(link) = &record.link {
        let preview = truncate_chars(link, LINK_PREVIEW);
        let ellipsis = if preview.len() < link.len() { "..." } else { "" };
        output.push_str(&format!("   Link: {preview}{ellipsis}\n"));
    }
    output
}

/// Format the merged listing.
#[must_use]
pub fn format_listing(records: &[PaperRecord]) -> String {
    if records.is_empty() {
        return "No papers found.".to_string();
    }

    let rule = "-".repeat(RULE_WIDTH);
    let mut output = format!("Found {} papers:\n\n", records.len());
    for (i, record) in records.iter().enumerate() {
        output.push_str(&format_paper_line(record, i + 1));
        output.push_str(&rule);
        output.push('\n');
    }
    output
}

/// Format per-source counts, one line each.
#[must_use]
pub fn format_outcomes(outcomes: &[SourceOutcome]) -> String {
    outcomes
        .iter()
        .map(|o| match &o.error {
            Some(error) => format!("  {}: failed ({error})", o.source),
            None => format!("  {}: {} found, {} new", o.source, o.fetched, o.added),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format the final line of a run.
#[must_use]
pub fn format_completion(saved: usize, failed: usize, database: &str) -> String {
    let mut output = format!("Completed! {saved} papers saved to '{database}'");
    if failed > 0 {
        output.push_str(&format!(" ({failed} failed)"));
    }
    output
}
