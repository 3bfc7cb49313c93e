//! JSON bodies for the Notion API.

use serde_json::{Value, json};

use crate::client::truncate_chars;
use crate::config::api::MAX_TEXT_CHARS;
use crate::models::{PaperRecord, Summary};

/// Longest multi-select option name Notion accepts.
const MAX_TAG_CHARS: usize = 100;

/// Heading above the detailed summary block.
pub const DETAILED_HEADING: &str = "Detailed Summary";

/// Heading above the architecture block.
pub const ARCHITECTURE_HEADING: &str = "Architecture";

fn text(content: &str) -> Value {
    json!([{ "type": "text", "text": { "content": truncate_chars(content, MAX_TEXT_CHARS) } }])
}

fn rich_text(content: &str) -> Value {
    json!({ "rich_text": text(content) })
}

/// Notion rejects commas in option names.
#[must_use]
pub fn tag_name(tag: &str) -> String {
    truncate_chars(&tag.replace(',', " "), MAX_TAG_CHARS).trim().to_string()
}

/// Body for creating a database with only its title property.
#[must_use]
pub fn database_body(parent_page_id: &str, title: &str) -> Value {
    json!({
        "parent": { "type": "page_id", "page_id": parent_page_id },
        "title": text(title),
        "properties": { "Name": { "title": {} } },
    })
}

/// Body adding the remaining columns to a data source.
#[must_use]
pub fn schema_body() -> Value {
    json!({
        "properties": {
            "Keyword": { "multi_select": {} },
            "Publisher & Year": { "rich_text": {} },
            "Link": { "url": {} },
            "Summary": { "rich_text": {} },
            "Generated By": { "rich_text": {} },
            "Source": { "rich_text": {} },
        }
    })
}

/// Page properties for one record.
#[must_use]
pub fn page_properties(record: &PaperRecord, summary: &Summary, generated_by: &str) -> Value {
    let mut seen = Vec::new();
    for tag in record.tags().iter().map(|t| tag_name(t)).filter(|t| !t.is_empty()) {
        if !seen.contains(&tag) {
            seen.push(tag);
        }
    }
    let keywords: Vec<Value> = seen.into_iter().map(|name| json!({ "name": name })).collect();

    json!({
        "Name": { "title": text(&record.title) },
        "Link": { "url": record.link },
        "Summary": rich_text(&summary.short),
        "Keyword": { "multi_select": keywords },
        "Publisher & Year": rich_text(&record.publisher_year()),
        "Generated By": rich_text(generated_by),
        "Source": rich_text(record.source.name()),
    })
}

/// Body creating a page inside a data source.
#[must_use]
pub fn page_body(data_source_id: &str, properties: Value) -> Value {
    json!({
        "parent": { "data_source_id": data_source_id },
        "properties": properties,
    })
}

fn block(kind: &str, content: &str) -> Value {
    json!({ "object": "block", "type": kind, kind: { "rich_text": text(content) } })
}

/// Heading and paragraph pairs for the non-empty long-form fields.
#[must_use]
pub fn content_blocks(summary: &Summary) -> Vec<Value> {
    let mut children = Vec::new();
    for (heading, body) in [(DETAILED_HEADING, &summary.detailed), (ARCHITECTURE_HEADING, &summary.architecture_note)] {
        if !body.trim().is_empty() {
            children.push(block("heading_2", heading));
            children.push(block("paragraph", body));
        }
    }
    children
}
