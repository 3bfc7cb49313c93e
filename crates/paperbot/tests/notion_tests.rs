//! Notion client and workspace against a mock server.

use paperbot::config::Config;
use paperbot::error::{ClientError, PersistError};
use paperbot::models::{PaperRecord, Source, Summary, Year};
use paperbot::notion::{NotionClient, NotionWorkspace, Workspace};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn notion(server: &MockServer) -> NotionClient {
    NotionClient::new(&Config::for_testing(&server.uri())).unwrap()
}

fn record() -> PaperRecord {
    PaperRecord::new("Graph Attention Networks", Source::Arxiv)
        .with_publisher("cs.LG")
        .with_year(Year::Known(2017))
        .with_category("cs.LG")
        .with_link(Some("https://arxiv.org/pdf/1710.10903".into()))
}

fn summary() -> Summary {
    Summary {
        short: "Attention over graph neighbourhoods.".into(),
        detailed: "Masked self-attention layers on graphs.".into(),
        architecture_note: "Stacked GAT layers.".into(),
    }
}

// =============================================================================
// Database creation
// =============================================================================

#[tokio::test]
async fn test_create_database_returns_data_source() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/notion/v1/databases"))
        .and(header("authorization", "Bearer test-notion-key"))
        .and(header("notion-version", "2025-09-03"))
        .and(body_partial_json(serde_json::json!({
            "parent": {"type": "page_id", "page_id": "test-parent-page"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "object": "database",
            "id": "db-1",
            "data_sources": [{"id": "ds-1", "name": "gnn - 2026-01-01"}]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/notion/v1/data_sources/ds-1"))
        .and(body_partial_json(serde_json::json!({
            "properties": {"Generated By": {"rich_text": {}}}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "ds-1"})))
        .expect(1)
        .mount(&server)
        .await;

    let id = notion(&server).create_database("test-parent-page", "gnn - 2026-01-01").await.unwrap();
    assert_eq!(id, "ds-1");
}

#[tokio::test]
async fn test_schema_failure_still_returns_data_source() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/notion/v1/databases"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "db-1",
            "data_sources": [{"id": "ds-1"}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/notion/v1/data_sources/ds-1"))
        .respond_with(ResponseTemplate::new(400).set_body_string("validation_error"))
        .expect(1)
        .mount(&server)
        .await;

    let id = notion(&server).create_database("test-parent-page", "t").await.unwrap();
    assert_eq!(id, "ds-1");
}

#[tokio::test]
async fn test_database_without_data_source_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/notion/v1/databases"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "db-1"})))
        .mount(&server)
        .await;

    let err = notion(&server).create_database("p", "t").await.unwrap_err();
    assert!(matches!(err, PersistError::MissingField(_)));
}

#[tokio::test]
async fn test_rejected_token_fails_database_creation() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/notion/v1/databases"))
        .respond_with(ResponseTemplate::new(401).set_body_string("API token is invalid."))
        .mount(&server)
        .await;

    let err = notion(&server).create_database("p", "t").await.unwrap_err();
    assert!(matches!(err, PersistError::Client(ClientError::Forbidden { status: 401, .. })));
}

// =============================================================================
// Pages
// =============================================================================

#[tokio::test]
async fn test_persist_creates_page_and_content() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/notion/v1/pages"))
        .and(body_partial_json(serde_json::json!({
            "parent": {"data_source_id": "ds-1"},
            "properties": {
                "Link": {"url": "https://arxiv.org/pdf/1710.10903"},
                "Publisher & Year": {"rich_text": [{"text": {"content": "cs.LG (2017)"}}]},
                "Generated By": {"rich_text": [{"text": {"content": "gemini-3-flash-preview"}}]},
                "Source": {"rich_text": [{"text": {"content": "arXiv"}}]}
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "page-1",
            "url": "https://www.notion.so/page-1"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/notion/v1/blocks/page-1/children"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"results": []})))
        .expect(1)
        .mount(&server)
        .await;

    let workspace = NotionWorkspace::new(notion(&server), "ds-1");
    let page = workspace.persist(&record(), &summary(), "gemini-3-flash-preview").await.unwrap();

    assert_eq!(page.id, "page-1");
    assert_eq!(page.url.as_deref(), Some("https://www.notion.so/page-1"));
}

#[tokio::test]
async fn test_placeholder_summary_adds_no_content() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/notion/v1/pages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "page-2"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let workspace = NotionWorkspace::new(notion(&server), "ds-1");
    let page = workspace.persist(&record(), &Summary::placeholder(), "none").await.unwrap();
    assert_eq!(page.id, "page-2");
    assert!(page.url.is_none());
}

#[tokio::test]
async fn test_content_failure_keeps_page() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/notion/v1/pages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "page-3"})))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/notion/v1/blocks/page-3/children"))
        .respond_with(ResponseTemplate::new(400).set_body_string("body failed validation"))
        .expect(1)
        .mount(&server)
        .await;

    let workspace = NotionWorkspace::new(notion(&server), "ds-1");
    assert_eq!(workspace.persist(&record(), &summary(), "m").await.unwrap().id, "page-3");
}

#[tokio::test]
async fn test_page_rejection_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/notion/v1/pages"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Could not find data source"))
        .mount(&server)
        .await;

    let workspace = NotionWorkspace::new(notion(&server), "missing");
    let err = workspace.persist(&record(), &summary(), "m").await.unwrap_err();
    assert!(matches!(err, PersistError::Client(ClientError::NotFound { .. })));
}
