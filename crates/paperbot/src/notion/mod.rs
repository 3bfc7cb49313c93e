//! Notion workspace: one database per run, one page per paper.
//!
//! Uses the data-source API (`Notion-Version: 2025-09-03`): a database is
//! created with only its title column, its first data source gets the
//! remaining columns, and pages are created under that data source.

pub mod properties;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::client::ApiClient;
use crate::config::Config;
use crate::config::api::NOTION_VERSION;
use crate::error::{ClientResult, PersistError};
use crate::models::{PageHandle, PaperRecord, Summary};

/// Destination for persisted records.
#[async_trait]
pub trait Workspace: Send + Sync {
    /// Persist one record with its summary and the model that wrote it.
    async fn persist(
        &self,
        record: &PaperRecord,
        summary: &Summary,
        generated_by: &str,
    ) -> Result<PageHandle, PersistError>;
}

/// Title for a run's database: `"<query> - YYYY-MM-DD"`.
#[must_use]
pub fn database_title(query: &str, date: NaiveDate) -> String {
    format!("{query} - {}", date.format("%Y-%m-%d"))
}

#[derive(Debug, Deserialize)]
struct CreatedDatabase {
    id: String,
    #[serde(default)]
    data_sources: Vec<DataSourceRef>,
}

#[derive(Debug, Deserialize)]
struct DataSourceRef {
    id: String,
}

#[derive(Debug, Deserialize)]
struct CreatedPage {
    id: String,
    #[serde(default)]
    url: Option<String>,
}

/// Low-level Notion API client.
#[derive(Debug, Clone)]
pub struct NotionClient {
    client: ApiClient,
    base_url: String,
}

impl NotionClient {
    /// Create a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client creation fails.
    pub fn new(config: &Config) -> ClientResult<Self> {
        let headers = [
            ("authorization", format!("Bearer {}", config.notion_api_key)),
            ("notion-version", NOTION_VERSION.to_string()),
        ];
        Ok(Self {
            client: ApiClient::new(&headers, config.request_timeout, config.connect_timeout)?,
            base_url: config.notion_api_url.clone(),
        })
    }

    /// Create a database under `parent_page_id` and return its data source id.
    ///
    /// A failure to add the extra columns is logged; the data source id is
    /// still returned.
    ///
    /// # Errors
    ///
    /// Returns error if the database cannot be created or the response has
    /// no data source.
    pub async fn create_database(&self, parent_page_id: &str, title: &str) -> Result<String, PersistError> {
        info!(title, parent = parent_page_id, "Creating database");
        let url = format!("{}/databases", self.base_url);
        let created: CreatedDatabase = self.client.post_json(&url, &properties::database_body(parent_page_id, title)).await?;

        let data_source_id = created
            .data_sources
            .into_iter()
            .next()
            .map(|ds| ds.id)
            .ok_or(PersistError::MissingField("data_sources[0].id"))?;
        info!(database = %created.id, data_source = %data_source_id, "Database created");

        let url = format!("{}/data_sources/{}", self.base_url, data_source_id);
        match self.client.patch_json::<_, Value>(&url, &properties::schema_body()).await {
            Ok(_) => debug!("Properties added to data source"),
            Err(e) => warn!(error = %e, "Could not add properties to data source"),
        }

        Ok(data_source_id)
    }

    /// Create a page with the given properties.
    ///
    /// # Errors
    ///
    /// Returns error if the page cannot be created.
    pub async fn create_page(&self, data_source_id: &str, props: Value) -> Result<PageHandle, PersistError> {
        let url = format!("{}/pages", self.base_url);
        let created: CreatedPage = self.client.post_json(&url, &properties::page_body(data_source_id, props)).await?;
        Ok(PageHandle { id: created.id, url: created.url })
    }

    /// Append child blocks to a page.
    ///
    /// # Errors
    ///
    /// Returns error if the blocks cannot be appended.
    pub async fn append_blocks(&self, page_id: &str, children: Vec<Value>) -> ClientResult<()> {
        let url = format!("{}/blocks/{}/children", self.base_url, page_id);
        let _: Value = self.client.patch_json(&url, &serde_json::json!({ "children": children })).await?;
        Ok(())
    }
}

/// [`Workspace`] writing into one Notion data source.
#[derive(Debug, Clone)]
pub struct NotionWorkspace {
    client: NotionClient,
    data_source_id: String,
}

impl NotionWorkspace {
    /// Workspace writing into an existing data source.
    #[must_use]
    pub fn new(client: NotionClient, data_source_id: impl Into<String>) -> Self {
        Self { client, data_source_id: data_source_id.into() }
    }
}

#[async_trait]
impl Workspace for NotionWorkspace {
    async fn persist(
        &self,
        record: &PaperRecord,
        summary: &Summary,
        generated_by: &str,
    ) -> Result<PageHandle, PersistError> {
        let props = properties::page_properties(record, summary, generated_by);
        let page = self.client.create_page(&self.data_source_id, props).await?;
        debug!(page = %page.id, title = %record.title, "Page created");

        let children = properties::content_blocks(summary);
        if !children.is_empty() {
            if let Err(e) = self.client.append_blocks(&page.id, children).await {
                warn!(page = %page.id, error = %e, "Could not add page content");
            }
        }
        Ok(page)
    }
}
