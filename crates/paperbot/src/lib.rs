//! paperbot
//!
//! Searches Semantic Scholar, arXiv and DuckDuckGo for papers, merges the
//! results by title, optionally summarizes them with Gemini, and files
//! each paper as a page in a fresh Notion database.
//!
//! # Features
//!
//! - **Three sources**: queried sequentially, higher-priority sources win ties
//! - **Batch summaries**: one AI call for the whole result set
//! - **Query adaptation**: optional per-engine rewrite of the query
//! - **Bounded retries**: one shared retry policy for every collaborator
//!
//! # Example
//!
//! ```no_run
//! use paperbot::{Aggregator, config::Config, models::SourceQueries, sources::all_sources};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let aggregator = Aggregator::new(all_sources(&config)?);
//!     let papers = aggregator.aggregate(&SourceQueries::uniform("graph neural networks"), 20).await;
//!     println!("{} papers", papers.len());
//!     Ok(())
//! }
//! ```

pub mod aggregate;
pub mod client;
pub mod config;
pub mod error;
pub mod formatters;
pub mod llm;
pub mod models;
pub mod notion;
pub mod pipeline;
pub mod sources;

pub use aggregate::{Aggregator, SourceOutcome, merge_unique};
pub use config::Config;
pub use error::{ClientError, ConfigError, PersistError};
pub use pipeline::{Pipeline, RunReport};
