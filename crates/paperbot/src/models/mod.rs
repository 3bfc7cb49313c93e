//! Data models shared across the pipeline.

mod page;
mod paper;
mod query;
mod summary;

pub use page::PageHandle;
pub use paper::{PaperRecord, Source, UNKNOWN_TITLE, Year};
pub use query::SourceQueries;
pub use summary::{NO_MODEL, Summary, SummaryBatch};
