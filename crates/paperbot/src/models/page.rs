//! Handle to a persisted page.

/// Identifier of a page created in the workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageHandle {
    /// Workspace page id.
    pub id: String,

    /// Browser URL, when the workspace returns one.
    pub url: Option<String>,
}
