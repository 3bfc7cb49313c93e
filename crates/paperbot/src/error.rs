//! Error types for paperbot.
//!
//! Uses `thiserror` for structured error handling with automatic `From` implementations.

use std::time::Duration;

/// Errors from the HTTP client layer shared by every collaborator.
#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    /// HTTP transport error (connection, DNS, TLS, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Middleware error
    #[error("Middleware error: {0}")]
    Middleware(#[from] reqwest_middleware::Error),

    /// Rate limited by the remote API (429 response)
    #[error("Rate limited, retry after {retry_after:?}")]
    RateLimited {
        /// Suggested wait time before retry
        retry_after: Duration,
    },

    /// Usage quota exhausted (AI service)
    #[error("Quota exhausted: {0}")]
    QuotaExhausted(String),

    /// Resource not found (404 response)
    #[error("Resource not found: {resource}")]
    NotFound {
        /// Description of the missing resource
        resource: String,
    },

    /// Invalid request parameters (400 response)
    #[error("Bad request: {message}")]
    BadRequest {
        /// Error message from API
        message: String,
    },

    /// Credentials rejected or insufficient (401/403 response)
    #[error("Forbidden ({status}): {message}")]
    Forbidden {
        /// HTTP status code
        status: u16,
        /// Error message from API
        message: String,
    },

    /// Request timeout
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// JSON parsing error
    #[error("Failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),

    /// XML parsing error
    #[error("Failed to parse XML response: {0}")]
    Xml(#[from] quick_xml::DeError),

    /// HTML parsing error
    #[error("Failed to parse HTML response: {0}")]
    Html(String),

    /// Server error (5xx response)
    #[error("Server error ({status}): {message}")]
    Server {
        /// HTTP status code
        status: u16,
        /// Error message
        message: String,
    },

    /// Unexpected HTTP status
    #[error("Unexpected status {status}: {message}")]
    UnexpectedStatus {
        /// HTTP status code
        status: u16,
        /// Response body or message
        message: String,
    },
}

impl ClientError {
    /// Create a rate limited error with retry-after duration.
    #[must_use]
    pub fn rate_limited(seconds: u64) -> Self {
        Self::RateLimited { retry_after: Duration::from_secs(seconds) }
    }

    /// Create a not found error.
    #[must_use]
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound { resource: resource.into() }
    }

    /// Create a bad request error.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest { message: message.into() }
    }

    /// Create a server error.
    #[must_use]
    pub fn server(status: u16, message: impl Into<String>) -> Self {
        Self::Server { status, message: message.into() }
    }

    /// Returns true if this error is retryable.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RateLimited { .. } | Self::QuotaExhausted(_) | Self::Timeout(_) | Self::Server { .. }
        )
    }

    /// Returns true for rate-limit and quota signals only.
    #[must_use]
    pub fn is_rate_limit(&self) -> bool {
        match self {
            Self::RateLimited { .. } | Self::QuotaExhausted(_) => true,
            Self::Forbidden { message, .. } => message.to_lowercase().contains("quota"),
            _ => false,
        }
    }

    /// Get the retry-after duration if this is a rate limit error.
    #[must_use]
    pub const fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited { retry_after } => Some(*retry_after),
            _ => None,
        }
    }
}

/// Errors from persisting a record into the workspace.
#[derive(thiserror::Error, Debug)]
pub enum PersistError {
    /// The workspace API call failed
    #[error("Workspace request failed: {0}")]
    Client(#[from] ClientError),

    /// The workspace answered without a field we need
    #[error("Workspace response missing {0}")]
    MissingField(&'static str),
}

/// Errors from loading configuration.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// A required environment variable is absent or blank
    #[error("{name} not found in environment variables")]
    Missing {
        /// Variable name(s) the user should set
        name: &'static str,
    },
}

impl ConfigError {
    /// Shell hint shown next to the error.
    #[must_use]
    pub fn hint(&self) -> String {
        match self {
            Self::Missing { name } => {
                let var = name.split_whitespace().next().unwrap_or(name);
                format!("Please set: export {var}='your_value'")
            }
        }
    }
}

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_error_retryable() {
        assert!(ClientError::rate_limited(60).is_retryable());
        assert!(ClientError::Timeout(Duration::from_secs(30)).is_retryable());
        assert!(ClientError::server(500, "Internal error").is_retryable());
        assert!(ClientError::QuotaExhausted("daily".into()).is_retryable());

        assert!(!ClientError::not_found("paper123").is_retryable());
        assert!(!ClientError::bad_request("invalid query").is_retryable());
    }

    #[test]
    fn test_rate_limit_detects_quota_in_forbidden() {
        let err = ClientError::Forbidden { status: 403, message: "Quota exceeded for model".into() };
        assert!(err.is_rate_limit());
        assert!(!err.is_retryable());

        let err = ClientError::Forbidden { status: 401, message: "bad key".into() };
        assert!(!err.is_rate_limit());
        assert!(!ClientError::server(503, "down").is_rate_limit());
    }

    #[test]
    fn test_client_error_retry_after() {
        let err = ClientError::rate_limited(60);
        assert_eq!(err.retry_after(), Some(Duration::from_secs(60)));

        let err = ClientError::not_found("paper");
        assert_eq!(err.retry_after(), None);
    }

    #[test]
    fn test_config_error_hint_names_variable() {
        let err = ConfigError::Missing { name: "NOTION_PAGE_ID" };
        assert!(err.to_string().contains("NOTION_PAGE_ID"));
        assert_eq!(err.hint(), "Please set: export NOTION_PAGE_ID='your_value'");
    }
}
