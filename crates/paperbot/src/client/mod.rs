//! Shared HTTP plumbing for every collaborator.
//!
//! Provides:
//! - [`ApiClient`]: reqwest client with tracing middleware and uniform
//!   status-code classification
//! - [`RetryPolicy`]: bounded retry with fixed or linear backoff

mod middleware;
mod retry;

pub use middleware::RequestTracing;
pub use retry::{Backoff, RetryPolicy};

use std::time::Duration;

use reqwest::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{ClientError, ClientResult};

/// User agent sent with every request.
pub const USER_AGENT: &str = concat!("paperbot/", env!("CARGO_PKG_VERSION"));

/// Longest error body kept in an error message.
const ERROR_BODY_LIMIT: usize = 500;

/// HTTP client used by one collaborator.
///
/// Holds the collaborator's default headers (credentials, API version)
/// so call sites only deal with URLs, parameters and bodies.
#[derive(Clone)]
pub struct ApiClient {
    /// HTTP client with middleware.
    client: ClientWithMiddleware,

    /// Request timeout, reported back in [`ClientError::Timeout`].
    timeout: Duration,
}

impl ApiClient {
    /// Build a client with the given default headers and timeouts.
    pub fn new(
        headers: &[(&'static str, String)],
        timeout: Duration,
        connect_timeout: Duration,
    ) -> ClientResult<Self> {
        let mut header_map = HeaderMap::new();
        for &(name, ref value) in headers {
            let value = HeaderValue::from_str(value)
                .map_err(|_| ClientError::bad_request(format!("invalid value for header {name}")))?;
            header_map.insert(HeaderName::from_static(name), value);
        }

        let client = Client::builder()
            .default_headers(header_map)
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .connect_timeout(connect_timeout)
            .gzip(true)
            .build()?;

        let client = ClientBuilder::new(client).with(RequestTracing).build();

        Ok(Self { client, timeout })
    }

    /// GET and decode a JSON body.
    pub async fn get_json<T>(&self, url: &str, params: &[(&str, String)]) -> ClientResult<T>
    where
        T: DeserializeOwned,
    {
        let text = self.get_text(url, params).await?;
        serde_json::from_str(&text).map_err(ClientError::from)
    }

    /// GET and return the raw body.
    pub async fn get_text(&self, url: &str, params: &[(&str, String)]) -> ClientResult<String> {
        let response = self
            .client
            .get(url)
            .query(params)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let response = Self::handle_response(response).await?;
        Ok(response.text().await?)
    }

    /// POST a JSON body and decode the JSON response.
    pub async fn post_json<B, T>(&self, url: &str, body: &B) -> ClientResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = serde_json::to_string(body)?;
        let response = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        Self::decode(response).await
    }

    /// PATCH a JSON body and decode the JSON response.
    pub async fn patch_json<B, T>(&self, url: &str, body: &B) -> ClientResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = serde_json::to_string(body)?;
        let response = self
            .client
            .patch(url)
            .header("Content-Type", "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        Self::decode(response).await
    }

    async fn decode<T>(response: reqwest::Response) -> ClientResult<T>
    where
        T: DeserializeOwned,
    {
        let response = Self::handle_response(response).await?;
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(ClientError::from)
    }

    fn transport_error(&self, err: reqwest_middleware::Error) -> ClientError {
        match err {
            reqwest_middleware::Error::Reqwest(e) if e.is_timeout() => ClientError::Timeout(self.timeout),
            reqwest_middleware::Error::Reqwest(e) => ClientError::Http(e),
            other => ClientError::Middleware(other),
        }
    }

    /// Handle API response status codes.
    async fn handle_response(response: reqwest::Response) -> ClientResult<reqwest::Response> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        match status.as_u16() {
            429 => {
                let retry_after = response
                    .headers()
                    .get("Retry-After")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(60);

                Err(ClientError::rate_limited(retry_after))
            }
            404 => Err(ClientError::not_found(error_body(response).await)),
            400 => Err(ClientError::bad_request(error_body(response).await)),
            401 | 403 => {
                Err(ClientError::Forbidden { status: status.as_u16(), message: error_body(response).await })
            }
            500..=599 => Err(ClientError::server(status.as_u16(), error_body(response).await)),
            _ => Err(ClientError::UnexpectedStatus {
                status: status.as_u16(),
                message: error_body(response).await,
            }),
        }
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient").field("timeout", &self.timeout).finish()
    }
}

async fn error_body(response: reqwest::Response) -> String {
    let text = response.text().await.unwrap_or_default();
    truncate_chars(&text, ERROR_BODY_LIMIT)
}

/// Truncate to at most `max` characters, never splitting a character.
#[must_use]
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((end, _)) => text[..end].to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_chars_respects_boundaries() {
        assert_eq!(truncate_chars("hello", 10), "hello");
        assert_eq!(truncate_chars("hello", 3), "hel");
        assert_eq!(truncate_chars("논문요약", 2), "논문");
        assert_eq!(truncate_chars("", 5), "");
    }

    #[test]
    fn test_client_builds_with_headers() {
        let client = ApiClient::new(
            &[("x-api-key", "secret".to_string())],
            Duration::from_secs(5),
            Duration::from_secs(1),
        );
        assert!(client.is_ok());
        let debug = format!("{:?}", client.unwrap());
        assert!(!debug.contains("secret"));
    }

    #[test]
    fn test_client_rejects_invalid_header_value() {
        let client =
            ApiClient::new(&[("x-api-key", "bad\nvalue".to_string())], Duration::from_secs(5), Duration::from_secs(1));
        assert!(matches!(client, Err(ClientError::BadRequest { .. })));
    }
}
