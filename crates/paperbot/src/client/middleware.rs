//! Middleware for the HTTP client.
//!
//! Every outbound request is logged with its status and latency. Query
//! strings are left out of the log line.

use std::time::Instant;

use http::Extensions;
use reqwest::{Request, Response};
use reqwest_middleware::{Middleware, Next};
use tracing::debug;

/// Logs method, host, path, status and elapsed time of each request.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestTracing;

#[async_trait::async_trait]
impl Middleware for RequestTracing {
    async fn handle(
        &self,
        req: Request,
        extensions: &mut Extensions,
        next: Next<'_>,
    ) -> reqwest_middleware::Result<Response> {
        let method = req.method().clone();
        let host = req.url().host_str().unwrap_or_default().to_string();
        let path = req.url().path().to_string();
        let started = Instant::now();

        let result = next.run(req, extensions).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match &result {
            Ok(response) => debug!(
                %method,
                %host,
                %path,
                status = response.status().as_u16(),
                elapsed_ms,
                "http request"
            ),
            Err(err) => debug!(%method, %host, %path, elapsed_ms, error = %err, "http request failed"),
        }

        result
    }
}
