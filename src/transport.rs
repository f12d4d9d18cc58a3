//! Request execution and status mapping.

use bytes::Bytes;
use reqwest::{Method, StatusCode};

use crate::client::GitlabClient;
use crate::error::{GitlabError, Result};
use crate::pagination::Pagination;
use crate::request::RequestSpec;

const SNIPPET_LEN: usize = 256;

/// A successful response, read fully into memory.
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// HTTP status code (always below 400).
    pub status: StatusCode,
    /// Response body.
    pub body: Bytes,
    /// Pagination parsed from the `Link` header.
    pub pagination: Pagination,
}

/// What a [`RequestLogger`] sees for each executed request.
#[derive(Debug)]
pub struct RequestRecord<'a> {
    pub method: &'a Method,
    pub path: &'a str,
    /// Form body or query string sent with the request.
    pub params: Option<&'a str>,
    /// Status code, when a response arrived.
    pub status: Option<u16>,
    /// Leading part of the response body.
    pub body_snippet: Option<&'a str>,
    pub error: Option<&'a GitlabError>,
}

/// Observer notified once per executed request.
///
/// Loggers only observe: whatever they do, the result handed back to the
/// caller is unchanged.
pub trait RequestLogger: Send + Sync {
    fn log(&self, record: &RequestRecord<'_>);
}

/// A [`RequestLogger`] that forwards records to `tracing` at `info` level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl RequestLogger for TracingLogger {
    fn log(&self, record: &RequestRecord<'_>) {
        tracing::info!(
            method = %record.method,
            path = record.path,
            params = record.params.unwrap_or(""),
            status = ?record.status,
            body = record.body_snippet.unwrap_or(""),
            error = ?record.error,
            "gitlab request"
        );
    }
}

impl GitlabClient {
    /// Execute a built request.
    ///
    /// The response body is read fully and the `Link` header is parsed
    /// whatever the status. Nothing is retried.
    ///
    /// # Errors
    ///
    /// - [`GitlabError::Network`] if the request could not be sent or the
    ///   body could not be read.
    /// - [`GitlabError::Server`] for a status of 400 or above, with the
    ///   trimmed body.
    #[tracing::instrument(skip(self, spec), fields(method = %spec.method(), path = %spec.path()))]
    pub async fn execute(&self, spec: RequestSpec) -> Result<RawResponse> {
        let Some(logger) = self.logger() else {
            return self.round_trip(spec).await;
        };

        let method = spec.method().clone();
        let path = spec.path().to_string();
        let params = spec.params_text();

        let result = self.round_trip(spec).await;

        let snippet = result.as_ref().ok().map(|r| body_snippet(&r.body));
        logger.log(&RequestRecord {
            method: &method,
            path: &path,
            params: params.as_deref(),
            status: match &result {
                Ok(response) => Some(response.status.as_u16()),
                Err(err) => err.status_code(),
            },
            body_snippet: match &result {
                Ok(_) => snippet.as_deref(),
                Err(err) => err.error_body(),
            },
            error: result.as_ref().err(),
        });

        result
    }

    async fn round_trip(&self, spec: RequestSpec) -> Result<RawResponse> {
        let request = spec.into_request()?;
        let url = request.url().to_string();

        let response = self.http().execute(request).await?;
        let status = response.status();
        let pagination = Pagination::from_headers(response.headers());
        let body = response.bytes().await?;

        tracing::debug!(status = status.as_u16(), bytes = body.len(), "response received");

        if status.as_u16() >= 400 {
            return Err(GitlabError::Server {
                status: status.as_u16(),
                url,
                body: String::from_utf8_lossy(&body).trim().to_string(),
            });
        }

        Ok(RawResponse {
            status,
            body,
            pagination,
        })
    }
}

fn body_snippet(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    match text.char_indices().nth(SNIPPET_LEN) {
        Some((end, _)) => format!("{}...", &text[..end]),
        None => text.into_owned(),
    }
}
