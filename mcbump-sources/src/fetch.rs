use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Why a source produced no value.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SourceError {
    #[error("timed out after {}ms", .timeout.as_millis())]
    Timeout { timeout: Duration },

    #[error("http status {status}")]
    Status { status: u16 },

    #[error("request failed: {message}")]
    Request { message: String },

    #[error("malformed payload: {message}")]
    Malformed { message: String },
}

/// Blocking JSON GET.
///
/// `Ok(None)` means the server answered 2xx with an empty body.
pub trait MetadataFetcher {
    fn get_json(
        &self,
        url: &str,
        timeout: Duration,
    ) -> Result<Option<serde_json::Value>, SourceError>;
}

/// `reqwest`-backed fetcher.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, SourceError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("mcbump/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SourceError::Request {
                message: e.to_string(),
            })?;
        Ok(Self { client })
    }
}

impl MetadataFetcher for HttpFetcher {
    fn get_json(
        &self,
        url: &str,
        timeout: Duration,
    ) -> Result<Option<serde_json::Value>, SourceError> {
        debug!(url, timeout_ms = timeout.as_millis() as u64, "GET");

        let resp = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .map_err(|e| request_error(e, timeout))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                status: status.as_u16(),
            });
        }

        let body = resp.text().map_err(|e| request_error(e, timeout))?;
        parse_body(&body)
    }
}

fn request_error(e: reqwest::Error, timeout: Duration) -> SourceError {
    if e.is_timeout() {
        SourceError::Timeout { timeout }
    } else {
        SourceError::Request {
            message: e.to_string(),
        }
    }
}

fn parse_body(body: &str) -> Result<Option<serde_json::Value>, SourceError> {
    if body.trim().is_empty() {
        return Ok(None);
    }
    serde_json::from_str(body)
        .map(Some)
        .map_err(|e| SourceError::Malformed {
            message: e.to_string(),
        })
}

/// Canned responses keyed by URL, for embedding and testing.
///
/// Unknown URLs answer with a 404.
#[derive(Debug, Clone, Default)]
pub struct InMemoryFetcher {
    responses: HashMap<String, Result<Option<serde_json::Value>, SourceError>>,
}

impl InMemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, url: impl Into<String>, body: serde_json::Value) -> Self {
        self.responses.insert(url.into(), Ok(Some(body)));
        self
    }

    pub fn respond_empty(mut self, url: impl Into<String>) -> Self {
        self.responses.insert(url.into(), Ok(None));
        self
    }

    pub fn fail(mut self, url: impl Into<String>, err: SourceError) -> Self {
        self.responses.insert(url.into(), Err(err));
        self
    }
}

impl MetadataFetcher for InMemoryFetcher {
    fn get_json(
        &self,
        url: &str,
        _timeout: Duration,
    ) -> Result<Option<serde_json::Value>, SourceError> {
        self.responses
            .get(url)
            .cloned()
            .unwrap_or(Err(SourceError::Status { status: 404 }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_body_is_no_data() {
        assert_eq!(parse_body("  \n"), Ok(None));
    }

    #[test]
    fn garbage_body_is_malformed() {
        let err = parse_body("<html>").unwrap_err();
        assert!(matches!(err, SourceError::Malformed { .. }));
    }

    #[test]
    fn in_memory_unknown_url_is_404() {
        let fetcher = InMemoryFetcher::new();
        let err = fetcher
            .get_json("https://example.invalid", Duration::from_secs(1))
            .unwrap_err();
        assert_eq!(err, SourceError::Status { status: 404 });
        assert_eq!(err.to_string(), "http status 404");
    }

    #[test]
    fn timeout_error_mentions_duration() {
        let err = SourceError::Timeout {
            timeout: Duration::from_secs(10),
        };
        assert_eq!(err.to_string(), "timed out after 10000ms");
    }
}
