//! Document retrieval by URL

use crate::config::DocumentConfig;
use crate::error::{QaError, Result};
use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use reqwest::{header::CONTENT_TYPE, Client, Url};
use std::time::Duration;
use tracing::{debug, error, warn};

/// Raw document body plus the content type the server reported
#[derive(Debug, Clone)]
pub struct FetchedDocument {
    pub bytes: Bytes,
    pub content_type: Option<String>,
    /// URL path (no query string), used to recognize the file type by extension
    pub path: Option<String>,
}

impl FetchedDocument {
    pub fn new(bytes: impl Into<Bytes>, content_type: Option<&str>) -> Self {
        Self {
            bytes: bytes.into(),
            content_type: content_type.map(str::to_string),
            path: None,
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }
}

/// Where policy documents come from
#[async_trait]
pub trait DocumentSource: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchedDocument>;
}

/// Downloads documents over HTTP(S) with retry and a size cap
pub struct HttpDocumentSource {
    http: Client,
    config: DocumentConfig,
}

impl HttpDocumentSource {
    pub fn new(config: DocumentConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| QaError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { http, config })
    }

    async fn fetch_once(&self, url: &Url) -> Result<FetchedDocument> {
        let mut response = self.http.get(url.clone()).send().await.map_err(map_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            return Err(QaError::UpstreamStatus {
                status: status.as_u16(),
            });
        }

        let limit = self.config.max_document_bytes;
        if let Some(len) = response.content_length() {
            if len as usize > limit {
                return Err(QaError::DocumentTooLarge {
                    size: len as usize,
                    limit,
                });
            }
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let mut body = BytesMut::new();
        while let Some(chunk) = response.chunk().await.map_err(map_reqwest)? {
            if body.len() + chunk.len() > limit {
                return Err(QaError::DocumentTooLarge {
                    size: body.len() + chunk.len(),
                    limit,
                });
            }
            body.extend_from_slice(&chunk);
        }

        debug!("Downloaded {} bytes ({:?})", body.len(), content_type);

        Ok(FetchedDocument {
            bytes: body.freeze(),
            content_type,
            path: Some(url.path().to_string()),
        })
    }

    /// Calculate exponential backoff
    fn calculate_backoff(&self, attempt: usize) -> Duration {
        let base = self.config.retry_backoff();
        let multiplier = 2_u32.saturating_pow((attempt - 1) as u32);
        base.saturating_mul(multiplier)
    }
}

#[async_trait]
impl DocumentSource for HttpDocumentSource {
    async fn fetch(&self, url: &str) -> Result<FetchedDocument> {
        let url = parse_document_url(url)?;

        let mut attempt = 0;
        loop {
            attempt += 1;

            match self.fetch_once(&url).await {
                Ok(document) => return Ok(document),
                Err(e) if e.is_transient() && attempt <= self.config.retry_attempts => {
                    let backoff = self.calculate_backoff(attempt);
                    warn!(
                        "Download attempt {} failed: {}, retrying in {:?}",
                        attempt, e, backoff
                    );
                    tokio::time::sleep(backoff).await;
                }
                Err(e) => {
                    error!("Download failed after {} attempts: {}", attempt, e);
                    return Err(e);
                }
            }
        }
    }
}

/// Only absolute http and https URLs are fetched
pub fn parse_document_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim())
        .map_err(|e| QaError::InvalidRequest(format!("Invalid document URL: {}", e)))?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(QaError::InvalidRequest(format!(
            "Unsupported document URL scheme: {}",
            other
        ))),
    }
}

fn map_reqwest(e: reqwest::Error) -> QaError {
    if e.is_timeout() {
        QaError::DownloadTimeout(e.to_string())
    } else {
        QaError::DownloadFailed(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calculate_backoff() {
        let source = HttpDocumentSource::new(DocumentConfig::default()).unwrap();

        assert_eq!(source.calculate_backoff(1), Duration::from_millis(200));
        assert_eq!(source.calculate_backoff(2), Duration::from_millis(400));
        assert_eq!(source.calculate_backoff(3), Duration::from_millis(800));
    }

    #[test]
    fn test_parse_document_url() {
        assert!(parse_document_url("https://example.com/policy.pdf?sv=1&sig=abc").is_ok());
        assert!(parse_document_url("  http://localhost:8080/doc  ").is_ok());
        assert!(matches!(
            parse_document_url("file:///etc/passwd"),
            Err(QaError::InvalidRequest(_))
        ));
        assert!(matches!(
            parse_document_url("not a url"),
            Err(QaError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_invalid_url_is_not_retried() {
        let config = DocumentConfig {
            retry_attempts: 5,
            retry_backoff_ms: 10_000,
            ..Default::default()
        };
        let source = HttpDocumentSource::new(config).unwrap();

        // Would take minutes if the invalid URL were retried with this backoff
        let result = tokio_test::block_on(source.fetch("ftp://example.com/policy.pdf"));
        assert!(matches!(result, Err(QaError::InvalidRequest(_))));
    }
}
