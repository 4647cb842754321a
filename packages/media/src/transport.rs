//! # Remote storage transport
//!
//! - [`Uploader`]: sends one file to the storage endpoint and returns
//!   its storage key.
//! - [`Fetcher`]: turns an external URI into a file.
//!
//! Both are traits so an editor can be wired to a fake in tests; the
//! HTTP implementations talk to the real endpoint.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};

use crate::{FetchError, ImportCandidate, MediaConfig, UploadError};

const USER_AGENT: &str = concat!("ara-media/", env!("CARGO_PKG_VERSION"));

/// Body of one upload
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub file_name: String,
    pub mime: String,
    pub bytes: Arc<[u8]>,
}

impl From<&ImportCandidate> for UploadRequest {
    fn from(candidate: &ImportCandidate) -> Self {
        Self {
            file_name: candidate.name.clone(),
            mime: candidate.mime.clone(),
            bytes: Arc::clone(&candidate.bytes),
        }
    }
}

#[async_trait]
pub trait Uploader: Send + Sync {
    /// Upload a file, returning its storage key
    async fn upload(&self, request: &UploadRequest) -> Result<String, UploadError>;
}

#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Download an external URI as an import candidate
    async fn fetch(&self, uri: &str) -> Result<ImportCandidate, FetchError>;
}

/// Multipart uploader for the storage endpoint
#[derive(Debug, Clone)]
pub struct HttpUploader {
    client: reqwest::Client,
    endpoint: String,
    timeout: Duration,
}

impl HttpUploader {
    pub fn new(config: &MediaConfig) -> Result<Self, UploadError> {
        let timeout = config.upload_timeout();
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| UploadError::unknown(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: config.upload_url.clone(),
            timeout,
        })
    }

    fn transport_error(&self, error: reqwest::Error) -> UploadError {
        if error.is_timeout() {
            UploadError::Timeout(self.timeout)
        } else {
            UploadError::Unknown {
                status: error.status().map(|s| s.as_u16()),
                message: error.to_string(),
                body: None,
            }
        }
    }
}

#[async_trait]
impl Uploader for HttpUploader {
    async fn upload(&self, request: &UploadRequest) -> Result<String, UploadError> {
        // Percent-encode so non-ASCII names survive the multipart header
        let file_name = urlencoding::encode(&request.file_name).into_owned();

        let part = Part::bytes(request.bytes.to_vec())
            .file_name(file_name)
            .mime_str(&request.mime)
            .map_err(|e| UploadError::unknown(format!("invalid mime type {}: {}", request.mime, e)))?;
        let form = Form::new().part("file", part);

        tracing::debug!(file = %request.file_name, size = request.bytes.len(), endpoint = %self.endpoint, "uploading");

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| self.transport_error(e))?;

        if !status.is_success() {
            return Err(UploadError::from_response(status.as_u16(), &body));
        }

        let key = body.trim();
        if key.is_empty() {
            return Err(UploadError::Unknown {
                status: Some(status.as_u16()),
                message: "endpoint returned an empty storage key".to_string(),
                body: Some(body.clone()),
            });
        }

        Ok(key.to_string())
    }
}

/// Fetches external images over HTTP(S)
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(config: &MediaConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.upload_timeout())
            .build()
            .map_err(|e| FetchError::Request {
                uri: String::new(),
                reason: e.to_string(),
            })?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, uri: &str) -> Result<ImportCandidate, FetchError> {
        if !(uri.starts_with("http://") || uri.starts_with("https://")) {
            return Err(FetchError::UnsupportedUri(uri.to_string()));
        }

        let request_error = |e: reqwest::Error| FetchError::Request {
            uri: uri.to_string(),
            reason: e.to_string(),
        };

        let response = self.client.get(uri).send().await.map_err(request_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                uri: uri.to_string(),
                status: status.as_u16(),
            });
        }

        let mime = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(';').next())
            .map(|value| value.trim().to_string())
            .unwrap_or_else(|| "application/octet-stream".to_string());

        let bytes = response.bytes().await.map_err(request_error)?;
        if bytes.is_empty() {
            return Err(FetchError::Empty { uri: uri.to_string() });
        }

        Ok(ImportCandidate::external(uri, mime, bytes.to_vec()))
    }
}
