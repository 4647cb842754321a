//! Error types for the media import pipeline
//!
//! None of these escape to the caller of an import: each one is turned
//! into exactly one user notification (see [`crate::notify`]).

use std::time::Duration;

use thiserror::Error;

/// Synchronous rejection before any network call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{name} is not an image ({mime})")]
    NotAnImage { name: String, mime: String },

    #[error("{name} is {size} bytes, the limit is {max}")]
    TooLarge { name: String, size: u64, max: u64 },

    #[error("{count} files submitted, the limit is {max}")]
    TooManyFiles { count: usize, max: usize },
}

/// Failure to turn an external URI into a file
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("Unsupported URI: {0}")]
    UnsupportedUri(String),

    #[error("Request to {uri} failed: {reason}")]
    Request { uri: String, reason: String },

    #[error("{uri} answered with status {status}")]
    Status { uri: String, status: u16 },

    #[error("{uri} returned an empty body")]
    Empty { uri: String },
}

/// Asynchronous upload failure
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UploadError {
    #[error("Upload timed out after {0:?}")]
    Timeout(Duration),

    #[error("Upload rejected: file too large")]
    SizeRejected,

    #[error("Upload rejected: unsupported format")]
    FormatRejected,

    #[error("Upload failed: {message}")]
    Unknown {
        status: Option<u16>,
        message: String,
        body: Option<String>,
    },
}

impl UploadError {
    pub fn unknown(message: impl Into<String>) -> Self {
        UploadError::Unknown {
            status: None,
            message: message.into(),
            body: None,
        }
    }

    /// Map a rejected upload response to a category
    pub fn from_response(status: u16, body: &str) -> Self {
        match status {
            413 => UploadError::SizeRejected,
            422 if body.contains("expected type") => UploadError::FormatRejected,
            422 if body.contains("expected size") => UploadError::SizeRejected,
            _ => UploadError::Unknown {
                status: Some(status),
                message: format!("unexpected response status {status}"),
                body: Some(body.to_string()),
            },
        }
    }
}

/// Local decode of an image header failed
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Could not read image: {0}")]
    Io(#[from] std::io::Error),

    #[error("Could not decode image: {0}")]
    Image(#[from] image::ImageError),

    #[error("Image has no pixels")]
    Empty,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_mapping() {
        assert_eq!(UploadError::from_response(413, ""), UploadError::SizeRejected);
        assert_eq!(
            UploadError::from_response(422, r#"{"message":"expected type image/*"}"#),
            UploadError::FormatRejected
        );
        assert_eq!(
            UploadError::from_response(422, "expected size <= 2000000"),
            UploadError::SizeRejected
        );
    }

    #[test]
    fn test_other_statuses_are_unknown() {
        let error = UploadError::from_response(422, "missing field");
        assert!(matches!(error, UploadError::Unknown { status: Some(422), .. }));

        let error = UploadError::from_response(500, "boom");
        assert_eq!(
            error,
            UploadError::Unknown {
                status: Some(500),
                message: "unexpected response status 500".to_string(),
                body: Some("boom".to_string()),
            }
        );
    }
}
