//! Error handling and custom error types
//!
//! Every stage of an upload run fails fast into one of these variants; none
//! of them are retried inside the library.

use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("CDN API error on {endpoint}: {message}")]
    Protocol { endpoint: String, message: String },

    #[error("Upload failed with status code {status}: {body}")]
    Upload { status: u16, body: String },

    #[error("No upload URLs received from CDN for key {key}")]
    NoDestinations { key: String },

    #[error("Invalid path {path}: {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl Error {
    pub fn protocol(endpoint: &str, message: impl Into<String>) -> Self {
        Self::Protocol {
            endpoint: endpoint.to_string(),
            message: message.into(),
        }
    }

    pub fn invalid_path(path: &Path, reason: impl std::fmt::Display) -> Self {
        Self::InvalidPath {
            path: path.display().to_string(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_error_carries_endpoint_and_message() {
        let err = Error::protocol("/v2/getUploadUrls", "invalid token");
        assert_eq!(
            err.to_string(),
            "CDN API error on /v2/getUploadUrls: invalid token"
        );
    }

    #[test]
    fn test_invalid_path_display() {
        let err = Error::invalid_path(Path::new("dist/link"), "not a regular file or directory");
        assert!(err.to_string().contains("dist/link"));
        assert!(err.to_string().contains("not a regular file"));
    }
}
