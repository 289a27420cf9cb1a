// src/error.rs
// =============================================================================
// This module defines the one error type every export step returns.
//
// The policy is simple: nothing is retried and nothing is recovered. The first
// failure travels up through `?` to main.rs, which prints it and exits.
//
// Rust concepts:
// - thiserror: Derives std::error::Error and Display from attributes
// - #[source]: Links an error to the lower-level error that caused it
// =============================================================================

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while fetching, decoding, or writing an export.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The API or the CDN answered with a non-success status code.
    #[error("{url} returned status code {status} ({reason})")]
    RemoteRequest {
        url: String,
        status: u16,
        reason: String,
    },

    /// The request never got a usable response (DNS, TLS, broken body, ...).
    #[error("request to {url} failed")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// A payload did not contain a field we rely on.
    #[error("missing field `{field}` in {context}")]
    MissingField { field: &'static str, context: String },

    /// A payload had the field but not the shape we expected.
    #[error("could not decode {context}")]
    Decode {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// A changed file's content was not base64-encoded UTF-8 text.
    #[error("could not decode contents of {path}: {message}")]
    Content { path: String, message: String },

    /// Reading or writing the output folder failed.
    #[error("I/O error on {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The repository identifier is not of the form `owner/name`.
    #[error("invalid repository identifier: {0} (expected owner/name)")]
    InvalidRepository(String),
}

impl ExportError {
    /// Builds a `RemoteRequest` error from a failed response's status line.
    pub fn remote(url: &str, status: reqwest::StatusCode) -> Self {
        ExportError::RemoteRequest {
            url: url.to_string(),
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("unknown").to_string(),
        }
    }

    /// Wraps a reqwest error together with the URL it was talking to.
    pub fn transport(url: &str, source: reqwest::Error) -> Self {
        ExportError::Transport {
            url: url.to_string(),
            source,
        }
    }

    /// Wraps a filesystem error together with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ExportError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Shorthand used by every module in the crate.
pub type Result<T> = std::result::Result<T, ExportError>;
