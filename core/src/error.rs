//! Error types for the event API client.
//!
//! # Design
//! Every way a call can fail maps to exactly one `ApiError` variant, and each
//! variant keeps enough context to diagnose the failure: the underlying
//! cause, the status code, or the raw body. The executor never retries; the
//! caller decides what to do with each variant.

use std::error::Error as StdError;

use thiserror::Error;

/// Result type alias using `ApiError`.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Errors returned by `Client` operations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(#[source] serde_json::Error),

    /// The round trip failed below HTTP: connect, DNS, reset, body read.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The call's context was canceled before the round trip finished.
    #[error("request canceled")]
    Canceled,

    /// The call's context deadline elapsed before the round trip finished.
    #[error("request deadline exceeded")]
    Timeout,

    /// The server answered with anything other than 200.
    #[error("HTTP {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {source}")]
    Deserialization {
        #[source]
        source: serde_json::Error,
        body: String,
    },

    /// The client configuration was rejected when it was built.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ApiError {
    /// Status code of an `UnexpectedStatus` error.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::UnexpectedStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True for `Canceled` and `Timeout`.
    pub fn is_context_error(&self) -> bool {
        matches!(self, ApiError::Canceled | ApiError::Timeout)
    }
}

/// Failure reported by a `Transport`.
#[derive(Debug, Error)]
#[error("transport error: {message}")]
pub struct TransportError {
    message: String,
    #[source]
    source: Option<Box<dyn StdError + Send + Sync>>,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        message: impl Into<String>,
        source: impl Into<Box<dyn StdError + Send + Sync>>,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        let message = if err.is_connect() {
            "connection failed"
        } else if err.is_timeout() {
            "transport timed out"
        } else if err.is_body() || err.is_decode() {
            "failed to read response body"
        } else {
            "request failed"
        };
        Self::with_source(message, err)
    }
}
