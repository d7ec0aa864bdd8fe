// ZEN Error Types
// Copyright (c) 2026 Xing_The_Creator | ZEN

use std::time::Duration;
use thiserror::Error;

/// Failures of the outbound generation call.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Transport-level failure (connect, TLS, body read, client timeout).
    /// Stored without its URL so credentials never reach the logs.
    #[error("request failed: {0}")]
    Http(reqwest::Error),

    /// Provider answered with a non-success status
    #[error("provider returned {status}: {body}")]
    Status { status: u16, body: String },

    /// Response decoded but carried no generated text
    #[error("provider response contained no text")]
    EmptyResponse,

    /// Call exceeded the composer's deadline
    #[error("provider did not answer within {0:?}")]
    Timeout(Duration),
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        ProviderError::Http(e.without_url())
    }
}

/// Reasons a session could not be composed from the model.
///
/// Every variant is recovered by the fallback payload.
#[derive(Debug, Error)]
pub enum ComposeError {
    #[error("no provider API key configured")]
    MissingCredential,

    #[error("generation provider failed: {0}")]
    Provider(#[from] ProviderError),

    #[error("malformed provider response: {0}")]
    MalformedResponse(String),
}

impl From<serde_json::Error> for ComposeError {
    fn from(e: serde_json::Error) -> Self {
        ComposeError::MalformedResponse(e.to_string())
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown provider '{0}' (expected 'gemini' or 'openai')")]
    UnknownProvider(String),

    #[error("{var} must be a positive number, got '{value}'")]
    InvalidNumber { var: &'static str, value: String },

    #[error("'{0}' is not an IP address")]
    InvalidHost(String),

    #[error("{var} is not a valid URL: {source}")]
    InvalidUrl {
        var: &'static str,
        #[source]
        source: url::ParseError,
    },

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}
