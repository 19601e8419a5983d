// Copyright 2025 CAIRN Team
//
// Licensed under the Apache License, Version 2.0 (the "License");

//! Error types for provider calls.

use std::time::Duration;

/// Provider error type.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The call did not complete within the configured timeout.
    #[error("Provider call timed out after {0:?}")]
    Timeout(Duration),

    /// The provider asked us to slow down.
    #[error("Provider rate limited the request: {0}")]
    RateLimited(String),

    /// Transport-level failure.
    #[error("Network error: {0}")]
    Network(String),

    /// The provider returned a non-success status.
    #[error("Provider returned status {status}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body or reason phrase.
        message: String,
    },

    /// Authentication or authorisation failure.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// The response could not be interpreted.
    #[error("Malformed provider response: {0}")]
    MalformedResponse(String),

    /// Empty input handed to a provider.
    #[error("Empty input provided")]
    EmptyInput,

    /// The provider returned an empty result.
    #[error("Provider returned an empty response")]
    EmptyResponse,

    /// Invalid provider configuration.
    #[error("Invalid provider configuration: {0}")]
    InvalidConfig(String),

    /// All retries were spent.
    #[error("{operation} failed for {subject} after {attempts} attempts: {source}")]
    Exhausted {
        /// Operation name (e.g. "embedding").
        operation: String,
        /// Identifier of the failing input.
        subject: String,
        /// Number of attempts made.
        attempts: u32,
        /// The last error observed.
        #[source]
        source: Box<ProviderError>,
    },
}

impl ProviderError {
    /// Whether retrying this error can help.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout(_) | Self::RateLimited(_) | Self::Network(_) => true,
            Self::Api { status, .. } => *status == 429 || *status >= 500,
            Self::Auth(_)
            | Self::MalformedResponse(_)
            | Self::EmptyInput
            | Self::EmptyResponse
            | Self::InvalidConfig(_)
            | Self::Exhausted { .. } => false,
        }
    }
}

/// Result type alias for provider operations.
pub type ProviderResult<T> = std::result::Result<T, ProviderError>;
