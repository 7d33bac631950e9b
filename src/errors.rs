/*!
 * Error types for the subforge application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

// Allow dead code - error types are for library consumers
#![allow(dead_code)]

use thiserror::Error;

/// Errors that can occur during subtitle parsing and serialization
#[derive(Error, Debug)]
pub enum SubtitleError {
    /// The container could not be parsed into a single valid cue.
    ///
    /// This is deliberately distinct from an empty-but-valid document: an
    /// empty "success" would be indistinguishable from a genuinely empty
    /// subtitle file.
    #[error("Malformed subtitle document: {0}")]
    MalformedDocument(String),

    /// A timestamp line could not be interpreted
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),
}

/// Errors that can occur when validating or applying a merge configuration
#[derive(Error, Debug)]
pub enum MergeError {
    /// Threshold must be a non-negative number of milliseconds
    #[error("Invalid merge threshold: {0} ms (must be >= 0)")]
    InvalidThreshold(i64),

    /// Color values must be 6 hex digits, with or without a leading '#'
    #[error("Invalid color value: {0:?} (expected 6 hex digits)")]
    InvalidColor(String),

    /// Error from subtitle processing
    #[error("Subtitle error: {0}")]
    Subtitle(#[from] SubtitleError),
}

/// Errors that can occur when working with provider APIs
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The request did not complete within the configured deadline
    #[error("Request timed out: {0}")]
    Timeout(String),
}

impl ProviderError {
    /// Short failure tag used when substituting placeholder text for a
    /// failed translation batch
    pub fn kind(&self) -> &'static str {
        match self {
            Self::RequestFailed(_) => "request",
            Self::ParseError(_) => "parse",
            Self::ApiError { .. } => "api",
            Self::ConnectionError(_) => "connection",
            Self::Timeout(_) => "timeout",
        }
    }
}

/// Errors that can occur during translation
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Error from the provider API
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// The provider returned an empty response body
    #[error("Empty response from provider")]
    EmptyResponse,
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from subtitle processing
    #[error("Subtitle error: {0}")]
    Subtitle(#[from] SubtitleError),

    /// Error from merge configuration or execution
    #[error("Merge error: {0}")]
    Merge(#[from] MergeError),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from translation
    #[error("Translation error: {0}")]
    Translation(#[from] TranslationError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
