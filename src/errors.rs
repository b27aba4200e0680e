/*!
 * Error types for the yasg application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors that can occur when working with translation provider APIs
#[derive(Error, Debug, Clone, PartialEq)]
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

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// The service's usage quota is used up
    #[error("Quota exceeded: {0}")]
    QuotaExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// The provider returned a different number of translations than it was sent
    #[error("Expected {expected} translations, received {actual}")]
    ResponseMismatch {
        /// Number of texts sent
        expected: usize,
        /// Number of translations returned
        actual: usize,
    },
}

impl ProviderError {
    /// Whether this error means the service's usage limit was reached.
    ///
    /// Structured variants are checked first. Any other error is matched on its
    /// message for the substrings "quota" or "limit", case-insensitively.
    pub fn is_quota_exhausted(&self) -> bool {
        match self {
            Self::QuotaExceeded(_) | Self::RateLimitExceeded(_) => true,
            Self::ResponseMismatch { .. } => false,
            other => {
                let message = other.to_string().to_lowercase();
                message.contains("quota") || message.contains("limit")
            }
        }
    }
}

/// Malformed timing input for the segmentation passes
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SubtitleError {
    /// An item ends before it starts
    #[error("Invalid time range for item {index}: end {end}s < start {start}s")]
    InvalidTimeRange {
        /// Position of the offending item in its input list
        index: usize,
        /// Start time in seconds
        start: f64,
        /// End time in seconds
        end: f64,
    },

    /// An item carries a negative or non-finite time
    #[error("Invalid time for item {index}: {value}")]
    NegativeTime {
        /// Position of the offending item in its input list
        index: usize,
        /// The offending value in seconds
        value: f64,
    },

    /// An item starts before its predecessor
    #[error("Item {index} starts at {start}s, before the previous item at {previous_start}s")]
    OutOfOrder {
        /// Position of the offending item in its input list
        index: usize,
        /// Start time in seconds
        start: f64,
        /// Start time of the preceding item
        previous_start: f64,
    },

    /// A timestamp string could not be parsed
    #[error("Invalid timestamp format: {0}")]
    InvalidTimestamp(String),
}

/// Errors that can occur during translation
#[derive(Error, Debug)]
pub enum TranslationError {
    /// The provider reported an exhausted quota; never retried
    #[error("Translation quota exceeded on batch {batch_index} (attempt {attempt}): {message}")]
    QuotaExceeded {
        /// Zero-based batch index
        batch_index: usize,
        /// One-based attempt on which the quota error occurred
        attempt: u32,
        /// Underlying provider message
        message: String,
    },

    /// A batch kept failing until its retries were exhausted
    #[error("Translation of batch {batch_index} failed after {attempts} attempts: {message}")]
    BatchFailed {
        /// Zero-based batch index
        batch_index: usize,
        /// Number of attempts made
        attempts: u32,
        /// Message of the last failure
        message: String,
    },

    /// Error from the provider API
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error with subtitle processing
    #[error("Subtitle error: {0}")]
    Subtitle(#[from] SubtitleError),
}

impl TranslationError {
    /// Whether the error is the fatal quota condition
    pub fn is_quota_exceeded(&self) -> bool {
        matches!(self, Self::QuotaExceeded { .. })
    }
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// The recognizer output could not be obtained or read
    #[error("Recognition error: {0}")]
    Recognition(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from subtitle processing
    #[error("Subtitle error: {0}")]
    Subtitle(#[from] SubtitleError),

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
