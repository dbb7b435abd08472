//! Error types for the Notifications subsystem

use thiserror::Error;

/// Notifications subsystem errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NotificationError {
    /// Message is missing a recipient or a subject
    #[error("Invalid message: {0}")]
    InvalidMessage(String),

    /// Provider could not be reached or answered 5xx/429
    #[error("Email provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// Provider refused the message
    #[error("Email provider rejected message ({status}): {message}")]
    Rejected { status: u16, message: String },
}

impl From<reqwest::Error> for NotificationError {
    fn from(e: reqwest::Error) -> Self {
        Self::ProviderUnavailable(e.to_string())
    }
}

/// Result type for notification operations
pub type NotificationResult<T> = Result<T, NotificationError>;
