//! Error types for the CLI

use thiserror::Error;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// Errors that can occur in the CLI
#[derive(Debug, Error)]
pub enum CliError {
    /// A journey check outside the page matcher failed (e.g. datastore state)
    #[error("Journey assertion failed: {message}")]
    JourneyAssertion {
        /// Error message
        message: String,
    },

    /// One or more journeys failed
    #[error("{failed} of {total} journey(s) failed")]
    JourneyFailed {
        /// Failed journeys
        failed: usize,
        /// Journeys run
        total: usize,
    },

    /// IO error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Pagewright library error
    #[error("{0}")]
    Pagewright(#[from] pagewright::PagewrightError),

    /// Database side-channel error
    #[error("Datastore error: {0}")]
    Datastore(#[from] sqlx::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Create a journey assertion error
    #[must_use]
    pub fn journey_assertion(message: impl Into<String>) -> Self {
        Self::JourneyAssertion {
            message: message.into(),
        }
    }
}
