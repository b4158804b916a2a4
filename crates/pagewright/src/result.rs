//! Result and error types for pagewright.

use thiserror::Error;

/// Result type for pagewright operations
pub type PagewrightResult<T> = Result<T, PagewrightError>;

/// Errors that can occur while driving or asserting on pages
#[derive(Debug, Error)]
pub enum PagewrightError {
    /// A page object is missing a required override (`url`, identity locators).
    ///
    /// This is a test-authoring mistake, never retried.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Concrete page type name
        page: String,
        /// Error message
        message: String,
    },

    /// An assertion did not pass within its timeout
    #[error("Assertion failed: {message}")]
    AssertionFailed {
        /// Error message
        message: String,
    },

    /// Navigation error
    #[error("Navigation to {url} failed: {message}")]
    Navigation {
        /// URL that failed
        url: String,
        /// Error message
        message: String,
    },

    /// Operation timed out
    #[error("Operation timed out after {ms}ms")]
    Timeout {
        /// Timeout in milliseconds
        ms: u64,
    },

    /// No element matched a locator when one was required
    #[error("No element matches {locator}")]
    ElementNotFound {
        /// Display form of the locator
        locator: String,
    },

    /// Fill/click failed
    #[error("Interaction failed: {message}")]
    Interaction {
        /// Error message
        message: String,
    },

    /// Browser launch error
    #[error("Failed to launch browser: {message}")]
    BrowserLaunch {
        /// Error message
        message: String,
    },

    /// Fixture error (setup/teardown failed)
    #[error("Fixture error: {message}")]
    Fixture {
        /// Error message
        message: String,
    },

    /// Invalid e2e configuration (file or environment)
    #[error("Invalid configuration: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl PagewrightError {
    /// Create a configuration error for a page type
    #[must_use]
    pub fn configuration(page: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Configuration {
            page: page.into(),
            message: message.into(),
        }
    }

    /// Create an assertion failure
    #[must_use]
    pub fn assertion(message: impl Into<String>) -> Self {
        Self::AssertionFailed {
            message: message.into(),
        }
    }

    /// Create an interaction error
    #[must_use]
    pub fn interaction(message: impl Into<String>) -> Self {
        Self::Interaction {
            message: message.into(),
        }
    }

    /// Create a fixture error
    #[must_use]
    pub fn fixture(message: impl Into<String>) -> Self {
        Self::Fixture {
            message: message.into(),
        }
    }

    /// Whether this is a test-authoring configuration error
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }

    /// Whether this is an assertion failure
    #[must_use]
    pub const fn is_assertion(&self) -> bool {
        matches!(self, Self::AssertionFailed { .. })
    }
}
