//! End-to-end run configuration.
//!
//! Resolution order: built-in defaults, then an optional YAML file, then
//! `PAGEWRIGHT_*` environment variables. Command-line flags are applied last
//! by the caller through the `with_*` setters.

use crate::driver::{parse_base_url, DriverConfig, DEFAULT_BASE_URL};
use crate::result::{PagewrightError, PagewrightResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Default Postgres URL of the starter app's development database
pub const DEFAULT_DATABASE_URL: &str = "postgres://localhost:5433/sample_app_development";

/// Default account used by the journeys
pub const DEFAULT_TEST_EMAIL: &str = "carl@springfieldnuclear.com";

/// Default password used by the journeys
pub const DEFAULT_TEST_PASSWORD: &str = "password1234";

/// Prefix of every environment override
pub const ENV_PREFIX: &str = "PAGEWRIGHT_";

/// Settings shared by every journey of a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct E2eConfig {
    /// Base URL of the application under test
    pub base_url: String,
    /// Database the journeys clean up directly
    pub database_url: String,
    /// Timeout for visibility and text assertions
    pub assertion_timeout_ms: u64,
    /// Timeout for page loads
    pub navigation_timeout_ms: u64,
    /// Interval between visibility polls
    pub poll_interval_ms: u64,
    /// Run the browser without a window
    pub headless: bool,
    /// Chromium executable override
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chromium_path: Option<String>,
    /// Base email; journeys derive distinct addresses from it
    pub test_email: String,
    /// Password for every journey account
    pub test_password: String,
}

impl Default for E2eConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            database_url: DEFAULT_DATABASE_URL.to_string(),
            assertion_timeout_ms: crate::driver::DEFAULT_ASSERTION_TIMEOUT_MS,
            navigation_timeout_ms: crate::driver::DEFAULT_NAVIGATION_TIMEOUT_MS,
            poll_interval_ms: crate::driver::DEFAULT_POLL_INTERVAL_MS,
            headless: true,
            chromium_path: None,
            test_email: DEFAULT_TEST_EMAIL.to_string(),
            test_password: DEFAULT_TEST_PASSWORD.to_string(),
        }
    }
}

impl E2eConfig {
    /// Parse and validate YAML; missing keys take their defaults
    pub fn from_yaml_str(yaml: &str) -> PagewrightResult<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a YAML configuration file
    pub fn from_file(path: &Path) -> PagewrightResult<Self> {
        debug!(path = %path.display(), "loading configuration file");
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&yaml)
    }

    /// Defaults or `path`, then the process environment
    pub fn load(path: Option<&Path>) -> PagewrightResult<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply `PAGEWRIGHT_*` overrides read through `lookup`
    pub fn apply_env<F>(&mut self, lookup: F) -> PagewrightResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| {
            lookup(&format!("{ENV_PREFIX}{name}")).filter(|value| !value.trim().is_empty())
        };

        if let Some(value) = var("BASE_URL") {
            self.base_url = value;
        }
        if let Some(value) = var("DATABASE_URL") {
            self.database_url = value;
        }
        if let Some(value) = var("ASSERTION_TIMEOUT_MS") {
            self.assertion_timeout_ms = parse_millis("ASSERTION_TIMEOUT_MS", &value)?;
        }
        if let Some(value) = var("NAVIGATION_TIMEOUT_MS") {
            self.navigation_timeout_ms = parse_millis("NAVIGATION_TIMEOUT_MS", &value)?;
        }
        if let Some(value) = var("POLL_INTERVAL_MS") {
            self.poll_interval_ms = parse_millis("POLL_INTERVAL_MS", &value)?;
        }
        if let Some(value) = var("HEADLESS") {
            self.headless = parse_bool(&value).ok_or_else(|| PagewrightError::Config {
                message: format!("{ENV_PREFIX}HEADLESS must be a boolean, got {value:?}"),
            })?;
        }
        if let Some(value) = var("CHROMIUM_PATH") {
            self.chromium_path = Some(value);
        }
        if let Some(value) = var("TEST_EMAIL") {
            self.test_email = value;
        }
        if let Some(value) = var("TEST_PASSWORD") {
            self.test_password = value;
        }
        self.validate()
    }

    /// Check cross-field constraints
    pub fn validate(&self) -> PagewrightResult<()> {
        let invalid = |message: String| Err(PagewrightError::Config { message });

        let _ = parse_base_url(&self.base_url)?;
        if self.assertion_timeout_ms == 0 || self.navigation_timeout_ms == 0 {
            return invalid("timeouts must be greater than zero".to_string());
        }
        if self.poll_interval_ms == 0 || self.poll_interval_ms > self.assertion_timeout_ms {
            return invalid(format!(
                "poll_interval_ms must be between 1 and assertion_timeout_ms ({})",
                self.assertion_timeout_ms
            ));
        }
        if !self.test_email.contains('@') {
            return invalid(format!(
                "test_email must be an email address, got {:?}",
                self.test_email
            ));
        }
        Ok(())
    }

    /// Set base URL
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set database URL
    #[must_use]
    pub fn with_database_url(mut self, url: impl Into<String>) -> Self {
        self.database_url = url.into();
        self
    }

    /// Set headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Assertion timeout as a duration
    #[must_use]
    pub const fn assertion_timeout(&self) -> Duration {
        Duration::from_millis(self.assertion_timeout_ms)
    }

    /// Driver settings derived from this configuration
    #[must_use]
    pub fn driver_config(&self) -> DriverConfig {
        let config = DriverConfig::new()
            .base_url(self.base_url.clone())
            .headless(self.headless)
            .assertion_timeout(self.assertion_timeout())
            .navigation_timeout(Duration::from_millis(self.navigation_timeout_ms))
            .poll_interval(Duration::from_millis(self.poll_interval_ms));
        match &self.chromium_path {
            Some(path) => config.executable_path(path.clone()),
            None => config,
        }
    }

    /// Render as YAML
    pub fn to_yaml(&self) -> PagewrightResult<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }
}

fn parse_millis(name: &str, raw: &str) -> PagewrightResult<u64> {
    raw.trim().parse().map_err(|_| PagewrightError::Config {
        message: format!("{ENV_PREFIX}{name} must be a whole number of milliseconds, got {raw:?}"),
    })
}

/// Parse env-style booleans: `1/true/yes/on` and `0/false/no/off`
#[must_use]
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
