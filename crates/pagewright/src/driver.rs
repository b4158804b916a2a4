//! PageDriver - Abstract Browser Automation Trait
//!
//! The automation handle every page object holds. Implementations:
//!
//! - `ChromiumDriver` (feature `browser`) - CDP via chromiumoxide
//! - [`MockDriver`] - in-memory screens for unit tests
//!
//! Every primitive is async and independently failable. Methods take `&self`
//! because one handle is shared (through [`SharedDriver`]) by all the page
//! objects of a single test.

use crate::locator::Locator;
use crate::result::{PagewrightError, PagewrightResult};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use url::Url;

/// Default assertion timeout (5 seconds, Playwright's `expect` default)
pub const DEFAULT_ASSERTION_TIMEOUT_MS: u64 = 5000;

/// Default navigation timeout (30 seconds)
pub const DEFAULT_NAVIGATION_TIMEOUT_MS: u64 = 30_000;

/// Default polling interval for visibility waits (50ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

/// Default base URL of the starter application
pub const DEFAULT_BASE_URL: &str = "http://localhost:1337";

/// Browser configuration for drivers
#[derive(Debug, Clone)]
pub struct DriverConfig {
    /// Base URL relative page URLs are resolved against
    pub base_url: String,
    /// Run in headless mode
    pub headless: bool,
    /// Viewport width
    pub viewport_width: u32,
    /// Viewport height
    pub viewport_height: u32,
    /// Timeout for navigation
    pub navigation_timeout: Duration,
    /// Timeout shared by all assertions (visibility, text)
    pub assertion_timeout: Duration,
    /// Interval between visibility polls
    pub poll_interval: Duration,
    /// Executable path override
    pub executable_path: Option<String>,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            headless: true,
            viewport_width: 1280,
            viewport_height: 720,
            navigation_timeout: Duration::from_millis(DEFAULT_NAVIGATION_TIMEOUT_MS),
            assertion_timeout: Duration::from_millis(DEFAULT_ASSERTION_TIMEOUT_MS),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            executable_path: None,
        }
    }
}

impl DriverConfig {
    /// Create new config with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set base URL
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set headless mode
    #[must_use]
    pub const fn headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set viewport dimensions
    #[must_use]
    pub const fn viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport_width = width;
        self.viewport_height = height;
        self
    }

    /// Set navigation timeout
    #[must_use]
    pub const fn navigation_timeout(mut self, timeout: Duration) -> Self {
        self.navigation_timeout = timeout;
        self
    }

    /// Set assertion timeout
    #[must_use]
    pub const fn assertion_timeout(mut self, timeout: Duration) -> Self {
        self.assertion_timeout = timeout;
        self
    }

    /// Set poll interval
    #[must_use]
    pub const fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Set chromium executable path
    #[must_use]
    pub fn executable_path(mut self, path: impl Into<String>) -> Self {
        self.executable_path = Some(path.into());
        self
    }

    /// Resolve a page URL against the base URL
    pub fn resolve_url(&self, url: &str) -> PagewrightResult<String> {
        resolve_url(&self.base_url, url)
    }
}

/// Parse `raw` as an absolute http(s) URL with a host
pub fn parse_base_url(raw: &str) -> PagewrightResult<Url> {
    let invalid = |reason: String| PagewrightError::Config {
        message: format!("base_url must be an http(s) URL, got {raw:?}: {reason}"),
    };
    let base = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;
    if !matches!(base.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme {:?}", base.scheme())));
    }
    if base.host_str().map_or(true, str::is_empty) {
        return Err(invalid("missing host".to_string()));
    }
    Ok(base)
}

/// Resolve `url` against `base` the way a browser resolves a link.
///
/// Absolute and scheme-relative URLs replace the base; a leading `/`
/// replaces the base path.
pub fn resolve_url(base: &str, url: &str) -> PagewrightResult<String> {
    let joined = parse_base_url(base)?
        .join(url)
        .map_err(|e| PagewrightError::Navigation {
            url: url.to_string(),
            message: e.to_string(),
        })?;
    Ok(joined.into())
}

/// Abstract driver trait for browser automation
#[async_trait]
pub trait PageDriver: Send + Sync + std::fmt::Debug {
    /// Load `url` and return once navigation completes
    async fn goto(&self, url: &str) -> PagewrightResult<()>;

    /// Replace the value of the form control matched by `locator`
    async fn fill(&self, locator: &Locator, text: &str) -> PagewrightResult<()>;

    /// Click the element matched by `locator`
    async fn click(&self, locator: &Locator) -> PagewrightResult<()>;

    /// Wait until `locator` matches a visible element, or fail with `Timeout`
    async fn wait_for_visible(&self, locator: &Locator, timeout: Duration)
        -> PagewrightResult<()>;

    /// Text content of the element matched by `locator`, `None` if nothing matches
    async fn text_content(&self, locator: &Locator) -> PagewrightResult<Option<String>>;

    /// Get current URL
    async fn current_url(&self) -> PagewrightResult<String>;

    /// Release the page and its session state.
    ///
    /// Called once a test is done with the driver; closing twice is a no-op.
    async fn close(&self) -> PagewrightResult<()> {
        Ok(())
    }

    /// Driver configuration
    fn config(&self) -> &DriverConfig;

    /// Base URL relative page URLs resolve against
    fn base_url(&self) -> &str {
        &self.config().base_url
    }

    /// Timeout inherited by every assertion built on this driver
    fn assertion_timeout(&self) -> Duration {
        self.config().assertion_timeout
    }
}

/// Automation handle shared by the page objects of one test
pub type SharedDriver = Arc<dyn PageDriver>;

/// Source of fresh, isolated drivers (one per test or per browser context)
#[async_trait]
pub trait DriverFactory: Send + Sync {
    /// Open a new driver with its own session state
    async fn new_driver(&self) -> PagewrightResult<SharedDriver>;
}

/// Mock driver for unit testing.
///
/// Models a browser as a set of visible locators. Routes map a resolved URL
/// to the locators that become visible after navigating there.
#[derive(Debug, Default)]
pub struct MockDriver {
    config: DriverConfig,
    state: Mutex<MockState>,
}

#[derive(Debug, Default)]
struct MockState {
    current_url: String,
    routes: HashMap<String, Vec<Locator>>,
    visible: HashSet<Locator>,
    text: HashMap<Locator, String>,
    values: HashMap<Locator, String>,
    unreachable: HashSet<String>,
    call_history: Vec<String>,
}

impl MockDriver {
    /// Create new mock driver
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock driver with a specific configuration
    #[must_use]
    pub fn with_config(config: DriverConfig) -> Self {
        Self {
            config,
            state: Mutex::default(),
        }
    }

    fn state(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register the locators visible after navigating to `url` (relative or absolute)
    pub fn route(&self, url: &str, visible: Vec<Locator>) {
        let url = self.mock_url(url);
        let _ = self.state().routes.insert(url, visible);
    }

    /// Make navigation to `url` fail
    pub fn make_unreachable(&self, url: &str) {
        let url = self.mock_url(url);
        let _ = self.state().unreachable.insert(url);
    }

    fn mock_url(&self, url: &str) -> String {
        self.config
            .resolve_url(url)
            .unwrap_or_else(|_| url.to_string())
    }

    /// Show an element
    pub fn show(&self, locator: Locator) {
        let _ = self.state().visible.insert(locator);
    }

    /// Set the text content of an element
    pub fn set_text(&self, locator: Locator, text: impl Into<String>) {
        let _ = self.state().text.insert(locator, text.into());
    }

    /// Value last filled into `locator`
    #[must_use]
    pub fn value_of(&self, locator: &Locator) -> Option<String> {
        self.state().values.get(locator).cloned()
    }

    /// Whether `locator` is currently visible
    #[must_use]
    pub fn is_visible(&self, locator: &Locator) -> bool {
        self.state().visible.contains(locator)
    }

    /// Get call history
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.state().call_history.clone()
    }

    /// Check if method was called
    #[must_use]
    pub fn was_called(&self, method: &str) -> bool {
        self.state()
            .call_history
            .iter()
            .any(|c| c.starts_with(method))
    }

    fn require_visible(&self, locator: &Locator) -> PagewrightResult<()> {
        if self.is_visible(locator) {
            Ok(())
        } else {
            Err(PagewrightError::ElementNotFound {
                locator: locator.to_string(),
            })
        }
    }
}

#[async_trait]
impl PageDriver for MockDriver {
    async fn goto(&self, url: &str) -> PagewrightResult<()> {
        let mut state = self.state();
        state.call_history.push(format!("goto:{url}"));
        if state.unreachable.contains(url) {
            return Err(PagewrightError::Navigation {
                url: url.to_string(),
                message: "net::ERR_CONNECTION_REFUSED".to_string(),
            });
        }
        state.current_url = url.to_string();
        state.visible = state
            .routes
            .get(url)
            .map(|locators| locators.iter().cloned().collect())
            .unwrap_or_default();
        Ok(())
    }

    async fn fill(&self, locator: &Locator, text: &str) -> PagewrightResult<()> {
        self.state().call_history.push(format!("fill:{locator}"));
        self.require_visible(locator)?;
        let _ = self
            .state()
            .values
            .insert(locator.clone(), text.to_string());
        Ok(())
    }

    async fn click(&self, locator: &Locator) -> PagewrightResult<()> {
        self.state().call_history.push(format!("click:{locator}"));
        self.require_visible(locator)
    }

    async fn wait_for_visible(
        &self,
        locator: &Locator,
        timeout: Duration,
    ) -> PagewrightResult<()> {
        let start = Instant::now();
        loop {
            if self.is_visible(locator) {
                return Ok(());
            }
            if start.elapsed() >= timeout {
                return Err(PagewrightError::Timeout {
                    ms: timeout.as_millis() as u64,
                });
            }
            tokio::time::sleep(self.config.poll_interval).await;
        }
    }

    async fn text_content(&self, locator: &Locator) -> PagewrightResult<Option<String>> {
        let state = self.state();
        if !state.visible.contains(locator) {
            return Ok(None);
        }
        Ok(Some(state.text.get(locator).cloned().unwrap_or_default()))
    }

    async fn current_url(&self) -> PagewrightResult<String> {
        Ok(self.state().current_url.clone())
    }

    async fn close(&self) -> PagewrightResult<()> {
        self.state().call_history.push("close".to_string());
        Ok(())
    }

    fn config(&self) -> &DriverConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_config() -> DriverConfig {
        DriverConfig::new()
            .assertion_timeout(Duration::from_millis(100))
            .poll_interval(Duration::from_millis(5))
    }

    mod driver_config_tests {
        use super::*;

        #[test]
        fn test_config_default() {
            let config = DriverConfig::default();
            assert!(config.headless);
            assert_eq!(config.base_url, DEFAULT_BASE_URL);
            assert_eq!(config.assertion_timeout, Duration::from_secs(5));
        }

        #[test]
        fn test_config_builder() {
            let config = DriverConfig::new()
                .base_url("http://127.0.0.1:8080")
                .headless(false)
                .viewport(800, 600)
                .executable_path("/usr/bin/chromium");

            assert!(!config.headless);
            assert_eq!(config.viewport_width, 800);
            assert_eq!(config.viewport_height, 600);
            assert_eq!(config.base_url, "http://127.0.0.1:8080");
            assert_eq!(config.executable_path.as_deref(), Some("/usr/bin/chromium"));
        }
    }

    mod resolve_url_tests {
        use super::*;

        const BASE: &str = "http://localhost:1337";

        #[test]
        fn test_relative_path_joins_base() {
            assert_eq!(
                resolve_url(BASE, "/sign-up").unwrap(),
                "http://localhost:1337/sign-up"
            );
        }

        #[test]
        fn test_trailing_and_leading_slashes_collapse() {
            assert_eq!(
                resolve_url("http://localhost:1337/", "/sign-in").unwrap(),
                "http://localhost:1337/sign-in"
            );
            assert_eq!(
                resolve_url(BASE, "sign-in").unwrap(),
                "http://localhost:1337/sign-in"
            );
        }

        #[test]
        fn test_absolute_path_replaces_base_path() {
            assert_eq!(
                resolve_url("http://localhost:1337/app/", "/sign-up").unwrap(),
                "http://localhost:1337/sign-up"
            );
            assert_eq!(
                resolve_url("http://localhost:1337/app/", "sign-up").unwrap(),
                "http://localhost:1337/app/sign-up"
            );
        }

        #[test]
        fn test_absolute_url_passes_through() {
            assert_eq!(
                resolve_url(BASE, "http://localhost:1337/sign-up").unwrap(),
                "http://localhost:1337/sign-up"
            );
            assert_eq!(resolve_url(BASE, "about:blank").unwrap(), "about:blank");
        }

        #[test]
        fn test_upper_case_scheme_is_absolute() {
            assert_eq!(
                resolve_url(BASE, "HTTPS://other.test/x").unwrap(),
                "https://other.test/x"
            );
        }

        #[test]
        fn test_scheme_relative_url_keeps_base_scheme() {
            assert_eq!(
                resolve_url(BASE, "//cdn.test/x").unwrap(),
                "http://cdn.test/x"
            );
        }

        #[test]
        fn test_root_path() {
            assert_eq!(resolve_url("http://a.test", "/").unwrap(), "http://a.test/");
        }

        #[test]
        fn test_unusable_base_is_config_error() {
            for base in ["http://", "http://exa mple", "https://:99999", "ftp://a.test", "/app"] {
                let err = resolve_url(base, "/sign-up").unwrap_err();
                assert!(
                    matches!(err, PagewrightError::Config { .. }),
                    "{base}: {err}"
                );
            }
        }

        #[test]
        fn test_parse_base_url_accepts_upper_case_scheme() {
            let base = parse_base_url("HTTP://Localhost:1337").unwrap();
            assert_eq!(base.scheme(), "http");
            assert_eq!(base.host_str(), Some("localhost"));
        }
    }

    mod mock_driver_tests {
        use super::*;

        #[test]
        fn test_mock_driver_creation() {
            let driver = MockDriver::new();
            assert!(driver.history().is_empty());
            assert!(!driver.was_called("goto"));
        }

        #[tokio::test]
        async fn test_goto_applies_route() {
            let driver = MockDriver::new();
            let email = Locator::by_label("Email");
            driver.route("/sign-up", vec![email.clone()]);

            driver.goto("http://localhost:1337/sign-up").await.unwrap();

            assert!(driver.is_visible(&email));
            assert_eq!(
                driver.current_url().await.unwrap(),
                "http://localhost:1337/sign-up"
            );
            assert!(driver.was_called("goto"));
        }

        #[tokio::test]
        async fn test_goto_unreachable_fails_with_navigation_error() {
            let driver = MockDriver::new();
            driver.make_unreachable("/down");
            let err = driver
                .goto("http://localhost:1337/down")
                .await
                .unwrap_err();
            assert!(matches!(err, PagewrightError::Navigation { .. }));
        }

        #[tokio::test]
        async fn test_fill_requires_visible_element() {
            let driver = MockDriver::new();
            let email = Locator::by_label("Email");
            assert!(driver.fill(&email, "x").await.is_err());

            driver.show(email.clone());
            driver.fill(&email, "carl@x.com").await.unwrap();
            assert_eq!(driver.value_of(&email).as_deref(), Some("carl@x.com"));
        }

        #[tokio::test]
        async fn test_wait_for_visible_times_out() {
            let driver = MockDriver::with_config(fast_config());
            let err = driver
                .wait_for_visible(&Locator::css("#nope"), Duration::from_millis(20))
                .await
                .unwrap_err();
            assert!(matches!(err, PagewrightError::Timeout { ms: 20 }));
        }

        #[tokio::test]
        async fn test_wait_for_visible_sees_late_element() {
            let driver = Arc::new(MockDriver::with_config(fast_config()));
            let late = Locator::css("#late");
            let background = Arc::clone(&driver);
            let shown = late.clone();
            let task = tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(20)).await;
                background.show(shown);
            });

            driver
                .wait_for_visible(&late, Duration::from_millis(500))
                .await
                .unwrap();
            task.await.unwrap();
        }

        #[tokio::test]
        async fn test_close_is_recorded() {
            let driver = MockDriver::new();
            driver.close().await.unwrap();
            assert_eq!(driver.history(), vec!["close"]);
        }

        #[tokio::test]
        async fn test_text_content_of_hidden_element_is_none() {
            let driver = MockDriver::new();
            let error = Locator::css("#error");
            driver.set_text(error.clone(), "boom");
            assert_eq!(driver.text_content(&error).await.unwrap(), None);
            driver.show(error.clone());
            assert_eq!(
                driver.text_content(&error).await.unwrap().as_deref(),
                Some("boom")
            );
        }
    }
}
