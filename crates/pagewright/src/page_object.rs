//! Page Object Model Support
//!
//! A page object represents one logical screen. It exposes a target URL, a
//! navigation action and the *identity locators*: the elements that must all
//! be visible for the screen to count as the current one.
//!
//! Identity locators are an `Option<Vec<Locator>>`:
//!
//! - `None` - the page never declared them; the current-page matcher treats
//!   this as a configuration error
//! - `Some(vec![])` - the page explicitly has no visible-identity requirement
//! - `Some(locators)` - every locator must become visible

use crate::driver::SharedDriver;
use crate::locator::Locator;
use crate::result::{PagewrightError, PagewrightResult};
use async_trait::async_trait;
use tracing::info;

/// Trait for page objects representing a screen of the application under test.
///
/// # Example
///
/// ```ignore
/// #[derive(Debug)]
/// struct LoginPage {
///     driver: SharedDriver,
/// }
///
/// impl LoginPage {
///     fn username(&self) -> Locator {
///         Locator::by_label("Username")
///     }
///
///     async fn login(&self, name: &str) -> PagewrightResult<()> {
///         self.driver.fill(&self.username(), name).await
///     }
/// }
///
/// impl PageObject for LoginPage {
///     fn driver(&self) -> &SharedDriver {
///         &self.driver
///     }
///
///     fn url(&self) -> Option<&str> {
///         Some("/login")
///     }
///
///     fn identity_locators(&self) -> Option<Vec<Locator>> {
///         Some(vec![self.username()])
///     }
/// }
/// ```
#[async_trait]
pub trait PageObject: Send + Sync {
    /// The automation handle this page drives (shared, not owned)
    fn driver(&self) -> &SharedDriver;

    /// Navigation target; `None` for pages only reached via redirect
    fn url(&self) -> Option<&str> {
        None
    }

    /// Locators that together define "this page is showing"
    fn identity_locators(&self) -> Option<Vec<Locator>> {
        None
    }

    /// Concrete page type name for diagnostics
    fn page_name(&self) -> &str {
        page_name_of::<Self>()
    }

    /// Load this page's URL, resolved against the driver's base URL.
    ///
    /// Fails with a configuration error when no URL is registered; driver
    /// navigation errors propagate unchanged.
    async fn navigate(&self) -> PagewrightResult<()> {
        let Some(url) = self.url() else {
            let page = self.page_name();
            return Err(PagewrightError::configuration(
                page,
                format!("Page {page} does not have a registered 'url'"),
            ));
        };
        let driver = self.driver();
        let target = driver.config().resolve_url(url)?;
        info!(page = self.page_name(), url = %target, "navigating");
        driver.goto(&target).await
    }
}

/// Short type name of `T`: the last path segment, generics stripped.
#[must_use]
pub fn page_name_of<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

/// Builder for pages declared at runtime rather than as dedicated types
#[derive(Debug, Clone, Default)]
pub struct PageBuilder {
    name: String,
    url: Option<String>,
    identity: Option<Vec<Locator>>,
}

impl PageBuilder {
    /// Create a new page builder
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: None,
            identity: None,
        }
    }

    /// Set the URL
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Declare the full identity locator sequence (may be empty)
    #[must_use]
    pub fn with_identity(mut self, locators: Vec<Locator>) -> Self {
        self.identity = Some(locators);
        self
    }

    /// Append one identity locator
    #[must_use]
    pub fn with_identity_locator(mut self, locator: Locator) -> Self {
        self.identity.get_or_insert_with(Vec::new).push(locator);
        self
    }

    /// Build the page object bound to `driver`
    #[must_use]
    pub fn build(self, driver: SharedDriver) -> SimplePage {
        SimplePage {
            name: self.name,
            url: self.url,
            identity: self.identity,
            driver,
        }
    }
}

/// A generic page object built by [`PageBuilder`]
pub struct SimplePage {
    name: String,
    url: Option<String>,
    identity: Option<Vec<Locator>>,
    driver: SharedDriver,
}

impl std::fmt::Debug for SimplePage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimplePage")
            .field("name", &self.name)
            .field("url", &self.url)
            .field("identity", &self.identity)
            .finish()
    }
}

impl PageObject for SimplePage {
    fn driver(&self) -> &SharedDriver {
        &self.driver
    }

    fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    fn identity_locators(&self) -> Option<Vec<Locator>> {
        self.identity.clone()
    }

    fn page_name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::{MockDriver, PageDriver};
    use std::sync::Arc;

    #[derive(Debug)]
    struct RedirectOnlyPage {
        driver: SharedDriver,
    }

    impl PageObject for RedirectOnlyPage {
        fn driver(&self) -> &SharedDriver {
            &self.driver
        }
    }

    mod page_name_tests {
        use super::*;

        #[test]
        fn test_strips_module_path() {
            assert_eq!(page_name_of::<RedirectOnlyPage>(), "RedirectOnlyPage");
        }

        #[test]
        fn test_strips_generics() {
            assert_eq!(page_name_of::<Vec<Option<u8>>>(), "Vec");
        }

        #[test]
        fn test_default_page_name_uses_type() {
            let page = RedirectOnlyPage {
                driver: Arc::new(MockDriver::new()),
            };
            assert_eq!(page.page_name(), "RedirectOnlyPage");
        }
    }

    mod defaults_tests {
        use super::*;

        #[test]
        fn test_defaults_are_unconfigured() {
            let page = RedirectOnlyPage {
                driver: Arc::new(MockDriver::new()),
            };
            assert!(page.url().is_none());
            assert!(page.identity_locators().is_none());
        }

        #[tokio::test]
        async fn test_navigate_without_url_is_configuration_error() {
            let mock = Arc::new(MockDriver::new());
            let page = RedirectOnlyPage {
                driver: mock.clone(),
            };

            let err = page.navigate().await.unwrap_err();

            assert!(err.is_configuration());
            assert!(err.to_string().contains("RedirectOnlyPage"));
            assert!(err.to_string().contains("'url'"));
            assert!(!mock.was_called("goto"));
        }
    }

    mod builder_tests {
        use super::*;

        #[test]
        fn test_builder_basic() {
            let page = PageBuilder::new("Checkout")
                .with_url("/checkout")
                .build(Arc::new(MockDriver::new()));

            assert_eq!(page.page_name(), "Checkout");
            assert_eq!(page.url(), Some("/checkout"));
            assert!(page.identity_locators().is_none());
        }

        #[test]
        fn test_empty_identity_is_distinct_from_unconfigured() {
            let page = PageBuilder::new("Blank")
                .with_identity(Vec::new())
                .build(Arc::new(MockDriver::new()));
            assert_eq!(page.identity_locators(), Some(Vec::new()));
        }

        #[test]
        fn test_identity_locators_keep_order() {
            let page = PageBuilder::new("Form")
                .with_identity_locator(Locator::by_label("Email"))
                .with_identity_locator(Locator::by_label("Password"))
                .build(Arc::new(MockDriver::new()));
            assert_eq!(
                page.identity_locators().unwrap(),
                vec![Locator::by_label("Email"), Locator::by_label("Password")]
            );
        }
    }

    mod navigate_tests {
        use super::*;
        use crate::driver::DriverConfig;

        #[tokio::test]
        async fn test_navigate_resolves_against_base_url() {
            let mock = Arc::new(MockDriver::with_config(
                DriverConfig::new().base_url("http://127.0.0.1:4000/"),
            ));
            let page = PageBuilder::new("Home")
                .with_url("/home")
                .build(mock.clone());

            page.navigate().await.unwrap();

            assert_eq!(
                mock.current_url().await.unwrap(),
                "http://127.0.0.1:4000/home"
            );
        }

        #[tokio::test]
        async fn test_navigation_error_propagates_unchanged() {
            let mock = Arc::new(MockDriver::new());
            mock.make_unreachable("/down");
            let page = PageBuilder::new("Down").with_url("/down").build(mock);

            let err = page.navigate().await.unwrap_err();
            match err {
                PagewrightError::Navigation { url, .. } => {
                    assert_eq!(url, "http://localhost:1337/down");
                }
                other => panic!("expected navigation error, got {other}"),
            }
        }
    }
}
