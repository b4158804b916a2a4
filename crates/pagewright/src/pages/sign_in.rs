//! Sign-in screen of the starter template.

use crate::driver::SharedDriver;
use crate::fixture::PageFixture;
use crate::locator::{AriaRole, Locator};
use crate::page_object::PageObject;
use crate::result::PagewrightResult;
use tracing::info;

/// The `/sign-in` form
#[derive(Debug)]
pub struct SignInPage {
    driver: SharedDriver,
}

impl SignInPage {
    /// Navigation target
    pub const URL: &'static str = "/sign-in";

    /// Create the page bound to `driver`
    #[must_use]
    pub fn new(driver: SharedDriver) -> Self {
        Self { driver }
    }

    /// Email field
    #[must_use]
    pub fn email_field() -> Locator {
        Locator::by_label("Email")
    }

    /// Password field
    #[must_use]
    pub fn password_field() -> Locator {
        Locator::by_label("Password")
    }

    /// "Sign In" submit button
    #[must_use]
    pub fn sign_in_button() -> Locator {
        Locator::by_role(AriaRole::Button, "Sign In")
    }

    /// Error shown after rejected credentials
    #[must_use]
    pub fn error() -> Locator {
        Locator::css("#error")
    }

    /// Locators that identify this screen
    #[must_use]
    pub fn identity() -> Vec<Locator> {
        vec![
            Self::email_field(),
            Self::password_field(),
            Self::sign_in_button(),
        ]
    }

    /// Fill in credentials and submit
    pub async fn login(&self, email: &str, password: &str) -> PagewrightResult<()> {
        info!(%email, "submitting sign-in form");
        self.driver.fill(&Self::email_field(), email).await?;
        self.driver.fill(&Self::password_field(), password).await?;
        self.driver.click(&Self::sign_in_button()).await
    }
}

impl PageObject for SignInPage {
    fn driver(&self) -> &SharedDriver {
        &self.driver
    }

    fn url(&self) -> Option<&str> {
        Some(Self::URL)
    }

    fn identity_locators(&self) -> Option<Vec<Locator>> {
        Some(Self::identity())
    }
}

impl PageFixture for SignInPage {
    fn from_driver(driver: SharedDriver) -> Self {
        Self::new(driver)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::{DriverConfig, MockDriver};
    use crate::matcher::check_current_page;
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn test_missing_button_is_the_only_failure() {
        let driver = Arc::new(MockDriver::with_config(
            DriverConfig::new()
                .assertion_timeout(Duration::from_millis(40))
                .poll_interval(Duration::from_millis(5)),
        ));
        driver.route(
            "/sign-in",
            vec![SignInPage::email_field(), SignInPage::password_field()],
        );
        let page = SignInPage::new(driver);
        page.navigate().await.unwrap();

        let report = check_current_page(&page).await.unwrap();

        assert_eq!(report.failed(), &[SignInPage::sign_in_button()]);
    }

    #[tokio::test]
    async fn test_login_fills_credentials() {
        let driver = Arc::new(MockDriver::new());
        driver.route(SignInPage::URL, SignInPage::identity());
        let page = SignInPage::new(driver.clone());
        page.navigate().await.unwrap();

        page.login("lenny@x.com", "donuts").await.unwrap();

        assert_eq!(
            driver.value_of(&SignInPage::email_field()).as_deref(),
            Some("lenny@x.com")
        );
        assert!(driver.was_called("click:get_by_role(button, name=\"Sign In\")"));
    }
}
