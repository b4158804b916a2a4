//! Sign-up screen of the starter template.

use crate::driver::SharedDriver;
use crate::fixture::PageFixture;
use crate::locator::{AriaRole, Locator};
use crate::page_object::PageObject;
use crate::result::PagewrightResult;
use tracing::info;

/// Error text shown when an account already exists for the submitted email
pub const DUPLICATE_EMAIL_ERROR: &str = "User with that email already exists";

/// The `/sign-up` form
#[derive(Debug)]
pub struct SignUpPage {
    driver: SharedDriver,
}

impl SignUpPage {
    /// Navigation target
    pub const URL: &'static str = "/sign-up";

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

    /// "Create" submit button
    #[must_use]
    pub fn sign_up_button() -> Locator {
        Locator::by_role(AriaRole::Button, "Create")
    }

    /// Server-rendered form error
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
            Self::sign_up_button(),
        ]
    }

    /// Fill in the form and submit it. Submitting twice creates two requests.
    pub async fn submit(&self, email: &str, password: &str) -> PagewrightResult<()> {
        info!(%email, "submitting sign-up form");
        self.driver.fill(&Self::email_field(), email).await?;
        self.driver.fill(&Self::password_field(), password).await?;
        self.driver.click(&Self::sign_up_button()).await
    }
}

impl PageObject for SignUpPage {
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

impl PageFixture for SignUpPage {
    fn from_driver(driver: SharedDriver) -> Self {
        Self::new(driver)
    }
}
