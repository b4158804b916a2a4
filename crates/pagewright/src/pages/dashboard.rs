//! Dashboard shown after signing up or in.

use crate::driver::SharedDriver;
use crate::fixture::PageFixture;
use crate::locator::{AriaRole, Locator};
use crate::page_object::PageObject;

/// Landing page for an authenticated user
#[derive(Debug)]
pub struct DashboardHomePage {
    driver: SharedDriver,
}

impl DashboardHomePage {
    /// Navigation target
    pub const URL: &'static str = "/dashboard";

    /// Create the page bound to `driver`
    #[must_use]
    pub fn new(driver: SharedDriver) -> Self {
        Self { driver }
    }

    /// "Dashboard" heading
    #[must_use]
    pub fn heading() -> Locator {
        Locator::by_role(AriaRole::Heading, "Dashboard")
    }

    /// "Sign Out" button
    #[must_use]
    pub fn sign_out_button() -> Locator {
        Locator::by_role(AriaRole::Button, "Sign Out")
    }

    /// Locators that identify this screen
    #[must_use]
    pub fn identity() -> Vec<Locator> {
        vec![Self::heading(), Self::sign_out_button()]
    }
}

impl PageObject for DashboardHomePage {
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

impl PageFixture for DashboardHomePage {
    fn from_driver(driver: SharedDriver) -> Self {
        Self::new(driver)
    }
}
