//! Pagewright: page objects and current-page assertions for browser e2e tests
//!
//! A page object describes one screen of the application under test: where it
//! lives and which elements must be visible for it to be the screen on
//! display. The current-page matcher checks those elements and names exactly
//! the ones that are missing.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    PAGEWRIGHT Architecture                    │
//! ├──────────────────────────────────────────────────────────────┤
//! │   ┌────────────┐    ┌────────────┐    ┌────────────┐         │
//! │   │ Journey    │    │ Page       │    │ PageDriver │         │
//! │   │ (TestScope)│───►│ Objects    │───►│ (chromium, │         │
//! │   │            │    │ + Matcher  │    │  mock)     │         │
//! │   └────────────┘    └────────────┘    └────────────┘         │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use pagewright::prelude::*;
//!
//! let driver: SharedDriver = browser.new_driver().await?;
//! TestScope::new("sign up", driver)
//!     .run(|pages| async move {
//!         let sign_up = pages.page::<SignUpPage>();
//!         sign_up.navigate().await?;
//!         expect_page(sign_up.as_ref()).to_be_current_page().await?;
//!         sign_up.submit("carl@x.com", "password1234").await?;
//!         expect_page(pages.page::<DashboardHomePage>().as_ref())
//!             .to_be_current_page()
//!             .await
//!     })
//!     .await?;
//! ```

#![cfg_attr(test, allow(clippy::large_stack_arrays, clippy::large_stack_frames))]

#[cfg(feature = "browser")]
mod browser;
mod config;
mod driver;
mod fixture;
mod locator;
mod matcher;
mod page_object;
mod result;

/// Starter-template pages
pub mod pages;

#[cfg(feature = "browser")]
pub use browser::{ChromiumBrowser, ChromiumDriver};
pub use config::{
    parse_bool, E2eConfig, DEFAULT_DATABASE_URL, DEFAULT_TEST_EMAIL, DEFAULT_TEST_PASSWORD,
    ENV_PREFIX,
};
pub use driver::{
    parse_base_url, resolve_url, DriverConfig, DriverFactory, MockDriver, PageDriver,
    SharedDriver, DEFAULT_ASSERTION_TIMEOUT_MS, DEFAULT_BASE_URL, DEFAULT_NAVIGATION_TIMEOUT_MS,
    DEFAULT_POLL_INTERVAL_MS,
};
pub use fixture::{
    step, Fixture, FixtureManager, FixtureRegistry, FixtureState, PageFixture, TestScope,
};
pub use locator::{js_string, AriaRole, Locator, Selector, MARKER_ATTRIBUTE};
pub use matcher::{
    check_current_page, expect_locator, expect_page, CurrentPageReport, LocatorExpectation,
    PageExpectation,
};
pub use page_object::{page_name_of, PageBuilder, PageObject, SimplePage};
pub use result::{PagewrightError, PagewrightResult};

/// Prelude for convenient imports
pub mod prelude {
    #[cfg(feature = "browser")]
    pub use super::{ChromiumBrowser, ChromiumDriver};
    pub use super::{
        check_current_page, expect_locator, expect_page, step, AriaRole, CurrentPageReport,
        DriverConfig, DriverFactory, E2eConfig, Fixture, FixtureRegistry, Locator, PageDriver,
        PageFixture, PageObject, PagewrightError, PagewrightResult, SharedDriver, TestScope,
    };
    pub use super::pages::{DashboardHomePage, SignInPage, SignUpPage};
}
