//! Starter-template pages.
//!
//! One type per screen of the starter application. Each exposes its locators
//! as plain associated functions so journeys and diagnostics can name them
//! without a driver.

mod dashboard;
mod sign_in;
mod sign_up;

pub use dashboard::DashboardHomePage;
pub use sign_in::SignInPage;
pub use sign_up::{SignUpPage, DUPLICATE_EMAIL_ERROR};

use crate::locator::Locator;
use serde::Serialize;

/// Static description of a page for listings
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageSummary {
    /// Page type name
    pub name: &'static str,
    /// Navigation target
    pub url: &'static str,
    /// Identity locators in declaration order
    pub identity: Vec<Locator>,
}

/// Every starter page, in the order a new user meets them
#[must_use]
pub fn starter_pages() -> Vec<PageSummary> {
    vec![
        PageSummary {
            name: "SignUpPage",
            url: SignUpPage::URL,
            identity: SignUpPage::identity(),
        },
        PageSummary {
            name: "SignInPage",
            url: SignInPage::URL,
            identity: SignInPage::identity(),
        },
        PageSummary {
            name: "DashboardHomePage",
            url: DashboardHomePage::URL,
            identity: DashboardHomePage::identity(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::{DriverConfig, MockDriver, SharedDriver};
    use crate::fixture::FixtureRegistry;
    use crate::matcher::check_current_page;
    use crate::page_object::{page_name_of, PageObject};
    use std::sync::Arc;
    use std::time::Duration;

    fn routed_driver() -> Arc<MockDriver> {
        let driver = MockDriver::with_config(
            DriverConfig::new()
                .assertion_timeout(Duration::from_millis(50))
                .poll_interval(Duration::from_millis(5)),
        );
        for summary in starter_pages() {
            driver.route(summary.url, summary.identity);
        }
        Arc::new(driver)
    }

    #[test]
    fn test_summary_names_match_types() {
        let names: Vec<_> = starter_pages().iter().map(|p| p.name).collect();
        assert_eq!(
            names,
            vec![
                page_name_of::<SignUpPage>(),
                page_name_of::<SignInPage>(),
                page_name_of::<DashboardHomePage>(),
            ]
        );
    }

    #[test]
    fn test_summary_serializes() {
        let json = serde_json::to_string(&starter_pages()).unwrap();
        assert!(json.contains("\"/sign-up\""));
        assert!(json.contains("\"strategy\":\"label\""));
    }

    #[tokio::test]
    async fn test_every_page_is_current_after_navigate() {
        let driver: SharedDriver = routed_driver();
        let registry = FixtureRegistry::new(driver);

        let sign_up = registry.page::<SignUpPage>();
        sign_up.navigate().await.unwrap();
        assert!(check_current_page(sign_up.as_ref()).await.unwrap().is_current());

        let sign_in = registry.page::<SignInPage>();
        sign_in.navigate().await.unwrap();
        assert!(check_current_page(sign_in.as_ref()).await.unwrap().is_current());
        assert!(!check_current_page(sign_up.as_ref())
            .await
            .unwrap()
            .is_current());

        let dashboard = registry.page::<DashboardHomePage>();
        dashboard.navigate().await.unwrap();
        assert!(check_current_page(dashboard.as_ref())
            .await
            .unwrap()
            .is_current());
    }

    #[tokio::test]
    async fn test_sign_up_and_sign_in_share_form_fields() {
        let driver = routed_driver();
        let sign_in = SignInPage::new(driver.clone());
        sign_in.navigate().await.unwrap();

        let report = check_current_page(&SignUpPage::new(driver)).await.unwrap();

        assert_eq!(report.failed(), &[SignUpPage::sign_up_button()]);
    }
}
