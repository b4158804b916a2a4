//! Current-page matcher and locator expectations.
//!
//! [`check_current_page`] is the standalone judgment: it reads a page's
//! identity locators, waits for each one independently and reports exactly
//! which ones never became visible. [`expect_page`] is the thin
//! `expect(page).toBeCurrentPage()`-style adapter that turns a failing report
//! into an error.
//!
//! Nothing here caches: every call evaluates the page afresh.

use crate::driver::SharedDriver;
use crate::locator::Locator;
use crate::page_object::PageObject;
use crate::result::{PagewrightError, PagewrightResult};
use futures::future::join_all;
use serde::Serialize;
use std::fmt::Write as _;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Outcome of a current-page check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurrentPageReport {
    page: String,
    checked: usize,
    failed: Vec<Locator>,
    elapsed_ms: u64,
}

impl CurrentPageReport {
    /// Whether every identity locator was visible
    #[must_use]
    pub fn is_current(&self) -> bool {
        self.failed.is_empty()
    }

    /// Concrete page type name
    #[must_use]
    pub fn page(&self) -> &str {
        &self.page
    }

    /// Number of identity locators evaluated
    #[must_use]
    pub const fn checked(&self) -> usize {
        self.checked
    }

    /// Locators that did not become visible, in declaration order
    #[must_use]
    pub fn failed(&self) -> &[Locator] {
        &self.failed
    }

    /// Wall time spent evaluating
    #[must_use]
    pub const fn elapsed(&self) -> Duration {
        Duration::from_millis(self.elapsed_ms)
    }

    /// Diagnostic message; empty when the page is current
    #[must_use]
    pub fn message(&self) -> String {
        if self.is_current() {
            return String::new();
        }
        let mut message = format!(
            "Expected {} to be the current page; {} of {} locator(s) failed:\n",
            self.page,
            self.failed.len(),
            self.checked
        );
        for locator in &self.failed {
            let _ = writeln!(message, "  - {locator}");
        }
        message
    }

    /// Convert into an assertion result
    pub fn into_result(self) -> PagewrightResult<()> {
        if self.is_current() {
            Ok(())
        } else {
            Err(PagewrightError::assertion(self.message()))
        }
    }
}

/// Determine whether `page` is the currently displayed page.
///
/// Returns a configuration error when the page never declared identity
/// locators. Each locator is awaited concurrently with the driver's assertion
/// timeout, so an absent locator does not short-circuit or delay the others.
pub async fn check_current_page<P>(page: &P) -> PagewrightResult<CurrentPageReport>
where
    P: PageObject + ?Sized,
{
    let name = page.page_name().to_string();
    let Some(locators) = page.identity_locators() else {
        return Err(PagewrightError::configuration(
            &name,
            format!("page {name} does not implement 'identity_locators'"),
        ));
    };

    let start = Instant::now();
    if locators.is_empty() {
        debug!(page = %name, "no identity locators declared; page is current");
        return Ok(CurrentPageReport {
            page: name,
            checked: 0,
            failed: Vec::new(),
            elapsed_ms: 0,
        });
    }

    let driver = page.driver();
    let timeout = driver.assertion_timeout();
    let checks = locators.iter().map(|locator| async move {
        let outcome = driver.wait_for_visible(locator, timeout).await;
        (locator, outcome)
    });

    let mut failed = Vec::new();
    for (locator, outcome) in join_all(checks).await {
        match outcome {
            Ok(()) => debug!(page = %name, %locator, "identity locator visible"),
            Err(err) => {
                warn!(page = %name, %locator, error = %err, "identity locator not visible");
                failed.push(locator.clone());
            }
        }
    }

    let report = CurrentPageReport {
        page: name,
        checked: locators.len(),
        failed,
        elapsed_ms: start.elapsed().as_millis() as u64,
    };
    info!(
        page = %report.page,
        current = report.is_current(),
        failed = report.failed.len(),
        "current-page check finished"
    );
    Ok(report)
}

/// Expectation on a page object
#[derive(Debug)]
pub struct PageExpectation<'a, P: ?Sized> {
    page: &'a P,
}

/// Create an expectation for a page (Playwright-style)
#[must_use]
pub fn expect_page<P: PageObject + ?Sized>(page: &P) -> PageExpectation<'_, P> {
    PageExpectation { page }
}

impl<P: PageObject + ?Sized> PageExpectation<'_, P> {
    /// Assert the page is the current one.
    ///
    /// Configuration errors pass through unchanged; a failed visibility check
    /// becomes `AssertionFailed` listing only the failed locators.
    pub async fn to_be_current_page(&self) -> PagewrightResult<()> {
        check_current_page(self.page).await?.into_result()
    }

    /// Assert the page is not the current one
    pub async fn not_to_be_current_page(&self) -> PagewrightResult<()> {
        let report = check_current_page(self.page).await?;
        if report.is_current() {
            Err(PagewrightError::assertion(format!(
                "Expected {} not to be the current page",
                report.page()
            )))
        } else {
            Ok(())
        }
    }
}

/// Expectation on a single locator
#[derive(Debug, Clone)]
pub struct LocatorExpectation {
    driver: SharedDriver,
    locator: Locator,
}

/// Create an expectation for a locator resolved through `driver`
#[must_use]
pub fn expect_locator(driver: &SharedDriver, locator: Locator) -> LocatorExpectation {
    LocatorExpectation {
        driver: SharedDriver::clone(driver),
        locator,
    }
}

impl LocatorExpectation {
    /// Assert the element becomes visible
    pub async fn to_be_visible(&self) -> PagewrightResult<()> {
        let timeout = self.driver.assertion_timeout();
        self.driver
            .wait_for_visible(&self.locator, timeout)
            .await
            .map_err(|err| {
                PagewrightError::assertion(format!(
                    "Expected {} to be visible: {err}",
                    self.locator
                ))
            })
    }

    /// Assert the element's text equals `expected`, whitespace-normalized.
    ///
    /// Polls until the text matches or the assertion timeout elapses.
    pub async fn to_have_text(&self, expected: &str) -> PagewrightResult<()> {
        let expected = normalize_whitespace(expected);
        let timeout = self.driver.assertion_timeout();
        let poll = self.driver.config().poll_interval;
        let start = Instant::now();
        let mut last_seen: Option<String> = None;

        loop {
            match self.driver.text_content(&self.locator).await {
                Ok(Some(text)) => {
                    let text = normalize_whitespace(&text);
                    if text == expected {
                        return Ok(());
                    }
                    last_seen = Some(text);
                }
                Ok(None) => last_seen = None,
                Err(err) => debug!(locator = %self.locator, error = %err, "text lookup failed"),
            }

            if start.elapsed() >= timeout {
                let actual = last_seen.map_or_else(
                    || "no matching element".to_string(),
                    |text| format!("{text:?}"),
                );
                return Err(PagewrightError::assertion(format!(
                    "Expected {} to have text {expected:?} but got {actual}",
                    self.locator
                )));
            }
            tokio::time::sleep(poll).await;
        }
    }
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
