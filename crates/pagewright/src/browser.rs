//! Chromium browser control over CDP.
//!
//! [`ChromiumBrowser`] owns one Chromium process. Every call to
//! [`DriverFactory::new_driver`] opens a page in a fresh browser context, so
//! tests never share cookies or storage. [`ChromiumDriver`] implements
//! [`PageDriver`] by evaluating the locator queries from [`crate::locator`]
//! in the page.

use crate::driver::{DriverConfig, DriverFactory, PageDriver, SharedDriver};
use crate::locator::{Locator, MARKER_ATTRIBUTE};
use crate::result::{PagewrightError, PagewrightResult};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig as CdpConfig};
use chromiumoxide::cdp::browser_protocol::browser::BrowserContextId;
use chromiumoxide::cdp::browser_protocol::target::{
    CreateBrowserContextParams, CreateTargetParams, DisposeBrowserContextParams,
};
use chromiumoxide::page::Page as CdpPage;
use futures::StreamExt;
use serde::de::DeserializeOwned;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info};

fn launch_error(e: impl std::fmt::Display) -> PagewrightError {
    PagewrightError::BrowserLaunch {
        message: e.to_string(),
    }
}

/// Browser instance with a live CDP connection
#[derive(Debug)]
pub struct ChromiumBrowser {
    config: DriverConfig,
    inner: Arc<Mutex<CdpBrowser>>,
    handle: tokio::task::JoinHandle<()>,
}

impl ChromiumBrowser {
    /// Launch Chromium.
    ///
    /// # Errors
    ///
    /// Returns error if the browser cannot be launched
    pub async fn launch(config: DriverConfig) -> PagewrightResult<Self> {
        let mut builder =
            CdpConfig::builder().window_size(config.viewport_width, config.viewport_height);

        if !config.headless {
            builder = builder.with_head();
        }

        if let Some(ref path) = config.executable_path {
            builder = builder.chrome_executable(path);
        }

        let cdp_config = builder
            .build()
            .map_err(|message| PagewrightError::BrowserLaunch { message })?;

        let (browser, mut handler) = CdpBrowser::launch(cdp_config)
            .await
            .map_err(launch_error)?;

        let handle = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        info!(headless = config.headless, "chromium launched");
        Ok(Self {
            config,
            inner: Arc::new(Mutex::new(browser)),
            handle,
        })
    }

    /// Open a blank page in its own browser context
    pub async fn new_page(&self) -> PagewrightResult<ChromiumDriver> {
        let mut browser = self.inner.lock().await;
        let context = browser
            .create_browser_context(CreateBrowserContextParams::default())
            .await
            .map_err(launch_error)?;
        let params = CreateTargetParams::builder()
            .url("about:blank")
            .browser_context_id(context.clone())
            .build()
            .map_err(|message| PagewrightError::BrowserLaunch { message })?;
        let page = browser.new_page(params).await.map_err(launch_error)?;
        debug!("opened page in isolated browser context");

        Ok(ChromiumDriver {
            page,
            context,
            browser: Arc::clone(&self.inner),
            closed: AtomicBool::new(false),
            config: self.config.clone(),
        })
    }

    /// Get the driver configuration
    #[must_use]
    pub const fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// Close the browser and stop the event loop
    pub async fn close(self) -> PagewrightResult<()> {
        {
            let mut browser = self.inner.lock().await;
            let _ = browser.close().await.map_err(launch_error)?;
        }
        self.handle.abort();
        Ok(())
    }
}

#[async_trait]
impl DriverFactory for ChromiumBrowser {
    async fn new_driver(&self) -> PagewrightResult<SharedDriver> {
        Ok(Arc::new(self.new_page().await?))
    }
}

/// One browser page driven through CDP.
///
/// The page lives in a browser context of its own; [`PageDriver::close`]
/// closes the page and disposes the context.
pub struct ChromiumDriver {
    page: CdpPage,
    context: BrowserContextId,
    browser: Arc<Mutex<CdpBrowser>>,
    closed: AtomicBool,
    config: DriverConfig,
}

impl std::fmt::Debug for ChromiumDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChromiumDriver")
            .field("context", &self.context)
            .field("closed", &self.closed)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ChromiumDriver {
    async fn eval<T: DeserializeOwned>(&self, expression: &str) -> PagewrightResult<T> {
        let result = self
            .page
            .evaluate(expression)
            .await
            .map_err(|e| PagewrightError::interaction(e.to_string()))?;
        result
            .into_value()
            .map_err(|e| PagewrightError::interaction(e.to_string()))
    }

    async fn is_visible(&self, locator: &Locator) -> bool {
        match self
            .eval::<bool>(&locator.selector().to_visibility_query())
            .await
        {
            Ok(visible) => visible,
            Err(e) => {
                debug!(%locator, error = %e, "visibility check failed");
                false
            }
        }
    }

    async fn wait_actionable(&self, locator: &Locator) -> PagewrightResult<()> {
        self.wait_for_visible(locator, self.config.assertion_timeout)
            .await
            .map_err(|_| PagewrightError::ElementNotFound {
                locator: locator.to_string(),
            })
    }
}

/// CSS selector for an element tagged with `marker`
fn marker_selector(marker: &str) -> String {
    format!("[{MARKER_ATTRIBUTE}=\"{marker}\"]")
}

#[async_trait]
impl PageDriver for ChromiumDriver {
    async fn goto(&self, url: &str) -> PagewrightResult<()> {
        debug!(%url, "goto");
        match tokio::time::timeout(self.config.navigation_timeout, self.page.goto(url)).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(PagewrightError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            }),
            Err(_) => Err(PagewrightError::Navigation {
                url: url.to_string(),
                message: format!(
                    "timed out after {}ms",
                    self.config.navigation_timeout.as_millis()
                ),
            }),
        }
    }

    async fn fill(&self, locator: &Locator, text: &str) -> PagewrightResult<()> {
        self.wait_actionable(locator).await?;
        let filled: bool = self
            .eval(&locator.selector().to_fill_query(text))
            .await?;
        if filled {
            Ok(())
        } else {
            Err(PagewrightError::ElementNotFound {
                locator: locator.to_string(),
            })
        }
    }

    async fn click(&self, locator: &Locator) -> PagewrightResult<()> {
        self.wait_actionable(locator).await?;
        let marker = uuid::Uuid::new_v4().to_string();
        let marked: bool = self
            .eval(&locator.selector().to_mark_query(&marker))
            .await?;
        if !marked {
            return Err(PagewrightError::ElementNotFound {
                locator: locator.to_string(),
            });
        }
        let element = self
            .page
            .find_element(marker_selector(&marker))
            .await
            .map_err(|e| PagewrightError::interaction(format!("{locator}: {e}")))?;
        let _ = element
            .click()
            .await
            .map_err(|e| PagewrightError::interaction(format!("{locator}: {e}")))?;
        Ok(())
    }

    async fn wait_for_visible(
        &self,
        locator: &Locator,
        timeout: Duration,
    ) -> PagewrightResult<()> {
        let start = Instant::now();
        loop {
            if self.is_visible(locator).await {
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
        // Stringified so a missing element arrives as "null" rather than an empty result
        let raw: String = self
            .eval(&format!(
                "JSON.stringify({})",
                locator.selector().to_text_query()
            ))
            .await?;
        Ok(serde_json::from_str(&raw)?)
    }

    async fn current_url(&self) -> PagewrightResult<String> {
        let url = self
            .page
            .url()
            .await
            .map_err(|e| PagewrightError::interaction(e.to_string()))?;
        Ok(url.unwrap_or_default())
    }

    async fn close(&self) -> PagewrightResult<()> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        let page_closed = self
            .page
            .clone()
            .close()
            .await
            .map_err(|e| PagewrightError::interaction(format!("close page: {e}")));
        let disposed = self
            .browser
            .lock()
            .await
            .execute(DisposeBrowserContextParams::new(self.context.clone()))
            .await
            .map(|_| ())
            .map_err(|e| PagewrightError::interaction(format!("dispose browser context: {e}")));
        debug!("closed page and disposed its browser context");
        page_closed.and(disposed)
    }

    fn config(&self) -> &DriverConfig {
        &self.config
    }
}
