//! Fixture Registry
//!
//! Per-test dependency injection for page objects plus ordered setup and
//! teardown of side-channel fixtures (database rows, seeded users).
//!
//! - [`FixtureRegistry`] lazily builds one instance of each requested page
//!   type, bound to the test's driver
//! - [`FixtureManager`] sets fixtures up by priority and tears them down in
//!   reverse order
//! - [`TestScope`] ties the two together around a test body and always runs
//!   teardown, even when the body fails
//! - [`step`] names a unit of work inside a test for the log

use crate::driver::SharedDriver;
use crate::page_object::{page_name_of, PageObject};
use crate::result::{PagewrightError, PagewrightResult};
use async_trait::async_trait;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;
use tracing::{debug, info, info_span, warn, Instrument};

/// A page object the registry can construct on demand.
pub trait PageFixture: PageObject + Sized + 'static {
    /// Build the page bound to `driver`
    fn from_driver(driver: SharedDriver) -> Self;
}

/// Trait for test fixtures that can be set up and torn down.
///
/// # Example
///
/// ```ignore
/// struct SeedUser {
///     email: String,
/// }
///
/// #[async_trait]
/// impl Fixture for SeedUser {
///     async fn setup(&mut self) -> PagewrightResult<()> {
///         insert_user(&self.email).await
///     }
///
///     async fn teardown(&mut self) -> PagewrightResult<()> {
///         delete_user(&self.email).await
///     }
/// }
/// ```
#[async_trait]
pub trait Fixture: Send + Sync {
    /// Set up the fixture before the test body runs.
    ///
    /// # Errors
    ///
    /// Returns an error if fixture setup fails.
    async fn setup(&mut self) -> PagewrightResult<()>;

    /// Tear down the fixture after the test body returns or fails.
    ///
    /// # Errors
    ///
    /// Returns an error if fixture teardown fails.
    async fn teardown(&mut self) -> PagewrightResult<()>;

    /// Fixture name for logging
    fn name(&self) -> &str {
        page_name_of::<Self>()
    }

    /// Higher priority is set up first and torn down last
    fn priority(&self) -> i32 {
        0
    }
}

/// State of a fixture in the manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixtureState {
    /// Fixture is registered but not set up.
    Registered,
    /// Fixture has been set up successfully.
    SetUp,
    /// Fixture has been torn down.
    TornDown,
    /// Fixture setup or teardown failed.
    Failed,
}

struct FixtureEntry {
    fixture: Box<dyn Fixture>,
    state: FixtureState,
    priority: i32,
}

/// Manager for test fixtures with priority-ordered setup and reverse teardown.
#[derive(Default)]
pub struct FixtureManager {
    fixtures: Vec<FixtureEntry>,
    setup_order: Vec<usize>,
}

impl std::fmt::Debug for FixtureManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FixtureManager")
            .field("fixture_count", &self.fixtures.len())
            .field("setup_order", &self.setup_order.len())
            .finish()
    }
}

impl FixtureManager {
    /// Create a new fixture manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a fixture. Equal priorities keep registration order.
    pub fn register<F: Fixture + 'static>(&mut self, fixture: F) {
        let priority = fixture.priority();
        self.fixtures.push(FixtureEntry {
            fixture: Box::new(fixture),
            state: FixtureState::Registered,
            priority,
        });
    }

    /// Number of registered fixtures
    #[must_use]
    pub fn count(&self) -> usize {
        self.fixtures.len()
    }

    /// State of the first fixture registered under `name`
    #[must_use]
    pub fn state(&self, name: &str) -> Option<FixtureState> {
        self.fixtures
            .iter()
            .find(|entry| entry.fixture.name() == name)
            .map(|entry| entry.state)
    }

    /// Set up all registered fixtures in priority order (highest first).
    ///
    /// # Errors
    ///
    /// Returns a fixture error if any setup fails. Fixtures already set up
    /// are torn down before returning.
    pub async fn setup_all(&mut self) -> PagewrightResult<()> {
        let mut ordered: Vec<usize> = (0..self.fixtures.len()).collect();
        ordered.sort_by_key(|&index| std::cmp::Reverse(self.fixtures[index].priority));

        self.setup_order.clear();
        let mut failure: Option<String> = None;

        for index in ordered {
            let entry = &mut self.fixtures[index];
            if !matches!(entry.state, FixtureState::Registered | FixtureState::TornDown) {
                continue;
            }
            debug!(fixture = entry.fixture.name(), "setting up fixture");
            if let Err(e) = entry.fixture.setup().await {
                entry.state = FixtureState::Failed;
                failure = Some(format!(
                    "Fixture '{}' setup failed: {e}",
                    entry.fixture.name()
                ));
                break;
            }
            entry.state = FixtureState::SetUp;
            self.setup_order.push(index);
        }

        if let Some(message) = failure {
            warn!(%message, "rolling back fixtures");
            if let Err(e) = self.teardown_all().await {
                warn!(error = %e, "rollback teardown failed");
            }
            return Err(PagewrightError::fixture(message));
        }
        Ok(())
    }

    /// Tear down all fixtures in reverse setup order.
    ///
    /// # Errors
    ///
    /// Every set-up fixture is torn down; the first failure is returned.
    pub async fn teardown_all(&mut self) -> PagewrightResult<()> {
        let mut first_error: Option<PagewrightError> = None;

        for index in self.setup_order.drain(..).rev() {
            let entry = &mut self.fixtures[index];
            if entry.state != FixtureState::SetUp {
                continue;
            }
            debug!(fixture = entry.fixture.name(), "tearing down fixture");
            match entry.fixture.teardown().await {
                Ok(()) => entry.state = FixtureState::TornDown,
                Err(e) => {
                    entry.state = FixtureState::Failed;
                    let message = format!("Fixture '{}' teardown failed: {e}", entry.fixture.name());
                    warn!(%message);
                    if first_error.is_none() {
                        first_error = Some(PagewrightError::fixture(message));
                    }
                }
            }
        }

        first_error.map_or(Ok(()), Err)
    }
}

type PageCache = HashMap<TypeId, Arc<dyn Any + Send + Sync>>;

/// Per-test registry of page objects.
///
/// Cloning is cheap and clones share the same cache, so a test body can hand
/// the registry to helpers without losing instance identity.
#[derive(Clone)]
pub struct FixtureRegistry {
    driver: SharedDriver,
    pages: Arc<Mutex<PageCache>>,
}

impl std::fmt::Debug for FixtureRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FixtureRegistry")
            .field("driver", &self.driver)
            .field("pages", &self.instantiated())
            .finish()
    }
}

impl FixtureRegistry {
    /// Create an empty registry for one test
    #[must_use]
    pub fn new(driver: SharedDriver) -> Self {
        Self {
            driver,
            pages: Arc::default(),
        }
    }

    /// The test's automation handle
    #[must_use]
    pub fn driver(&self) -> &SharedDriver {
        &self.driver
    }

    /// The page of type `P`, constructed on first request.
    #[must_use]
    pub fn page<P: PageFixture>(&self) -> Arc<P> {
        let mut pages = self.pages.lock().unwrap_or_else(PoisonError::into_inner);
        let key = TypeId::of::<P>();
        if let Some(existing) = pages.get(&key) {
            if let Ok(page) = Arc::clone(existing).downcast::<P>() {
                return page;
            }
        }
        debug!(page = page_name_of::<P>(), "constructing page fixture");
        let page = Arc::new(P::from_driver(SharedDriver::clone(&self.driver)));
        let _ = pages.insert(key, Arc::clone(&page) as Arc<dyn Any + Send + Sync>);
        page
    }

    /// Number of page objects constructed so far
    #[must_use]
    pub fn instantiated(&self) -> usize {
        self.pages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// One test execution: a fresh registry plus its side-channel fixtures.
#[derive(Debug)]
pub struct TestScope {
    name: String,
    driver: SharedDriver,
    fixtures: FixtureManager,
}

impl TestScope {
    /// Create a scope for the test `name`
    #[must_use]
    pub fn new(name: impl Into<String>, driver: SharedDriver) -> Self {
        Self {
            name: name.into(),
            driver,
            fixtures: FixtureManager::new(),
        }
    }

    /// Register a fixture for this test
    #[must_use]
    pub fn with_fixture<F: Fixture + 'static>(mut self, fixture: F) -> Self {
        self.fixtures.register(fixture);
        self
    }

    /// Test name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run `body` with a fresh registry.
    ///
    /// Fixtures are set up before the body and torn down after it, whether
    /// it succeeded or not. The body's error wins over a teardown error.
    /// The driver is closed last, on every path.
    pub async fn run<T, E, F, Fut>(mut self, body: F) -> Result<T, E>
    where
        F: FnOnce(FixtureRegistry) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: From<PagewrightError> + std::fmt::Display,
    {
        let span = info_span!("test", name = %self.name);
        async move {
            info!("test started");
            let start = Instant::now();
            if let Err(e) = self.fixtures.setup_all().await {
                warn!(error = %e, "fixture setup failed; body skipped");
                close_driver(&self.driver).await;
                return Err(E::from(e));
            }

            let registry = FixtureRegistry::new(SharedDriver::clone(&self.driver));
            let outcome = body(registry).await;
            let teardown = self.fixtures.teardown_all().await;
            close_driver(&self.driver).await;

            let elapsed_ms = start.elapsed().as_millis() as u64;
            match (outcome, teardown) {
                (Ok(value), Ok(())) => {
                    info!(elapsed_ms, "test passed");
                    Ok(value)
                }
                (Ok(_), Err(teardown)) => {
                    warn!(elapsed_ms, error = %teardown, "test failed in teardown");
                    Err(E::from(teardown))
                }
                (Err(e), teardown) => {
                    if let Err(teardown) = teardown {
                        warn!(error = %teardown, "teardown also failed");
                    }
                    warn!(elapsed_ms, error = %e, "test failed");
                    Err(e)
                }
            }
        }
        .instrument(span)
        .await
    }
}

async fn close_driver(driver: &SharedDriver) {
    if let Err(e) = driver.close().await {
        warn!(error = %e, "closing driver failed");
    }
}

/// Run `fut` as a named test step.
///
/// The step's error propagates unchanged.
pub async fn step<T, E, Fut>(name: &str, fut: Fut) -> Result<T, E>
where
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let span = info_span!("step", step = name);
    async move {
        debug!("step started");
        let start = Instant::now();
        let result = fut.await;
        let elapsed_ms = start.elapsed().as_millis() as u64;
        match &result {
            Ok(_) => info!(elapsed_ms, "step passed"),
            Err(e) => warn!(elapsed_ms, error = %e, "step failed"),
        }
        result
    }
    .instrument(span)
    .await
}
