//! The starter-template journeys.
//!
//! Each journey opens its own driver (one browser context), registers the
//! datastore fixtures it needs and runs inside a [`TestScope`]. Journeys
//! never share an email, so they can run concurrently against one app and
//! one database.

use crate::datastore::{DeleteUserFixture, UserDirectory};
use crate::error::{CliError, CliResult};
use async_trait::async_trait;
use pagewright::pages::{DashboardHomePage, SignInPage, SignUpPage, DUPLICATE_EMAIL_ERROR};
use pagewright::{
    expect_locator, expect_page, step, DriverFactory, Fixture, PageObject, PagewrightError,
    PagewrightResult, TestScope,
};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A browser journey through the starter template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Journey {
    /// Sign up a new account and land on the dashboard
    SignUp,
    /// Sign up with an email that already has an account
    DuplicateSignUp,
    /// Sign in with an existing account
    SignIn,
}

impl Journey {
    /// Every journey, in run order
    #[must_use]
    pub const fn all() -> [Self; 3] {
        [Self::SignUp, Self::DuplicateSignUp, Self::SignIn]
    }

    /// Kebab-case name used on the command line and in reports
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::SignUp => "sign-up",
            Self::DuplicateSignUp => "duplicate-sign-up",
            Self::SignIn => "sign-in",
        }
    }

    /// Email this journey signs up with.
    ///
    /// `sign-up` uses `base` as is; the others tag the local part with their
    /// name (`carl+sign-in@example.com`).
    #[must_use]
    pub fn email(self, base: &str) -> String {
        if self == Self::SignUp {
            return base.to_string();
        }
        match base.split_once('@') {
            Some((local, domain)) => format!("{local}+{}@{domain}", self.name()),
            None => format!("{base}+{}", self.name()),
        }
    }

    /// Run the journey with a fresh driver from `ctx`
    pub async fn run(self, ctx: &JourneyContext) -> CliResult<()> {
        let email = self.email(&ctx.email_base);
        info!(journey = self.name(), %email, "journey starting");
        match self {
            Self::SignUp => sign_up(ctx, email).await,
            Self::DuplicateSignUp => duplicate_sign_up(ctx, email).await,
            Self::SignIn => sign_in(ctx, email).await,
        }
    }
}

impl fmt::Display for Journey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What every journey needs: a driver source, the users table and credentials
#[derive(Clone)]
pub struct JourneyContext {
    factory: Arc<dyn DriverFactory>,
    users: Arc<dyn UserDirectory>,
    email_base: String,
    password: String,
}

impl fmt::Debug for JourneyContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JourneyContext")
            .field("users", &self.users)
            .field("email_base", &self.email_base)
            .finish_non_exhaustive()
    }
}

impl JourneyContext {
    /// Create a context
    #[must_use]
    pub fn new(
        factory: Arc<dyn DriverFactory>,
        users: Arc<dyn UserDirectory>,
        email_base: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            factory,
            users,
            email_base: email_base.into(),
            password: password.into(),
        }
    }
}

/// Creates an account through the UI before the journey and deletes it after.
///
/// Seeding goes through the sign-up form on a driver of its own, so the
/// journey's session starts signed out.
#[derive(Debug)]
pub struct SeedUserFixture {
    ctx: JourneyContext,
    email: String,
}

impl SeedUserFixture {
    /// Create the fixture for `email`
    #[must_use]
    pub fn new(ctx: JourneyContext, email: impl Into<String>) -> Self {
        Self {
            ctx,
            email: email.into(),
        }
    }

    async fn delete(&self) -> PagewrightResult<()> {
        self.ctx
            .users
            .delete_by_email(&self.email)
            .await
            .map(|_| ())
            .map_err(|e| PagewrightError::fixture(format!("delete {}: {e}", self.email)))
    }

    async fn sign_up_through_ui(&self) -> PagewrightResult<()> {
        let driver = self.ctx.factory.new_driver().await?;
        let sign_up = SignUpPage::new(driver.clone());
        let submitted = async {
            sign_up.navigate().await?;
            sign_up.submit(&self.email, &self.ctx.password).await?;
            expect_page(&DashboardHomePage::new(driver.clone()))
                .to_be_current_page()
                .await
                .map_err(|e| PagewrightError::fixture(format!("seed {}: {e}", self.email)))
        }
        .await;
        if let Err(e) = driver.close().await {
            warn!(error = %e, "closing seeding driver failed");
        }
        submitted?;
        debug!(email = %self.email, "seeded user");
        Ok(())
    }
}

#[async_trait]
impl Fixture for SeedUserFixture {
    async fn setup(&mut self) -> PagewrightResult<()> {
        self.delete().await?;
        let seeded = self.sign_up_through_ui().await;
        if let Err(e) = &seeded {
            // Teardown never runs for a fixture whose setup failed
            warn!(email = %self.email, error = %e, "seeding failed; removing partial user");
            if let Err(cleanup) = self.delete().await {
                warn!(error = %cleanup, "cleanup after failed seed also failed");
            }
        }
        seeded
    }

    async fn teardown(&mut self) -> PagewrightResult<()> {
        self.delete().await
    }

    fn name(&self) -> &str {
        "seed-user"
    }

    fn priority(&self) -> i32 {
        10
    }
}

async fn sign_up(ctx: &JourneyContext, email: String) -> CliResult<()> {
    let driver = ctx.factory.new_driver().await?;
    let users = Arc::clone(&ctx.users);
    let password = ctx.password.clone();
    let fixture = DeleteUserFixture::new(Arc::clone(&ctx.users), email.clone());

    TestScope::new(Journey::SignUp.name(), driver)
        .with_fixture(fixture)
        .run(move |pages| async move {
            let sign_up = pages.page::<SignUpPage>();
            step("visit sign-up", sign_up.navigate()).await?;
            expect_page(sign_up.as_ref()).to_be_current_page().await?;

            step("submit sign-up form", sign_up.submit(&email, &password)).await?;
            expect_page(pages.page::<DashboardHomePage>().as_ref())
                .to_be_current_page()
                .await?;

            let rows = users.find_by_email(&email).await?;
            match rows.as_slice() {
                [row] if row.email == email && row.id > 0 => Ok::<_, CliError>(()),
                [row] => Err(CliError::journey_assertion(format!(
                    "users row for {email} has id {} and email {}",
                    row.id, row.email
                ))),
                _ => Err(CliError::journey_assertion(format!(
                    "expected 1 users row for {email}, found {}",
                    rows.len()
                ))),
            }
        })
        .await
}

async fn duplicate_sign_up(ctx: &JourneyContext, email: String) -> CliResult<()> {
    let driver = ctx.factory.new_driver().await?;
    let users = Arc::clone(&ctx.users);
    let password = ctx.password.clone();
    let fixture = SeedUserFixture::new(ctx.clone(), email.clone());

    TestScope::new(Journey::DuplicateSignUp.name(), driver)
        .with_fixture(fixture)
        .run(move |pages| async move {
            let sign_up = pages.page::<SignUpPage>();
            step("visit sign-up", sign_up.navigate()).await?;
            expect_page(sign_up.as_ref()).to_be_current_page().await?;

            step("resubmit existing email", sign_up.submit(&email, &password)).await?;
            expect_page(sign_up.as_ref()).to_be_current_page().await?;
            expect_locator(pages.driver(), SignUpPage::error())
                .to_have_text(DUPLICATE_EMAIL_ERROR)
                .await?;

            let found = users.find_by_email(&email).await?.len();
            if found == 1 {
                Ok::<_, CliError>(())
            } else {
                Err(CliError::journey_assertion(format!(
                    "expected 1 users row for {email} after duplicate sign-up, found {found}"
                )))
            }
        })
        .await
}

async fn sign_in(ctx: &JourneyContext, email: String) -> CliResult<()> {
    let driver = ctx.factory.new_driver().await?;
    let password = ctx.password.clone();
    let fixture = SeedUserFixture::new(ctx.clone(), email.clone());

    TestScope::new(Journey::SignIn.name(), driver)
        .with_fixture(fixture)
        .run(move |pages| async move {
            let sign_in = pages.page::<SignInPage>();
            step("visit sign-in", sign_in.navigate()).await?;
            expect_page(sign_in.as_ref()).to_be_current_page().await?;

            step("log in", sign_in.login(&email, &password)).await?;
            expect_page(pages.page::<DashboardHomePage>().as_ref())
                .to_be_current_page()
                .await?;
            Ok::<_, CliError>(())
        })
        .await
}
