//! Direct database access for journey setup and cleanup.
//!
//! Journeys read and delete `users` rows by literal email, bypassing the
//! application under test. Concurrent journeys must use distinct emails;
//! nothing here serializes access.

use crate::error::CliResult;
use async_trait::async_trait;
use pagewright::{Fixture, PagewrightError, PagewrightResult};
use serde::Serialize;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use std::sync::Arc;
use tracing::{debug, info};

/// A row of the starter app's `users` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserRow {
    /// Generated numeric id
    pub id: i64,
    /// Email the account was created with
    pub email: String,
}

/// Users table as seen by the journeys
#[async_trait]
pub trait UserDirectory: Send + Sync + std::fmt::Debug {
    /// Every row whose email equals `email`
    async fn find_by_email(&self, email: &str) -> CliResult<Vec<UserRow>>;

    /// Delete every row whose email equals `email`, returning the count
    async fn delete_by_email(&self, email: &str) -> CliResult<u64>;
}

/// Postgres-backed [`UserDirectory`]
#[derive(Debug, Clone)]
pub struct UserStore {
    pool: PgPool,
}

impl UserStore {
    /// Wrap an existing pool
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect to `url` with a small pool
    pub async fn connect(url: &str) -> CliResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(4)
            .connect(url)
            .await?;
        info!("connected to journey datastore");
        Ok(Self::new(pool))
    }

    fn map_row(row: &PgRow) -> CliResult<UserRow> {
        Ok(UserRow {
            id: row.try_get("id")?,
            email: row.try_get("email")?,
        })
    }
}

#[async_trait]
impl UserDirectory for UserStore {
    async fn find_by_email(&self, email: &str) -> CliResult<Vec<UserRow>> {
        let rows = sqlx::query(
            r#"
            SELECT id::bigint AS id, email::text AS email
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::map_row).collect()
    }

    async fn delete_by_email(&self, email: &str) -> CliResult<u64> {
        let result = sqlx::query("DELETE FROM users WHERE email = $1")
            .bind(email)
            .execute(&self.pool)
            .await?;
        debug!(%email, rows = result.rows_affected(), "deleted user rows");
        Ok(result.rows_affected())
    }
}

/// Deletes the rows for one email before and after a journey
#[derive(Debug)]
pub struct DeleteUserFixture {
    users: Arc<dyn UserDirectory>,
    email: String,
}

impl DeleteUserFixture {
    /// Create the fixture
    #[must_use]
    pub fn new(users: Arc<dyn UserDirectory>, email: impl Into<String>) -> Self {
        Self {
            users,
            email: email.into(),
        }
    }

    async fn delete(&self) -> PagewrightResult<()> {
        self.users
            .delete_by_email(&self.email)
            .await
            .map(|_| ())
            .map_err(|e| PagewrightError::fixture(format!("delete {}: {e}", self.email)))
    }
}

#[async_trait]
impl Fixture for DeleteUserFixture {
    async fn setup(&mut self) -> PagewrightResult<()> {
        self.delete().await
    }

    async fn teardown(&mut self) -> PagewrightResult<()> {
        self.delete().await
    }

    fn name(&self) -> &str {
        "delete-user"
    }
}
