//! Read-only access to the WordPress database behind the store.
//!
//! FooEvents issues one `event_magic_tickets` post per sold ticket and tags it
//! with post meta for the product, booking slot, booking date and payment
//! status. Counting those posts gives the authoritative number of tickets
//! sold; the booking plugin's own stock figure only says what is left.

mod queries;
pub mod tickets;

use std::time::Duration;

use seatsync_core::WordPressDbConfig;
use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions};
use thiserror::Error;

pub use tickets::{DatabaseStatus, TicketRow};

#[derive(Debug, Error)]
pub enum DbError {
    #[error("WordPress database is not configured")]
    NotConfigured,
    #[error("invalid table prefix '{0}'")]
    InvalidTablePrefix(String),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Handle on the WordPress MySQL database.
///
/// Holds a single lazily-opened connection. The connection is checked before
/// each use and reopened if the server dropped it; nothing is opened until the
/// first query.
pub struct WordPressDb {
    pool: MySqlPool,
    host: String,
    database: String,
    table_prefix: String,
}

impl WordPressDb {
    /// Build a handle without touching the network.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::InvalidTablePrefix`] if the configured prefix
    /// contains anything other than ASCII letters, digits, or `_`.
    pub fn connect_lazy(config: &WordPressDbConfig) -> Result<Self, DbError> {
        if !queries::is_valid_table_prefix(&config.table_prefix) {
            return Err(DbError::InvalidTablePrefix(config.table_prefix.clone()));
        }

        let options = MySqlConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.user)
            .password(&config.password)
            .database(&config.database)
            .charset("utf8mb4");

        let pool = MySqlPoolOptions::new()
            .max_connections(1)
            .min_connections(0)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .test_before_acquire(true)
            .connect_lazy_with(options);

        Ok(Self {
            pool,
            host: config.host.clone(),
            database: config.database.clone(),
            table_prefix: config.table_prefix.clone(),
        })
    }

    /// Send a `SELECT 1` to verify the connection is live.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Sqlx`] if the connection cannot be opened or the
    /// query fails.
    pub async fn ping(&self) -> Result<(), DbError> {
        sqlx::query_scalar::<_, i64>("SELECT 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(())
    }

    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    #[must_use]
    pub fn database(&self) -> &str {
        &self.database
    }

    #[must_use]
    pub fn table_prefix(&self) -> &str {
        &self.table_prefix
    }

    /// Close the connection, if one is open.
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::info!("WordPress database connection closed");
    }
}
