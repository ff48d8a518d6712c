//! Async connection pool for SQL Server.
//!
//! Wraps `bb8` with the `bb8-tiberius` manager. Checkout respects the
//! configured timeout and every failure is mapped to [`PoolError`].

use std::time::Duration;

use bb8::{Pool, PooledConnection, RunError};
use bb8_tiberius::ConnectionManager;
use tracing::info;

use super::DbConfig;

/// Errors that can occur during pool operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    /// Failed to check out a connection from the pool.
    #[error("failed to get connection from pool: {message}")]
    Checkout {
        /// Driver or timeout detail.
        message: String,
    },

    /// Failed to build the connection pool.
    #[error("failed to build connection pool: {message}")]
    Build {
        /// Driver detail.
        message: String,
    },

    /// The connectivity probe did not succeed in time.
    #[error("database ping failed: {message}")]
    Ping {
        /// Driver or timeout detail.
        message: String,
    },
}

impl PoolError {
    /// Create a checkout error with the given message.
    pub fn checkout(message: impl Into<String>) -> Self {
        Self::Checkout {
            message: message.into(),
        }
    }

    /// Create a build error with the given message.
    pub fn build(message: impl Into<String>) -> Self {
        Self::Build {
            message: message.into(),
        }
    }

    /// Create a ping error with the given message.
    pub fn ping(message: impl Into<String>) -> Self {
        Self::Ping {
            message: message.into(),
        }
    }
}

/// Pool sizing and timeouts.
///
/// Defaults: 10 connections, 2 kept idle, 10 second checkout timeout.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    db: DbConfig,
    max_size: u32,
    min_idle: Option<u32>,
    connection_timeout: Duration,
}

impl PoolConfig {
    /// Create a configuration for `db` with default sizing.
    #[must_use]
    pub fn new(db: DbConfig) -> Self {
        Self {
            db,
            max_size: 10,
            min_idle: Some(2),
            connection_timeout: Duration::from_secs(10),
        }
    }

    /// Set the maximum number of connections in the pool.
    #[must_use]
    pub fn with_max_size(mut self, max_size: u32) -> Self {
        self.max_size = max_size;
        self
    }

    /// Set the minimum number of idle connections to maintain.
    #[must_use]
    pub fn with_min_idle(mut self, min_idle: Option<u32>) -> Self {
        self.min_idle = min_idle;
        self
    }

    /// Set the connection checkout timeout.
    #[must_use]
    pub fn with_connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }

    /// Checkout timeout, also used to bound the startup ping.
    #[must_use]
    pub const fn connection_timeout(&self) -> Duration {
        self.connection_timeout
    }
}

/// Shared pool of SQL Server connections.
#[derive(Clone)]
pub struct DbPool {
    inner: Pool<ConnectionManager>,
    timeout: Duration,
}

impl DbPool {
    /// Build the pool. Connections are opened lazily apart from the idle
    /// minimum.
    ///
    /// # Errors
    /// Returns [`PoolError::Build`] when the pool cannot be constructed.
    pub async fn new(config: PoolConfig) -> Result<Self, PoolError> {
        let manager = ConnectionManager::new(config.db.to_tiberius());
        let pool = Pool::builder()
            .max_size(config.max_size)
            .min_idle(config.min_idle)
            .connection_timeout(config.connection_timeout)
            .build(manager)
            .await
            .map_err(|err| PoolError::build(err.to_string()))?;

        info!(
            host = config.db.host(),
            port = config.db.port(),
            database = config.db.database(),
            max_size = config.max_size,
            "database pool created"
        );
        Ok(Self {
            inner: pool,
            timeout: config.connection_timeout,
        })
    }

    /// Get a connection from the pool.
    ///
    /// # Errors
    /// Returns [`PoolError::Checkout`] if no connection is available within
    /// the configured timeout.
    pub async fn get(&self) -> Result<PooledConnection<'_, ConnectionManager>, PoolError> {
        self.inner.get().await.map_err(|err| match err {
            RunError::User(source) => PoolError::checkout(source.to_string()),
            RunError::TimedOut => PoolError::checkout("timed out waiting for a connection"),
        })
    }

    /// Run `SELECT 1` to prove the database is reachable.
    ///
    /// # Errors
    /// Returns [`PoolError::Ping`] when the probe fails or exceeds the
    /// connection timeout.
    pub async fn ping(&self) -> Result<(), PoolError> {
        let probe = async {
            let mut conn = self.get().await?;
            conn.simple_query("SELECT 1")
                .await
                .map_err(|err| PoolError::ping(err.to_string()))?
                .into_results()
                .await
                .map_err(|err| PoolError::ping(err.to_string()))?;
            Ok::<(), PoolError>(())
        };
        tokio::time::timeout(self.timeout, probe)
            .await
            .map_err(|_| PoolError::ping(format!("no answer within {:?}", self.timeout)))?
    }
}
