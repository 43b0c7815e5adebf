//! bb8-backed connection pooling for the Diesel PostgreSQL adapters.
//!
//! Repositories hold a cloned [`DbPool`] and check connections out per
//! operation, so no adapter ever blocks the runtime waiting on Postgres.
//! Checkout honours [`PoolOptions::checkout_timeout`].

use std::time::Duration;

use diesel_async::AsyncPgConnection;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::pooled_connection::bb8::{Pool, PooledConnection};

use crate::domain::ports::define_port_error;

define_port_error! {
    /// Failures raised while building the pool or checking out a connection.
    pub enum PoolError {
        /// No connection became available before the checkout timeout.
        Checkout { message: String } =>
            "failed to get connection from pool: {message}",
        /// The pool itself could not be constructed.
        Build { message: String } =>
            "failed to build connection pool: {message}",
    }
}

/// Tunables applied when the pool is built.
///
/// The defaults suit a small deployment: ten connections at most, two kept
/// idle, and a thirty second checkout timeout.
#[derive(Debug, Clone)]
pub struct PoolOptions {
    /// Upper bound on open connections.
    pub max_connections: u32,
    /// Idle connections bb8 keeps warm, or `None` to let the pool drain.
    pub min_idle: Option<u32>,
    /// How long a checkout may wait before failing.
    pub checkout_timeout: Duration,
}

impl Default for PoolOptions {
    fn default() -> Self {
        Self {
            max_connections: 10,
            min_idle: Some(2),
            checkout_timeout: Duration::from_secs(30),
        }
    }
}

/// Shared PostgreSQL pool handed to the persistence adapters.
#[derive(Clone)]
pub struct DbPool {
    inner: Pool<AsyncPgConnection>,
}

impl DbPool {
    /// Build a pool for `database_url` with the supplied tunables.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::Build`] when the pool cannot be constructed.
    pub async fn connect(database_url: &str, options: PoolOptions) -> Result<Self, PoolError> {
        let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(database_url);
        let inner = Pool::builder()
            .max_size(options.max_connections)
            .min_idle(options.min_idle)
            .connection_timeout(options.checkout_timeout)
            .build(manager)
            .await
            .map_err(|err| PoolError::build(err.to_string()))?;
        Ok(Self { inner })
    }

    /// Check out a connection.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::Checkout`] when no connection becomes available
    /// within the configured timeout.
    pub async fn get(&self) -> Result<PooledConnection<'_, AsyncPgConnection>, PoolError> {
        self.inner
            .get()
            .await
            .map_err(|err| PoolError::checkout(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn default_options_suit_a_small_deployment() {
        let options = PoolOptions::default();

        assert_eq!(options.max_connections, 10);
        assert_eq!(options.min_idle, Some(2));
        assert_eq!(options.checkout_timeout, Duration::from_secs(30));
    }

    #[rstest]
    #[case::checkout(PoolError::checkout("connection refused"), "connection refused")]
    #[case::build(PoolError::build("bad URL"), "bad URL")]
    fn pool_errors_carry_their_cause(#[case] error: PoolError, #[case] cause: &str) {
        assert!(error.to_string().contains(cause));
    }
}
