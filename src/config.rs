use std::time::Duration;

use sqlx::any::AnyPoolOptions;

use crate::db::{SqlDb, open_with};
use crate::error::SqlFacadeError;

/// Pool settings applied when a [`SqlDb`] is constructed.
///
/// The defaults are sqlx's own, so `PoolOptions::default()` changes nothing about how the
/// native pool behaves.
///
/// ```rust
/// use std::time::Duration;
/// use sql_facade::PoolOptions;
///
/// let opts = PoolOptions::builder()
///     .max_open_conns(4)
///     .idle_timeout(None)
///     .acquire_timeout(Duration::from_secs(5))
///     .finish();
/// assert_eq!(opts.max_open_conns, 4);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolOptions {
    pub max_open_conns: u32,
    /// Connections the pool keeps open even when idle.
    pub min_idle_conns: u32,
    /// How long `conn`, `ping` and friends wait for a free connection before the driver gives up.
    pub acquire_timeout: Duration,
    pub idle_timeout: Option<Duration>,
    pub max_lifetime: Option<Duration>,
    /// Ping a pooled connection before handing it out.
    pub test_before_acquire: bool,
}

impl Default for PoolOptions {
    fn default() -> Self {
        Self {
            max_open_conns: 10,
            min_idle_conns: 0,
            acquire_timeout: Duration::from_secs(30),
            idle_timeout: Some(Duration::from_secs(10 * 60)),
            max_lifetime: Some(Duration::from_secs(30 * 60)),
            test_before_acquire: true,
        }
    }
}

impl PoolOptions {
    #[must_use]
    pub fn builder() -> PoolOptionsBuilder {
        PoolOptionsBuilder::new()
    }

    pub(crate) fn to_native(&self) -> AnyPoolOptions {
        AnyPoolOptions::new()
            .max_connections(self.max_open_conns)
            .min_connections(self.min_idle_conns)
            .acquire_timeout(self.acquire_timeout)
            .idle_timeout(self.idle_timeout)
            .max_lifetime(self.max_lifetime)
            .test_before_acquire(self.test_before_acquire)
    }
}

/// Fluent builder for [`PoolOptions`].
#[derive(Debug, Clone, Default)]
pub struct PoolOptionsBuilder {
    opts: PoolOptions,
}

impl PoolOptionsBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn max_open_conns(mut self, max: u32) -> Self {
        self.opts.max_open_conns = max;
        self
    }

    #[must_use]
    pub fn min_idle_conns(mut self, min: u32) -> Self {
        self.opts.min_idle_conns = min;
        self
    }

    #[must_use]
    pub fn acquire_timeout(mut self, timeout: Duration) -> Self {
        self.opts.acquire_timeout = timeout;
        self
    }

    #[must_use]
    pub fn idle_timeout(mut self, timeout: impl Into<Option<Duration>>) -> Self {
        self.opts.idle_timeout = timeout.into();
        self
    }

    #[must_use]
    pub fn max_lifetime(mut self, lifetime: impl Into<Option<Duration>>) -> Self {
        self.opts.max_lifetime = lifetime.into();
        self
    }

    #[must_use]
    pub fn test_before_acquire(mut self, test: bool) -> Self {
        self.opts.test_before_acquire = test;
        self
    }

    #[must_use]
    pub fn finish(self) -> PoolOptions {
        self.opts
    }

    /// Build a [`SqlDb`] with these options.
    ///
    /// # Errors
    ///
    /// Returns `SqlFacadeError` if the driver name is unknown or the data source does not parse.
    pub fn open(self, driver_name: &str, data_source: &str) -> Result<SqlDb, SqlFacadeError> {
        open_with(driver_name, data_source, &self.opts)
    }
}
