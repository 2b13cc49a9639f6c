//! Runtime configuration: connection URL, pool size, retry behavior.

use crate::error::{SqError, SqResult};
use crate::placeholder::PlaceholderFormat;
use crate::qb::{BuiltQuery, StatementBuilder};
use crate::transaction::{DEFAULT_SAVEPOINT, RetryPolicy};
use std::time::Duration;

/// Environment variable holding the connection string.
pub const ENV_DATABASE_URL: &str = "DATABASE_URL";
/// Environment variable for the maximum pool size.
pub const ENV_POOL_SIZE: &str = "PGSQ_POOL_SIZE";
/// Environment variable bounding retry attempts (unset means unbounded).
pub const ENV_MAX_RETRIES: &str = "PGSQ_MAX_RETRIES";

/// Configuration for pools and [`transact_with`](crate::transact_with).
#[derive(Debug, Clone)]
pub struct SqConfig {
    /// Postgres connection string.
    pub database_url: Option<String>,
    /// Maximum number of pooled connections.
    pub max_pool_size: usize,
    /// Savepoint used by the retry loop.
    pub savepoint_name: String,
    /// Retry bound and backoff.
    pub retry: RetryPolicy,
    /// Marker style for statements built through this configuration.
    pub placeholder_format: PlaceholderFormat,
}

impl Default for SqConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            max_pool_size: 16,
            savepoint_name: DEFAULT_SAVEPOINT.to_string(),
            retry: RetryPolicy::default(),
            placeholder_format: PlaceholderFormat::Dollar,
        }
    }
}

impl SqConfig {
    /// Create a new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from the process environment, reading `.env` first if present.
    pub fn from_env() -> SqResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> SqResult<Self> {
        let mut config = Self {
            database_url: lookup(ENV_DATABASE_URL),
            ..Self::default()
        };

        if let Some(raw) = lookup(ENV_POOL_SIZE) {
            let size: usize = raw.trim().parse().map_err(|_| {
                SqError::Config(format!("{ENV_POOL_SIZE} must be a positive integer, got {raw:?}"))
            })?;
            if size == 0 {
                return Err(SqError::Config(format!("{ENV_POOL_SIZE} must be at least 1")));
            }
            config.max_pool_size = size;
        }

        if let Some(raw) = lookup(ENV_MAX_RETRIES) {
            let attempts: u32 = raw.trim().parse().map_err(|_| {
                SqError::Config(format!("{ENV_MAX_RETRIES} must be an integer, got {raw:?}"))
            })?;
            config.retry = config.retry.max_attempts(attempts);
        }

        Ok(config)
    }

    pub fn database_url(mut self, url: impl Into<String>) -> Self {
        self.database_url = Some(url.into());
        self
    }

    pub fn max_pool_size(mut self, size: usize) -> Self {
        self.max_pool_size = size;
        self
    }

    pub fn savepoint_name(mut self, name: impl Into<String>) -> Self {
        self.savepoint_name = name.into();
        self
    }

    pub fn retry(mut self, policy: RetryPolicy) -> Self {
        self.retry = policy;
        self
    }

    /// Stop retrying after `attempts` invocations of the callback.
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.retry = self.retry.max_attempts(attempts);
        self
    }

    /// Pause between retries.
    pub fn backoff(mut self, delay: Duration) -> Self {
        self.retry = self.retry.backoff(delay);
        self
    }

    pub fn placeholder_format(mut self, format: PlaceholderFormat) -> Self {
        self.placeholder_format = format;
        self
    }

    /// Build `stmt` with the configured marker style.
    pub fn render(&self, stmt: &impl StatementBuilder) -> SqResult<BuiltQuery> {
        stmt.to_sql_with(self.placeholder_format)
    }

    /// The connection string, or a config error if none was set.
    pub fn require_database_url(&self) -> SqResult<&str> {
        self.database_url
            .as_deref()
            .ok_or_else(|| SqError::Config(format!("{ENV_DATABASE_URL} is not set")))
    }
}
