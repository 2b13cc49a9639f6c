//! Connection pool utilities

use crate::config::SqConfig;
use crate::error::{SqError, SqResult};
use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod};
use tokio_postgres::NoTls;

/// Create a connection pool from a configuration.
///
/// Uses `NoTls`. The connection string comes from `config.database_url`.
///
/// # Example
///
/// ```ignore
/// let config = pgsq::SqConfig::from_env()?;
/// let pool = pgsq::create_pool(&config)?;
/// let client = pool.get().await?;
/// ```
pub fn create_pool(config: &SqConfig) -> SqResult<Pool> {
    let pg_config: tokio_postgres::Config = config
        .require_database_url()?
        .parse()
        .map_err(|e: tokio_postgres::Error| SqError::Connection(e.to_string()))?;

    let mgr = Manager::from_config(pg_config, NoTls, default_manager_config());
    Pool::builder(mgr)
        .max_size(config.max_pool_size)
        .build()
        .map_err(|e| SqError::Pool(e.to_string()))
}

/// Check out a connection and run `f` in a retryable `SERIALIZABLE` transaction.
pub async fn transact_pooled<R, F>(pool: &Pool, config: &SqConfig, f: F) -> SqResult<R>
where
    F: AsyncFnMut(&tokio_postgres::Transaction<'_>) -> SqResult<R>,
{
    let mut client = pool.get().await?;
    crate::transaction::transact_with(&mut client, config, f).await
}

fn default_manager_config() -> ManagerConfig {
    ManagerConfig {
        recycling_method: RecyclingMethod::Fast,
    }
}
