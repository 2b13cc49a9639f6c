//! Retryable transactions.
//!
//! Under `SERIALIZABLE` isolation (the default in CockroachDB, and common on Postgres),
//! a transaction can fail with SQLSTATE `40001` whenever it loses a conflict. The work
//! is then safe to run again. [`execute_retryable`] wraps a callback in a savepoint
//! so the retry happens inside the same transaction:
//!
//! ```text
//! SAVEPOINT pgsq
//! loop:
//!     callback(&tx)
//!     ok  -> RELEASE SAVEPOINT pgsq -> COMMIT
//!     40001 -> ROLLBACK TO SAVEPOINT pgsq, run the callback again
//!     other -> ROLLBACK, return the error
//! ```
//!
//! The callback may run more than once, so it must not have side effects outside
//! the transaction.
//!
//! Retrying in place relies on the server restarting the transaction at the savepoint,
//! as CockroachDB does. PostgreSQL keeps the transaction snapshot across
//! `ROLLBACK TO SAVEPOINT`, so a conflict there usually fails again; bound the retries
//! with [`RetryPolicy::max_attempts`] and retry the whole call if needed.
//!
//! # Example
//!
//! ```ignore
//! use pgsq::qb::{eq, expr, update, StatementBuilder};
//!
//! let (mut client, connection) = tokio_postgres::connect("postgres://...", NoTls).await?;
//! tokio::spawn(async move { let _ = connection.await; });
//!
//! pgsq::transact(&mut client, async |tx| {
//!     update("accounts")
//!         .set("balance", expr("balance - ?").bind(100_i64))
//!         .and_where(eq("id", 1_i64))
//!         .execute(tx)
//!         .await?;
//!     update("accounts")
//!         .set("balance", expr("balance + ?").bind(100_i64))
//!         .and_where(eq("id", 2_i64))
//!         .execute(tx)
//!         .await?;
//!     Ok(())
//! })
//! .await?;
//! ```

use crate::client::GenericClient;
use crate::config::SqConfig;
use crate::error::{SqError, SqResult};
use std::time::Duration;
use tokio_postgres::IsolationLevel;

/// Savepoint name used when none is configured.
pub const DEFAULT_SAVEPOINT: &str = "pgsq";

/// An open transaction that can be finished exactly once.
///
/// Dropping the handle without calling either method must roll the transaction
/// back, as `tokio_postgres::Transaction` does.
pub trait TxHandle: GenericClient + Sized {
    fn commit(self) -> impl std::future::Future<Output = SqResult<()>> + Send;

    fn rollback(self) -> impl std::future::Future<Output = SqResult<()>> + Send;
}

impl TxHandle for tokio_postgres::Transaction<'_> {
    async fn commit(self) -> SqResult<()> {
        tokio_postgres::Transaction::commit(self)
            .await
            .map_err(SqError::from_db_error)
    }

    async fn rollback(self) -> SqResult<()> {
        tokio_postgres::Transaction::rollback(self)
            .await
            .map_err(SqError::from_db_error)
    }
}

/// How often a serialization failure may be retried.
///
/// The default retries until the callback succeeds or fails with another error,
/// without pausing in between.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total callback invocations allowed, including the first. `None` is unbounded.
    pub max_attempts: Option<u32>,
    /// Pause before each retry.
    pub backoff: Option<Duration>,
}

impl RetryPolicy {
    /// Retry until success or a non-retryable error.
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Give up after `attempts` invocations. Zero is treated as one.
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = Some(attempts.max(1));
        self
    }

    pub fn backoff(mut self, delay: Duration) -> Self {
        self.backoff = Some(delay);
        self
    }

    fn allows_retry_after(&self, attempt: u32) -> bool {
        self.max_attempts.is_none_or(|max| attempt < max)
    }
}

/// Run `f` inside `tx` under a savepoint, retrying on serialization failures.
///
/// Takes ownership of `tx`: on success it is committed and the callback's value is
/// returned; on any other outcome it is rolled back and the error that ended the
/// loop is returned unchanged. A failing commit is reported as the error.
///
/// `savepoint` must be a plain identifier (ASCII letters, digits and `_`).
pub async fn execute_retryable<T, R, F>(
    tx: T,
    savepoint: &str,
    policy: &RetryPolicy,
    mut f: F,
) -> SqResult<R>
where
    T: TxHandle,
    F: AsyncFnMut(&T) -> SqResult<R>,
{
    if !is_identifier(savepoint) {
        return Err(SqError::Config(format!(
            "invalid savepoint name: {savepoint:?}"
        )));
    }

    let outcome = run_attempts(&tx, savepoint, policy, &mut f).await;
    match outcome {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(_rollback_err) = tx.rollback().await {
                #[cfg(feature = "tracing")]
                tracing::warn!(
                    target: "pgsq.tx",
                    error = %err,
                    rollback_error = %_rollback_err,
                    "transaction rollback failed"
                );
            }
            Err(err)
        }
    }
}

async fn run_attempts<T, R, F>(
    tx: &T,
    savepoint: &str,
    policy: &RetryPolicy,
    f: &mut F,
) -> SqResult<R>
where
    T: TxHandle,
    F: AsyncFnMut(&T) -> SqResult<R>,
{
    tx.batch_execute(&format!("SAVEPOINT {savepoint}")).await?;

    let release = format!("RELEASE SAVEPOINT {savepoint}");
    let rollback_to = format!("ROLLBACK TO SAVEPOINT {savepoint}");
    let mut attempt: u32 = 0;

    loop {
        attempt += 1;
        let err = match f(tx).await {
            Ok(value) => match tx.batch_execute(&release).await {
                Ok(()) => return Ok(value),
                Err(err) => err,
            },
            Err(err) => err,
        };

        if !err.is_serialization_failure() || !policy.allows_retry_after(attempt) {
            return Err(err);
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(
            target: "pgsq.tx",
            attempt,
            savepoint,
            error = %err,
            "serialization failure, retrying"
        );

        if let Err(_rollback_err) = tx.batch_execute(&rollback_to).await {
            #[cfg(feature = "tracing")]
            tracing::warn!(
                target: "pgsq.tx",
                savepoint,
                error = %_rollback_err,
                "rollback to savepoint failed"
            );
            return Err(err);
        }

        if let Some(delay) = policy.backoff {
            tokio::time::sleep(delay).await;
        }
    }
}

fn is_identifier(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with(|c: char| c.is_ascii_digit())
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Begin a `SERIALIZABLE` transaction on `client` and run `f` with retries.
///
/// Uses the default savepoint name and retries without bound. Pooled connections work
/// too: `transact(&mut pooled, ...)` derefs to the underlying client.
pub async fn transact<R, F>(client: &mut tokio_postgres::Client, f: F) -> SqResult<R>
where
    F: AsyncFnMut(&tokio_postgres::Transaction<'_>) -> SqResult<R>,
{
    transact_with(client, &SqConfig::default(), f).await
}

/// Like [`transact`], with the savepoint name and retry policy taken from `config`.
pub async fn transact_with<R, F>(
    client: &mut tokio_postgres::Client,
    config: &SqConfig,
    f: F,
) -> SqResult<R>
where
    F: AsyncFnMut(&tokio_postgres::Transaction<'_>) -> SqResult<R>,
{
    let tx = client
        .build_transaction()
        .isolation_level(IsolationLevel::Serializable)
        .start()
        .await
        .map_err(SqError::from_db_error)?;

    execute_retryable(tx, &config.savepoint_name, &config.retry, f).await
}
