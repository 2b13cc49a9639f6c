//! # pgsq
//!
//! Composable SQL statements and retryable transactions for Postgres.
//!
//! ## Features
//!
//! - **Statement builders**: SELECT / INSERT / UPDATE / DELETE / CASE / WITH built from
//!   nestable parts, rendered once with `$n` markers
//! - **Predicate algebra**: equality and comparison maps, AND / OR groups, raw expressions
//!   with bound values, sub-statements anywhere a value fits
//! - **Driver agnostic core**: builders only produce SQL text plus parameters; execution
//!   goes through [`GenericClient`]
//! - **Retryable transactions**: a savepoint loop that replays the work on
//!   serialization failures (SQLSTATE `40001`)
//!
//! ## Statements
//!
//! ```ignore
//! use pgsq::qb::{self, eq, expr, gt, StatementBuilder};
//!
//! let q = qb::select(["id", "email"])
//!     .from("users")
//!     .and_where(eq("status", "active"))
//!     .and_where(gt("logins", 10))
//!     .order_by(["id"])
//!     .limit(20)
//!     .to_sql()?;
//! assert_eq!(
//!     q.sql,
//!     "SELECT id, email FROM users WHERE status = $1 AND logins > $2 ORDER BY id LIMIT 20"
//! );
//! ```
//!
//! ## Transactions
//!
//! ```ignore
//! let config = pgsq::SqConfig::from_env()?;
//! let pool = pgsq::create_pool(&config)?;
//!
//! pgsq::transact_pooled(&pool, &config, async |tx| {
//!     qb::update("stock")
//!         .set("qty", expr("qty - ?").bind(1))
//!         .and_where(eq("sku", "A-1"))
//!         .execute(tx)
//!         .await?;
//!     Ok(())
//! })
//! .await?;
//! ```

pub mod client;
pub mod codes;
pub mod config;
pub mod error;
pub mod placeholder;
pub mod qb;
pub mod row;
pub mod transaction;

pub use client::GenericClient;
pub use codes::{ErrorClass, SqlState, is_error};
pub use config::SqConfig;
pub use error::{SqError, SqResult};
pub use placeholder::{PlaceholderFormat, placeholders};
pub use row::{FromRow, RowExt};
pub use transaction::{
    DEFAULT_SAVEPOINT, RetryPolicy, TxHandle, execute_retryable, transact, transact_with,
};

// Re-export qb entry points for easy access
pub use qb::{
    BuiltQuery, StatementBuilder, case, case_value, delete, delete_from, insert, select, update,
    where_clause, with,
};

#[cfg(feature = "pool")]
pub mod pool;

#[cfg(feature = "pool")]
pub use pool::{create_pool, transact_pooled};
