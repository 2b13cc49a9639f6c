//! The statement trait shared by every predicate and builder.

use crate::client::GenericClient;
use crate::error::{SqError, SqResult};
use crate::placeholder::PlaceholderFormat;
use crate::qb::fragment::Fragment;
use crate::qb::param::Param;
use crate::row::FromRow;
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;

/// Anything that reduces to SQL text plus parameters.
///
/// `to_fragment` is the only required method. It is pure: calling it twice on the same
/// value yields the same text and the same parameters in the same order. Nested
/// statements reduce depth-first and their parameters are spliced in where their SQL
/// lands, so the rewrite to `$n` markers only ever happens once, on the outermost text.
pub trait StatementBuilder: std::fmt::Debug + Send + Sync {
    /// Reduce to text with unnumbered `?` markers.
    fn to_fragment(&self) -> SqResult<Fragment>;

    /// Reduce and rewrite markers as `$1, $2, ...`.
    fn to_sql(&self) -> SqResult<BuiltQuery> {
        self.to_sql_with(PlaceholderFormat::Dollar)
    }

    /// Reduce and rewrite markers in the given format.
    fn to_sql_with(&self, format: PlaceholderFormat) -> SqResult<BuiltQuery> {
        let fragment = self.to_fragment()?;
        let (sql, markers) = format.replace_counted(&fragment.sql)?;
        if markers != fragment.params.len() {
            return Err(SqError::Placeholder(format!(
                "statement has {} markers but {} parameters: {}",
                markers,
                fragment.params.len(),
                fragment.sql
            )));
        }

        #[cfg(feature = "tracing")]
        tracing::trace!(
            target: "pgsq.sql",
            sql = %sql,
            params = fragment.params.len(),
            "statement built"
        );

        Ok(BuiltQuery::new(sql, fragment.params))
    }

    /// Execute and return the number of affected rows.
    fn execute(
        &self,
        conn: &impl GenericClient,
    ) -> impl std::future::Future<Output = SqResult<u64>> + Send
    where
        Self: Sized,
    {
        async move {
            let built = self.to_sql()?;
            conn.execute(&built.sql, &built.params_ref()).await
        }
    }

    /// Execute and return all rows.
    fn query(
        &self,
        conn: &impl GenericClient,
    ) -> impl std::future::Future<Output = SqResult<Vec<Row>>> + Send
    where
        Self: Sized,
    {
        async move {
            let built = self.to_sql()?;
            conn.query(&built.sql, &built.params_ref()).await
        }
    }

    /// Execute and return the first row; no rows is [`SqError::NotFound`].
    fn query_one(
        &self,
        conn: &impl GenericClient,
    ) -> impl std::future::Future<Output = SqResult<Row>> + Send
    where
        Self: Sized,
    {
        async move {
            let built = self.to_sql()?;
            conn.query_one(&built.sql, &built.params_ref()).await
        }
    }

    /// Execute and return the first row, if any.
    fn query_opt(
        &self,
        conn: &impl GenericClient,
    ) -> impl std::future::Future<Output = SqResult<Option<Row>>> + Send
    where
        Self: Sized,
    {
        async move {
            let built = self.to_sql()?;
            conn.query_opt(&built.sql, &built.params_ref()).await
        }
    }

    /// Execute and map all rows to `T`.
    fn fetch_all<T: FromRow>(
        &self,
        conn: &impl GenericClient,
    ) -> impl std::future::Future<Output = SqResult<Vec<T>>> + Send
    where
        Self: Sized,
    {
        async move {
            let rows = self.query(conn).await?;
            rows.iter().map(T::from_row).collect()
        }
    }

    /// Execute and map exactly one row to `T`.
    fn fetch_one<T: FromRow>(
        &self,
        conn: &impl GenericClient,
    ) -> impl std::future::Future<Output = SqResult<T>> + Send
    where
        Self: Sized,
    {
        async move {
            let row = self.query_one(conn).await?;
            T::from_row(&row)
        }
    }

    /// Execute and map at most one row to `T`.
    fn fetch_opt<T: FromRow>(
        &self,
        conn: &impl GenericClient,
    ) -> impl std::future::Future<Output = SqResult<Option<T>>> + Send
    where
        Self: Sized,
    {
        async move {
            let row = self.query_opt(conn).await?;
            row.as_ref().map(T::from_row).transpose()
        }
    }
}

/// The result of building a statement: final SQL and its parameters.
#[derive(Debug, Clone)]
pub struct BuiltQuery {
    pub sql: String,
    pub params: Vec<Param>,
}

impl BuiltQuery {
    /// Create a new built query.
    pub fn new(sql: String, params: Vec<Param>) -> Self {
        Self { sql, params }
    }

    /// Get parameters as references for tokio-postgres.
    pub fn params_ref(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.params.iter().map(|p| p.as_ref()).collect()
    }
}

/// Lets a builder be bound as a value and used as a predicate.
macro_rules! impl_sub_statement {
    ($($ty:ty),* $(,)?) => {
        $(
            impl $crate::qb::param::IntoValue for $ty {
                fn into_value(self) -> $crate::qb::param::Value {
                    $crate::qb::param::Value::Sub(std::sync::Arc::new(self))
                }
            }

            impl From<$ty> for $crate::qb::expr::Predicate {
                fn from(stmt: $ty) -> Self {
                    $crate::qb::expr::Predicate::Sub(std::sync::Arc::new(stmt))
                }
            }
        )*
    };
}

pub(crate) use impl_sub_statement;
