//! Row mapping traits and utilities

use crate::error::{SqError, SqResult};
use tokio_postgres::Row;
use tokio_postgres::types::FromSql;

/// Trait for converting a database row into a Rust type.
///
/// Statements hand rows to it from [`fetch_all`](crate::qb::StatementBuilder::fetch_all),
/// [`fetch_one`](crate::qb::StatementBuilder::fetch_one) and
/// [`fetch_opt`](crate::qb::StatementBuilder::fetch_opt).
///
/// # Example
///
/// ```ignore
/// use pgsq::{FromRow, RowExt, SqResult};
///
/// struct User {
///     id: i64,
///     email: Option<String>,
/// }
///
/// impl FromRow for User {
///     fn from_row(row: &tokio_postgres::Row) -> SqResult<Self> {
///         Ok(Self {
///             id: row.try_get_column("id")?,
///             email: row.try_get_column("email")?,
///         })
///     }
/// }
/// ```
pub trait FromRow: Sized {
    /// Convert a database row into Self
    fn from_row(row: &Row) -> SqResult<Self>;
}

/// Extension trait for Row to provide typed access
pub trait RowExt {
    /// Try to get a column value, returning SqError::Decode on failure
    fn try_get_column<T>(&self, column: &str) -> SqResult<T>
    where
        T: for<'a> FromSql<'a>;

    /// Same as [`try_get_column`](Self::try_get_column), by position.
    fn try_get_index<T>(&self, idx: usize) -> SqResult<T>
    where
        T: for<'a> FromSql<'a>;
}

impl RowExt for Row {
    fn try_get_column<T>(&self, column: &str) -> SqResult<T>
    where
        T: for<'a> FromSql<'a>,
    {
        self.try_get(column)
            .map_err(|e| SqError::decode(column, e.to_string()))
    }

    fn try_get_index<T>(&self, idx: usize) -> SqResult<T>
    where
        T: for<'a> FromSql<'a>,
    {
        self.try_get(idx)
            .map_err(|e| SqError::decode(format!("#{idx}"), e.to_string()))
    }
}

// Tuples decode positionally: `select(["id", "name"])` -> `(i64, String)`.
macro_rules! impl_tuple_from_row {
    ($($ty:ident => $idx:tt),+) => {
        impl<$($ty),+> FromRow for ($($ty,)+)
        where
            $($ty: for<'a> FromSql<'a>,)+
        {
            fn from_row(row: &Row) -> SqResult<Self> {
                Ok(($(row.try_get_index::<$ty>($idx)?,)+))
            }
        }
    };
}

impl_tuple_from_row!(A => 0);
impl_tuple_from_row!(A => 0, B => 1);
impl_tuple_from_row!(A => 0, B => 1, C => 2);
impl_tuple_from_row!(A => 0, B => 1, C => 2, D => 3);
impl_tuple_from_row!(A => 0, B => 1, C => 2, D => 3, E => 4);
impl_tuple_from_row!(A => 0, B => 1, C => 2, D => 3, E => 4, F => 5);
