//! Parameter storage and the value union accepted by predicates and builders.

use crate::qb::traits::StatementBuilder;
use std::sync::Arc;
use tokio_postgres::types::ToSql;

/// A clone-friendly parameter wrapper using Arc.
///
/// Builders hold their bound values behind an `Arc`, so cloning a statement never
/// copies parameter data.
#[derive(Clone)]
pub struct Param(pub(crate) Arc<dyn ToSql + Send + Sync>);

impl Param {
    /// Create a new parameter from any ToSql value.
    pub fn new<T: ToSql + Send + Sync + 'static>(value: T) -> Self {
        Param(Arc::new(value))
    }

    /// Get a reference to the inner value as a ToSql trait object.
    pub fn as_ref(&self) -> &(dyn ToSql + Sync) {
        &*self.0 as &(dyn ToSql + Sync)
    }
}

impl std::fmt::Debug for Param {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // ToSql has no Debug bound; the inner Arc's Debug would not compile here.
        f.debug_tuple("Param").field(&"<dyn ToSql>").finish()
    }
}

/// A value bound into a statement.
///
/// Where a value ends up decides how each kind is rendered:
///
/// | kind    | equality          | comparison | INSERT / SET / `Expr` |
/// |---------|-------------------|------------|-----------------------|
/// | `Null`  | `IS NULL`         | error      | `NULL`                |
/// | `Param` | `= ?`             | `< ?`      | `?`                   |
/// | `List`  | `IN (?,?,..)`     | error      | error                 |
/// | `Sub`   | `= (<sql>)`       | `< (<sql>)`| `<sql>`               |
#[derive(Clone, Debug)]
pub enum Value {
    Null,
    Param(Param),
    List(Vec<Param>),
    Sub(Arc<dyn StatementBuilder>),
}

impl Value {
    /// Wrap a sub-statement.
    pub fn sub<S: StatementBuilder + 'static>(stmt: S) -> Self {
        Value::Sub(Arc::new(stmt))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Value::Null => "NULL",
            Value::Param(_) => "parameter",
            Value::List(_) => "list",
            Value::Sub(_) => "sub-statement",
        }
    }
}

/// Conversion into a [`Value`].
///
/// Implemented for the scalar types `tokio-postgres` can bind, for `Option<T>`
/// (`None` becomes `NULL`), for `Vec<T>` and arrays (lists), and for every statement
/// builder (sub-statements).
pub trait IntoValue {
    fn into_value(self) -> Value;
}

impl IntoValue for Value {
    fn into_value(self) -> Value {
        self
    }
}

impl IntoValue for Param {
    fn into_value(self) -> Value {
        Value::Param(self)
    }
}

macro_rules! impl_scalar_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl IntoValue for $ty {
                fn into_value(self) -> Value {
                    Value::Param(Param::new(self))
                }
            }
        )*
    };
}

impl_scalar_value!(
    bool,
    i8,
    i16,
    i32,
    i64,
    u32,
    f32,
    f64,
    String,
    &'static str,
    chrono::NaiveDate,
    chrono::NaiveTime,
    chrono::NaiveDateTime,
    chrono::DateTime<chrono::Utc>,
    chrono::DateTime<chrono::FixedOffset>,
    uuid::Uuid,
    serde_json::Value,
);

impl<T: ToSql + Send + Sync + 'static> IntoValue for Option<T> {
    fn into_value(self) -> Value {
        match self {
            Some(v) => Value::Param(Param::new(v)),
            None => Value::Null,
        }
    }
}

impl<T: ToSql + Send + Sync + 'static> IntoValue for Vec<T> {
    fn into_value(self) -> Value {
        Value::List(self.into_iter().map(Param::new).collect())
    }
}

impl<T: ToSql + Send + Sync + 'static, const N: usize> IntoValue for [T; N] {
    fn into_value(self) -> Value {
        Value::List(self.into_iter().map(Param::new).collect())
    }
}

#[cfg(test)]
impl Param {
    /// Encode the value and decode it back as text, for asserting on bound values.
    pub(crate) fn to_test_string(&self) -> String {
        use bytes::BytesMut;
        use tokio_postgres::types::{FromSql, Type};

        let mut buf = BytesMut::new();
        if self.0.to_sql_checked(&Type::INT4, &mut buf).is_ok() {
            return i32::from_sql(&Type::INT4, &buf).unwrap().to_string();
        }
        buf.clear();
        if self.0.to_sql_checked(&Type::INT8, &mut buf).is_ok() {
            return i64::from_sql(&Type::INT8, &buf).unwrap().to_string();
        }
        buf.clear();
        if self.0.to_sql_checked(&Type::BOOL, &mut buf).is_ok() {
            return bool::from_sql(&Type::BOOL, &buf).unwrap().to_string();
        }
        buf.clear();
        if self.0.to_sql_checked(&Type::TEXT, &mut buf).is_ok() {
            return String::from_sql(&Type::TEXT, &buf).unwrap();
        }
        "<other>".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn option_none_is_null() {
        assert!(None::<i32>.into_value().is_null());
        assert!(matches!(Some(10_i64).into_value(), Value::Param(_)));
    }

    #[test]
    fn sequences_become_lists() {
        match vec![1, 2, 3].into_value() {
            Value::List(items) => assert_eq!(items.len(), 3),
            other => panic!("expected list, got {}", other.kind()),
        }
        match ["a", "b"].into_value() {
            Value::List(items) => assert_eq!(items.len(), 2),
            other => panic!("expected list, got {}", other.kind()),
        }
    }
}
