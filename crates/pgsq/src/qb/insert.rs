//! INSERT statement builder.

use crate::error::{SqError, SqResult};
use crate::qb::expr::Predicate;
use crate::qb::fragment::Fragment;
use crate::qb::param::{IntoValue, Value};
use crate::qb::traits::{StatementBuilder, impl_sub_statement};
use std::collections::BTreeMap;

/// INSERT statement builder.
///
/// Each value renders as a `?` marker, literal `NULL`, or the inlined SQL of a nested
/// statement. Lists are rejected; bind a Postgres array with [`Param::new`] instead.
///
/// [`Param::new`]: crate::qb::Param::new
#[derive(Clone, Debug, Default)]
pub struct InsertBuilder {
    prefixes: Vec<Predicate>,
    options: Vec<String>,
    into: String,
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
    suffixes: Vec<Predicate>,
}

impl InsertBuilder {
    /// Create an INSERT builder for the given table.
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            into: table.into(),
            ..Self::default()
        }
    }

    pub fn prefix(mut self, part: impl Into<Predicate>) -> Self {
        self.prefixes.push(part.into());
        self
    }

    /// Keywords between `INSERT` and `INTO`.
    pub fn options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options.extend(options.into_iter().map(Into::into));
        self
    }

    /// Set the target table.
    pub fn into_table(mut self, table: impl Into<String>) -> Self {
        self.into = table.into();
        self
    }

    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns.extend(columns.into_iter().map(Into::into));
        self
    }

    /// Append one row of values.
    ///
    /// Rows with mixed types take `Value`s: `.values([1_i32.into_value(), expr("now()").into_value()])`.
    pub fn values<I, V>(mut self, row: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: IntoValue,
    {
        self.rows
            .push(row.into_iter().map(IntoValue::into_value).collect());
        self
    }

    /// Replace all columns and rows with a single row built from `(column, value)` pairs.
    ///
    /// Columns are sorted, so the same pairs always produce the same statement.
    pub fn set_map<I, K, V>(mut self, clauses: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: IntoValue,
    {
        let sorted: BTreeMap<String, Value> = clauses
            .into_iter()
            .map(|(k, v)| (k.into(), v.into_value()))
            .collect();
        let (columns, row): (Vec<String>, Vec<Value>) = sorted.into_iter().unzip();
        self.columns = columns;
        self.rows = vec![row];
        self
    }

    /// Add an expression after the VALUES list, e.g. `RETURNING id`.
    pub fn suffix(mut self, part: impl Into<Predicate>) -> Self {
        self.suffixes.push(part.into());
        self
    }
}

impl StatementBuilder for InsertBuilder {
    fn to_fragment(&self) -> SqResult<Fragment> {
        if self.into.is_empty() {
            return Err(SqError::MissingClause(
                "insert statements must specify a table",
            ));
        }
        if self.rows.is_empty() {
            return Err(SqError::MissingClause(
                "insert statements must have at least one set of values",
            ));
        }

        let mut sql = Fragment::default();
        sql.push_prefixes(&self.prefixes)?;

        sql.push_str("INSERT ");
        if !self.options.is_empty() {
            sql.push_str(&self.options.join(" "));
            sql.push_str(" ");
        }
        sql.push_str("INTO ");
        sql.push_str(&self.into);
        sql.push_str(" ");

        if !self.columns.is_empty() {
            sql.push_str("(");
            sql.push_str(&self.columns.join(","));
            sql.push_str(") ");
        }

        sql.push_str("VALUES ");
        for (r, row) in self.rows.iter().enumerate() {
            if r > 0 {
                sql.push_str(",");
            }
            sql.push_str("(");
            for (v, value) in row.iter().enumerate() {
                if v > 0 {
                    sql.push_str(",");
                }
                sql.push_value(value)?;
            }
            sql.push_str(")");
        }

        sql.push_suffixes(&self.suffixes)?;
        Ok(sql)
    }
}

impl_sub_statement!(InsertBuilder);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::placeholder::PlaceholderFormat;
    use crate::qb::{expr, insert};

    #[test]
    fn test_placeholder_formats() {
        let b = insert("test").values([1, 2]);

        let q = b.to_sql_with(PlaceholderFormat::Question).unwrap();
        assert_eq!(q.sql, "INSERT INTO test VALUES (?,?)");

        let q = b.to_sql_with(PlaceholderFormat::Dollar).unwrap();
        assert_eq!(q.sql, "INSERT INTO test VALUES ($1,$2)");
    }

    #[test]
    fn test_null_is_literal() {
        let q = insert("t")
            .columns(["a", "b"])
            .values([Some(1), None])
            .to_sql()
            .unwrap();
        assert_eq!(q.sql, "INSERT INTO t (a,b) VALUES ($1,NULL)");
        assert_eq!(q.params.len(), 1);
    }

    #[test]
    fn test_set_map_is_sorted() {
        let q = insert("t")
            .columns(["ignored"])
            .values([9])
            .set_map([("z", 1), ("a", 2), ("m", 3)])
            .to_sql()
            .unwrap();
        assert_eq!(q.sql, "INSERT INTO t (a,m,z) VALUES ($1,$2,$3)");
    }

    #[test]
    fn test_sub_statement_value() {
        let q = insert("t")
            .columns(["a", "b"])
            .values([
                5_i32.into_value(),
                expr("(SELECT max(x) + ? FROM s)").bind(1).into_value(),
            ])
            .to_sql()
            .unwrap();
        assert_eq!(q.sql, "INSERT INTO t (a,b) VALUES ($1,(SELECT max(x) + $2 FROM s))");
        assert_eq!(q.params.len(), 2);
    }

    #[test]
    fn test_list_value_is_rejected() {
        let err = insert("t").values([vec![1, 2]]).to_sql().unwrap_err();
        assert!(matches!(err, SqError::UnsupportedPredicateType(_)));
    }

    #[test]
    fn test_missing_table_or_rows() {
        let err = insert("").values([1]).to_sql().unwrap_err();
        assert!(matches!(err, SqError::MissingClause(m) if m.contains("table")));

        let err = insert("x").to_sql().unwrap_err();
        assert!(matches!(err, SqError::MissingClause(m) if m.contains("values")));
    }
}
