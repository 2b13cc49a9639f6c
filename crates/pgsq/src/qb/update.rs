//! UPDATE statement builder.

use crate::error::{SqError, SqResult};
use crate::qb::expr::Predicate;
use crate::qb::fragment::Fragment;
use crate::qb::param::{IntoValue, Value};
use crate::qb::traits::{StatementBuilder, impl_sub_statement};
use std::collections::BTreeMap;

/// UPDATE statement builder.
///
/// Emits `[prefixes] UPDATE table SET col = val, ... [FROM a, b] [WHERE ...]
/// [ORDER BY ...] [LIMIT n] [OFFSET n] [suffixes]`.
#[derive(Clone, Debug, Default)]
pub struct UpdateBuilder {
    prefixes: Vec<Predicate>,
    table: String,
    set_clauses: Vec<(String, Value)>,
    from: Vec<String>,
    pub(crate) where_parts: Vec<Predicate>,
    order_by: Vec<String>,
    limit: Option<u64>,
    offset: Option<u64>,
    suffixes: Vec<Predicate>,
}

impl UpdateBuilder {
    /// Create an UPDATE builder for the given table.
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            ..Self::default()
        }
    }

    pub fn prefix(mut self, part: impl Into<Predicate>) -> Self {
        self.prefixes.push(part.into());
        self
    }

    pub fn table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    /// Add `column = value`. The value may be `NULL`, a parameter or a nested statement.
    pub fn set(mut self, column: impl Into<String>, value: impl IntoValue) -> Self {
        self.set_clauses.push((column.into(), value.into_value()));
        self
    }

    /// Add one SET clause per pair, in column order.
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
        self.set_clauses.extend(sorted);
        self
    }

    /// Add a table to the `FROM` list (`UPDATE ... FROM a, b`).
    pub fn from(mut self, from: impl Into<String>) -> Self {
        self.from.push(from.into());
        self
    }

    /// Add a WHERE condition. Conditions are ANDed together.
    pub fn and_where(mut self, pred: impl Into<Predicate>) -> Self {
        self.where_parts.push(pred.into());
        self
    }

    pub fn order_by<I, S>(mut self, exprs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.order_by.extend(exprs.into_iter().map(Into::into));
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn suffix(mut self, part: impl Into<Predicate>) -> Self {
        self.suffixes.push(part.into());
        self
    }
}

impl StatementBuilder for UpdateBuilder {
    fn to_fragment(&self) -> SqResult<Fragment> {
        if self.table.is_empty() {
            return Err(SqError::MissingClause(
                "update statements must specify a table",
            ));
        }
        if self.set_clauses.is_empty() {
            return Err(SqError::MissingClause(
                "update statements must have at least one Set clause",
            ));
        }

        let mut sql = Fragment::default();
        sql.push_prefixes(&self.prefixes)?;

        sql.push_str("UPDATE ");
        sql.push_str(&self.table);
        sql.push_str(" SET ");
        for (i, (column, value)) in self.set_clauses.iter().enumerate() {
            if i > 0 {
                sql.push_str(", ");
            }
            sql.push_str(column);
            sql.push_str(" = ");
            sql.push_value(value)?;
        }

        sql.push_list(" FROM ", &self.from);
        sql.push_clause(" WHERE ", &self.where_parts, " AND ")?;
        sql.push_list(" ORDER BY ", &self.order_by);
        sql.push_limit_offset(self.limit, self.offset);
        sql.push_suffixes(&self.suffixes)?;

        Ok(sql)
    }
}

impl_sub_statement!(UpdateBuilder);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qb::{expr, update};

    #[test]
    fn test_set_null_and_expression() {
        let q = update("users")
            .set("deleted_at", None::<chrono::NaiveDateTime>)
            .set("version", expr("version + ?").bind(1))
            .and_where(expr("id = ?").bind(7_i64))
            .to_sql()
            .unwrap();
        assert_eq!(
            q.sql,
            "UPDATE users SET deleted_at = NULL, version = version + $1 WHERE id = $2"
        );
        assert_eq!(q.params.len(), 2);
    }

    #[test]
    fn test_zero_limit_and_offset() {
        let q = update("a").set("b", true).limit(0).offset(0).to_sql().unwrap();
        assert_eq!(q.sql, "UPDATE a SET b = $1 LIMIT 0 OFFSET 0");
        assert_eq!(q.params[0].to_test_string(), "true");
    }

    #[test]
    fn test_set_map_appends_sorted() {
        let q = update("t")
            .set("first", 0)
            .set_map([("b", 2), ("a", 1)])
            .to_sql()
            .unwrap();
        assert_eq!(q.sql, "UPDATE t SET first = $1, a = $2, b = $3");
    }

    #[test]
    fn test_missing_table_or_set() {
        let err = update("").set("x", 1).to_sql().unwrap_err();
        assert!(matches!(err, SqError::MissingClause(m) if m.contains("table")));

        let err = update("x").to_sql().unwrap_err();
        assert!(matches!(err, SqError::MissingClause(m) if m.contains("Set")));
    }
}
