//! Predicate algebra for WHERE/HAVING clauses and column expressions.
//!
//! A [`Predicate`] is one of:
//! - raw SQL with bound values ([`Expr`])
//! - an equality map ([`Eq`] / [`NotEq`]): `NULL` becomes `IS [NOT] NULL` and a list
//!   becomes `[NOT] IN (?,?,...)`
//! - a comparison map ([`Compare`]) for `<`, `<=`, `>` and `>=`
//! - an AND/OR group, parenthesised as a unit, skipping empty members
//! - any nested statement, optionally aliased as `(<sql>) AS name`
//!
//! Map predicates keep their columns in a `BTreeMap`, so several columns are always
//! emitted in lexicographic order.

use crate::error::{SqError, SqResult};
use crate::placeholder::placeholders;
use crate::qb::fragment::{Expr, Fragment};
use crate::qb::param::{IntoValue, Value};
use crate::qb::traits::{StatementBuilder, impl_sub_statement};
use std::collections::BTreeMap;
use std::sync::Arc;

/// A boolean or value expression that reduces to a [`Fragment`].
#[derive(Clone, Debug)]
pub enum Predicate {
    /// Raw SQL with bound values.
    Expr(Expr),
    /// `col = ?`, `col IS NULL`, `col IN (...)`
    Eq(Eq),
    /// `col <> ?`, `col IS NOT NULL`, `col NOT IN (...)`
    NotEq(NotEq),
    /// `col < ?` and friends.
    Compare(Compare),
    /// Members joined with AND, parenthesised.
    And(Vec<Predicate>),
    /// Members joined with OR, parenthesised.
    Or(Vec<Predicate>),
    /// Nested statement.
    Sub(Arc<dyn StatementBuilder>),
    /// `(<inner>) AS <alias>`
    Alias(Box<Predicate>, String),
}

impl StatementBuilder for Predicate {
    fn to_fragment(&self) -> SqResult<Fragment> {
        match self {
            Predicate::Expr(e) => e.to_fragment(),
            Predicate::Eq(eq) => equality(&eq.columns, false),
            Predicate::NotEq(neq) => equality(&neq.0.columns, true),
            Predicate::Compare(cmp) => cmp.reduce(),
            Predicate::And(parts) => group(parts, " AND "),
            Predicate::Or(parts) => group(parts, " OR "),
            Predicate::Sub(stmt) => stmt.to_fragment(),
            Predicate::Alias(inner, alias) => {
                let f = inner.to_fragment()?;
                Ok(Fragment::new(format!("({}) AS {}", f.sql, alias), f.params))
            }
        }
    }
}

impl IntoValue for Predicate {
    fn into_value(self) -> Value {
        Value::Sub(Arc::new(self))
    }
}

impl IntoValue for Expr {
    fn into_value(self) -> Value {
        Value::Sub(Arc::new(self))
    }
}

impl_sub_statement!(Fragment);

impl From<&str> for Predicate {
    fn from(sql: &str) -> Self {
        Predicate::Expr(Expr::new(sql))
    }
}

impl From<String> for Predicate {
    fn from(sql: String) -> Self {
        Predicate::Expr(Expr::new(sql))
    }
}

impl From<Expr> for Predicate {
    fn from(e: Expr) -> Self {
        Predicate::Expr(e)
    }
}

impl From<Eq> for Predicate {
    fn from(eq: Eq) -> Self {
        Predicate::Eq(eq)
    }
}

impl From<NotEq> for Predicate {
    fn from(neq: NotEq) -> Self {
        Predicate::NotEq(neq)
    }
}

impl From<Compare> for Predicate {
    fn from(cmp: Compare) -> Self {
        Predicate::Compare(cmp)
    }
}

// ==================== Equality ====================

/// Column → value equality map.
///
/// ```ignore
/// let p = Eq::new().with("status", "active").with("deleted_at", None::<i64>);
/// // deleted_at IS NULL AND status = ?
/// ```
#[derive(Clone, Debug, Default)]
pub struct Eq {
    columns: BTreeMap<String, Value>,
}

impl Eq {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a column.
    pub fn with(mut self, column: impl Into<String>, value: impl IntoValue) -> Self {
        self.columns.insert(column.into(), value.into_value());
        self
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl<K: Into<String>, V: IntoValue> FromIterator<(K, V)> for Eq {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Eq::new(), |eq, (column, value)| eq.with(column, value))
    }
}

/// Negated equality map. See [`Eq`].
#[derive(Clone, Debug, Default)]
pub struct NotEq(Eq);

impl NotEq {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, column: impl Into<String>, value: impl IntoValue) -> Self {
        NotEq(self.0.with(column, value))
    }
}

impl From<Eq> for NotEq {
    fn from(eq: Eq) -> Self {
        NotEq(eq)
    }
}

/// `column = value` (or `IS NULL`, `IN (...)` depending on the value).
pub fn eq(column: impl Into<String>, value: impl IntoValue) -> Eq {
    Eq::new().with(column, value)
}

/// `column <> value` (or `IS NOT NULL`, `NOT IN (...)` depending on the value).
pub fn not_eq(column: impl Into<String>, value: impl IntoValue) -> NotEq {
    NotEq::new().with(column, value)
}

fn equality(columns: &BTreeMap<String, Value>, negate: bool) -> SqResult<Fragment> {
    let (eq_op, in_op, null_op) = if negate {
        ("<>", "NOT IN", "IS NOT")
    } else {
        ("=", "IN", "IS")
    };

    let mut out = Fragment::default();
    for (i, (column, value)) in columns.iter().enumerate() {
        if i > 0 {
            out.push_str(" AND ");
        }
        match value {
            Value::Null => out.push_str(&format!("{} {} NULL", column, null_op)),
            Value::Param(p) => {
                out.push_str(&format!("{} {} ", column, eq_op));
                out.push_param(p.clone());
            }
            Value::List(items) => {
                if items.is_empty() {
                    return Err(SqError::EmptyParameterSet(column.clone()));
                }
                out.push_str(&format!(
                    "{} {} ({})",
                    column,
                    in_op,
                    placeholders(items.len())
                ));
                out.params.extend(items.iter().cloned());
            }
            Value::Sub(stmt) => {
                out.push_str(&format!("{} {} (", column, eq_op));
                out.append(stmt.to_fragment()?);
                out.push_str(")");
            }
        }
    }
    Ok(out)
}

// ==================== Comparison ====================

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CompareOp {
    Lt,
    LtOrEq,
    Gt,
    GtOrEq,
}

impl CompareOp {
    pub fn as_str(self) -> &'static str {
        match self {
            CompareOp::Lt => "<",
            CompareOp::LtOrEq => "<=",
            CompareOp::Gt => ">",
            CompareOp::GtOrEq => ">=",
        }
    }
}

/// Column → value map compared with one operator. `NULL` and lists are rejected.
#[derive(Clone, Debug)]
pub struct Compare {
    op: CompareOp,
    columns: BTreeMap<String, Value>,
}

impl Compare {
    pub fn new(op: CompareOp) -> Self {
        Self {
            op,
            columns: BTreeMap::new(),
        }
    }

    pub fn with(mut self, column: impl Into<String>, value: impl IntoValue) -> Self {
        self.columns.insert(column.into(), value.into_value());
        self
    }

    pub fn op(&self) -> CompareOp {
        self.op
    }

    fn reduce(&self) -> SqResult<Fragment> {
        let op = self.op.as_str();
        let mut out = Fragment::default();
        for (i, (column, value)) in self.columns.iter().enumerate() {
            if i > 0 {
                out.push_str(" AND ");
            }
            match value {
                Value::Null => {
                    return Err(SqError::comparison(
                        column,
                        "cannot use NULL with less than or greater than operators",
                    ));
                }
                Value::List(_) => {
                    return Err(SqError::comparison(
                        column,
                        "cannot use a list with less than or greater than operators",
                    ));
                }
                Value::Param(p) => {
                    out.push_str(&format!("{} {} ", column, op));
                    out.push_param(p.clone());
                }
                Value::Sub(stmt) => {
                    out.push_str(&format!("{} {} (", column, op));
                    out.append(stmt.to_fragment()?);
                    out.push_str(")");
                }
            }
        }
        Ok(out)
    }
}

/// `column < value`
pub fn lt(column: impl Into<String>, value: impl IntoValue) -> Compare {
    Compare::new(CompareOp::Lt).with(column, value)
}

/// `column <= value`
pub fn lt_or_eq(column: impl Into<String>, value: impl IntoValue) -> Compare {
    Compare::new(CompareOp::LtOrEq).with(column, value)
}

/// `column > value`
pub fn gt(column: impl Into<String>, value: impl IntoValue) -> Compare {
    Compare::new(CompareOp::Gt).with(column, value)
}

/// `column >= value`
pub fn gt_or_eq(column: impl Into<String>, value: impl IntoValue) -> Compare {
    Compare::new(CompareOp::GtOrEq).with(column, value)
}

// ==================== Groups ====================

/// AND group. Empty members are skipped; an all-empty group reduces to nothing.
pub fn and<P: Into<Predicate>>(parts: impl IntoIterator<Item = P>) -> Predicate {
    Predicate::And(parts.into_iter().map(Into::into).collect())
}

/// OR group. Empty members are skipped; an all-empty group reduces to nothing.
pub fn or<P: Into<Predicate>>(parts: impl IntoIterator<Item = P>) -> Predicate {
    Predicate::Or(parts.into_iter().map(Into::into).collect())
}

/// `(<inner>) AS <alias>`, mostly for computed SELECT columns.
pub fn alias(inner: impl Into<Predicate>, alias: impl Into<String>) -> Predicate {
    Predicate::Alias(Box::new(inner.into()), alias.into())
}

fn group(parts: &[Predicate], sep: &str) -> SqResult<Fragment> {
    let mut inner = join_parts(parts, sep)?;
    if !inner.is_empty() {
        inner.sql.insert(0, '(');
        inner.sql.push(')');
    }
    Ok(inner)
}

/// Reduce `parts` in order and join the non-empty ones with `sep`.
pub(crate) fn join_parts(parts: &[Predicate], sep: &str) -> SqResult<Fragment> {
    let mut out = Fragment::default();
    for part in parts {
        let f = part.to_fragment()?;
        if f.is_empty() {
            continue;
        }
        if !out.is_empty() {
            out.push_str(sep);
        }
        out.append(f);
    }
    Ok(out)
}
