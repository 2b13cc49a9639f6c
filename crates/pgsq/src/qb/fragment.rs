//! Reduced SQL fragments and raw SQL expressions.

use crate::error::{SqError, SqResult};
use crate::placeholder::{marker_overflow, scan};
use crate::qb::expr::{Predicate, join_parts};
use crate::qb::param::{IntoValue, Param, Value};
use crate::qb::traits::StatementBuilder;
use tokio_postgres::types::ToSql;

/// SQL text with `?` markers plus the parameters for those markers, in order.
///
/// This is what every predicate and builder reduces to.
#[derive(Clone, Debug, Default)]
pub struct Fragment {
    pub sql: String,
    pub params: Vec<Param>,
}

impl Fragment {
    pub fn new(sql: impl Into<String>, params: Vec<Param>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }

    /// Fragment without parameters.
    pub fn raw(sql: impl Into<String>) -> Self {
        Self::new(sql, Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.sql.is_empty()
    }

    /// Get parameters as references for tokio-postgres.
    pub fn params_ref(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.params.iter().map(|p| p.as_ref()).collect()
    }

    pub(crate) fn push_str(&mut self, sql: &str) {
        self.sql.push_str(sql);
    }

    pub(crate) fn push_param(&mut self, param: Param) {
        self.sql.push('?');
        self.params.push(param);
    }

    /// Append another fragment, keeping its parameters in textual order.
    pub(crate) fn append(&mut self, other: Fragment) {
        self.sql.push_str(&other.sql);
        self.params.extend(other.params);
    }

    /// Append a value in a plain value position (INSERT row, SET right-hand side).
    ///
    /// `NULL` is written literally; lists are rejected.
    pub(crate) fn push_value(&mut self, value: &Value) -> SqResult<()> {
        match value {
            Value::Null => self.push_str("NULL"),
            Value::Param(p) => self.push_param(p.clone()),
            Value::Sub(stmt) => self.append(stmt.to_fragment()?),
            Value::List(_) => {
                return Err(SqError::UnsupportedPredicateType(format!(
                    "a {} cannot be used as a single value",
                    value.kind()
                )));
            }
        }
        Ok(())
    }
}

// Clause writers shared by the statement builders.
impl Fragment {
    /// Leading parts joined with spaces, followed by one space.
    pub(crate) fn push_prefixes(&mut self, parts: &[Predicate]) -> SqResult<()> {
        let joined = join_parts(parts, " ")?;
        if !joined.is_empty() {
            self.append(joined);
            self.push_str(" ");
        }
        Ok(())
    }

    /// Trailing parts joined with spaces, after one space.
    pub(crate) fn push_suffixes(&mut self, parts: &[Predicate]) -> SqResult<()> {
        self.push_clause(" ", parts, " ")
    }

    /// `keyword` followed by the non-empty parts joined with `sep`; nothing if all are empty.
    pub(crate) fn push_clause(
        &mut self,
        keyword: &str,
        parts: &[Predicate],
        sep: &str,
    ) -> SqResult<()> {
        let joined = join_parts(parts, sep)?;
        if !joined.is_empty() {
            self.push_str(keyword);
            self.append(joined);
        }
        Ok(())
    }

    pub(crate) fn push_list(&mut self, keyword: &str, items: &[String]) {
        if !items.is_empty() {
            self.push_str(keyword);
            self.push_str(&items.join(", "));
        }
    }

    /// LIMIT and OFFSET are written whenever set, including 0.
    pub(crate) fn push_limit_offset(&mut self, limit: Option<u64>, offset: Option<u64>) {
        if let Some(limit) = limit {
            self.push_str(&format!(" LIMIT {}", limit));
        }
        if let Some(offset) = offset {
            self.push_str(&format!(" OFFSET {}", offset));
        }
    }
}

impl StatementBuilder for Fragment {
    fn to_fragment(&self) -> SqResult<Fragment> {
        Ok(self.clone())
    }
}

/// Raw SQL with bound values.
///
/// Each `?` in the text is matched with the value bound at the same position. When a
/// bound value is a sub-statement, its SQL replaces the marker and its parameters are
/// spliced in at that point.
///
/// ```ignore
/// use pgsq::qb::{expr, select};
///
/// let recent = expr("created_at > now() - ?::interval").bind("1 day");
/// let exists = expr("EXISTS(?)").bind(select(["1"]).from("orders"));
/// ```
#[derive(Clone, Debug, Default)]
pub struct Expr {
    pub(crate) sql: String,
    pub(crate) args: Vec<Value>,
}

/// Create an [`Expr`] from raw SQL.
pub fn expr(sql: impl Into<String>) -> Expr {
    Expr::new(sql)
}

impl Expr {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            args: Vec::new(),
        }
    }

    /// Bind the value for the next `?` marker.
    pub fn bind(mut self, value: impl IntoValue) -> Self {
        self.args.push(value.into_value());
        self
    }

    /// Bind several values of one type, in order.
    pub fn bind_all<V: IntoValue>(mut self, values: impl IntoIterator<Item = V>) -> Self {
        self.args.extend(values.into_iter().map(IntoValue::into_value));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.sql.is_empty()
    }

    pub(crate) fn prefixed(mut self, keyword: &str) -> Self {
        self.sql.insert_str(0, keyword);
        self
    }

    fn inline(&self) -> SqResult<Fragment> {
        let mut params = Vec::with_capacity(self.args.len());
        let mut used = 0;
        let sql = scan(&self.sql, "??", |buf, idx| {
            let arg = self
                .args
                .get(idx - 1)
                .ok_or_else(|| marker_overflow(idx, self.args.len()))?;
            used = idx;
            match arg {
                Value::Param(p) => {
                    buf.push('?');
                    params.push(p.clone());
                }
                Value::Null => buf.push_str("NULL"),
                Value::Sub(stmt) => {
                    let sub = stmt.to_fragment()?;
                    buf.push_str(&sub.sql);
                    params.extend(sub.params);
                }
                Value::List(_) => {
                    return Err(SqError::UnsupportedPredicateType(format!(
                        "a list cannot be bound to marker {} of `{}`",
                        idx, self.sql
                    )));
                }
            }
            Ok(())
        })?;

        if used < self.args.len() {
            return Err(SqError::Placeholder(format!(
                "{} values bound to `{}` but only {} markers",
                self.args.len(),
                self.sql,
                used
            )));
        }
        Ok(Fragment { sql, params })
    }
}

impl StatementBuilder for Expr {
    fn to_fragment(&self) -> SqResult<Fragment> {
        let mut params = Vec::with_capacity(self.args.len());
        for arg in &self.args {
            match arg {
                Value::Param(p) => params.push(p.clone()),
                Value::Null | Value::Sub(_) => return self.inline(),
                Value::List(_) => {
                    return Err(SqError::UnsupportedPredicateType(format!(
                        "a list cannot be bound to `{}`; use placeholders(n) with bind_all",
                        self.sql
                    )));
                }
            }
        }
        // Markers are left as written; only their count is checked here.
        let mut markers = 0;
        scan(&self.sql, "??", |_, idx| {
            markers = idx;
            Ok(())
        })?;
        if markers != params.len() {
            return Err(SqError::Placeholder(format!(
                "{} values bound to `{}` with {} markers",
                params.len(),
                self.sql,
                markers
            )));
        }
        Ok(Fragment::new(self.sql.clone(), params))
    }
}

impl From<&str> for Expr {
    fn from(sql: &str) -> Self {
        Expr::new(sql)
    }
}

impl From<String> for Expr {
    fn from(sql: String) -> Self {
        Expr::new(sql)
    }
}
