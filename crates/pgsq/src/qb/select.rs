//! SELECT statement builder.

use crate::error::{SqError, SqResult};
use crate::qb::expr::Predicate;
use crate::qb::fragment::{Expr, Fragment};
use crate::qb::traits::{StatementBuilder, impl_sub_statement};

/// SELECT statement builder.
///
/// Emits `[prefixes] SELECT [DISTINCT] columns [FROM from] [joins] [WHERE ...]
/// [GROUP BY ...] [HAVING ...] [ORDER BY ...] [LIMIT n] [OFFSET n] [suffixes]`.
#[derive(Clone, Debug, Default)]
pub struct SelectBuilder {
    prefixes: Vec<Predicate>,
    distinct: bool,
    columns: Vec<Predicate>,
    from: Option<String>,
    joins: Vec<Predicate>,
    pub(crate) where_parts: Vec<Predicate>,
    group_by: Vec<String>,
    having_parts: Vec<Predicate>,
    order_by: Vec<String>,
    limit: Option<u64>,
    offset: Option<u64>,
    suffixes: Vec<Predicate>,
}

impl SelectBuilder {
    /// Create an empty SELECT builder (at least one column is required to build).
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an expression before `SELECT`, e.g. a WITH clause.
    pub fn prefix(mut self, part: impl Into<Predicate>) -> Self {
        self.prefixes.push(part.into());
        self
    }

    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    // ==================== Columns ====================

    /// Append plain result columns.
    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns
            .extend(columns.into_iter().map(|c| Predicate::Expr(Expr::new(c))));
        self
    }

    /// Append one result column: raw SQL, an expression with bound values, an alias or
    /// a sub-statement.
    pub fn column(mut self, column: impl Into<Predicate>) -> Self {
        self.columns.push(column.into());
        self
    }

    pub fn from(mut self, from: impl Into<String>) -> Self {
        self.from = Some(from.into());
        self
    }

    // ==================== JOIN ====================

    /// Add a join clause verbatim.
    pub fn join_clause(mut self, join: impl Into<Expr>) -> Self {
        self.joins.push(Predicate::Expr(join.into()));
        self
    }

    pub fn join(self, join: impl Into<Expr>) -> Self {
        self.join_clause(join.into().prefixed("JOIN "))
    }

    pub fn left_join(self, join: impl Into<Expr>) -> Self {
        self.join_clause(join.into().prefixed("LEFT JOIN "))
    }

    pub fn right_join(self, join: impl Into<Expr>) -> Self {
        self.join_clause(join.into().prefixed("RIGHT JOIN "))
    }

    pub fn inner_join(self, join: impl Into<Expr>) -> Self {
        self.join_clause(join.into().prefixed("INNER JOIN "))
    }

    // ==================== WHERE / GROUP BY / HAVING ====================

    /// Add a WHERE condition. Conditions are ANDed together; empty ones are skipped.
    pub fn and_where(mut self, pred: impl Into<Predicate>) -> Self {
        self.where_parts.push(pred.into());
        self
    }

    pub fn group_by<I, S>(mut self, exprs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.group_by.extend(exprs.into_iter().map(Into::into));
        self
    }

    /// Add a HAVING condition. Conditions are ANDed together.
    pub fn having(mut self, pred: impl Into<Predicate>) -> Self {
        self.having_parts.push(pred.into());
        self
    }

    // ==================== ORDER / LIMIT / OFFSET ====================

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

    /// Add an expression after everything else, e.g. `FOR UPDATE`.
    pub fn suffix(mut self, part: impl Into<Predicate>) -> Self {
        self.suffixes.push(part.into());
        self
    }
}

impl StatementBuilder for SelectBuilder {
    fn to_fragment(&self) -> SqResult<Fragment> {
        if self.columns.is_empty() {
            return Err(SqError::MissingClause(
                "select statements must have at least one result column",
            ));
        }

        let mut sql = Fragment::default();
        sql.push_prefixes(&self.prefixes)?;

        sql.push_str("SELECT ");
        if self.distinct {
            sql.push_str("DISTINCT ");
        }
        sql.push_clause("", &self.columns, ", ")?;

        if let Some(from) = &self.from {
            sql.push_str(" FROM ");
            sql.push_str(from);
        }

        sql.push_clause(" ", &self.joins, " ")?;
        sql.push_clause(" WHERE ", &self.where_parts, " AND ")?;
        sql.push_list(" GROUP BY ", &self.group_by);
        sql.push_clause(" HAVING ", &self.having_parts, " AND ")?;
        sql.push_list(" ORDER BY ", &self.order_by);
        sql.push_limit_offset(self.limit, self.offset);
        sql.push_suffixes(&self.suffixes)?;

        Ok(sql)
    }
}

impl_sub_statement!(SelectBuilder);
