//! DELETE statement builder.

use crate::error::{SqError, SqResult};
use crate::qb::expr::Predicate;
use crate::qb::fragment::{Expr, Fragment};
use crate::qb::traits::{StatementBuilder, impl_sub_statement};

/// DELETE statement builder.
///
/// `what` names the tables rows are deleted from in multi-table deletes. It is left out
/// of the output when it is exactly the FROM table, so `delete(["a"])` renders as the
/// canonical `DELETE FROM a`.
#[derive(Clone, Debug, Default)]
pub struct DeleteBuilder {
    prefixes: Vec<Predicate>,
    what: Vec<String>,
    from: String,
    joins: Vec<Predicate>,
    pub(crate) where_parts: Vec<Predicate>,
    order_by: Vec<String>,
    limit: Option<u64>,
    offset: Option<u64>,
    suffixes: Vec<Predicate>,
}

impl DeleteBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prefix(mut self, part: impl Into<Predicate>) -> Self {
        self.prefixes.push(part.into());
        self
    }

    /// Set the tables to delete from. Empty names are dropped; a single name also
    /// becomes the FROM table.
    pub fn what<I, S>(mut self, what: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.what = what
            .into_iter()
            .map(Into::into)
            .filter(|name: &String| !name.is_empty())
            .collect();
        if let [only] = self.what.as_slice() {
            self.from = only.clone();
        }
        self
    }

    pub fn from(mut self, from: impl Into<String>) -> Self {
        self.from = from.into();
        self
    }

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

impl StatementBuilder for DeleteBuilder {
    fn to_fragment(&self) -> SqResult<Fragment> {
        if self.from.is_empty() {
            return Err(SqError::MissingClause(
                "delete statements must specify a From table",
            ));
        }

        let mut sql = Fragment::default();
        sql.push_prefixes(&self.prefixes)?;

        sql.push_str("DELETE ");
        let what_is_from = matches!(self.what.as_slice(), [only] if *only == self.from);
        if !self.what.is_empty() && !what_is_from {
            sql.push_str(&self.what.join(", "));
            sql.push_str(" ");
        }

        sql.push_str("FROM ");
        sql.push_str(&self.from);

        sql.push_clause(" ", &self.joins, " ")?;
        sql.push_clause(" WHERE ", &self.where_parts, " AND ")?;
        sql.push_list(" ORDER BY ", &self.order_by);
        sql.push_limit_offset(self.limit, self.offset);
        sql.push_suffixes(&self.suffixes)?;

        Ok(sql)
    }
}

impl_sub_statement!(DeleteBuilder);
