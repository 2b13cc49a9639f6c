//! CASE expression builder.

use crate::error::{SqError, SqResult};
use crate::qb::expr::Predicate;
use crate::qb::fragment::Fragment;
use crate::qb::traits::{StatementBuilder, impl_sub_statement};

/// `CASE [subject] WHEN .. THEN .. [ELSE ..] END`
///
/// Every part is a predicate, so plain strings are SQL text; bind values with
/// [`expr`](crate::qb::expr).
///
/// ```ignore
/// let status = case()
///     .when("score >= 90", "'gold'")
///     .when(expr("score >= ?").bind(50), "'silver'")
///     .else_("'none'");
/// let q = select(["id"]).column(alias(status, "tier")).from("players");
/// ```
#[derive(Clone, Debug, Default)]
pub struct CaseBuilder {
    subject: Option<Box<Predicate>>,
    whens: Vec<(Predicate, Predicate)>,
    else_part: Option<Box<Predicate>>,
}

impl CaseBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the value compared against each WHEN (`CASE subject WHEN ...`).
    pub fn subject(mut self, subject: impl Into<Predicate>) -> Self {
        self.subject = Some(Box::new(subject.into()));
        self
    }

    pub fn when(mut self, when: impl Into<Predicate>, then: impl Into<Predicate>) -> Self {
        self.whens.push((when.into(), then.into()));
        self
    }

    pub fn else_(mut self, otherwise: impl Into<Predicate>) -> Self {
        self.else_part = Some(Box::new(otherwise.into()));
        self
    }
}

impl StatementBuilder for CaseBuilder {
    fn to_fragment(&self) -> SqResult<Fragment> {
        if self.whens.is_empty() {
            return Err(SqError::MissingClause(
                "case expression must contain at least one WHEN clause",
            ));
        }

        let mut sql = Fragment::raw("CASE ");
        if let Some(subject) = &self.subject {
            sql.append(subject.to_fragment()?);
            sql.push_str(" ");
        }
        for (when, then) in &self.whens {
            sql.push_str("WHEN ");
            sql.append(when.to_fragment()?);
            sql.push_str(" THEN ");
            sql.append(then.to_fragment()?);
            sql.push_str(" ");
        }
        if let Some(otherwise) = &self.else_part {
            sql.push_str("ELSE ");
            sql.append(otherwise.to_fragment()?);
            sql.push_str(" ");
        }
        sql.push_str("END");
        Ok(sql)
    }
}

impl_sub_statement!(CaseBuilder);
