//! WITH (common table expression) builder.

use crate::error::{SqError, SqResult};
use crate::qb::delete::DeleteBuilder;
use crate::qb::expr::Predicate;
use crate::qb::fragment::Fragment;
use crate::qb::insert::InsertBuilder;
use crate::qb::select::SelectBuilder;
use crate::qb::traits::StatementBuilder;
use crate::qb::update::UpdateBuilder;
use std::sync::Arc;

#[derive(Clone, Debug)]
struct Cte {
    name: String,
    fields: Vec<String>,
    body: Option<Predicate>,
    union: Option<(Predicate, bool)>,
}

/// Builds `WITH [RECURSIVE] name[(fields)] AS (body [UNION [ALL] body]), ...` and
/// hands it to the statement that follows as its first prefix.
///
/// Mistakes such as calling [`as_`](Self::as_) before any [`with`](Self::with) are
/// reported when the resulting statement is built.
///
/// ```ignore
/// let q = with("recent")
///     .as_(select(["id"]).from("orders").and_where(gt("created_at", cutoff)))
///     .select(["count(*)"])
///     .from("recent");
/// ```
#[derive(Clone, Debug, Default)]
pub struct WithBuilder {
    ctes: Vec<Cte>,
    recursive: bool,
    misuse: bool,
}

impl WithBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new common table expression.
    pub fn with(mut self, name: impl Into<String>) -> Self {
        self.ctes.push(Cte {
            name: name.into(),
            fields: Vec::new(),
            body: None,
            union: None,
        });
        self
    }

    /// Column names of the current CTE: `name(a, b)`.
    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let fields = fields.into_iter().map(Into::into).collect();
        if let Some(cte) = self.current() {
            cte.fields = fields;
        }
        self
    }

    pub fn recursive(mut self) -> Self {
        self.recursive = true;
        self
    }

    /// Body of the current CTE.
    pub fn as_(mut self, body: impl Into<Predicate>) -> Self {
        let body = body.into();
        if let Some(cte) = self.current() {
            cte.body = Some(body);
        }
        self
    }

    /// Second body of the current CTE, joined with `UNION`.
    pub fn union(self, body: impl Into<Predicate>) -> Self {
        self.set_union(body.into(), false)
    }

    /// Second body of the current CTE, joined with `UNION ALL`.
    pub fn union_all(self, body: impl Into<Predicate>) -> Self {
        self.set_union(body.into(), true)
    }

    fn set_union(mut self, body: Predicate, all: bool) -> Self {
        if let Some(cte) = self.current() {
            cte.union = Some((body, all));
        }
        self
    }

    fn current(&mut self) -> Option<&mut Cte> {
        let cte = self.ctes.last_mut();
        if cte.is_none() {
            self.misuse = true;
        }
        cte
    }

    fn into_prefix(self) -> Predicate {
        Predicate::Sub(Arc::new(self))
    }

    // ==================== Main statement ====================

    pub fn select<I, S>(self, columns: I) -> SelectBuilder
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        SelectBuilder::new()
            .prefix(self.into_prefix())
            .columns(columns)
    }

    pub fn insert(self, table: impl Into<String>) -> InsertBuilder {
        InsertBuilder::new(table).prefix(self.into_prefix())
    }

    pub fn update(self, table: impl Into<String>) -> UpdateBuilder {
        UpdateBuilder::new(table).prefix(self.into_prefix())
    }

    pub fn delete(self, table: impl Into<String>) -> DeleteBuilder {
        DeleteBuilder::new().from(table).prefix(self.into_prefix())
    }
}

impl StatementBuilder for WithBuilder {
    fn to_fragment(&self) -> SqResult<Fragment> {
        if self.misuse || self.ctes.is_empty() {
            return Err(SqError::InvalidWith(
                "with statements must have WITH".to_string(),
            ));
        }

        let mut sql = Fragment::raw("WITH ");
        if self.recursive {
            sql.push_str("RECURSIVE ");
        }

        for (i, cte) in self.ctes.iter().enumerate() {
            if cte.name.is_empty() {
                return Err(SqError::InvalidWith(
                    "with statements must have a non-empty name".to_string(),
                ));
            }
            let body = cte.body.as_ref().ok_or_else(|| {
                SqError::InvalidWith(format!(
                    "with statements must have AS statement ({})",
                    cte.name
                ))
            })?;

            if i > 0 {
                sql.push_str(", ");
            }
            sql.push_str(&cte.name);
            if !cte.fields.is_empty() {
                sql.push_str("(");
                sql.push_str(&cte.fields.join(", "));
                sql.push_str(")");
            }

            sql.push_str(" AS (");
            sql.append(body.to_fragment()?);
            if let Some((second, all)) = &cte.union {
                sql.push_str(if *all { " UNION ALL " } else { " UNION " });
                sql.append(second.to_fragment()?);
            }
            sql.push_str(")");
        }

        Ok(sql)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qb::{expr, select, with};

    #[test]
    fn test_cte_before_insert() {
        let q = with("src")
            .as_(select(["id"]).from("staging").and_where(expr("ok = ?").bind(true)))
            .insert("target")
            .columns(["id"])
            .values([expr("(SELECT id FROM src LIMIT ?)").bind(1)])
            .to_sql()
            .unwrap();
        assert_eq!(
            q.sql,
            "WITH src AS (SELECT id FROM staging WHERE ok = $1) INSERT INTO target (id) VALUES ((SELECT id FROM src LIMIT $2))"
        );
        assert_eq!(q.params.len(), 2);
    }

    #[test]
    fn test_cte_before_delete() {
        let q = with("old")
            .as_("SELECT id FROM logs WHERE at < now() - interval '30 days'")
            .delete("logs")
            .and_where("id IN (SELECT id FROM old)")
            .to_sql()
            .unwrap();
        assert_eq!(
            q.sql,
            "WITH old AS (SELECT id FROM logs WHERE at < now() - interval '30 days') DELETE FROM logs WHERE id IN (SELECT id FROM old)"
        );
    }

    #[test]
    fn test_fields_before_with_is_misuse() {
        let err = WithBuilder::new()
            .fields(["a"])
            .with("x")
            .as_("SELECT 1")
            .select(["a"])
            .to_sql()
            .unwrap_err();
        assert!(matches!(err, SqError::InvalidWith(_)));
    }
}
