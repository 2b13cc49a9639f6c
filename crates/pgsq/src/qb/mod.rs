//! Composable SQL statements.
//!
//! Builders collect clauses through consuming, chainable methods and reduce to a
//! [`Fragment`]: text with unnumbered `?` markers plus the parameters for those markers
//! in textual order. Builders, predicates and raw expressions nest freely (a SELECT as a
//! column, a CASE inside an alias, an UPDATE as a CTE body). Only the outermost
//! statement is rewritten to `$1, $2, ...`, so numbering is always consistent.
//!
//! # Features
//!
//! - **Predicate algebra**: equality/comparison maps, AND/OR groups, aliases, sub-statements
//! - **`??` escape**: a literal `?` (e.g. jsonb `?|`) that never consumes a parameter
//! - **Arc-based parameters**: builders are cheap to clone and `Send + Sync`
//! - **Deferred validation**: missing clauses surface as [`SqError`](crate::SqError) when building
//!
//! # Usage
//!
//! ```ignore
//! use pgsq::qb::{self, alias, eq, expr, gt, or, StatementBuilder};
//!
//! let active = qb::select(["id", "email"])
//!     .from("users")
//!     .and_where(eq("status", "active").with("team_id", vec![1, 2, 3]))
//!     .and_where(or([expr("last_seen > now() - interval '1 day'"), expr("admin")]))
//!     .order_by(["id"])
//!     .limit(20);
//! let users: Vec<User> = active.fetch_all(&client).await?;
//!
//! qb::insert("audit")
//!     .columns(["user_id", "action"])
//!     .values([user_id.into_value(), "login".into_value()])
//!     .execute(&client)
//!     .await?;
//!
//! qb::update("users")
//!     .set("logins", expr("logins + ?").bind(1))
//!     .and_where(eq("id", user_id))
//!     .execute(&client)
//!     .await?;
//!
//! qb::delete(["sessions"])
//!     .and_where(gt("age_days", 30))
//!     .execute(&client)
//!     .await?;
//! ```

mod case;
mod delete;
mod expr;
mod fragment;
mod insert;
mod param;
mod select;
mod traits;
mod update;
mod where_builder;
mod with;

pub use case::CaseBuilder;
pub use delete::DeleteBuilder;
pub use expr::{
    Compare, CompareOp, Eq, NotEq, Predicate, alias, and, eq, gt, gt_or_eq, lt, lt_or_eq,
    not_eq, or,
};
pub use fragment::{Expr, Fragment, expr};
pub use insert::InsertBuilder;
pub use param::{IntoValue, Param, Value};
pub use select::SelectBuilder;
pub use traits::{BuiltQuery, StatementBuilder};
pub use update::UpdateBuilder;
pub use where_builder::WhereBuilder;
pub use with::WithBuilder;

/// Create a SELECT builder with the given result columns.
///
/// # Example
/// ```ignore
/// let qb = pgsq::qb::select(["id", "name"]).from("users");
/// ```
pub fn select<I, S>(columns: I) -> SelectBuilder
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    SelectBuilder::new().columns(columns)
}

/// Create an INSERT builder for the given table.
pub fn insert(table: impl Into<String>) -> InsertBuilder {
    InsertBuilder::new(table)
}

/// Create an UPDATE builder for the given table.
pub fn update(table: impl Into<String>) -> UpdateBuilder {
    UpdateBuilder::new(table)
}

/// Create a DELETE builder for the given tables.
///
/// Empty names are ignored. With exactly one name it is also the FROM table:
/// ```ignore
/// let qb = pgsq::qb::delete(["users"]).and_where(eq("id", 1));
/// // DELETE FROM users WHERE id = $1
/// ```
pub fn delete<I, S>(what: I) -> DeleteBuilder
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    DeleteBuilder::new().what(what)
}

/// Create a DELETE builder for a single table.
pub fn delete_from(table: impl Into<String>) -> DeleteBuilder {
    DeleteBuilder::new().from(table)
}

/// Create a CASE expression without a subject.
pub fn case() -> CaseBuilder {
    CaseBuilder::new()
}

/// Create a `CASE <subject> WHEN ...` expression.
pub fn case_value(subject: impl Into<Predicate>) -> CaseBuilder {
    CaseBuilder::new().subject(subject)
}

/// Start a WITH clause with its first common table expression.
pub fn with(name: impl Into<String>) -> WithBuilder {
    WithBuilder::new().with(name)
}

/// Start a set of WHERE conditions to share between statements.
pub fn where_clause(pred: impl Into<Predicate>) -> WhereBuilder {
    WhereBuilder::new().and_where(pred)
}

#[cfg(test)]
mod tests;
