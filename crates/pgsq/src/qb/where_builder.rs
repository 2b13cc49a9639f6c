//! WHERE conditions that can start a SELECT, UPDATE or DELETE.

use crate::qb::delete::DeleteBuilder;
use crate::qb::expr::Predicate;
use crate::qb::select::SelectBuilder;
use crate::qb::update::UpdateBuilder;

/// Accumulated WHERE conditions, reusable across statement kinds.
///
/// ```ignore
/// let scope = where_clause(eq("tenant_id", tenant)).and_where("deleted_at IS NULL");
/// let rows = scope.clone().select(["*"]).from("documents");
/// let purge = scope.delete("documents");
/// ```
#[derive(Clone, Debug, Default)]
pub struct WhereBuilder {
    parts: Vec<Predicate>,
}

impl WhereBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn and_where(mut self, pred: impl Into<Predicate>) -> Self {
        self.parts.push(pred.into());
        self
    }

    pub fn select<I, S>(self, columns: I) -> SelectBuilder
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut b = SelectBuilder::new().columns(columns);
        b.where_parts = self.parts;
        b
    }

    pub fn update(self, table: impl Into<String>) -> UpdateBuilder {
        let mut b = UpdateBuilder::new(table);
        b.where_parts = self.parts;
        b
    }

    pub fn delete(self, table: impl Into<String>) -> DeleteBuilder {
        let mut b = DeleteBuilder::new().from(table);
        b.where_parts = self.parts;
        b
    }
}
