//! Query Builder composition: unions, subqueries, counts and type views

use tracing::debug;

use super::builder::QueryBuilder;
use crate::error::QueryResult;
use crate::select_builder::SelectBuilder;

impl<M> QueryBuilder<M> {
    /// `self UNION other`, selected from as one aliased source.
    ///
    /// Members never carry the implicit ordering. Unioning a builder that is
    /// already a bare union appends to its members instead of nesting.
    pub fn union<N>(self, other: &QueryBuilder<N>) -> QueryResult<Self> {
        self.ensure_same_context(other.context(), "union")?;

        let mut tables = self.tables;
        tables.merge(&other.tables, "union")?;

        let mut members = self.select.union_members();
        members.extend(other.select.union_members());

        let select = SelectBuilder::over_union(self.select.context().clone(), members);
        debug!(
            alias = select.primary_alias(),
            parameters = tables.parameters.len(),
            "built union"
        );

        Ok(QueryBuilder::from_parts(select, tables))
    }

    /// Wrap the current select as a subquery of a new outer select. Explicit
    /// ordering moves to the outer select.
    pub fn subquery(self) -> Self {
        let select = self.select.wrapped();
        debug!(alias = select.primary_alias(), "wrapped select as subquery");
        QueryBuilder::from_parts(select, self.tables)
    }

    /// View the same query under another result record type
    pub fn as_type<U>(self) -> QueryBuilder<U> {
        QueryBuilder::from_parts(self.select, self.tables)
    }

    /// `SELECT COUNT(*)` over the same rows, without ordering. A `TOP` limit
    /// is honoured by counting over the limited query.
    pub fn count_query(&self) -> Self {
        debug!(top = ?self.select.top(), "rewriting select as count");
        QueryBuilder::from_parts(self.select.counted(), self.tables.clone())
    }
}
