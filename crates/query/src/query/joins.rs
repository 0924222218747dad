//! Query Builder JOIN operations
//!
//! A join is a two-step protocol: [`QueryBuilder::join`] returns a
//! [`PendingJoin`] which only becomes usable as a query again after at least
//! one `on` clause has been supplied.

use tracing::debug;

use super::builder::QueryBuilder;
use crate::ast::{AliasedSelectSource, FieldRef, Join, JoinClause, JoinKind, SelectSource};
use crate::error::QueryResult;

impl<M> QueryBuilder<M> {
    /// Join `other` as a subquery.
    ///
    /// On the first join the current select is itself wrapped as a subquery
    /// and becomes the primary source; later joins attach to the same
    /// primary. Side tables of `other` are merged immediately.
    pub fn join<N>(self, other: &QueryBuilder<N>, kind: JoinKind) -> QueryResult<PendingJoin<M>> {
        self.ensure_same_context(other.context(), "join")?;

        let mut tables = self.tables;
        tables.merge(&other.tables, "join")?;

        let select = if self.select.joins().is_empty() {
            self.select.wrapped()
        } else {
            self.select
        };
        let source: SelectSource = other.select.to_subquery().into();

        debug!(
            kind = %kind,
            primary = select.primary_alias(),
            joined = source.alias(),
            "joining subquery"
        );

        Ok(PendingJoin {
            builder: QueryBuilder::from_parts(select, tables),
            kind,
            source,
        })
    }

    /// Join with the kind given as text, e.g. `"InnerJoin"` or
    /// `"LEFT HASH JOIN"`
    pub fn join_as<N>(self, other: &QueryBuilder<N>, kind: &str) -> QueryResult<PendingJoin<M>> {
        let kind: JoinKind = kind.parse()?;
        self.join(other, kind)
    }

    /// Add INNER JOIN to the query
    pub fn inner_join<N>(self, other: &QueryBuilder<N>) -> QueryResult<PendingJoin<M>> {
        self.join(other, JoinKind::InnerJoin)
    }

    /// Add LEFT HASH JOIN to the query
    pub fn left_hash_join<N>(self, other: &QueryBuilder<N>) -> QueryResult<PendingJoin<M>> {
        self.join(other, JoinKind::LeftHashJoin)
    }
}

/// A join still waiting for its first `ON` clause
#[derive(Debug)]
pub struct PendingJoin<M = ()> {
    builder: QueryBuilder<M>,
    kind: JoinKind,
    source: SelectSource,
}

impl<M> PendingJoin<M> {
    pub fn kind(&self) -> JoinKind {
        self.kind
    }

    /// Alias of the primary (left-most) source
    pub fn primary_alias(&self) -> &str {
        self.builder.select.primary_alias()
    }

    /// Alias of the joined source
    pub fn alias(&self) -> &str {
        self.source.alias()
    }

    /// `left = right`. A bare `left` refers to the primary source and a bare
    /// `right` to the joined source.
    pub fn on(self, left: &str, right: &str) -> JoinedQuery<M> {
        let clause = join_clause(self.primary_alias(), self.alias(), left, right);
        JoinedQuery {
            join: Join::new(self.kind, self.source, clause),
            builder: self.builder,
        }
    }
}

/// A join with at least one `ON` clause
#[derive(Debug)]
pub struct JoinedQuery<M = ()> {
    builder: QueryBuilder<M>,
    join: Join,
}

impl<M> JoinedQuery<M> {
    pub fn primary_alias(&self) -> &str {
        self.builder.select.primary_alias()
    }

    pub fn alias(&self) -> &str {
        self.join.source().alias()
    }

    /// Add another clause, ANDed with the previous ones
    pub fn on(mut self, left: &str, right: &str) -> Self {
        let clause = join_clause(self.primary_alias(), self.alias(), left, right);
        self.join = self.join.and(clause);
        self
    }

    pub fn into_builder(self) -> QueryBuilder<M> {
        let mut builder = self.builder;
        builder.select.add_join(self.join);
        builder
    }
}

impl<M> From<JoinedQuery<M>> for QueryBuilder<M> {
    fn from(joined: JoinedQuery<M>) -> Self {
        joined.into_builder()
    }
}

fn join_clause(primary: &str, joined: &str, left: &str, right: &str) -> JoinClause {
    JoinClause::new(
        FieldRef::parse(left).qualify_with(primary),
        FieldRef::parse(right).qualify_with(joined),
    )
}

#[cfg(test)]
mod tests {
    use crate::error::QueryError;
    use crate::generator::QueryContext;
    use crate::query::QueryBuilder;

    #[test]
    fn test_join_wraps_both_operands() {
        let context = QueryContext::new();
        let orders = context.table::<()>("Orders");
        let customers = context.table::<()>("Customers");

        let pending = orders.inner_join(&customers).unwrap();
        assert_eq!(pending.primary_alias(), "ALIAS_GENERATED_1");
        assert_eq!(pending.alias(), "ALIAS_GENERATED_2");

        let query = pending.on("CustomerId", "Id").on("Region", "Region").into_builder();
        assert!(query.to_sql().contains(
            "ON [ALIAS_GENERATED_1].[CustomerId] = [ALIAS_GENERATED_2].[Id] AND [ALIAS_GENERATED_1].[Region] = [ALIAS_GENERATED_2].[Region]"
        ));
    }

    #[test]
    fn test_second_join_reuses_primary() {
        let context = QueryContext::new();
        let orders = context.table::<()>("Orders");
        let customers = context.table::<()>("Customers");
        let lines = context.table::<()>("OrderLines");

        let query: QueryBuilder = orders
            .inner_join(&customers)
            .unwrap()
            .on("CustomerId", "Id")
            .into_builder()
            .left_hash_join(&lines)
            .unwrap()
            .on("Id", "OrderId")
            .into();

        let sql = query.to_sql();
        assert_eq!(query.select_builder().joins().len(), 2);
        assert!(sql.contains("LEFT HASH JOIN (\n"));
        assert!(sql.contains("ON [ALIAS_GENERATED_1].[Id] = [ALIAS_GENERATED_3].[OrderId]"));
    }

    #[test]
    fn test_join_kind_text() {
        let context = QueryContext::new();
        let orders = context.table::<()>("Orders");
        let customers = context.table::<()>("Customers");

        let err = orders.join_as(&customers, "FULL OUTER").unwrap_err();
        assert_eq!(
            err,
            QueryError::UnsupportedJoinKind {
                kind: "FULL OUTER".to_string()
            }
        );
    }

    #[test]
    fn test_join_across_contexts_is_rejected() {
        let orders = QueryBuilder::<()>::new("Orders");
        let customers = QueryBuilder::<()>::new("Customers");
        let err = orders.inner_join(&customers).unwrap_err();
        assert!(matches!(err, QueryError::ForeignContext { .. }));
    }
}
