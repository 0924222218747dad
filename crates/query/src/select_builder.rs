//! Mutable SELECT accumulator
//!
//! A [`SelectBuilder`] collects pending AST state and freezes it on request
//! with [`generate_select`](SelectBuilder::generate_select). Cloning yields
//! independent collections that still draw names from the same
//! [`QueryContext`].

use tracing::trace;

use crate::ast::{
    AliasedSelectSource, Column, FieldRef, Join, OrderBy, OrderDirection, Projection,
    RowNumberColumn, Select, SelectSource, SubquerySource, UnionSource, WhereClause,
};
use crate::generator::QueryContext;
use crate::scope::Scope;

#[derive(Debug, Clone)]
pub struct SelectBuilder {
    context: QueryContext,
    source: SelectSource,
    columns: Vec<Column>,
    count: bool,
    row_number: Option<RowNumberColumn>,
    joins: Vec<Join>,
    filters: Vec<WhereClause>,
    order: Vec<OrderBy>,
    top: Option<u64>,
    suppress_default_order: bool,
}

impl SelectBuilder {
    pub fn new(context: QueryContext, source: SelectSource) -> Self {
        Self {
            context,
            source,
            columns: Vec::new(),
            count: false,
            row_number: None,
            joins: Vec::new(),
            filters: Vec::new(),
            order: Vec::new(),
            top: None,
            suppress_default_order: false,
        }
    }

    pub fn context(&self) -> &QueryContext {
        &self.context
    }

    pub fn source(&self) -> &SelectSource {
        &self.source
    }

    pub fn primary_alias(&self) -> &str {
        self.source.alias()
    }

    pub fn joins(&self) -> &[Join] {
        &self.joins
    }

    pub fn filters(&self) -> &[WhereClause] {
        &self.filters
    }

    pub fn order(&self) -> &[OrderBy] {
        &self.order
    }

    pub fn top(&self) -> Option<u64> {
        self.top
    }

    pub fn is_default_order_suppressed(&self) -> bool {
        self.suppress_default_order
    }

    pub fn add_column(&mut self, column: Column) {
        self.count = false;
        self.columns.push(column);
    }

    /// Back to `SELECT *`
    pub fn clear_columns(&mut self) {
        self.columns.clear();
        self.count = false;
    }

    /// Replace the projection with `COUNT(*)`
    pub fn select_count(&mut self) {
        self.columns.clear();
        self.row_number = None;
        self.count = true;
    }

    pub fn set_row_number(&mut self, column: RowNumberColumn) {
        self.row_number = Some(column);
    }

    pub fn add_join(&mut self, join: Join) {
        self.joins.push(join);
    }

    pub fn add_where(&mut self, filter: WhereClause) {
        self.filters.push(filter);
    }

    pub fn add_order(&mut self, order: OrderBy) {
        self.order.push(order);
    }

    pub fn clear_order(&mut self) {
        self.order.clear();
    }

    pub fn set_top(&mut self, top: Option<u64>) {
        self.top = top;
    }

    pub fn suppress_default_order(&mut self, suppress: bool) {
        self.suppress_default_order = suppress;
    }

    /// Explicit ordering, or the implicit identity ordering unless suppressed
    pub fn effective_order(&self) -> Vec<OrderBy> {
        if !self.order.is_empty() {
            return self.order.clone();
        }
        if self.suppress_default_order {
            return Vec::new();
        }
        vec![OrderBy::new(
            FieldRef::bare(&self.context.config().default_order_column),
            OrderDirection::Asc,
        )]
    }

    /// Whether this builder is nothing but a union of other selects
    pub(crate) fn is_bare_union(&self) -> bool {
        matches!(self.source, SelectSource::Union(_))
            && self.columns.is_empty()
            && !self.count
            && self.row_number.is_none()
            && self.joins.is_empty()
            && self.filters.is_empty()
            && self.order.is_empty()
            && self.top.is_none()
    }

    /// Members this builder contributes to a union. A bare union contributes
    /// its own members so nested unions flatten.
    pub(crate) fn union_members(&self) -> Vec<Select> {
        match &self.source {
            SelectSource::Union(union) if self.is_bare_union() => union.selects().to_vec(),
            _ => vec![self.union_member()],
        }
    }

    /// Freeze the pending state. Later mutation of this builder does not
    /// affect the returned snapshot.
    pub fn generate_select(&self) -> Select {
        let scope = Scope::new(self.source.alias(), !self.joins.is_empty());

        let projection = if self.count {
            Projection::Count
        } else if self.columns.is_empty() {
            scope.resolve_projection(&Projection::All { qualifier: None })
        } else {
            scope.resolve_projection(&Projection::Columns(self.columns.clone()))
        };

        let select = Select {
            top: self.top,
            projection,
            row_number: self.row_number.as_ref().map(|c| scope.resolve_row_number(c)),
            source: self.source.clone(),
            joins: self.joins.clone(),
            filters: self.filters.iter().map(|f| scope.resolve_filter(f)).collect(),
            order: self
                .effective_order()
                .iter()
                .map(|o| scope.resolve_order(o))
                .collect(),
            indent_width: self.context.config().indent_width,
        };

        trace!(
            alias = select.alias(),
            joins = select.joins.len(),
            filters = select.filters.len(),
            "generated select"
        );
        select
    }

    /// Snapshot used when this builder becomes the operand of a join, union
    /// or subquery. The implicit ordering is always suppressed; explicit
    /// ordering is only kept alongside `TOP`, the one case SQL Server allows
    /// it in a derived table.
    pub(crate) fn operand_select(&self) -> Select {
        let mut operand = self.clone();
        operand.suppress_default_order = true;
        if operand.top.is_none() {
            operand.order.clear();
        }
        operand.generate_select()
    }

    /// Wrap a snapshot of this builder as an aliased subquery source
    pub(crate) fn to_subquery(&self) -> SubquerySource {
        SubquerySource::new(self.operand_select(), self.context.next_alias())
    }

    /// A member for a `UNION`. Members with `TOP` and explicit ordering are
    /// wrapped in a derived table since a bare union member cannot carry
    /// `ORDER BY`.
    pub(crate) fn union_member(&self) -> Select {
        if self.top.is_some() && !self.order.is_empty() {
            let mut wrapper = SelectBuilder::new(self.context.clone(), self.to_subquery().into());
            wrapper.suppress_default_order = true;
            wrapper.generate_select()
        } else {
            self.operand_select()
        }
    }

    /// Start a new outer builder over a union of `members`
    pub(crate) fn over_union(context: QueryContext, members: Vec<Select>) -> Self {
        let alias = context.next_alias();
        SelectBuilder::new(context, UnionSource::new(members, alias).into())
    }

    /// Start a new outer builder over a subquery of this builder. Explicit
    /// ordering and the default-order flag move to the outer level.
    pub(crate) fn wrapped(&self) -> Self {
        let subquery = self.to_subquery();
        let mut outer = SelectBuilder::new(self.context.clone(), subquery.into());
        outer.suppress_default_order = self.suppress_default_order;
        if self.top.is_none() {
            outer.order = self
                .order
                .iter()
                .map(|o| OrderBy::new(FieldRef::bare(&o.field.name), o.direction))
                .collect();
        }
        outer
    }

    /// `COUNT(*)` over the same rows. Ordering is dropped; a `TOP` limit is
    /// kept by counting over a derived table.
    pub(crate) fn counted(&self) -> Self {
        let mut counted = if self.top.is_some() {
            SelectBuilder::new(self.context.clone(), self.to_subquery().into())
        } else {
            self.clone()
        };
        counted.select_count();
        counted.order.clear();
        counted.suppress_default_order = true;
        counted
    }

    /// The inner half of row-number pagination: the same select with a
    /// row-number column over its unmodified ordering, wrapped as a subquery
    /// of a new outer builder ordered by that column.
    pub(crate) fn numbered(&self) -> Self {
        let alias = self.context.config().row_number_alias.clone();
        let mut inner = self.clone();
        inner.set_row_number(RowNumberColumn::new(&alias, self.effective_order()));

        let mut outer = SelectBuilder::new(self.context.clone(), inner.to_subquery().into());
        outer.add_order(OrderBy::new(FieldRef::bare(&alias), OrderDirection::Asc));
        outer
    }
}
