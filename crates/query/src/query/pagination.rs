//! Query Builder pagination operations

use std::sync::Arc;

use tracing::debug;

use super::builder::QueryBuilder;
use crate::ast::{FieldRef, WhereClause};
use crate::parameter::{Parameter, UniqueParameter};

impl<M> QueryBuilder<M> {
    /// Limit the outer select with `TOP n`
    pub fn take(mut self, count: u64) -> Self {
        self.select.set_top(Some(count));
        self
    }

    /// Remove a `TOP` limit
    pub fn without_take(mut self) -> Self {
        self.select.set_top(None);
        self
    }

    /// Rows `skip + 1` through `skip + take` of the current ordering.
    ///
    /// The select gains a row-number column over its effective ordering and
    /// becomes a subquery; the outer select filters and orders on that
    /// column with two bound placeholders. Bounds saturate at `u64::MAX`.
    pub fn page(self, skip: u64, take: u64) -> Self {
        let outer = self.select.numbered();
        let row_number = FieldRef::bare(&outer.context().config().row_number_alias);
        let (start, end) = UniqueParameter::pair(
            outer.context().generator(),
            Parameter::from_field("RowStart"),
            Parameter::from_field("RowEnd"),
        );

        debug!(
            skip,
            take,
            alias = outer.primary_alias(),
            "rewriting select for row-number pagination"
        );

        let mut builder = QueryBuilder::from_parts(outer, self.tables);
        builder.select.add_where(WhereClause::Between {
            field: row_number,
            start: Arc::new(start.clone()),
            end: Arc::new(end.clone()),
        });
        builder.tables.bind(start, skip.saturating_add(1).into());
        builder.tables.bind(end, skip.saturating_add(take).into());
        builder
    }

    /// One-based page of `per_page` rows
    pub fn paginate(self, per_page: u64, page: u64) -> Self {
        let skip = page.saturating_sub(1).saturating_mul(per_page);
        self.page(skip, per_page)
    }
}
