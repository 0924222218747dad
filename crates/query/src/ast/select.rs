//! Frozen SELECT statement
//!
//! A [`Select`] is a snapshot produced by
//! [`SelectBuilder::generate_select`](crate::SelectBuilder::generate_select).
//! Rendering is a pure function of the snapshot: it cannot fail and returns
//! byte-identical text on every call.

use std::fmt;

use super::column::{Projection, RowNumberColumn};
use super::join::Join;
use super::ordering::OrderBy;
use super::predicate::WhereClause;
use super::source::{AliasedSelectSource, SelectSource};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Select {
    pub(crate) top: Option<u64>,
    pub(crate) projection: Projection,
    pub(crate) row_number: Option<RowNumberColumn>,
    pub(crate) source: SelectSource,
    pub(crate) joins: Vec<Join>,
    pub(crate) filters: Vec<WhereClause>,
    pub(crate) order: Vec<OrderBy>,
    pub(crate) indent_width: usize,
}

impl Select {
    pub fn top(&self) -> Option<u64> {
        self.top
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    pub fn row_number(&self) -> Option<&RowNumberColumn> {
        self.row_number.as_ref()
    }

    pub fn source(&self) -> &SelectSource {
        &self.source
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

    /// Alias of the primary source
    pub fn alias(&self) -> &str {
        self.source.alias()
    }

    /// Render the statement, one clause per line
    pub fn generate_sql(&self) -> String {
        let mut lines = Vec::with_capacity(4 + self.joins.len() + self.filters.len());

        let mut head = String::from("SELECT ");
        if let Some(top) = self.top {
            head.push_str(&format!("TOP {} ", top));
        }
        head.push_str(&self.projection.to_sql());
        if let Some(row_number) = &self.row_number {
            head.push_str(", ");
            head.push_str(&row_number.to_sql());
        }
        lines.push(head);

        lines.push(format!("FROM {}", self.source.render(self.indent_width)));

        for join in &self.joins {
            lines.push(join.render(self.indent_width));
        }

        for (i, filter) in self.filters.iter().enumerate() {
            let keyword = if i == 0 { "WHERE" } else { "AND" };
            lines.push(format!("{} ({})", keyword, filter.to_sql()));
        }

        if !self.order.is_empty() {
            let order: Vec<String> = self.order.iter().map(OrderBy::to_sql).collect();
            lines.push(format!("ORDER BY {}", order.join(", ")));
        }

        lines.join("\n")
    }

    pub fn to_sql(&self) -> String {
        self.generate_sql()
    }
}

impl fmt::Display for Select {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.generate_sql())
    }
}
