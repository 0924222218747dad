//! Query Builder ordering operations

use super::builder::QueryBuilder;
use crate::ast::{OrderBy, OrderDirection};

impl<M> QueryBuilder<M> {
    /// Add ORDER BY clause (ascending)
    pub fn order_by(mut self, field: &str) -> Self {
        self.select.add_order(OrderBy::asc(field));
        self
    }

    /// Add ORDER BY clause with descending order
    pub fn order_by_desc(mut self, field: &str) -> Self {
        self.select.add_order(OrderBy::desc(field));
        self
    }

    /// Add ORDER BY clause with an explicit direction
    pub fn order_by_direction(mut self, field: &str, direction: OrderDirection) -> Self {
        let order = match direction {
            OrderDirection::Asc => OrderBy::asc(field),
            OrderDirection::Desc => OrderBy::desc(field),
        };
        self.select.add_order(order);
        self
    }

    /// Drop every explicit ordering; the implicit identity ordering applies
    /// again unless suppressed
    pub fn clear_order(mut self) -> Self {
        self.select.clear_order();
        self
    }

    /// Do not append the implicit identity ordering
    pub fn without_default_order(mut self) -> Self {
        self.select.suppress_default_order(true);
        self
    }

    /// Re-enable the implicit identity ordering
    pub fn with_default_order(mut self) -> Self {
        self.select.suppress_default_order(false);
        self
    }
}
