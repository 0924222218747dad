//! Alias resolution for unqualified column references
//!
//! Inside a select with joins every unqualified reference is qualified with
//! the primary (left-most) source alias. Without joins references stay bare.

use crate::ast::{Column, FieldRef, OrderBy, Projection, RowNumberColumn, WhereClause};

#[derive(Debug, Clone, Copy)]
pub struct Scope<'a> {
    primary: &'a str,
    joined: bool,
}

impl<'a> Scope<'a> {
    pub fn new(primary: &'a str, joined: bool) -> Self {
        Self { primary, joined }
    }

    pub fn primary(&self) -> &'a str {
        self.primary
    }

    pub fn is_joined(&self) -> bool {
        self.joined
    }

    /// Qualify a field with the primary alias when the scope has joins
    pub fn resolve_field(&self, field: &FieldRef) -> FieldRef {
        if self.joined {
            field.qualify_with(self.primary)
        } else {
            field.clone()
        }
    }

    /// Qualify a field with the primary alias regardless of joins
    pub fn qualify_field(&self, field: &FieldRef) -> FieldRef {
        field.qualify_with(self.primary)
    }

    pub fn resolve_column(&self, column: &Column) -> Column {
        if self.joined {
            column.qualify_with(self.primary)
        } else {
            column.clone()
        }
    }

    pub fn resolve_projection(&self, projection: &Projection) -> Projection {
        match projection {
            Projection::All { qualifier: None } if self.joined => Projection::All {
                qualifier: Some(self.primary.to_string()),
            },
            Projection::Columns(columns) => {
                Projection::Columns(columns.iter().map(|c| self.resolve_column(c)).collect())
            }
            other => other.clone(),
        }
    }

    pub fn resolve_filter(&self, filter: &WhereClause) -> WhereClause {
        if self.joined {
            filter.qualify_with(self.primary)
        } else {
            filter.clone()
        }
    }

    pub fn resolve_order(&self, order: &OrderBy) -> OrderBy {
        OrderBy::new(self.resolve_field(&order.field), order.direction)
    }

    pub fn resolve_row_number(&self, column: &RowNumberColumn) -> RowNumberColumn {
        let partition_by = column
            .partition_by
            .iter()
            .map(|field| {
                if column.qualify_partition {
                    self.qualify_field(field)
                } else {
                    self.resolve_field(field)
                }
            })
            .collect();
        RowNumberColumn {
            alias: column.alias.clone(),
            partition_by,
            qualify_partition: column.qualify_partition,
            order_by: column.order_by.iter().map(|o| self.resolve_order(o)).collect(),
        }
    }
}
