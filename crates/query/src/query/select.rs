//! Query Builder SELECT operations

use super::builder::QueryBuilder;
use crate::ast::{Column, FieldRef, RowNumberColumn};

impl<M> QueryBuilder<M> {
    /// Add a column, `Name` or `alias.Name`
    pub fn select_column(mut self, column: &str) -> Self {
        self.select.add_column(Column::field(column, None));
        self
    }

    /// Add a column with an output alias
    pub fn select_column_as(mut self, column: &str, alias: &str) -> Self {
        self.select.add_column(Column::field(column, Some(alias)));
        self
    }

    /// Add several columns
    pub fn select_columns(mut self, columns: &[&str]) -> Self {
        for column in columns {
            self.select.add_column(Column::field(column, None));
        }
        self
    }

    /// Add a column qualified with an explicit source alias
    pub fn select_qualified(mut self, source: &str, column: &str) -> Self {
        let field = FieldRef::qualified(source, column);
        self.select.add_column(Column::Qualified {
            source: field.qualifier.unwrap_or_default(),
            name: field.name,
            alias: None,
        });
        self
    }

    /// Add a calculated column. The expression is inserted verbatim.
    pub fn select_expression(mut self, expression: &str, alias: &str) -> Self {
        self.select
            .add_column(Column::calculated(expression, Some(alias)));
        self
    }

    /// Add `ROW_NUMBER() OVER (PARTITION BY ... ORDER BY ...)` over the
    /// current effective ordering. With `qualified` the partition columns are
    /// prefixed with the primary source alias.
    pub fn select_row_number(
        mut self,
        alias: &str,
        partition_by: &[&str],
        qualified: bool,
    ) -> Self {
        let column = RowNumberColumn::new(alias, self.select.effective_order())
            .partitioned_by(partition_by, qualified);
        self.select.set_row_number(column);
        self
    }

    /// Back to `SELECT *`
    pub fn select_all(mut self) -> Self {
        self.select.clear_columns();
        self
    }
}

#[cfg(test)]
mod tests {
    use crate::query::QueryBuilder;

    #[test]
    fn test_column_selection() {
        let query = QueryBuilder::<()>::new("Orders")
            .select_column("Id")
            .select_column_as("o.Total", "Amount")
            .select_expression("[Qty] * [Price]", "LineTotal");

        assert_eq!(
            query.to_sql(),
            "SELECT [Id], [o].[Total] AS [Amount], [Qty] * [Price] AS [LineTotal]\nFROM dbo.[Orders]\nORDER BY [Id]"
        );
    }

    #[test]
    fn test_row_number_uses_current_order() {
        let query = QueryBuilder::<()>::new("Orders")
            .order_by_desc("Date")
            .select_row_number("Seq", &["CustomerId"], true);

        assert_eq!(
            query.to_sql(),
            "SELECT *, ROW_NUMBER() OVER (PARTITION BY [Orders].[CustomerId] ORDER BY [Date] DESC) AS [Seq]\nFROM dbo.[Orders]\nORDER BY [Date] DESC"
        );
    }

    #[test]
    fn test_select_all_resets_columns() {
        let query = QueryBuilder::<()>::new("Orders")
            .select_column("Id")
            .select_all();
        assert!(query.to_sql().starts_with("SELECT *\n"));
    }
}
