//! Derived artifacts: routine and view definitions wrapping the select
//!
//! These are textual wrappers over the same frozen select. Parameter types
//! come from the declared [`DbType`] or are inferred from the bound value;
//! defaults render as T-SQL literals.

use crate::ast::identifier::indent;
use crate::ast::{quote_identifier, schema_object, FieldRef, Select};
use crate::error::{QueryError, QueryResult};
use crate::parameter::{sql_literal, DbType};

use super::builder::QueryBuilder;

impl<M> QueryBuilder<M> {
    /// `CREATE PROCEDURE` with the declared parameters as its signature
    pub fn create_procedure(&self, name: &str) -> QueryResult<String> {
        let object = self.routine_object(name)?;
        let width = self.indent_width();

        let mut sql = format!("CREATE PROCEDURE {}", object);
        let signature = self.signature(name)?;
        if !signature.is_empty() {
            sql.push('\n');
            sql.push_str(&indent(&signature.join(",\n"), width));
        }
        sql.push_str("\nAS\nBEGIN\n");
        sql.push_str(&indent("SET NOCOUNT ON;", width));
        sql.push('\n');
        sql.push_str(&indent(&self.generate_select().generate_sql(), width));
        sql.push_str("\nEND");
        Ok(sql)
    }

    /// `CREATE FUNCTION ... RETURNS <type>` returning the single value the
    /// select produces
    pub fn create_scalar_function(&self, name: &str, returns: DbType) -> QueryResult<String> {
        let object = self.routine_object(name)?;
        let width = self.indent_width();
        let body = format!(
            "RETURN (\n{}\n);",
            indent(&self.routine_select().generate_sql(), width)
        );
        Ok(format!(
            "CREATE FUNCTION {}({})\nRETURNS {}\nAS\nBEGIN\n{}\nEND",
            object,
            self.parameter_list(name)?,
            returns,
            indent(&body, width)
        ))
    }

    /// Inline table-valued `CREATE FUNCTION ... RETURNS TABLE`
    pub fn create_table_function(&self, name: &str) -> QueryResult<String> {
        let object = self.routine_object(name)?;
        Ok(format!(
            "CREATE FUNCTION {}({})\nRETURNS TABLE\nAS\nRETURN (\n{}\n)",
            object,
            self.parameter_list(name)?,
            indent(&self.routine_select().generate_sql(), self.indent_width())
        ))
    }

    /// `CREATE VIEW`. Views cannot take parameters.
    pub fn create_view(&self, name: &str) -> QueryResult<String> {
        let object = self.routine_object(name)?;
        if !self.tables.parameters.is_empty() {
            return Err(QueryError::InvalidRoutine {
                name: name.to_string(),
                reason: format!(
                    "a view cannot reference parameters ({})",
                    self.tables.parameters.names().join(", ")
                ),
            });
        }
        Ok(format!(
            "CREATE VIEW {}\nAS\n{}",
            object,
            self.routine_select().generate_sql()
        ))
    }

    /// `INSERT INTO table (columns) SELECT ...`. An empty column list omits
    /// the column list.
    pub fn insert_into(&self, table: &str, columns: &[&str]) -> QueryResult<String> {
        let object = self.routine_object(table)?;
        let mut sql = format!("INSERT INTO {}", object);
        if !columns.is_empty() {
            let columns: Vec<String> = columns.iter().map(|c| quote_identifier(c)).collect();
            sql.push_str(&format!(" ({})", columns.join(", ")));
        }
        sql.push('\n');
        sql.push_str(&self.generate_select().generate_sql());
        Ok(sql)
    }

    /// The select without implicit ordering; explicit ordering survives only
    /// alongside `TOP`
    fn routine_select(&self) -> Select {
        self.select.operand_select()
    }

    fn indent_width(&self) -> usize {
        self.context().config().indent_width
    }

    fn routine_object(&self, name: &str) -> QueryResult<String> {
        let invalid = |reason: &str| QueryError::InvalidRoutine {
            name: name.to_string(),
            reason: reason.to_string(),
        };

        let reference = FieldRef::parse(name);
        if reference.name.trim().is_empty() {
            return Err(invalid("name is empty"));
        }
        if reference.name.contains(['[', ']']) {
            return Err(invalid("name contains brackets"));
        }

        let schema = reference
            .qualifier
            .unwrap_or_else(|| self.context().config().default_schema.clone());
        Ok(schema_object(&schema, &reference.name))
    }

    /// `@name TYPE[ = default]` for every declared parameter
    fn signature(&self, routine: &str) -> QueryResult<Vec<String>> {
        self.tables
            .parameters
            .iter()
            .map(|parameter| {
                let db_type = parameter
                    .db_type()
                    .or_else(|| self.tables.values.get(parameter.name()).map(DbType::infer))
                    .or_else(|| self.tables.defaults.get(parameter.name()).map(DbType::infer))
                    .ok_or_else(|| QueryError::InvalidRoutine {
                        name: routine.to_string(),
                        reason: format!(
                            "parameter '{}' has neither a declared type nor a value",
                            parameter.name()
                        ),
                    })?;

                let mut declaration = format!("{} {}", parameter.placeholder(), db_type);
                if let Some(default) = self.tables.defaults.get(parameter.name()) {
                    declaration.push_str(&format!(" = {}", sql_literal(default)));
                }
                Ok(declaration)
            })
            .collect()
    }

    fn parameter_list(&self, routine: &str) -> QueryResult<String> {
        let signature = self.signature(routine)?;
        if signature.is_empty() {
            return Ok(String::new());
        }
        Ok(format!(
            "\n{}\n",
            indent(&signature.join(",\n"), self.indent_width())
        ))
    }
}

#[cfg(test)]
mod tests {
    use crate::error::QueryError;
    use crate::parameter::DbType;
    use crate::query::QueryBuilder;

    fn active_orders() -> QueryBuilder {
        QueryBuilder::new("Orders")
            .where_eq("Status", "open")
            .with_default("open")
            .with_type(DbType::NVarChar(Some(20)))
            .into_builder()
    }

    #[test]
    fn test_procedure_signature_and_body() {
        let sql = active_orders().create_procedure("GetOrders").unwrap();
        assert_eq!(
            sql,
            "CREATE PROCEDURE dbo.[GetOrders]\n    \
             @Status_0 NVARCHAR(20) = N'open'\n\
             AS\n\
             BEGIN\n    \
             SET NOCOUNT ON;\n    \
             SELECT *\n    \
             FROM dbo.[Orders]\n    \
             WHERE ([Status] = @Status_0)\n    \
             ORDER BY [Id]\n\
             END"
        );
    }

    #[test]
    fn test_scalar_function_drops_implicit_order() {
        let sql = QueryBuilder::<()>::new("Orders")
            .select_expression("MAX([Total])", "MaxTotal")
            .where_gt("CustomerId", 3)
            .into_builder()
            .create_scalar_function("sales.MaxTotal", DbType::Money)
            .unwrap();

        assert!(sql.starts_with(
            "CREATE FUNCTION sales.[MaxTotal](\n    @CustomerId_0 INT\n)\nRETURNS MONEY"
        ));
        assert!(!sql.contains("ORDER BY"));
    }

    #[test]
    fn test_table_function_without_parameters() {
        let sql = QueryBuilder::<()>::new("Orders")
            .create_table_function("AllOrders")
            .unwrap();
        assert_eq!(
            sql,
            "CREATE FUNCTION dbo.[AllOrders]()\nRETURNS TABLE\nAS\nRETURN (\n    SELECT *\n    FROM dbo.[Orders]\n)"
        );
    }

    #[test]
    fn test_view_rejects_parameters() {
        let err = active_orders().create_view("ActiveOrders").unwrap_err();
        assert!(matches!(err, QueryError::InvalidRoutine { name, .. } if name == "ActiveOrders"));

        let view = QueryBuilder::<()>::new("Orders")
            .where_raw("[Status] = 'open'")
            .create_view("ActiveOrders")
            .unwrap();
        assert_eq!(
            view,
            "CREATE VIEW dbo.[ActiveOrders]\nAS\nSELECT *\nFROM dbo.[Orders]\nWHERE ([Status] = 'open')"
        );
    }

    #[test]
    fn test_insert_into_select() {
        let sql = QueryBuilder::<()>::new("Orders")
            .select_columns(&["Id", "Total"])
            .without_default_order()
            .insert_into("OrderArchive", &["OrderId", "Total"])
            .unwrap();
        assert_eq!(
            sql,
            "INSERT INTO dbo.[OrderArchive] ([OrderId], [Total])\nSELECT [Id], [Total]\nFROM dbo.[Orders]"
        );
    }

    #[test]
    fn test_routine_name_validation() {
        let err = QueryBuilder::<()>::new("Orders").create_procedure("").unwrap_err();
        assert!(matches!(err, QueryError::InvalidRoutine { .. }));
    }
}
