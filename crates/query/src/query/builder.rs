//! Query Builder - Core builder implementation

use std::fmt;
use std::marker::PhantomData;

use serde_json::Value;

use crate::ast::Select;
use crate::error::{QueryError, QueryResult};
use crate::generator::QueryContext;
use crate::parameter::{
    sql_literal, CommandParameterValues, DbType, Parameter, ParameterDefaults, Parameters,
    SideTables, UniqueParameter,
};
use crate::select_builder::SelectBuilder;

/// Query builder for one result record type `M`
///
/// The builder owns a [`SelectBuilder`] plus the three side tables
/// (declared parameters, defaults, bound values). `M` is a pure type tag;
/// [`as_type`](QueryBuilder::as_type) changes it without touching the SQL.
pub struct QueryBuilder<M = ()> {
    pub(crate) select: SelectBuilder,
    pub(crate) tables: SideTables,
    _phantom: PhantomData<fn() -> M>,
}

impl<M> Clone for QueryBuilder<M> {
    fn clone(&self) -> Self {
        Self {
            select: self.select.clone(),
            tables: self.tables.clone(),
            _phantom: PhantomData,
        }
    }
}

impl<M> fmt::Debug for QueryBuilder<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryBuilder")
            .field("record", &std::any::type_name::<M>())
            .field("select", &self.select)
            .field("tables", &self.tables)
            .finish()
    }
}

impl<M> QueryBuilder<M> {
    /// Create a query over `table` in the default schema with a fresh
    /// [`QueryContext`]
    pub fn new(table: &str) -> Self {
        QueryContext::new().table(table)
    }

    pub fn from_select(select: SelectBuilder) -> Self {
        Self::from_parts(select, SideTables::new())
    }

    pub(crate) fn from_parts(select: SelectBuilder, tables: SideTables) -> Self {
        Self {
            select,
            tables,
            _phantom: PhantomData,
        }
    }

    pub fn context(&self) -> &QueryContext {
        self.select.context()
    }

    pub fn select_builder(&self) -> &SelectBuilder {
        &self.select
    }

    pub fn side_tables(&self) -> &SideTables {
        &self.tables
    }

    /// Declared parameters
    pub fn parameters(&self) -> &Parameters {
        &self.tables.parameters
    }

    /// Parameter defaults, for generated routine signatures
    pub fn parameter_defaults(&self) -> &ParameterDefaults {
        &self.tables.defaults
    }

    /// Bound values keyed by rendered placeholder name
    pub fn parameter_values(&self) -> &CommandParameterValues {
        &self.tables.values
    }

    /// Bound value of the first parameter the caller declared as `original`
    pub fn value_for(&self, original: &str) -> Option<&Value> {
        self.tables.value_for(original)
    }

    /// Bound values of every parameter the caller declared as `original`
    pub fn values_for(&self, original: &str) -> Vec<&Value> {
        self.tables.values_for(original)
    }

    /// Freeze the current state into a select snapshot
    pub fn generate_select(&self) -> Select {
        self.select.generate_select()
    }

    /// Generate the SQL text
    pub fn to_sql(&self) -> String {
        self.generate_select().generate_sql()
    }

    /// SQL text preceded by one comment line per bound value
    pub fn to_debug_sql(&self) -> String {
        let mut lines: Vec<String> = self
            .tables
            .values
            .iter()
            .map(|(name, value)| format!("-- @{} = {}", name, sql_literal(value)))
            .collect();
        lines.push(self.to_sql());
        lines.join("\n")
    }

    /// Declare a placeholder that the caller writes into raw predicate text.
    /// The name is used verbatim, without uniquification.
    pub fn declare_parameter(mut self, name: &str, db_type: DbType) -> QueryResult<Self> {
        let parameter = Parameter::typed(name, db_type)?;
        self.tables
            .parameters
            .declare(UniqueParameter::verbatim(parameter));
        Ok(self)
    }

    /// Bind a value to a raw placeholder, declaring it untyped if needed
    pub fn bind_value<T: Into<Value>>(mut self, name: &str, value: T) -> QueryResult<Self> {
        let name = self.ensure_declared(name)?;
        self.tables.values.insert(name, value);
        Ok(self)
    }

    /// Attach a default to a raw placeholder, declaring it untyped if needed
    pub fn default_value<T: Into<Value>>(mut self, name: &str, value: T) -> QueryResult<Self> {
        let name = self.ensure_declared(name)?;
        self.tables.defaults.insert(name, value);
        Ok(self)
    }

    fn ensure_declared(&mut self, name: &str) -> QueryResult<String> {
        let parameter = Parameter::new(name)?;
        let name = parameter.name().to_string();
        if !self.tables.parameters.contains(&name) {
            self.tables
                .parameters
                .declare(UniqueParameter::verbatim(parameter));
        }
        Ok(name)
    }

    /// Fail unless `other` draws names from the same generators
    pub(crate) fn ensure_same_context(
        &self,
        other: &QueryContext,
        operation: &str,
    ) -> QueryResult<()> {
        if self.context().shares_generator_with(other) {
            Ok(())
        } else {
            Err(QueryError::ForeignContext {
                operation: operation.to_string(),
            })
        }
    }
}

impl<M> fmt::Display for QueryBuilder<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sql())
    }
}
