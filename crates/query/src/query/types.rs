//! Query Builder intermediate types

use std::ops::Deref;

use serde_json::Value;

use super::builder::QueryBuilder;
use crate::error::{QueryError, QueryResult};
use crate::parameter::DbType;

/// A builder returned from a parameterized predicate. It remembers the
/// placeholders the predicate just created so their value, default or type
/// can be overridden before the builder is used further.
#[derive(Debug, Clone)]
pub struct ParameterizedBuilder<M = ()> {
    builder: QueryBuilder<M>,
    created: Vec<String>,
}

impl<M> ParameterizedBuilder<M> {
    pub(crate) fn new(builder: QueryBuilder<M>, created: Vec<String>) -> Self {
        Self { builder, created }
    }

    /// Rendered names of the placeholders created by the predicate
    pub fn parameter_names(&self) -> &[String] {
        &self.created
    }

    /// Override the bound value of the first created placeholder. A no-op
    /// for an empty `IN` list.
    pub fn with_value<T: Into<Value>>(mut self, value: T) -> Self {
        if let Some(name) = self.created.first() {
            self.builder.tables.values.insert(name.clone(), value);
        }
        self
    }

    /// Attach a default to the first created placeholder
    pub fn with_default<T: Into<Value>>(mut self, value: T) -> Self {
        if let Some(name) = self.created.first() {
            self.builder.tables.defaults.insert(name.clone(), value);
        }
        self
    }

    /// Declare the storage type of every created placeholder
    pub fn with_type(mut self, db_type: DbType) -> Self {
        for name in &self.created {
            if let Some(parameter) = self.builder.tables.parameters.get_mut(name) {
                parameter.set_type(db_type);
            }
        }
        self
    }

    /// Override the value of the created placeholder the caller named
    /// `original`
    pub fn bind<T: Into<Value>>(mut self, original: &str, value: T) -> QueryResult<Self> {
        let name = self.resolve(original, "bind")?;
        self.builder.tables.values.insert(name, value);
        Ok(self)
    }

    /// Attach a default to the created placeholder the caller named
    /// `original`
    pub fn default_for<T: Into<Value>>(mut self, original: &str, value: T) -> QueryResult<Self> {
        let name = self.resolve(original, "default")?;
        self.builder.tables.defaults.insert(name, value);
        Ok(self)
    }

    fn resolve(&self, original: &str, operation: &str) -> QueryResult<String> {
        self.created
            .iter()
            .find(|name| {
                self.builder
                    .tables
                    .parameters
                    .get(name)
                    .is_some_and(|p| p.original_name() == original)
            })
            .cloned()
            .ok_or_else(|| QueryError::UndeclaredParameter {
                operation: operation.to_string(),
                name: original.to_string(),
            })
    }

    pub fn into_builder(self) -> QueryBuilder<M> {
        self.builder
    }
}

impl<M> Deref for ParameterizedBuilder<M> {
    type Target = QueryBuilder<M>;

    fn deref(&self) -> &Self::Target {
        &self.builder
    }
}

impl<M> From<ParameterizedBuilder<M>> for QueryBuilder<M> {
    fn from(parameterized: ParameterizedBuilder<M>) -> Self {
        parameterized.builder
    }
}

#[cfg(test)]
mod tests {
    use crate::query::QueryBuilder;
    use crate::error::QueryError;
    use crate::parameter::DbType;
    use serde_json::json;

    #[test]
    fn test_value_override_and_default() {
        let query = QueryBuilder::<()>::new("Orders")
            .where_eq("Status", "open")
            .with_value("closed")
            .with_default("open")
            .with_type(DbType::VarChar(Some(16)));

        assert_eq!(query.parameter_names(), ["Status_0".to_string()]);
        assert_eq!(query.value_for("Status"), Some(&json!("closed")));
        assert_eq!(query.parameter_defaults().get("Status_0"), Some(&json!("open")));
        assert_eq!(
            query.parameters().get("Status_0").unwrap().db_type(),
            Some(DbType::VarChar(Some(16)))
        );
    }

    #[test]
    fn test_bind_by_original_name() {
        let query = QueryBuilder::<()>::new("Orders")
            .where_between("Total", 1, 10)
            .bind("TotalEnd", 99)
            .unwrap();

        assert_eq!(query.value_for("TotalStart"), Some(&json!(1)));
        assert_eq!(query.value_for("TotalEnd"), Some(&json!(99)));
    }

    #[test]
    fn test_bind_unknown_name() {
        let err = QueryBuilder::<()>::new("Orders")
            .where_eq("Status", 1)
            .bind("Price", 2)
            .unwrap_err();
        assert_eq!(
            err,
            QueryError::UndeclaredParameter {
                operation: "bind".to_string(),
                name: "Price".to_string()
            }
        );
    }
}
