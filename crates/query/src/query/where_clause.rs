//! Query Builder WHERE clause operations

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use super::builder::QueryBuilder;
use super::types::ParameterizedBuilder;
use crate::ast::{FieldRef, QueryOperator, WhereClause};
use crate::error::{QueryError, QueryResult};
use crate::parameter::{like, sanitize_placeholders, Parameter, UniqueParameter};

impl<M> QueryBuilder<M> {
    /// Add a raw predicate. `@name` and `:name` tokens are rewritten to the
    /// rendered placeholder syntax; the rest of the text is trusted verbatim.
    pub fn where_raw(mut self, predicate: &str) -> Self {
        self.select
            .add_where(WhereClause::Raw(sanitize_placeholders(predicate)));
        self
    }

    /// Add a structured predicate `field <operator> value`. `BETWEEN` expects
    /// a two-element array and `IN` an array of values.
    ///
    /// A `LIKE` value is bound as the raw pattern: `%`, `_` and `[` keep
    /// their wildcard meaning. Use the `where_like_*` helpers to match the
    /// text literally.
    pub fn where_field<T: Into<Value>>(
        self,
        field: &str,
        operator: QueryOperator,
        value: T,
    ) -> QueryResult<ParameterizedBuilder<M>> {
        let value = value.into();
        match operator {
            QueryOperator::Between => match value {
                Value::Array(bounds) if bounds.len() == 2 => {
                    let mut bounds = bounds.into_iter();
                    let start = bounds.next().unwrap_or(Value::Null);
                    let end = bounds.next().unwrap_or(Value::Null);
                    Ok(self.where_between(field, start, end))
                }
                other => Err(QueryError::UnsupportedOperand {
                    operation: format!("where {} BETWEEN", field),
                    operand: other.to_string(),
                }),
            },
            QueryOperator::In => match value {
                Value::Array(values) => Ok(self.where_in(field, values)),
                other => Err(QueryError::UnsupportedOperand {
                    operation: format!("where {} IN", field),
                    operand: other.to_string(),
                }),
            },
            unary => Ok(self.compare(field, unary, value)),
        }
    }

    /// Like [`where_field`](Self::where_field) with the operator given as
    /// text, e.g. `">="` or `"LIKE"`. `LIKE` patterns are not escaped.
    pub fn where_op<T: Into<Value>>(
        self,
        field: &str,
        operator: &str,
        value: T,
    ) -> QueryResult<ParameterizedBuilder<M>> {
        let operator: QueryOperator = operator.parse()?;
        self.where_field(field, operator, value)
    }

    /// Add WHERE condition with equality
    pub fn where_eq<T: Into<Value>>(self, field: &str, value: T) -> ParameterizedBuilder<M> {
        self.compare(field, QueryOperator::Equal, value.into())
    }

    /// Add WHERE condition with not equal
    pub fn where_ne<T: Into<Value>>(self, field: &str, value: T) -> ParameterizedBuilder<M> {
        self.compare(field, QueryOperator::NotEqual, value.into())
    }

    /// Add WHERE condition with less than
    pub fn where_lt<T: Into<Value>>(self, field: &str, value: T) -> ParameterizedBuilder<M> {
        self.compare(field, QueryOperator::LessThan, value.into())
    }

    /// Add WHERE condition with less than or equal
    pub fn where_lte<T: Into<Value>>(self, field: &str, value: T) -> ParameterizedBuilder<M> {
        self.compare(field, QueryOperator::LessThanOrEqual, value.into())
    }

    /// Add WHERE condition with greater than
    pub fn where_gt<T: Into<Value>>(self, field: &str, value: T) -> ParameterizedBuilder<M> {
        self.compare(field, QueryOperator::GreaterThan, value.into())
    }

    /// Add WHERE condition with greater than or equal
    pub fn where_gte<T: Into<Value>>(self, field: &str, value: T) -> ParameterizedBuilder<M> {
        self.compare(field, QueryOperator::GreaterThanOrEqual, value.into())
    }

    /// Add `field BETWEEN @<field>Start_n AND @<field>End_m`
    pub fn where_between<S, E>(mut self, field: &str, start: S, end: E) -> ParameterizedBuilder<M>
    where
        S: Into<Value>,
        E: Into<Value>,
    {
        let field = FieldRef::parse(field);
        let (start_parameter, end_parameter) = UniqueParameter::pair(
            self.context().generator(),
            Parameter::from_field(&format!("{}Start", field.name)),
            Parameter::from_field(&format!("{}End", field.name)),
        );
        let created = vec![
            start_parameter.name().to_string(),
            end_parameter.name().to_string(),
        ];

        self.select.add_where(WhereClause::Between {
            field,
            start: Arc::new(start_parameter.clone()),
            end: Arc::new(end_parameter.clone()),
        });
        self.tables.bind(start_parameter, start.into());
        self.tables.bind(end_parameter, end.into());

        ParameterizedBuilder::new(self, created)
    }

    /// Add `field IN (...)` with one placeholder per value. An empty list
    /// adds a predicate matching no rows and declares nothing.
    pub fn where_in<I, T>(mut self, field: &str, values: I) -> ParameterizedBuilder<M>
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        if values.is_empty() {
            debug!(field, "empty IN list, adding always-false predicate");
            self.select.add_where(WhereClause::Never);
            return ParameterizedBuilder::new(self, Vec::new());
        }

        let field = FieldRef::parse(field);
        let parameters = UniqueParameter::array(
            self.context().generator(),
            &Parameter::from_field(&field.name),
            values.len(),
        );
        let created: Vec<String> = parameters.iter().map(|p| p.name().to_string()).collect();

        self.select.add_where(WhereClause::In {
            field,
            parameters: parameters.iter().cloned().map(Arc::new).collect(),
        });
        for (parameter, value) in parameters.into_iter().zip(values) {
            self.tables.bind(parameter, value);
        }

        ParameterizedBuilder::new(self, created)
    }

    /// `field LIKE '%value%'` with wildcards in `value` matched literally
    pub fn where_like_contains(self, field: &str, value: &str) -> ParameterizedBuilder<M> {
        self.compare(field, QueryOperator::Like, like::contains_pattern(value).into())
    }

    /// `field LIKE 'value%'` with wildcards in `value` matched literally
    pub fn where_like_starts_with(self, field: &str, value: &str) -> ParameterizedBuilder<M> {
        self.compare(field, QueryOperator::Like, like::starts_with_pattern(value).into())
    }

    /// `field LIKE '%value'` with wildcards in `value` matched literally
    pub fn where_like_ends_with(self, field: &str, value: &str) -> ParameterizedBuilder<M> {
        self.compare(field, QueryOperator::Like, like::ends_with_pattern(value).into())
    }

    /// Match any of the `delimiter`-separated alternatives against a
    /// pipe-delimited column value
    pub fn where_like_piped(
        self,
        field: &str,
        alternatives: &str,
        delimiter: char,
    ) -> ParameterizedBuilder<M> {
        self.compare(
            field,
            QueryOperator::Like,
            like::piped_pattern(alternatives, delimiter).into(),
        )
    }

    fn compare(
        mut self,
        field: &str,
        operator: QueryOperator,
        value: Value,
    ) -> ParameterizedBuilder<M> {
        let field = FieldRef::parse(field);
        let parameter = UniqueParameter::new(
            self.context().generator(),
            Parameter::from_field(&field.name),
        );
        let created = vec![parameter.name().to_string()];

        self.select.add_where(WhereClause::Compare {
            field,
            operator,
            parameter: Arc::new(parameter.clone()),
        });
        self.tables.bind(parameter, value);

        ParameterizedBuilder::new(self, created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn orders() -> QueryBuilder {
        QueryBuilder::new("Orders")
    }

    #[test]
    fn test_structured_predicates_are_parameterized() {
        let query = orders()
            .where_gt("Price", 5)
            .into_builder()
            .where_ne("o.Status", "void")
            .into_builder();

        assert_eq!(
            query.to_sql(),
            "SELECT *\nFROM dbo.[Orders]\nWHERE ([Price] > @Price_0)\nAND ([o].[Status] <> @Status_1)\nORDER BY [Id]"
        );
        assert_eq!(query.value_for("Price"), Some(&json!(5)));
        assert_eq!(query.value_for("Status"), Some(&json!("void")));
    }

    #[test]
    fn test_in_list_binds_one_value_per_element() {
        let query = orders().where_in("Status", vec![1, 2, 3]).into_builder();

        assert!(query
            .to_sql()
            .contains("WHERE ([Status] IN (@Status0_0, @Status1_1, @Status2_2))"));
        assert_eq!(query.parameter_values().len(), 3);
        assert_eq!(query.value_for("Status1"), Some(&json!(2)));
    }

    #[test]
    fn test_empty_in_list_matches_nothing() {
        let query = orders().where_in("Status", Vec::<i32>::new());

        assert!(query.parameter_names().is_empty());
        let query = query.into_builder();
        assert!(query.to_sql().contains("WHERE (0 = 1)"));
        assert!(query.parameters().is_empty());
        assert!(query.parameter_values().is_empty());
    }

    #[test]
    fn test_where_field_dispatches_on_operator() {
        let query = orders()
            .where_field("Total", QueryOperator::Between, json!([10, 20]))
            .unwrap()
            .into_builder()
            .where_op("Region", "IN", json!(["EU", "US"]))
            .unwrap()
            .into_builder()
            .where_op("Name", "like", "A%")
            .unwrap()
            .into_builder();

        let sql = query.to_sql();
        assert!(sql.contains("WHERE ([Total] BETWEEN @TotalStart_0 AND @TotalEnd_1)"));
        assert!(sql.contains("AND ([Region] IN (@Region0_2, @Region1_3))"));
        assert!(sql.contains("AND ([Name] LIKE @Name_4)"));
        assert_eq!(query.value_for("Name"), Some(&json!("A%")));
    }

    #[test]
    fn test_where_field_rejects_malformed_operands() {
        let err = orders()
            .where_field("Total", QueryOperator::Between, 5)
            .unwrap_err();
        assert!(matches!(err, QueryError::UnsupportedOperand { .. }));

        let err = orders().where_op("Total", "~=", 5).unwrap_err();
        assert!(matches!(err, QueryError::UnsupportedOperand { operand, .. } if operand == "~="));
    }

    #[test]
    fn test_like_helpers_escape_values() {
        let query = orders()
            .where_like_contains("Code", "50%_off[1]")
            .into_builder()
            .where_like_piped("Tags", "a,b , c", ',')
            .into_builder();

        assert_eq!(query.value_for("Code"), Some(&json!("%50[%][_]off[[]1]%")));
        assert_eq!(query.value_for("Tags"), Some(&json!("%|a|b|c|%")));
        assert!(query.to_sql().contains("WHERE ([Code] LIKE @Code_0)"));
    }

    #[test]
    fn test_raw_like_pattern_keeps_wildcards() {
        let raw = orders()
            .where_field("Code", QueryOperator::Like, "50%_off")
            .unwrap()
            .into_builder();
        let escaped = orders().where_like_contains("Code", "50%_off").into_builder();

        assert_eq!(raw.value_for("Code"), Some(&json!("50%_off")));
        assert_eq!(escaped.value_for("Code"), Some(&json!("%50[%][_]off%")));
    }

    #[test]
    fn test_raw_predicate_placeholders_are_sanitized() {
        let query = orders().where_raw("[Date] >= :from");
        assert!(query.to_sql().contains("WHERE ([Date] >= @from)"));
    }
}
