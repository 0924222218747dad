//! Query Builder execution through an external executor
//!
//! The builder never talks to a database itself. It hands the rendered SQL
//! and the bound values to a [`QueryExecutor`] and turns the returned rows
//! into records with a [`RowMapper`].

use std::marker::PhantomData;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::debug;

use super::builder::QueryBuilder;
use crate::error::{QueryError, QueryResult};
use crate::parameter::CommandParameterValues;

/// One result row, column name to value
pub type Row = Map<String, Value>;

/// Executes rendered SQL with a placeholder-name to value mapping
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Execute a query returning a single value
    async fn fetch_scalar(&self, sql: &str, parameters: &CommandParameterValues)
        -> QueryResult<Value>;

    /// Execute a query and return the result rows
    async fn fetch_rows(&self, sql: &str, parameters: &CommandParameterValues)
        -> QueryResult<Vec<Row>>;
}

/// Maps one result row to a record
pub trait RowMapper<M>: Send + Sync {
    fn map_row(&self, row: &Row) -> QueryResult<M>;
}

impl<M, F> RowMapper<M> for F
where
    F: Fn(&Row) -> QueryResult<M> + Send + Sync,
{
    fn map_row(&self, row: &Row) -> QueryResult<M> {
        self(row)
    }
}

/// Maps rows through serde by column name
#[derive(Debug, Clone, Copy, Default)]
pub struct DeserializeRow;

impl<M: DeserializeOwned> RowMapper<M> for DeserializeRow {
    fn map_row(&self, row: &Row) -> QueryResult<M> {
        Ok(serde_json::from_value(Value::Object(row.clone()))?)
    }
}

/// Lazily mapped result rows. Each row is mapped when the iterator reaches
/// it.
pub struct RowStream<M, R> {
    rows: std::vec::IntoIter<Row>,
    mapper: R,
    _record: PhantomData<fn() -> M>,
}

impl<M, R: RowMapper<M>> Iterator for RowStream<M, R> {
    type Item = QueryResult<M>;

    fn next(&mut self) -> Option<Self::Item> {
        self.rows.next().map(|row| self.mapper.map_row(&row))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.rows.size_hint()
    }
}

impl<M> QueryBuilder<M> {
    /// Execute the query and map every row
    pub async fn to_list<E, R>(&self, executor: &E, mapper: R) -> QueryResult<Vec<M>>
    where
        E: QueryExecutor + ?Sized,
        R: RowMapper<M>,
    {
        self.stream(executor, mapper).await?.collect()
    }

    /// Execute rows `skip + 1` through `skip + take` of the current ordering
    pub async fn to_list_page<E, R>(
        &self,
        executor: &E,
        mapper: R,
        skip: u64,
        take: u64,
    ) -> QueryResult<Vec<M>>
    where
        E: QueryExecutor + ?Sized,
        R: RowMapper<M>,
    {
        self.clone().page(skip, take).to_list(executor, mapper).await
    }

    /// Execute the query and return a lazily mapped row iterator
    pub async fn stream<E, R>(&self, executor: &E, mapper: R) -> QueryResult<RowStream<M, R>>
    where
        E: QueryExecutor + ?Sized,
        R: RowMapper<M>,
    {
        let sql = self.to_sql();
        debug!(
            parameters = self.tables.values.len(),
            "executing select"
        );
        let rows = executor.fetch_rows(&sql, &self.tables.values).await?;
        debug!(rows = rows.len(), "select returned");

        Ok(RowStream {
            rows: rows.into_iter(),
            mapper,
            _record: PhantomData,
        })
    }

    /// Execute `COUNT(*)` over the same rows
    pub async fn count<E>(&self, executor: &E) -> QueryResult<u64>
    where
        E: QueryExecutor + ?Sized,
    {
        let query = self.count_query();
        let value = executor
            .fetch_scalar(&query.to_sql(), &query.tables.values)
            .await?;

        match &value {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
        .ok_or_else(|| QueryError::Execution {
            message: format!("COUNT(*) returned a non-count value: {}", value),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Order {
        id: i64,
    }

    #[test]
    fn test_deserialize_mapper() {
        let row = json!({"id": 4, "extra": "ignored"});
        let row = row.as_object().unwrap();
        let order: Order = DeserializeRow.map_row(row).unwrap();
        assert_eq!(order, Order { id: 4 });

        let bad = json!({"id": "four"});
        let err = RowMapper::<Order>::map_row(&DeserializeRow, bad.as_object().unwrap()).unwrap_err();
        assert!(matches!(err, QueryError::RowMapping { .. }));
    }

    #[test]
    fn test_closure_mapper() {
        let mapper = |row: &Row| -> QueryResult<i64> {
            row.get("id")
                .and_then(Value::as_i64)
                .ok_or_else(|| QueryError::RowMapping {
                    message: "missing id".to_string(),
                })
        };
        let row = json!({"id": 9});
        assert_eq!(mapper.map_row(row.as_object().unwrap()).unwrap(), 9);
    }
}
