//! Shared helpers for integration tests

#![allow(dead_code)]

use std::sync::Mutex;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use sqlweave_query::{CommandParameterValues, QueryExecutor, QueryResult, Row};

/// Collapse runs of whitespace so multi-line SQL compares against a
/// single-line expectation
pub fn collapse(sql: &str) -> String {
    sql.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .replace("( ", "(")
        .replace(" )", ")")
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Order {
    #[serde(rename = "Id")]
    pub id: i64,
    #[serde(rename = "Name")]
    pub name: String,
}

/// Rows `Id = 1..=count`, already in `[Id]` order
pub fn order_rows(count: i64) -> Vec<Row> {
    (1..=count)
        .map(|id| {
            let row = json!({ "Id": id, "Name": format!("order-{}", id) });
            match row {
                Value::Object(map) => map,
                _ => unreachable!(),
            }
        })
        .collect()
}

/// Executor over a fixed, ordered row set.
///
/// Honours row-number pagination by slicing on the bound `RowStart_*` and
/// `RowEnd_*` values, and answers scalar queries with the row count.
#[derive(Debug, Default)]
pub struct InMemoryExecutor {
    rows: Vec<Row>,
    executed: Mutex<Vec<(String, CommandParameterValues)>>,
}

impl InMemoryExecutor {
    pub fn new(rows: Vec<Row>) -> Self {
        Self {
            rows,
            executed: Mutex::new(Vec::new()),
        }
    }

    pub fn executed(&self) -> Vec<(String, CommandParameterValues)> {
        self.executed.lock().unwrap().clone()
    }

    fn record(&self, sql: &str, parameters: &CommandParameterValues) {
        self.executed
            .lock()
            .unwrap()
            .push((sql.to_string(), parameters.clone()));
    }

    fn bound(parameters: &CommandParameterValues, prefix: &str) -> Option<u64> {
        parameters
            .iter()
            .find(|(name, _)| name.starts_with(prefix))
            .and_then(|(_, value)| value.as_u64())
    }
}

#[async_trait]
impl QueryExecutor for InMemoryExecutor {
    async fn fetch_scalar(
        &self,
        sql: &str,
        parameters: &CommandParameterValues,
    ) -> QueryResult<Value> {
        self.record(sql, parameters);
        Ok(json!(self.rows.len()))
    }

    async fn fetch_rows(
        &self,
        sql: &str,
        parameters: &CommandParameterValues,
    ) -> QueryResult<Vec<Row>> {
        self.record(sql, parameters);

        let start = Self::bound(parameters, "RowStart_");
        let end = Self::bound(parameters, "RowEnd_");
        let rows = match (start, end) {
            (Some(start), Some(end)) => self
                .rows
                .iter()
                .enumerate()
                .skip(start.saturating_sub(1) as usize)
                .take(end.saturating_sub(start.saturating_sub(1)) as usize)
                .map(|(index, row)| {
                    let mut row = row.clone();
                    row.insert("RowNumber".to_string(), json!(index + 1));
                    row
                })
                .collect(),
            _ => self.rows.clone(),
        };
        Ok(rows)
    }
}
