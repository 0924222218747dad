//! # sqlweave-query
//!
//! Composable T-SQL `SELECT` generation. A [`QueryBuilder`] accumulates
//! columns, predicates, joins, ordering and pagination, and renders
//! deterministic parameterized SQL. Every placeholder and source alias is
//! drawn from generators shared by the whole composition graph, so joined
//! and unioned operands never collide.
//!
//! ```
//! use sqlweave_query::{QueryBuilder, QueryContext};
//!
//! let context = QueryContext::new();
//! let orders = context
//!     .table::<()>("Orders")
//!     .where_gt("Price", 5)
//!     .into_builder()
//!     .order_by("Name");
//!
//! assert_eq!(
//!     orders.to_sql(),
//!     "SELECT *\nFROM dbo.[Orders]\nWHERE ([Price] > @Price_0)\nORDER BY [Name]"
//! );
//! assert_eq!(orders.value_for("Price"), Some(&serde_json::json!(5)));
//! # let _: QueryBuilder = orders;
//! ```

pub mod ast;
pub mod config;
pub mod error;
pub mod generator;
pub mod parameter;
pub mod query;
pub mod scope;
pub mod select_builder;

pub use ast::{JoinKind, LockingHint, OrderDirection, QueryOperator, Select};
pub use config::{ConfigError, SqlConfig};
pub use error::{QueryError, QueryResult};
pub use generator::{NameGenerator, QueryContext};
pub use parameter::{
    CommandParameterValues, DbType, Parameter, ParameterDefaults, Parameters, SideTables,
    UniqueParameter,
};
pub use query::{
    DeserializeRow, JoinedQuery, ParameterizedBuilder, PendingJoin, QueryBuilder, QueryExecutor,
    Row, RowMapper, RowStream,
};
pub use select_builder::SelectBuilder;
