//! Query Builder Module - Fluent, type-tagged façade over the select builder

pub mod builder;
pub mod composition;
pub mod execution;
pub mod joins;
pub mod ordering;
pub mod pagination;
pub mod routines;
pub mod select;
pub mod types;
pub mod where_clause;

pub use builder::QueryBuilder;
pub use execution::{DeserializeRow, QueryExecutor, Row, RowMapper, RowStream};
pub use joins::{JoinedQuery, PendingJoin};
pub use types::ParameterizedBuilder;
