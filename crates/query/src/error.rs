//! Error types for the query builder
//!
//! Every configuration error is returned from the builder call that
//! introduced the inconsistency. Rendering a frozen [`Select`](crate::ast::Select)
//! never fails.

use crate::config::ConfigError;

/// Result type alias for builder operations
pub type QueryResult<T> = Result<T, QueryError>;

/// Error types for query building, composition and execution
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum QueryError {
    #[error("Unsupported join kind '{kind}' (expected InnerJoin or LeftHashJoin)")]
    UnsupportedJoinKind { kind: String },

    #[error("{operation}: unsupported operand '{operand}'")]
    UnsupportedOperand { operation: String, operand: String },

    #[error("Invalid parameter name '{name}'")]
    InvalidParameterName { name: String },

    #[error(
        "{operation}: side table mismatch ({parameters} declared parameters, {defaults} defaults, {values} bound values)"
    )]
    SideTableMismatch {
        operation: String,
        parameters: usize,
        defaults: usize,
        values: usize,
    },

    #[error("{operation}: parameter '{name}' is not declared")]
    UndeclaredParameter { operation: String, name: String },

    #[error("{operation}: parameter '{name}' is declared by both operands")]
    DuplicateParameter { operation: String, name: String },

    #[error("{operation}: operands were created from different query contexts")]
    ForeignContext { operation: String },

    #[error("Cannot generate routine '{name}': {reason}")]
    InvalidRoutine { name: String, reason: String },

    #[error(transparent)]
    Configuration(#[from] ConfigError),

    #[error("Execution failed: {message}")]
    Execution { message: String },

    #[error("Row mapping failed: {message}")]
    RowMapping { message: String },
}

impl QueryError {
    pub(crate) fn mismatch(
        operation: &str,
        parameters: usize,
        defaults: usize,
        values: usize,
    ) -> Self {
        QueryError::SideTableMismatch {
            operation: operation.to_string(),
            parameters,
            defaults,
            values,
        }
    }
}

// Executors commonly surface driver errors through anyhow
impl From<anyhow::Error> for QueryError {
    fn from(err: anyhow::Error) -> Self {
        QueryError::Execution {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for QueryError {
    fn from(err: serde_json::Error) -> Self {
        QueryError::RowMapping {
            message: err.to_string(),
        }
    }
}
