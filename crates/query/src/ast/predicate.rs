//! WHERE predicates
//!
//! Structured predicates reference their placeholders by name only; bound
//! values travel through the side tables, never through the SQL text.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use super::identifier::FieldRef;
use crate::error::QueryError;
use crate::parameter::UniqueParameter;

/// Query operator types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryOperator {
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    Like,
    Between,
    In,
}

impl QueryOperator {
    /// Operators taking a single value
    pub fn is_unary(&self) -> bool {
        !matches!(self, QueryOperator::Between | QueryOperator::In)
    }
}

impl fmt::Display for QueryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryOperator::Equal => write!(f, "="),
            QueryOperator::NotEqual => write!(f, "<>"),
            QueryOperator::LessThan => write!(f, "<"),
            QueryOperator::LessThanOrEqual => write!(f, "<="),
            QueryOperator::GreaterThan => write!(f, ">"),
            QueryOperator::GreaterThanOrEqual => write!(f, ">="),
            QueryOperator::Like => write!(f, "LIKE"),
            QueryOperator::Between => write!(f, "BETWEEN"),
            QueryOperator::In => write!(f, "IN"),
        }
    }
}

impl FromStr for QueryOperator {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "=" | "==" => Ok(QueryOperator::Equal),
            "<>" | "!=" => Ok(QueryOperator::NotEqual),
            "<" => Ok(QueryOperator::LessThan),
            "<=" => Ok(QueryOperator::LessThanOrEqual),
            ">" => Ok(QueryOperator::GreaterThan),
            ">=" => Ok(QueryOperator::GreaterThanOrEqual),
            "LIKE" => Ok(QueryOperator::Like),
            "BETWEEN" => Ok(QueryOperator::Between),
            "IN" => Ok(QueryOperator::In),
            _ => Err(QueryError::UnsupportedOperand {
                operation: "parse operator".to_string(),
                operand: s.to_string(),
            }),
        }
    }
}

/// One ANDed predicate of a WHERE clause
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WhereClause {
    /// Caller-supplied text, already placeholder-sanitized
    Raw(String),
    Compare {
        field: FieldRef,
        operator: QueryOperator,
        parameter: Arc<UniqueParameter>,
    },
    Between {
        field: FieldRef,
        start: Arc<UniqueParameter>,
        end: Arc<UniqueParameter>,
    },
    In {
        field: FieldRef,
        parameters: Vec<Arc<UniqueParameter>>,
    },
    /// Matches no rows; stands in for `IN ()`
    Never,
}

impl WhereClause {
    /// Qualify the referenced field with `alias` unless already qualified
    pub fn qualify_with(&self, alias: &str) -> Self {
        match self {
            WhereClause::Compare {
                field,
                operator,
                parameter,
            } => WhereClause::Compare {
                field: field.qualify_with(alias),
                operator: *operator,
                parameter: Arc::clone(parameter),
            },
            WhereClause::Between { field, start, end } => WhereClause::Between {
                field: field.qualify_with(alias),
                start: Arc::clone(start),
                end: Arc::clone(end),
            },
            WhereClause::In { field, parameters } => WhereClause::In {
                field: field.qualify_with(alias),
                parameters: parameters.clone(),
            },
            other => other.clone(),
        }
    }

    /// Placeholders referenced by this predicate
    pub fn parameter_names(&self) -> Vec<&str> {
        match self {
            WhereClause::Compare { parameter, .. } => vec![parameter.name()],
            WhereClause::Between { start, end, .. } => vec![start.name(), end.name()],
            WhereClause::In { parameters, .. } => parameters.iter().map(|p| p.name()).collect(),
            WhereClause::Raw(_) | WhereClause::Never => Vec::new(),
        }
    }

    pub fn to_sql(&self) -> String {
        match self {
            WhereClause::Raw(text) => text.clone(),
            WhereClause::Compare {
                field,
                operator,
                parameter,
            } => format!("{} {} {}", field, operator, parameter.placeholder()),
            WhereClause::Between { field, start, end } => format!(
                "{} BETWEEN {} AND {}",
                field,
                start.placeholder(),
                end.placeholder()
            ),
            WhereClause::In { field, parameters } => {
                let placeholders: Vec<String> =
                    parameters.iter().map(|p| p.placeholder()).collect();
                format!("{} IN ({})", field, placeholders.join(", "))
            }
            WhereClause::Never => "0 = 1".to_string(),
        }
    }
}
