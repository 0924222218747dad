//! JOIN nodes

use std::fmt;
use std::str::FromStr;

use super::identifier::FieldRef;
use super::source::{AliasedSelectSource, SelectSource};
use crate::error::QueryError;

/// Supported join kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    InnerJoin,
    LeftHashJoin,
}

impl fmt::Display for JoinKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JoinKind::InnerJoin => write!(f, "INNER JOIN"),
            JoinKind::LeftHashJoin => write!(f, "LEFT HASH JOIN"),
        }
    }
}

impl FromStr for JoinKind {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_')
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "innerjoin" | "inner" => Ok(JoinKind::InnerJoin),
            "lefthashjoin" | "lefthash" => Ok(JoinKind::LeftHashJoin),
            _ => Err(QueryError::UnsupportedJoinKind {
                kind: s.to_string(),
            }),
        }
    }
}

/// `left = right`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinClause {
    pub left: FieldRef,
    pub right: FieldRef,
}

impl JoinClause {
    pub fn new(left: FieldRef, right: FieldRef) -> Self {
        Self { left, right }
    }

    pub fn to_sql(&self) -> String {
        format!("{} = {}", self.left, self.right)
    }
}

/// A join of one aliased source with at least one equality clause
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Join {
    kind: JoinKind,
    source: SelectSource,
    clauses: Vec<JoinClause>,
}

impl Join {
    pub fn new(kind: JoinKind, source: SelectSource, first: JoinClause) -> Self {
        Self {
            kind,
            source,
            clauses: vec![first],
        }
    }

    pub fn and(mut self, clause: JoinClause) -> Self {
        self.clauses.push(clause);
        self
    }

    pub fn kind(&self) -> JoinKind {
        self.kind
    }

    pub fn source(&self) -> &SelectSource {
        &self.source
    }

    pub fn clauses(&self) -> &[JoinClause] {
        &self.clauses
    }

    pub fn render(&self, indent_width: usize) -> String {
        let clauses: Vec<String> = self.clauses.iter().map(JoinClause::to_sql).collect();
        format!(
            "{} {}\nON {}",
            self.kind,
            self.source.render(indent_width),
            clauses.join(" AND ")
        )
    }
}
