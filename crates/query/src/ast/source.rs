//! FROM sources: tables, subqueries and unions

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::identifier::{indent, quote_identifier, schema_object, unquote_identifier};
use super::select::Select;
use crate::config::ConfigError;

/// Table locking hint, rendered as `WITH (<hint>)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LockingHint {
    NoLock,
    ReadPast,
    UpdLock,
    HoldLock,
}

impl fmt::Display for LockingHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LockingHint::NoLock => write!(f, "NOLOCK"),
            LockingHint::ReadPast => write!(f, "READPAST"),
            LockingHint::UpdLock => write!(f, "UPDLOCK"),
            LockingHint::HoldLock => write!(f, "HOLDLOCK"),
        }
    }
}

impl FromStr for LockingHint {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "nolock" => Ok(LockingHint::NoLock),
            "readpast" => Ok(LockingHint::ReadPast),
            "updlock" => Ok(LockingHint::UpdLock),
            "holdlock" => Ok(LockingHint::HoldLock),
            _ => Err(ConfigError::InvalidValue {
                field: "locking_hint".to_string(),
                value: s.to_string(),
                expected: "NOLOCK, READPAST, UPDLOCK or HOLDLOCK".to_string(),
            }),
        }
    }
}

/// A source that can be referenced through an alias
pub trait AliasedSelectSource {
    /// Alias other clauses use to qualify this source's columns
    fn alias(&self) -> &str;

    /// Render the source as it appears after `FROM` or a join keyword
    fn render(&self, indent_width: usize) -> String;
}

/// `schema.[table]`, optionally aliased and hinted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSource {
    schema: String,
    table: String,
    alias: Option<String>,
    hint: Option<LockingHint>,
}

impl TableSource {
    pub fn new(schema: &str, table: &str) -> Self {
        Self {
            schema: unquote_identifier(schema),
            table: unquote_identifier(table),
            alias: None,
            hint: None,
        }
    }

    pub fn with_alias(mut self, alias: &str) -> Self {
        self.alias = Some(unquote_identifier(alias));
        self
    }

    pub fn with_hint(mut self, hint: LockingHint) -> Self {
        self.hint = Some(hint);
        self
    }

    pub fn with_optional_hint(mut self, hint: Option<LockingHint>) -> Self {
        self.hint = hint;
        self
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn hint(&self) -> Option<LockingHint> {
        self.hint
    }
}

impl AliasedSelectSource for TableSource {
    fn alias(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.table)
    }

    fn render(&self, _indent_width: usize) -> String {
        let mut sql = schema_object(&self.schema, &self.table);
        if let Some(alias) = self.alias.as_deref().filter(|alias| *alias != self.table) {
            sql.push(' ');
            sql.push_str(&quote_identifier(alias));
        }
        if let Some(hint) = self.hint {
            sql.push_str(&format!(" WITH ({})", hint));
        }
        sql
    }
}

/// A parenthesized nested select with a generated alias
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubquerySource {
    select: Box<Select>,
    alias: String,
}

impl SubquerySource {
    pub fn new(select: Select, alias: String) -> Self {
        Self {
            select: Box::new(select),
            alias,
        }
    }

    pub fn select(&self) -> &Select {
        &self.select
    }
}

impl AliasedSelectSource for SubquerySource {
    fn alias(&self) -> &str {
        &self.alias
    }

    fn render(&self, indent_width: usize) -> String {
        format!(
            "(\n{}\n) {}",
            indent(&self.select.to_sql(), indent_width),
            quote_identifier(&self.alias)
        )
    }
}

/// Two or more selects combined with `UNION`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnionSource {
    selects: Vec<Select>,
    alias: String,
}

impl UnionSource {
    pub fn new(selects: Vec<Select>, alias: String) -> Self {
        Self { selects, alias }
    }

    pub fn selects(&self) -> &[Select] {
        &self.selects
    }
}

impl AliasedSelectSource for UnionSource {
    fn alias(&self) -> &str {
        &self.alias
    }

    fn render(&self, indent_width: usize) -> String {
        let separator = format!("\n{}UNION\n", " ".repeat(indent_width));
        let members: Vec<String> = self
            .selects
            .iter()
            .map(|select| indent(&select.to_sql(), indent_width))
            .collect();
        format!(
            "(\n{}\n) {}",
            members.join(&separator),
            quote_identifier(&self.alias)
        )
    }
}

/// Any aliased select source
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectSource {
    Table(TableSource),
    Subquery(SubquerySource),
    Union(UnionSource),
}

impl AliasedSelectSource for SelectSource {
    fn alias(&self) -> &str {
        match self {
            SelectSource::Table(table) => table.alias(),
            SelectSource::Subquery(subquery) => subquery.alias(),
            SelectSource::Union(union) => union.alias(),
        }
    }

    fn render(&self, indent_width: usize) -> String {
        match self {
            SelectSource::Table(table) => table.render(indent_width),
            SelectSource::Subquery(subquery) => subquery.render(indent_width),
            SelectSource::Union(union) => union.render(indent_width),
        }
    }
}

impl From<TableSource> for SelectSource {
    fn from(source: TableSource) -> Self {
        SelectSource::Table(source)
    }
}

impl From<SubquerySource> for SelectSource {
    fn from(source: SubquerySource) -> Self {
        SelectSource::Subquery(source)
    }
}

impl From<UnionSource> for SelectSource {
    fn from(source: UnionSource) -> Self {
        SelectSource::Union(source)
    }
}
