//! Projected columns

use super::identifier::{quote_identifier, FieldRef};
use super::ordering::OrderBy;

/// One projected column with an optional output alias
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Column {
    /// `[Name]`
    Bare { name: String, alias: Option<String> },
    /// `[source].[Name]`
    Qualified {
        source: String,
        name: String,
        alias: Option<String>,
    },
    /// Caller-supplied expression, inserted verbatim
    Calculated {
        expression: String,
        alias: Option<String>,
    },
}

impl Column {
    /// Parse `Name` or `source.Name` into a bare or qualified column
    pub fn field(reference: &str, alias: Option<&str>) -> Self {
        let field = FieldRef::parse(reference);
        let alias = alias.map(str::to_string);
        match field.qualifier {
            Some(source) => Column::Qualified {
                source,
                name: field.name,
                alias,
            },
            None => Column::Bare {
                name: field.name,
                alias,
            },
        }
    }

    pub fn calculated(expression: &str, alias: Option<&str>) -> Self {
        Column::Calculated {
            expression: expression.to_string(),
            alias: alias.map(str::to_string),
        }
    }

    pub fn alias(&self) -> Option<&str> {
        match self {
            Column::Bare { alias, .. }
            | Column::Qualified { alias, .. }
            | Column::Calculated { alias, .. } => alias.as_deref(),
        }
    }

    /// Qualify a bare column with `source`
    pub fn qualify_with(&self, source: &str) -> Self {
        match self {
            Column::Bare { name, alias } => Column::Qualified {
                source: source.to_string(),
                name: name.clone(),
                alias: alias.clone(),
            },
            other => other.clone(),
        }
    }

    pub fn to_sql(&self) -> String {
        let body = match self {
            Column::Bare { name, .. } => FieldRef::bare(name).to_sql(),
            Column::Qualified { source, name, .. } => FieldRef::qualified(source, name).to_sql(),
            Column::Calculated { expression, .. } => expression.clone(),
        };
        match self.alias() {
            Some(alias) => format!("{} AS {}", body, quote_identifier(alias)),
            None => body,
        }
    }
}

/// `ROW_NUMBER() OVER (PARTITION BY ... ORDER BY ...) AS [alias]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowNumberColumn {
    pub alias: String,
    pub partition_by: Vec<FieldRef>,
    /// Qualify unqualified partition columns with the primary source alias
    pub qualify_partition: bool,
    pub order_by: Vec<OrderBy>,
}

impl RowNumberColumn {
    pub fn new(alias: &str, order_by: Vec<OrderBy>) -> Self {
        Self {
            alias: alias.to_string(),
            partition_by: Vec::new(),
            qualify_partition: false,
            order_by,
        }
    }

    pub fn partitioned_by(mut self, columns: &[&str], qualified: bool) -> Self {
        self.partition_by = columns.iter().map(|c| FieldRef::parse(c)).collect();
        self.qualify_partition = qualified;
        self
    }

    pub fn to_sql(&self) -> String {
        let mut window = Vec::new();
        if !self.partition_by.is_empty() {
            let columns: Vec<String> = self.partition_by.iter().map(FieldRef::to_sql).collect();
            window.push(format!("PARTITION BY {}", columns.join(", ")));
        }
        if !self.order_by.is_empty() {
            let order: Vec<String> = self.order_by.iter().map(OrderBy::to_sql).collect();
            window.push(format!("ORDER BY {}", order.join(", ")));
        } else {
            // ROW_NUMBER requires an ORDER BY
            window.push("ORDER BY (SELECT NULL)".to_string());
        }
        format!(
            "ROW_NUMBER() OVER ({}) AS {}",
            window.join(" "),
            quote_identifier(&self.alias)
        )
    }
}

/// The projection of a select
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Projection {
    /// `*` or `[source].*`
    All { qualifier: Option<String> },
    Columns(Vec<Column>),
    /// `COUNT(*)`
    Count,
}

impl Projection {
    pub fn to_sql(&self) -> String {
        match self {
            Projection::All { qualifier: None } => "*".to_string(),
            Projection::All {
                qualifier: Some(source),
            } => FieldRef::qualified(source, "*").to_sql(),
            Projection::Columns(columns) => columns
                .iter()
                .map(Column::to_sql)
                .collect::<Vec<_>>()
                .join(", "),
            Projection::Count => "COUNT(*)".to_string(),
        }
    }
}
