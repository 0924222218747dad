//! Typed SQL placeholders
//!
//! A [`Parameter`] is a placeholder name plus an optional declared storage
//! type. A [`UniqueParameter`] renames its parameter through the shared
//! [`NameGenerator`] so that equally named placeholders from independently
//! built operands never collide, while remembering the name the caller used.

pub mod like;
pub mod side_tables;

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{QueryError, QueryResult};
use crate::generator::NameGenerator;

pub use side_tables::{CommandParameterValues, ParameterDefaults, Parameters, SideTables};

/// Placeholder sigil emitted in rendered SQL
pub const PLACEHOLDER_PREFIX: char = '@';

/// `@name` or `:name` tokens inside caller-supplied predicate text. The first
/// group keeps the preceding character so `@@ROWCOUNT`, `a::b` and `12:30`
/// are left alone.
static RAW_PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(^|[^@:\w])[@:]([A-Za-z_][A-Za-z0-9_]*)").unwrap());

/// Rewrite `@name`/`:name` tokens in raw predicate text into the placeholder
/// syntax used at render time.
pub fn sanitize_placeholders(text: &str) -> String {
    RAW_PLACEHOLDER
        .replace_all(text, |caps: &regex::Captures<'_>| {
            format!("{}{}{}", &caps[1], PLACEHOLDER_PREFIX, &caps[2])
        })
        .into_owned()
}

/// Strip one leading `@` or `:` sigil
pub fn sanitize_name(name: &str) -> &str {
    let trimmed = name.trim();
    trimmed.strip_prefix(['@', ':']).unwrap_or(trimmed)
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Declared storage type of a parameter, used for routine signatures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DbType {
    Bit,
    TinyInt,
    SmallInt,
    Int,
    BigInt,
    Decimal { precision: u8, scale: u8 },
    Money,
    Float,
    Date,
    DateTime,
    DateTime2,
    UniqueIdentifier,
    /// `None` renders as `MAX`
    NVarChar(Option<u32>),
    VarChar(Option<u32>),
    VarBinary(Option<u32>),
}

impl DbType {
    /// Best-effort type for a bound value without a declared type
    pub fn infer(value: &Value) -> DbType {
        match value {
            Value::Bool(_) => DbType::Bit,
            Value::Number(n) if n.is_i64() || n.is_u64() => match n.as_i64() {
                Some(v) if i32::try_from(v).is_ok() => DbType::Int,
                _ => DbType::BigInt,
            },
            Value::Number(_) => DbType::Float,
            _ => DbType::NVarChar(None),
        }
    }
}

impl fmt::Display for DbType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn length(len: &Option<u32>) -> String {
            len.map(|n| n.to_string()).unwrap_or_else(|| "MAX".to_string())
        }

        match self {
            DbType::Bit => write!(f, "BIT"),
            DbType::TinyInt => write!(f, "TINYINT"),
            DbType::SmallInt => write!(f, "SMALLINT"),
            DbType::Int => write!(f, "INT"),
            DbType::BigInt => write!(f, "BIGINT"),
            DbType::Decimal { precision, scale } => write!(f, "DECIMAL({}, {})", precision, scale),
            DbType::Money => write!(f, "MONEY"),
            DbType::Float => write!(f, "FLOAT"),
            DbType::Date => write!(f, "DATE"),
            DbType::DateTime => write!(f, "DATETIME"),
            DbType::DateTime2 => write!(f, "DATETIME2"),
            DbType::UniqueIdentifier => write!(f, "UNIQUEIDENTIFIER"),
            DbType::NVarChar(len) => write!(f, "NVARCHAR({})", length(len)),
            DbType::VarChar(len) => write!(f, "VARCHAR({})", length(len)),
            DbType::VarBinary(len) => write!(f, "VARBINARY({})", length(len)),
        }
    }
}

/// Render a value as a T-SQL literal. Only used for routine default values;
/// queries always carry values through the parameter mapping.
pub fn sql_literal(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Bool(true) => "1".to_string(),
        Value::Bool(false) => "0".to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => format!("N'{}'", s.replace('\'', "''")),
        other => format!("N'{}'", other.to_string().replace('\'', "''")),
    }
}

/// A named placeholder with an optional declared type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    name: String,
    db_type: Option<DbType>,
}

impl Parameter {
    /// Create a parameter from a caller-supplied name. A leading `@` or `:`
    /// is stripped; the remainder must be a plain identifier.
    pub fn new(name: &str) -> QueryResult<Self> {
        let sanitized = sanitize_name(name);
        if !is_identifier(sanitized) {
            return Err(QueryError::InvalidParameterName {
                name: name.to_string(),
            });
        }
        Ok(Self {
            name: sanitized.to_string(),
            db_type: None,
        })
    }

    pub fn typed(name: &str, db_type: DbType) -> QueryResult<Self> {
        Ok(Self::new(name)?.with_type(db_type))
    }

    /// Derive a parameter name from a column reference such as `[o].[Price]`
    pub fn from_field(field: &str) -> Self {
        let mut name: String = field
            .chars()
            .filter(|c| !matches!(c, '[' | ']' | '"' | '@' | ':'))
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();
        if !name.starts_with(|c: char| c.is_ascii_alphabetic() || c == '_') {
            name.insert(0, 'p');
        }
        Self { name, db_type: None }
    }

    pub fn with_type(mut self, db_type: DbType) -> Self {
        self.db_type = Some(db_type);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn db_type(&self) -> Option<DbType> {
        self.db_type
    }

    pub fn placeholder(&self) -> String {
        format!("{}{}", PLACEHOLDER_PREFIX, self.name)
    }
}

/// A parameter whose rendered name is unique within its composition graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniqueParameter {
    original: String,
    parameter: Parameter,
}

impl UniqueParameter {
    /// Rename `parameter` to `<name>_<n>` using the shared generator
    pub fn new(generator: &NameGenerator, parameter: Parameter) -> Self {
        let original = parameter.name.clone();
        let name = generator.next_parameter_name(&original);
        Self {
            original,
            parameter: Parameter { name, ..parameter },
        }
    }

    /// Keep the caller's name unchanged. Used for placeholders the caller
    /// wrote into raw predicate text.
    pub fn verbatim(parameter: Parameter) -> Self {
        Self {
            original: parameter.name.clone(),
            parameter,
        }
    }

    /// Start and end placeholders of a `BETWEEN` predicate
    pub fn pair(generator: &NameGenerator, start: Parameter, end: Parameter) -> (Self, Self) {
        let start = Self::new(generator, start);
        let end = Self::new(generator, end);
        (start, end)
    }

    /// One placeholder per element of an `IN` list, named by ordinal
    pub fn array(generator: &NameGenerator, base: &Parameter, count: usize) -> Vec<Self> {
        (0..count)
            .map(|ordinal| {
                let element = Parameter {
                    name: format!("{}{}", base.name, ordinal),
                    db_type: base.db_type,
                };
                Self::new(generator, element)
            })
            .collect()
    }

    /// Rendered (unique) name
    pub fn name(&self) -> &str {
        self.parameter.name()
    }

    /// Name the caller supplied
    pub fn original_name(&self) -> &str {
        &self.original
    }

    pub fn db_type(&self) -> Option<DbType> {
        self.parameter.db_type()
    }

    pub(crate) fn set_type(&mut self, db_type: DbType) {
        self.parameter.db_type = Some(db_type);
    }

    pub fn placeholder(&self) -> String {
        self.parameter.placeholder()
    }
}
