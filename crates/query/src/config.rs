//! Rendering configuration
//!
//! Defaults target SQL Server: `dbo` schema, `[Id]` as the implicit ordering
//! column and `ALIAS_GENERATED_<n>` aliases. Values can be overridden from the
//! environment with `SQLWEAVE_*` variables.

use std::env;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ast::LockingHint;

/// Configuration errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value '{value}' for {field}: expected {expected}")]
    InvalidValue {
        field: String,
        value: String,
        expected: String,
    },

    #[error("Validation failed for {field}: {reason}")]
    ValidationFailed { field: String, reason: String },
}

/// Settings shared by every builder created from one [`QueryContext`](crate::QueryContext)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SqlConfig {
    /// Schema used for tables created without an explicit schema
    pub default_schema: String,
    /// Column appended as `ORDER BY` when a query has no explicit ordering
    pub default_order_column: String,
    /// Prefix of generated source aliases
    pub alias_prefix: String,
    /// Output alias of the synthetic pagination column
    pub row_number_alias: String,
    /// Locking hint applied to tables that do not carry their own
    pub locking_hint: Option<LockingHint>,
    /// Spaces used to indent nested selects
    pub indent_width: usize,
}

impl Default for SqlConfig {
    fn default() -> Self {
        Self {
            default_schema: "dbo".to_string(),
            default_order_column: "Id".to_string(),
            alias_prefix: "ALIAS_GENERATED_".to_string(),
            row_number_alias: "RowNumber".to_string(),
            locking_hint: None,
            indent_width: 4,
        }
    }
}

impl SqlConfig {
    /// Load configuration from `SQLWEAVE_*` environment variables, falling
    /// back to the defaults for anything unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let locking_hint = match env::var("SQLWEAVE_LOCKING_HINT") {
            Ok(raw) if !raw.trim().is_empty() => Some(LockingHint::from_str(&raw)?),
            _ => defaults.locking_hint,
        };

        let indent_width = match env::var("SQLWEAVE_INDENT_WIDTH") {
            Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                field: "indent_width".to_string(),
                value: raw.clone(),
                expected: "a non-negative integer".to_string(),
            })?,
            Err(_) => defaults.indent_width,
        };

        let config = Self {
            default_schema: env_or("SQLWEAVE_DEFAULT_SCHEMA", defaults.default_schema),
            default_order_column: env_or(
                "SQLWEAVE_DEFAULT_ORDER_COLUMN",
                defaults.default_order_column,
            ),
            alias_prefix: env_or("SQLWEAVE_ALIAS_PREFIX", defaults.alias_prefix),
            row_number_alias: env_or("SQLWEAVE_ROW_NUMBER_ALIAS", defaults.row_number_alias),
            locking_hint,
            indent_width,
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let identifiers = [
            ("default_schema", &self.default_schema),
            ("default_order_column", &self.default_order_column),
            ("alias_prefix", &self.alias_prefix),
            ("row_number_alias", &self.row_number_alias),
        ];

        for (field, value) in identifiers {
            if value.trim().is_empty() {
                return Err(ConfigError::ValidationFailed {
                    field: field.to_string(),
                    reason: "must not be empty".to_string(),
                });
            }
            if value.contains(['[', ']']) {
                return Err(ConfigError::ValidationFailed {
                    field: field.to_string(),
                    reason: "must be a bare name without brackets".to_string(),
                });
            }
        }

        if self.indent_width > 16 {
            return Err(ConfigError::ValidationFailed {
                field: "indent_width".to_string(),
                reason: "must be at most 16".to_string(),
            });
        }

        Ok(())
    }
}

fn env_or(key: &str, default: String) -> String {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => value.trim().to_string(),
        _ => default,
    }
}
