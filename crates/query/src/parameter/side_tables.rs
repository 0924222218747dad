//! Side tables carried alongside a select
//!
//! Declared parameters, parameter defaults and bound values are keyed by the
//! final (uniquified) parameter name. Merging validates the incoming operand
//! completely before anything is copied, so a failed merge leaves the target
//! untouched.

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::trace;

use super::UniqueParameter;
use crate::error::{QueryError, QueryResult};

/// Declared placeholders in declaration order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parameters {
    entries: Vec<UniqueParameter>,
}

impl Parameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a parameter, replacing an earlier declaration of the same name
    pub fn declare(&mut self, parameter: UniqueParameter) {
        match self.entries.iter_mut().find(|p| p.name() == parameter.name()) {
            Some(existing) => *existing = parameter,
            None => self.entries.push(parameter),
        }
    }

    pub fn get(&self, name: &str) -> Option<&UniqueParameter> {
        self.entries.iter().find(|p| p.name() == name)
    }

    pub(crate) fn get_mut(&mut self, name: &str) -> Option<&mut UniqueParameter> {
        self.entries.iter_mut().find(|p| p.name() == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Parameters declared under the caller-facing `original` name
    pub fn by_original<'a>(
        &'a self,
        original: &'a str,
    ) -> impl Iterator<Item = &'a UniqueParameter> + 'a {
        self.entries
            .iter()
            .filter(move |p| p.original_name() == original)
    }

    pub fn iter(&self) -> impl Iterator<Item = &UniqueParameter> {
        self.entries.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|p| p.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

macro_rules! value_table {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq)]
        pub struct $name {
            values: BTreeMap<String, Value>,
        }

        impl $name {
            pub fn new() -> Self {
                Self::default()
            }

            pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
                self.values.insert(name.into(), value.into());
            }

            pub fn get(&self, name: &str) -> Option<&Value> {
                self.values.get(name)
            }

            pub fn remove(&mut self, name: &str) -> Option<Value> {
                self.values.remove(name)
            }

            pub fn contains(&self, name: &str) -> bool {
                self.values.contains_key(name)
            }

            pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
                self.values.iter()
            }

            pub fn keys(&self) -> impl Iterator<Item = &String> {
                self.values.keys()
            }

            pub fn len(&self) -> usize {
                self.values.len()
            }

            pub fn is_empty(&self) -> bool {
                self.values.is_empty()
            }

            pub fn as_map(&self) -> &BTreeMap<String, Value> {
                &self.values
            }
        }
    };
}

value_table!(
    /// Placeholder name to default value, for generated routine signatures
    ParameterDefaults
);

value_table!(
    /// Placeholder name to bound value, handed to the executor
    CommandParameterValues
);

/// The three side tables of one builder
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SideTables {
    pub parameters: Parameters,
    pub defaults: ParameterDefaults,
    pub values: CommandParameterValues,
}

impl SideTables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a generated parameter together with its bound value
    pub fn bind(&mut self, parameter: UniqueParameter, value: Value) {
        self.values.insert(parameter.name(), value);
        self.parameters.declare(parameter);
    }

    /// Bound values for every parameter declared under `original`, in
    /// declaration order
    pub fn values_for(&self, original: &str) -> Vec<&Value> {
        self.parameters
            .by_original(original)
            .filter_map(|p| self.values.get(p.name()))
            .collect()
    }

    /// Bound value of the first parameter declared under `original`
    pub fn value_for(&self, original: &str) -> Option<&Value> {
        self.values_for(original).into_iter().next()
    }

    /// Check that every default and value belongs to a declared parameter and
    /// that every declared parameter has a bound value.
    pub fn validate(&self, operation: &str) -> QueryResult<()> {
        let parameters = self.parameters.len();
        let defaults = self.defaults.len();
        let values = self.values.len();

        if defaults > parameters || values != parameters {
            return Err(QueryError::mismatch(operation, parameters, defaults, values));
        }

        let undeclared = self
            .defaults
            .keys()
            .chain(self.values.keys())
            .find(|name| !self.parameters.contains(name));
        if let Some(name) = undeclared {
            return Err(QueryError::UndeclaredParameter {
                operation: operation.to_string(),
                name: name.clone(),
            });
        }

        Ok(())
    }

    /// Merge `other` into `self`. Nothing is copied unless `other` is
    /// consistent and each of its names is either new here or already bound
    /// to the same parameter, value and default.
    pub fn merge(&mut self, other: &SideTables, operation: &str) -> QueryResult<()> {
        other.validate(operation)?;

        if let Some(duplicate) = other
            .parameters
            .iter()
            .find(|p| self.parameters.contains(p.name()) && !self.shares_binding(other, p))
        {
            return Err(QueryError::DuplicateParameter {
                operation: operation.to_string(),
                name: duplicate.name().to_string(),
            });
        }

        trace!(
            operation,
            parameters = other.parameters.len(),
            "merging side tables"
        );

        for parameter in other.parameters.iter() {
            self.parameters.declare(parameter.clone());
        }
        for (name, value) in other.defaults.iter() {
            self.defaults.insert(name.clone(), value.clone());
        }
        for (name, value) in other.values.iter() {
            self.values.insert(name.clone(), value.clone());
        }

        Ok(())
    }

    /// Whether `parameter` of `other` is declared here with the same value
    /// and default, as happens when both operands are clones of one query.
    fn shares_binding(&self, other: &SideTables, parameter: &UniqueParameter) -> bool {
        let name = parameter.name();
        self.parameters.get(name) == Some(parameter)
            && self.values.get(name) == other.values.get(name)
            && self.defaults.get(name) == other.defaults.get(name)
    }
}
