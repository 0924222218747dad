//! Identifier generation for one composition graph
//!
//! A [`QueryContext`] owns two monotonically increasing counters, one for
//! source aliases and one for parameter names. Cloning the context (and every
//! builder created from it) shares the counters, so names handed out anywhere
//! in the graph never collide once operands are joined or unioned together.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::ast::{LockingHint, TableSource};
use crate::config::SqlConfig;
use crate::error::QueryResult;
use crate::query::QueryBuilder;
use crate::select_builder::SelectBuilder;

/// Shared alias and parameter-name counters
#[derive(Debug, Clone, Default)]
pub struct NameGenerator {
    aliases: Arc<AtomicU64>,
    parameters: Arc<AtomicU64>,
}

impl NameGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next generated alias, `<prefix><n>` with `n` starting at 1
    pub fn next_alias(&self, prefix: &str) -> String {
        let n = self.aliases.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{}{}", prefix, n)
    }

    /// Next de-duplicated parameter name, `<base>_<n>` with `n` starting at 0
    pub fn next_parameter_name(&self, base: &str) -> String {
        let n = self.parameters.fetch_add(1, Ordering::Relaxed);
        format!("{}_{}", base, n)
    }

    /// Whether both generators hand out names from the same counters
    pub fn same_graph(&self, other: &NameGenerator) -> bool {
        Arc::ptr_eq(&self.aliases, &other.aliases)
            && Arc::ptr_eq(&self.parameters, &other.parameters)
    }
}

/// Generators and configuration threaded through every builder of one
/// composition graph
#[derive(Debug, Clone, Default)]
pub struct QueryContext {
    generator: NameGenerator,
    config: Arc<SqlConfig>,
}

impl QueryContext {
    /// Create a context with the default SQL Server configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context with a custom configuration
    pub fn with_config(config: SqlConfig) -> Self {
        Self {
            generator: NameGenerator::new(),
            config: Arc::new(config),
        }
    }

    /// Create a context configured from `SQLWEAVE_*` environment variables
    pub fn from_env() -> QueryResult<Self> {
        Ok(Self::with_config(SqlConfig::from_env()?))
    }

    pub fn generator(&self) -> &NameGenerator {
        &self.generator
    }

    pub fn config(&self) -> &SqlConfig {
        &self.config
    }

    /// Whether two contexts belong to the same composition graph
    pub fn shares_generator_with(&self, other: &QueryContext) -> bool {
        self.generator.same_graph(&other.generator)
    }

    pub(crate) fn next_alias(&self) -> String {
        self.generator.next_alias(&self.config.alias_prefix)
    }

    /// Start a query over `table` in the default schema
    pub fn table<M>(&self, table: &str) -> QueryBuilder<M> {
        let schema = self.config.default_schema.clone();
        self.table_in(&schema, table)
    }

    /// Start a query over `schema.table`
    pub fn table_in<M>(&self, schema: &str, table: &str) -> QueryBuilder<M> {
        let source = TableSource::new(schema, table).with_optional_hint(self.config.locking_hint);
        self.query_over(source)
    }

    /// Start a query over `table` referenced through an explicit alias
    pub fn table_as<M>(&self, table: &str, alias: &str) -> QueryBuilder<M> {
        let source = TableSource::new(&self.config.default_schema, table)
            .with_alias(alias)
            .with_optional_hint(self.config.locking_hint);
        self.query_over(source)
    }

    /// Start a query over `table` with an explicit locking hint
    pub fn table_with_hint<M>(&self, table: &str, hint: LockingHint) -> QueryBuilder<M> {
        let source = TableSource::new(&self.config.default_schema, table).with_hint(hint);
        self.query_over(source)
    }

    fn query_over<M>(&self, source: TableSource) -> QueryBuilder<M> {
        QueryBuilder::from_select(SelectBuilder::new(self.clone(), source.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aliases_start_at_one_and_never_repeat() {
        let generator = NameGenerator::new();
        assert_eq!(generator.next_alias("ALIAS_GENERATED_"), "ALIAS_GENERATED_1");
        assert_eq!(generator.next_alias("ALIAS_GENERATED_"), "ALIAS_GENERATED_2");
    }

    #[test]
    fn test_parameter_counter_is_shared_across_base_names() {
        let generator = NameGenerator::new();
        assert_eq!(generator.next_parameter_name("name"), "name_0");
        assert_eq!(generator.next_parameter_name("name"), "name_1");
        assert_eq!(generator.next_parameter_name("price"), "price_2");
    }

    #[test]
    fn test_clones_share_counters() {
        let context = QueryContext::new();
        let clone = context.clone();
        assert_eq!(context.next_alias(), "ALIAS_GENERATED_1");
        assert_eq!(clone.next_alias(), "ALIAS_GENERATED_2");
        assert!(context.shares_generator_with(&clone));
        assert!(!context.shares_generator_with(&QueryContext::new()));
    }
}
