//! SQL syntax tree
//!
//! Nodes render themselves bottom-up. No node ever substitutes a bound value;
//! the emitted text only contains placeholders.

pub mod column;
pub mod identifier;
pub mod join;
pub mod ordering;
pub mod predicate;
pub mod select;
pub mod source;

pub use column::{Column, Projection, RowNumberColumn};
pub use identifier::{quote_identifier, schema_object, unquote_identifier, FieldRef};
pub use join::{Join, JoinClause, JoinKind};
pub use ordering::{OrderBy, OrderDirection};
pub use predicate::{QueryOperator, WhereClause};
pub use select::Select;
pub use source::{
    AliasedSelectSource, LockingHint, SelectSource, SubquerySource, TableSource, UnionSource,
};
