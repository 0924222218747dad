//! ORDER BY terms

use std::fmt;

use super::identifier::FieldRef;

/// Order by direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderDirection {
    Asc,
    Desc,
}

impl fmt::Display for OrderDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderDirection::Asc => write!(f, "ASC"),
            OrderDirection::Desc => write!(f, "DESC"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub field: FieldRef,
    pub direction: OrderDirection,
}

impl OrderBy {
    pub fn new(field: FieldRef, direction: OrderDirection) -> Self {
        Self { field, direction }
    }

    pub fn asc(field: &str) -> Self {
        Self::new(FieldRef::parse(field), OrderDirection::Asc)
    }

    pub fn desc(field: &str) -> Self {
        Self::new(FieldRef::parse(field), OrderDirection::Desc)
    }

    /// Ascending is the SQL default and is not spelled out
    pub fn to_sql(&self) -> String {
        match self.direction {
            OrderDirection::Asc => self.field.to_sql(),
            OrderDirection::Desc => format!("{} {}", self.field.to_sql(), self.direction),
        }
    }
}
