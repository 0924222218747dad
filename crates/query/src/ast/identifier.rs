//! Bracket quoting for T-SQL identifiers and column references

use std::fmt;

/// Wrap an identifier in brackets. Already-bracketed identifiers are kept;
/// a closing bracket inside the name is doubled.
pub fn quote_identifier(identifier: &str) -> String {
    let trimmed = identifier.trim();
    if trimmed.len() >= 2 && trimmed.starts_with('[') && trimmed.ends_with(']') {
        return trimmed.to_string();
    }
    format!("[{}]", trimmed.replace(']', "]]"))
}

/// Strip surrounding brackets or double quotes
pub fn unquote_identifier(identifier: &str) -> String {
    let trimmed = identifier.trim();
    if trimmed.len() >= 2
        && ((trimmed.starts_with('[') && trimmed.ends_with(']'))
            || (trimmed.starts_with('"') && trimmed.ends_with('"')))
    {
        return trimmed[1..trimmed.len() - 1].replace("]]", "]");
    }
    trimmed.to_string()
}

/// Split `a.b` / `[a].[b]` on dots that are not inside brackets
fn split_parts(reference: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut in_brackets = false;

    for c in reference.trim().chars() {
        match c {
            '[' => {
                in_brackets = true;
                current.push(c);
            }
            ']' => {
                in_brackets = false;
                current.push(c);
            }
            '.' if !in_brackets => parts.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    parts.push(current);
    parts
}

/// A column reference, optionally qualified by a source alias
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldRef {
    pub qualifier: Option<String>,
    pub name: String,
}

impl FieldRef {
    /// Parse `Name`, `alias.Name` or `[alias].[Name]`
    pub fn parse(reference: &str) -> Self {
        let mut parts = split_parts(reference);
        let name = unquote_identifier(&parts.pop().unwrap_or_default());
        let qualifier = if parts.is_empty() {
            None
        } else {
            Some(
                parts
                    .iter()
                    .map(|p| unquote_identifier(p))
                    .collect::<Vec<_>>()
                    .join("."),
            )
        };
        Self { qualifier, name }
    }

    pub fn bare(name: &str) -> Self {
        Self {
            qualifier: None,
            name: unquote_identifier(name),
        }
    }

    pub fn qualified(qualifier: &str, name: &str) -> Self {
        Self {
            qualifier: Some(unquote_identifier(qualifier)),
            name: unquote_identifier(name),
        }
    }

    pub fn is_qualified(&self) -> bool {
        self.qualifier.is_some()
    }

    /// Qualify with `alias` unless already qualified
    pub fn qualify_with(&self, alias: &str) -> Self {
        match self.qualifier {
            Some(_) => self.clone(),
            None => Self::qualified(alias, &self.name),
        }
    }

    pub fn to_sql(&self) -> String {
        let name = if self.name == "*" {
            "*".to_string()
        } else {
            quote_identifier(&self.name)
        };
        match &self.qualifier {
            Some(qualifier) => format!("{}.{}", quote_identifier(qualifier), name),
            None => name,
        }
    }
}

impl fmt::Display for FieldRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sql())
    }
}

/// Render `schema.[name]`; the schema is emitted bare unless it needs quoting
pub fn schema_object(schema: &str, name: &str) -> String {
    let schema = unquote_identifier(schema);
    let schema = if schema.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        schema
    } else {
        quote_identifier(&schema)
    };
    format!("{}.{}", schema, quote_identifier(name))
}

/// Indent every line of `text` by `width` spaces
pub(crate) fn indent(text: &str, width: usize) -> String {
    let pad = " ".repeat(width);
    text.lines()
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("{}{}", pad, line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_identifier() {
        assert_eq!(quote_identifier("Price"), "[Price]");
        assert_eq!(quote_identifier("[Price]"), "[Price]");
        assert_eq!(quote_identifier("odd]name"), "[odd]]name]");
    }

    #[test]
    fn test_parse_field_references() {
        assert_eq!(FieldRef::parse("Price"), FieldRef::bare("Price"));
        assert_eq!(FieldRef::parse("o.Price"), FieldRef::qualified("o", "Price"));
        assert_eq!(FieldRef::parse("[o].[Unit.Price]").to_sql(), "[o].[Unit.Price]");
        assert_eq!(FieldRef::parse("o.*").to_sql(), "[o].*");
    }

    #[test]
    fn test_qualify_keeps_explicit_qualifier() {
        let field = FieldRef::parse("c.Name");
        assert_eq!(field.qualify_with("o").to_sql(), "[c].[Name]");
        assert_eq!(FieldRef::bare("Name").qualify_with("o").to_sql(), "[o].[Name]");
    }

    #[test]
    fn test_schema_object() {
        assert_eq!(schema_object("dbo", "Orders"), "dbo.[Orders]");
        assert_eq!(schema_object("[sales]", "[Orders]"), "sales.[Orders]");
        assert_eq!(schema_object("my schema", "T"), "[my schema].[T]");
    }

    #[test]
    fn test_indent_skips_blank_lines() {
        assert_eq!(indent("a\n\nb", 2), "  a\n\n  b");
    }
}
