//! `LIKE` pattern values
//!
//! Wildcard metacharacters in user data are bracket-escaped before the
//! surrounding `%` wrapper is applied, so the data is matched literally.

/// Escape `%`, `_` and `[` as `[%]`, `[_]` and `[[]`
pub fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len() + 8);
    for c in value.chars() {
        match c {
            '%' => escaped.push_str("[%]"),
            '_' => escaped.push_str("[_]"),
            '[' => escaped.push_str("[[]"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// `%value%`
pub fn contains_pattern(value: &str) -> String {
    format!("%{}%", escape_like(value))
}

/// `value%`
pub fn starts_with_pattern(value: &str) -> String {
    format!("{}%", escape_like(value))
}

/// `%value`
pub fn ends_with_pattern(value: &str) -> String {
    format!("%{}", escape_like(value))
}

/// Pipe-delimited alternatives: `A,B,C` with `,` becomes `%|A|B|C|%`
pub fn piped_pattern(alternatives: &str, delimiter: char) -> String {
    let joined = alternatives
        .split(delimiter)
        .map(|alternative| escape_like(alternative.trim()))
        .collect::<Vec<_>>()
        .join("|");
    format!("%|{}|%", joined)
}
