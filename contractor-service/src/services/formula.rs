//! Filter formulas for record-store queries.
//!
//! Lookup values (emails, purchase order ids) arrive straight from request
//! bodies, so a formula is only ever built from a field name and a literal,
//! both escaped before they reach the expression string.

/// An equality predicate `{field} = 'literal'`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Formula {
    field: String,
    value: String,
}

impl Formula {
    pub fn field_equals(field: &str, value: &str) -> Self {
        Self {
            field: field.to_string(),
            value: value.to_string(),
        }
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Expression text as sent in `filterByFormula`.
    pub fn expression(&self) -> String {
        format!("{}={}", field_reference(&self.field), quote_literal(&self.value))
    }
}

impl std::fmt::Display for Formula {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.expression())
    }
}

/// `{name}` with any closing brace escaped.
fn field_reference(name: &str) -> String {
    format!("{{{}}}", name.replace('}', "\\}"))
}

/// Single-quoted string literal; backslashes go first so the quote escapes
/// added afterwards are not doubled.
pub fn quote_literal(value: &str) -> String {
    let escaped = value
        .replace('\\', "\\\\")
        .replace('\'', "\\'")
        .replace('\n', "\\n")
        .replace('\r', "\\r");
    format!("'{}'", escaped)
}
