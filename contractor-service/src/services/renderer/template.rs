//! `{field}` placeholder substitution for operator-supplied text templates.

use super::RenderError;
use std::collections::BTreeMap;

/// Replaces each `{name}` with `values[name]`. `{{` and `}}` produce literal
/// braces. Unknown names and unbalanced braces are errors.
pub fn fill_placeholders(
    template: &str,
    values: &BTreeMap<String, String>,
) -> Result<String, RenderError> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            '{' => {
                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some(ch) => name.push(ch),
                        None => {
                            return Err(RenderError::Template(format!(
                                "unclosed placeholder '{{{}'",
                                name
                            )))
                        }
                    }
                }
                let value = values
                    .get(name.trim())
                    .ok_or_else(|| RenderError::Template(format!("unknown placeholder '{}'", name)))?;
                out.push_str(value);
            }
            '}' => {
                return Err(RenderError::Template(
                    "single '}' encountered in template".to_string(),
                ))
            }
            other => out.push(other),
        }
    }

    Ok(out)
}
