//! Purchase-order balance arithmetic.

use serde_json::Value;

/// Remaining balance after a payment, floored at zero.
///
/// A negative payment is treated as zero so the workflow can only ever
/// decrement a balance.
pub fn adjust_balance(current: f64, payment: f64) -> f64 {
    (current - payment.max(0.0)).max(0.0)
}

/// Reads a balance cell. Numbers are taken as-is, strings like `"$3,000.00"`
/// are parsed after stripping `$` and `,`; anything else counts as zero.
pub fn parse_balance(value: Option<&Value>) -> f64 {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => parse_amount(s),
        // Lookup fields come back as single-element lists.
        Some(Value::Array(items)) if items.len() == 1 => return parse_balance(items.first()),
        _ => None,
    };

    parsed.filter(|v| v.is_finite()).unwrap_or(0.0)
}

/// `"$3,000.00"` -> `3000.0`.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| *c != '$' && *c != ',')
        .collect();
    cleaned.trim().parse::<f64>().ok()
}
