use crate::services::balance::parse_amount;
use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

/// Invoice submission as posted by the payments form.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct InvoicePayload {
    #[validate(length(min = 1, message = "paymentName must not be empty"))]
    pub payment_name: String,
    pub invoice_date: String,
    #[serde(default)]
    pub description: String,
    /// Accepts `250`, `250.5` or `"$250.50"`.
    #[serde(deserialize_with = "deserialize_amount")]
    #[validate(range(min = 0.0, message = "totalPayment must not be negative"))]
    pub total_payment: f64,
    #[validate(length(min = 1, message = "purchaseOrder must not be empty"))]
    pub purchase_order: String,
    #[validate(length(min = 1, message = "email must not be empty"))]
    pub email: String,
    #[serde(default)]
    pub invoice_pdf_url: Option<String>,
}

impl InvoicePayload {
    /// The attachment URL, with blank strings treated as absent.
    pub fn pdf_url(&self) -> Option<&str> {
        self.invoice_pdf_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}

fn deserialize_amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Amount {
        Number(f64),
        Text(String),
    }

    match Amount::deserialize(deserializer)? {
        Amount::Number(n) => Ok(n),
        Amount::Text(s) => parse_amount(&s)
            .filter(|n| n.is_finite())
            .ok_or_else(|| serde::de::Error::custom(format!("invalid totalPayment '{}'", s))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(total: serde_json::Value) -> serde_json::Value {
        json!({
            "paymentName": "October deliverables",
            "invoiceDate": "2025-10-30",
            "description": "Two videos",
            "totalPayment": total,
            "purchaseOrder": "PO-1001",
            "email": "jane@example.com",
            "invoicePdfUrl": "  "
        })
    }

    #[test]
    fn accepts_numeric_and_string_amounts() {
        let numeric: InvoicePayload = serde_json::from_value(payload(json!(250))).unwrap();
        assert_eq!(numeric.total_payment, 250.0);

        let text: InvoicePayload = serde_json::from_value(payload(json!("$1,250.50"))).unwrap();
        assert_eq!(text.total_payment, 1250.5);
    }

    #[test]
    fn rejects_non_numeric_amount() {
        assert!(serde_json::from_value::<InvoicePayload>(payload(json!("lots"))).is_err());
    }

    #[test]
    fn negative_amount_fails_validation() {
        let p: InvoicePayload = serde_json::from_value(payload(json!(-5))).unwrap();
        assert!(p.validate().is_err());
    }

    #[test]
    fn blank_pdf_url_is_absent() {
        let p: InvoicePayload = serde_json::from_value(payload(json!(1))).unwrap();
        assert_eq!(p.pdf_url(), None);
        assert!(p.validate().is_ok());
    }
}
