use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Keys a contract record must carry before it can be rendered.
pub const REQUIRED_FIELDS: [&str; 10] = [
    "contractor_name",
    "signer_name",
    "relationship_to_vendor",
    "address",
    "email",
    "vendor_account",
    "service",
    "amount",
    "due_date",
    "end_date",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContractVariant {
    Regular,
    Campfire,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    #[default]
    Pdf,
    Docx,
}

impl DocumentFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "pdf",
            DocumentFormat::Docx => "docx",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "application/pdf",
            DocumentFormat::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Some(DocumentFormat::Pdf),
            "docx" => Some(DocumentFormat::Docx),
            _ => None,
        }
    }
}

/// Validated contract input.
///
/// Values are kept as text; numbers in the request (`"amount": 15000`) are
/// rendered the way they were sent. Present-but-empty values are accepted,
/// only absent or `null` keys count as missing.
#[derive(Debug, Clone)]
pub struct ContractFields {
    pub contractor_name: String,
    pub signer_name: String,
    pub relationship_to_vendor: String,
    pub address: String,
    pub email: String,
    pub vendor_account: String,
    pub service: String,
    pub amount: String,
    pub due_date: String,
    pub end_date: String,
    pub number_of_content: Option<String>,
    pub contract_type: Option<String>,
    pub po: Option<String>,
    values: BTreeMap<String, String>,
}

impl ContractFields {
    /// Builds the fields from a request record, or returns the missing
    /// required keys in declaration order.
    pub fn from_record(record: &Map<String, Value>) -> Result<Self, Vec<String>> {
        let values: BTreeMap<String, String> = record
            .iter()
            .filter_map(|(k, v)| value_text(v).map(|text| (k.clone(), text)))
            .collect();

        let missing: Vec<String> = REQUIRED_FIELDS
            .iter()
            .filter(|key| !values.contains_key(**key))
            .map(|key| key.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(missing);
        }

        let required = |key: &str| values.get(key).cloned().unwrap_or_default();
        let optional = |key: &str| values.get(key).filter(|v| !v.trim().is_empty()).cloned();

        Ok(Self {
            contractor_name: required("contractor_name"),
            signer_name: required("signer_name"),
            relationship_to_vendor: required("relationship_to_vendor"),
            address: required("address"),
            email: required("email"),
            vendor_account: required("vendor_account"),
            service: required("service"),
            amount: required("amount"),
            due_date: required("due_date"),
            end_date: required("end_date"),
            number_of_content: optional("number_of_content"),
            contract_type: optional("contract_type"),
            po: optional("po"),
            values,
        })
    }

    pub fn variant(&self) -> ContractVariant {
        match self.contract_type.as_deref() {
            Some(t) if t.trim().eq_ignore_ascii_case("campfire") => ContractVariant::Campfire,
            _ => ContractVariant::Regular,
        }
    }

    /// Every textual value of the record, keyed as sent.
    pub fn values(&self) -> &BTreeMap<String, String> {
        &self.values
    }
}

fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}
