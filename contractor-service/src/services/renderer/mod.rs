//! Contract document generation.
//!
//! The renderer turns validated [`ContractFields`] into paragraphs (built-in
//! prose, or an operator template when one is configured) and writes them to
//! a new PDF or DOCX file under the output directory. Rendering is blocking
//! work; async callers run it under `spawn_blocking`.

mod docx;
pub mod numerals;
mod pdf;
pub mod prose;
pub mod template;

use crate::config::DocumentsConfig;
use crate::models::{ContractFields, DocumentFormat};
use chrono::{DateTime, Local};
use prose::Block;
use service_core::error::AppError;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("contract template not found at {0}")]
    TemplateMissing(PathBuf),

    #[error("invalid contract template: {0}")]
    Template(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PDF generation failed: {0}")]
    Pdf(String),

    #[error("DOCX generation failed: {0}")]
    Docx(String),
}

impl From<RenderError> for AppError {
    fn from(err: RenderError) -> Self {
        AppError::InternalError(anyhow::Error::new(err))
    }
}

/// A contract written to disk.
#[derive(Debug, Clone)]
pub struct GeneratedDocument {
    pub path: PathBuf,
    pub file_name: String,
    pub format: DocumentFormat,
}

pub struct ContractRenderer {
    output_dir: PathBuf,
    template_path: Option<PathBuf>,
}

impl ContractRenderer {
    /// Creates the output directory if it doesn't exist yet.
    pub fn new(config: &DocumentsConfig) -> Result<Self, RenderError> {
        let output_dir = PathBuf::from(&config.output_dir);
        std::fs::create_dir_all(&output_dir)?;

        Ok(Self {
            output_dir,
            template_path: config.template_path.as_ref().map(PathBuf::from),
        })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn render(
        &self,
        fields: &ContractFields,
        format: DocumentFormat,
    ) -> Result<GeneratedDocument, RenderError> {
        let blocks = self.compose(fields)?;
        let file_name = contract_file_name(&fields.contractor_name, Local::now(), format);
        let path = self.output_dir.join(&file_name);

        match format {
            DocumentFormat::Pdf => pdf::write(&path, &fields.contractor_name, &blocks)?,
            DocumentFormat::Docx => docx::write(&path, &blocks)?,
        }

        metrics::counter!("contracts_generated_total", "format" => format.extension()).increment(1);
        tracing::info!(file = %file_name, format = format.extension(), "Contract generated");
        Ok(GeneratedDocument {
            path,
            file_name,
            format,
        })
    }

    fn compose(&self, fields: &ContractFields) -> Result<Vec<Block>, RenderError> {
        let Some(template_path) = &self.template_path else {
            return Ok(prose::compose(fields));
        };

        // Read on every render so template edits apply without a restart.
        let text = std::fs::read_to_string(template_path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => RenderError::TemplateMissing(template_path.clone()),
            _ => RenderError::Io(e),
        })?;

        let mut values = fields.values().clone();
        values.insert(
            "content_count_text".to_string(),
            numerals::content_count_text(fields.number_of_content.as_deref()),
        );

        let filled = template::fill_placeholders(&text, &values)?;
        Ok(prose::blocks_from_text(&filled))
    }
}

/// `contract_<name>_<YYYYMMDD_HHMMSS>.<ext>`, with spaces and path separators
/// in the name replaced by underscores.
pub fn contract_file_name(
    contractor_name: &str,
    timestamp: DateTime<Local>,
    format: DocumentFormat,
) -> String {
    let name: String = contractor_name
        .trim()
        .chars()
        .map(|c| match c {
            ' ' | '/' | '\\' => '_',
            other => other,
        })
        .collect();

    format!(
        "contract_{}_{}.{}",
        name,
        timestamp.format("%Y%m%d_%H%M%S"),
        format.extension()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn fields() -> ContractFields {
        let record = json!({
            "contractor_name": "Jane Q Doe",
            "signer_name": "",
            "relationship_to_vendor": "",
            "address": "1 Main St",
            "email": "jane@example.com",
            "vendor_account": "Needed",
            "service": "Video Promotion",
            "amount": 15000,
            "due_date": "October 30, 2025",
            "end_date": "November 30, 2025",
            "number_of_content": "3"
        });
        ContractFields::from_record(record.as_object().unwrap()).unwrap()
    }

    fn renderer(dir: &Path, template_path: Option<&Path>) -> ContractRenderer {
        ContractRenderer::new(&DocumentsConfig {
            output_dir: dir.join("out").to_string_lossy().into_owned(),
            template_path: template_path.map(|p| p.to_string_lossy().into_owned()),
        })
        .unwrap()
    }

    #[test]
    fn file_name_replaces_spaces_and_separators() {
        let ts = Local.with_ymd_and_hms(2025, 10, 30, 14, 5, 9).unwrap();
        assert_eq!(
            contract_file_name("Jane Q Doe", ts, DocumentFormat::Pdf),
            "contract_Jane_Q_Doe_20251030_140509.pdf"
        );
        assert_eq!(
            contract_file_name("../etc/x", ts, DocumentFormat::Docx),
            "contract_.._etc_x_20251030_140509.docx"
        );
    }

    #[test]
    fn renders_pdf_into_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = renderer(dir.path(), None);

        let doc = renderer.render(&fields(), DocumentFormat::Pdf).unwrap();

        assert!(doc.file_name.starts_with("contract_Jane_Q_Doe_"));
        assert!(doc.file_name.ends_with(".pdf"));
        assert_eq!(doc.path.parent().unwrap(), renderer.output_dir());
        let bytes = std::fs::read(&doc.path).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn renders_docx_as_zip_package() {
        let dir = tempfile::tempdir().unwrap();
        let doc = renderer(dir.path(), None)
            .render(&fields(), DocumentFormat::Docx)
            .unwrap();

        let bytes = std::fs::read(&doc.path).unwrap();
        assert!(bytes.starts_with(b"PK"));
    }

    #[test]
    fn template_placeholders_are_filled() {
        let dir = tempfile::tempdir().unwrap();
        let template = dir.path().join("contract.txt");
        std::fs::write(
            &template,
            "Vendor: {contractor_name}\n\nVideos: {content_count_text}\nFee: ${amount}\n",
        )
        .unwrap();

        let blocks = renderer(dir.path(), Some(&template))
            .compose(&fields())
            .unwrap();
        let texts: Vec<_> = blocks.iter().map(|b| b.text.as_str()).collect();
        assert_eq!(
            texts,
            vec![
                "Vendor: Jane Q Doe",
                "Videos: one (1) / two (2) / three (3)",
                "Fee: $15000"
            ]
        );
    }

    #[test]
    fn missing_template_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.txt");

        let err = renderer(dir.path(), Some(&missing))
            .render(&fields(), DocumentFormat::Pdf)
            .unwrap_err();
        assert!(matches!(err, RenderError::TemplateMissing(p) if p == missing));
    }
}
