//! Validation of built location documents.
//!
//! Validation only reports; whether an invalid document is still written is
//! decided by the caller through [`gate_documents`].

mod gating;
mod schema;

pub use gating::{GatingDecision, InvalidDocumentPolicy, gate_documents};
pub use schema::{SchemaViolation, validate_document};

use serde::Serialize;
use tracing::warn;

use hubverse_core::BuildOutput;

/// Validation outcome for one location document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentValidation {
    pub file_name: String,
    pub violation: Option<SchemaViolation>,
}

impl DocumentValidation {
    pub fn is_valid(&self) -> bool {
        self.violation.is_none()
    }
}

/// Validate every location document of a build; `metadata.json` is not checked.
pub fn validate_build(output: &BuildOutput) -> Vec<DocumentValidation> {
    output
        .documents
        .iter()
        .map(|(file_name, document)| {
            let violation = match serde_json::to_value(document) {
                Ok(value) => validate_document(&value).err(),
                Err(error) => Some(SchemaViolation {
                    path: String::new(),
                    message: format!("document could not be serialized: {error}"),
                }),
            };
            if let Some(violation) = &violation {
                warn!(
                    %file_name,
                    path = %violation.path,
                    message = %violation.message,
                    "document failed validation"
                );
            }
            DocumentValidation {
                file_name: file_name.clone(),
                violation,
            }
        })
        .collect()
}

pub fn invalid_count(results: &[DocumentValidation]) -> usize {
    results.iter().filter(|result| !result.is_valid()).count()
}
