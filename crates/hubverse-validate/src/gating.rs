//! Deciding which invalid documents are still written.

use std::fmt;
use std::str::FromStr;

use crate::DocumentValidation;

/// What the caller does with documents that fail validation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InvalidDocumentPolicy {
    /// Warn and write the document anyway.
    #[default]
    Save,
    /// Leave the document out of the written output.
    Skip,
}

impl InvalidDocumentPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Save => "save",
            Self::Skip => "skip",
        }
    }
}

impl fmt::Display for InvalidDocumentPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InvalidDocumentPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "save" => Ok(Self::Save),
            "skip" => Ok(Self::Skip),
            other => Err(format!("unknown invalid-document policy '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GatingDecision {
    /// File names that must not be written.
    pub blocked_files: Vec<String>,
}

impl GatingDecision {
    pub fn is_blocked(&self, file_name: &str) -> bool {
        self.blocked_files.iter().any(|blocked| blocked == file_name)
    }
}

pub fn gate_documents(
    policy: InvalidDocumentPolicy,
    results: &[DocumentValidation],
) -> GatingDecision {
    if policy == InvalidDocumentPolicy::Save {
        return GatingDecision::default();
    }
    GatingDecision {
        blocked_files: results
            .iter()
            .filter(|result| !result.is_valid())
            .map(|result| result.file_name.clone())
            .collect(),
    }
}
