//! Import types for single and bulk service import

use std::path::Path;

use serde::{Deserialize, Serialize};

// ==========================================================================
// Tests First (TDD)
// ==========================================================================


// ==========================================================================
// Validation
// ==========================================================================

/// A single field-level validation error produced by the server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
    #[serde(default)]
    pub code: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            code: code.into(),
        }
    }

    /// Synthetic error used when the server rejects input without
    /// supplying any field-level details
    pub fn general(message: impl Into<String>) -> Self {
        Self::new("General", message, "VALIDATION_ERROR")
    }
}

/// Result of the validate endpoint, normalized so that an invalid outcome
/// always carries at least one error
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationOutcome {
    pub is_valid: bool,
    #[serde(default)]
    pub errors: Vec<ValidationError>,
}

impl ValidationOutcome {
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
        }
    }

    pub fn invalid(errors: Vec<ValidationError>) -> Self {
        Self {
            is_valid: false,
            errors,
        }
    }
}

/// Group errors by field for display, preserving the order in which each
/// field first appears
pub fn group_by_field(errors: &[ValidationError]) -> Vec<(&str, Vec<&ValidationError>)> {
    let mut groups: Vec<(&str, Vec<&ValidationError>)> = Vec::new();
    for error in errors {
        match groups.iter_mut().find(|(field, _)| *field == error.field) {
            Some((_, items)) => items.push(error),
            None => groups.push((error.field.as_str(), vec![error])),
        }
    }
    groups
}

// ==========================================================================
// Import results
// ==========================================================================

/// Outcome of importing one service document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<ValidationError>>,
}

impl ImportResult {
    /// Failure-shaped result built from a 400 response
    pub fn failed(message: Option<String>, errors: Vec<ValidationError>) -> Self {
        Self {
            success: false,
            service_id: None,
            service_code: None,
            message,
            errors: if errors.is_empty() { None } else { Some(errors) },
        }
    }
}

/// Outcome of a bulk import; per-item results are in request order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkImportResult {
    pub total_count: usize,
    pub success_count: usize,
    pub fail_count: usize,
    #[serde(default)]
    pub results: Vec<ImportResult>,
}

impl BulkImportResult {
    /// `totalCount == successCount + failCount == results.len()`
    pub fn is_consistent(&self) -> bool {
        self.success_count.checked_add(self.fail_count) == Some(self.total_count)
            && self.total_count == self.results.len()
    }
}

/// Import endpoint liveness probe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub service: String,
    #[serde(default)]
    pub timestamp: String,
}

// ==========================================================================
// Selected file
// ==========================================================================

/// A file chosen for import, held in memory until the workflow parses it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportFile {
    pub name: String,
    pub media_type: Option<String>,
    pub contents: Vec<u8>,
}

impl ImportFile {
    pub fn new(name: impl Into<String>, media_type: Option<String>, contents: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            media_type,
            contents,
        }
    }

    /// Read a file from disk. The media type is inferred from the extension.
    pub async fn from_path(path: &Path) -> std::io::Result<Self> {
        let contents = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let media_type = path
            .extension()
            .filter(|ext| ext.eq_ignore_ascii_case("json"))
            .map(|_| "application/json".to_string());

        Ok(Self::new(name, media_type, contents))
    }

    pub fn is_json(&self) -> bool {
        let json_type = self
            .media_type
            .as_deref()
            .map_or(false, |t| t.eq_ignore_ascii_case("application/json"));
        let json_extension = Path::new(&self.name)
            .extension()
            .map_or(false, |ext| ext.eq_ignore_ascii_case("json"));
        json_type || json_extension
    }

    pub fn size_bytes(&self) -> usize {
        self.contents.len()
    }
}
