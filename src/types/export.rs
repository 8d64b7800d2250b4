//! Export job types for PDF / Markdown catalogue exports

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================================================
// Tests First (TDD)
// ==========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_status_accepts_capitalized_names() {
        let status: ExportStatus = serde_json::from_str(r#""Processing""#).unwrap();
        assert_eq!(status, ExportStatus::Processing);

        let status: ExportStatus = serde_json::from_str(r#""completed""#).unwrap();
        assert_eq!(status, ExportStatus::Completed);
    }

    #[test]
    fn test_export_status_terminal_states() {
        assert!(ExportStatus::Completed.is_terminal());
        assert!(ExportStatus::Failed.is_terminal());
        assert!(ExportStatus::Cancelled.is_terminal());
        assert!(!ExportStatus::Pending.is_terminal());
        assert!(!ExportStatus::Processing.is_terminal());
        assert!(!ExportStatus::Idle.is_terminal());
    }

    #[test]
    fn test_export_request_serializes_to_camel_case() {
        let request = ExportRequest {
            service_ids: vec![1, 2],
            format: ExportFormat::Pdf,
            options: Some(ExportOptions {
                include_usage_scenarios: Some(true),
                ..Default::default()
            }),
        };
        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("serviceIds"));
        assert!(json.contains(r#""format":"pdf""#));
        assert!(json.contains("includeUsageScenarios"));
        assert!(!json.contains("includeTeam"));
    }

    #[test]
    fn test_status_response_deserializes_minimal_poll() {
        let json = r#"{"status":"Processing","progress":40}"#;
        let response: ExportStatusResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.status, ExportStatus::Processing);
        assert_eq!(response.progress, 40);
        assert!(response.operation_id.is_none());
        assert!(response.download_url.is_none());
    }

    #[test]
    fn test_format_path_segment() {
        assert_eq!(ExportFormat::Pdf.as_str(), "pdf");
        assert_eq!(ExportFormat::Markdown.as_str(), "markdown");
    }
}

// ==========================================================================
// Export requests
// ==========================================================================

/// Output format of an export job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Pdf,
    Markdown,
}

impl ExportFormat {
    /// Path segment used by the export endpoints
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Markdown => "markdown",
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// Sections to include in the exported document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_usage_scenarios: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_dependencies: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_scope: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_timeline: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_team: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_effort: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_licenses: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,
}

/// Request to start an export job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRequest {
    pub service_ids: Vec<i64>,
    pub format: ExportFormat,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<ExportOptions>,
}

// ==========================================================================
// Export job status
// ==========================================================================

/// Lifecycle of an export job: Pending -> Processing -> {Completed | Failed | Cancelled}
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportStatus {
    #[serde(alias = "Idle")]
    Idle,
    #[serde(alias = "Pending", alias = "Queued", alias = "queued")]
    Pending,
    #[serde(alias = "Processing")]
    Processing,
    #[serde(alias = "Completed")]
    Completed,
    #[serde(alias = "Failed")]
    Failed,
    #[serde(alias = "Cancelled")]
    Cancelled,
}

impl ExportStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ExportStatus::Completed | ExportStatus::Failed | ExportStatus::Cancelled
        )
    }

    /// Whether a cancel request can still move the job to Cancelled
    pub fn is_cancellable(&self) -> bool {
        matches!(self, ExportStatus::Pending | ExportStatus::Processing)
    }
}

impl std::fmt::Display for ExportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ExportStatus::Idle => "idle",
            ExportStatus::Pending => "pending",
            ExportStatus::Processing => "processing",
            ExportStatus::Completed => "completed",
            ExportStatus::Failed => "failed",
            ExportStatus::Cancelled => "cancelled",
        };
        f.pad(name)
    }
}

/// Response to starting an export
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportOperationResponse {
    pub operation_id: String,
    pub status: ExportStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_completion_time: Option<DateTime<Utc>>,
}

/// Response of one status poll. The latest poll is authoritative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportStatusResponse {
    #[serde(default)]
    pub operation_id: Option<String>,
    pub status: ExportStatus,
    #[serde(default)]
    pub progress: u32,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub download_url: Option<String>,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub file_size: Option<u64>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Client-side view of the export job being tracked
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportOperation {
    pub operation_id: String,
    pub status: ExportStatus,
    pub format: ExportFormat,
    /// 0-100
    pub progress: u8,
    pub message: Option<String>,
    pub download_url: Option<String>,
    pub file_name: Option<String>,
    pub file_size: Option<u64>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub error: Option<String>,
}

/// Payload of a fulfilled start-export call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartedExport {
    pub operation_id: String,
    pub status: ExportStatus,
    pub format: ExportFormat,
    pub started_at: DateTime<Utc>,
}

// ==========================================================================
// Export history
// ==========================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportHistoryItem {
    pub operation_id: String,
    pub format: ExportFormat,
    pub status: ExportStatus,
    #[serde(default)]
    pub service_count: u32,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub file_size: Option<u64>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_by: Option<String>,
    #[serde(default)]
    pub download_url: Option<String>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportHistoryParams {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub format: Option<ExportFormat>,
    pub status: Option<ExportStatus>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportHistoryResponse {
    pub items: Vec<ExportHistoryItem>,
    pub total_count: u64,
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub page_size: u32,
}
