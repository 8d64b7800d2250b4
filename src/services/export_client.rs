//! Export job client
//!
//! Starts PDF / Markdown exports, polls their status, cancels them and
//! fetches the produced file. Status polling is a single call here; the
//! repeat loop lives in [`crate::services::export_poller`].

use async_trait::async_trait;
use tracing::info;

use crate::error::ApiError;
use crate::services::api_client::{path_segment, ApiClient};
use crate::types::{
    ExportFormat, ExportHistoryParams, ExportHistoryResponse, ExportOperationResponse,
    ExportRequest, ExportStatusResponse,
};

const HISTORY_PATH: &str = "/export/history";

#[async_trait]
pub trait ExportApi: Send + Sync {
    async fn start(&self, request: &ExportRequest) -> Result<ExportOperationResponse, ApiError>;

    /// Poll once, returning the latest status
    async fn status(&self, operation_id: &str, format: ExportFormat) -> Result<ExportStatusResponse, ApiError>;

    /// Advisory: the job may still reach a terminal state of its own
    async fn cancel(&self, operation_id: &str) -> Result<(), ApiError>;

    async fn history(&self, params: &ExportHistoryParams) -> Result<ExportHistoryResponse, ApiError>;

    async fn download(&self, operation_id: &str, format: ExportFormat) -> Result<Vec<u8>, ApiError>;
}

pub struct HttpExportApi<'a> {
    client: &'a ApiClient,
}

impl<'a> HttpExportApi<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ExportApi for HttpExportApi<'_> {
    async fn start(&self, request: &ExportRequest) -> Result<ExportOperationResponse, ApiError> {
        let path = format!("/export/{}", request.format.as_str());
        let response: ExportOperationResponse = self.client.post_json(&path, request).await?;
        info!(
            "Export {} started for {} services ({})",
            response.operation_id,
            request.service_ids.len(),
            request.format
        );
        Ok(response)
    }

    async fn status(&self, operation_id: &str, format: ExportFormat) -> Result<ExportStatusResponse, ApiError> {
        let path = format!("/export/{}/status/{}", format.as_str(), path_segment(operation_id));
        self.client.get_json(&path, &[]).await
    }

    async fn cancel(&self, operation_id: &str) -> Result<(), ApiError> {
        let path = format!("/export/{}/cancel", path_segment(operation_id));
        self.client.post_empty(&path).await
    }

    async fn history(&self, params: &ExportHistoryParams) -> Result<ExportHistoryResponse, ApiError> {
        let mut query = Vec::new();
        if let Some(page) = params.page {
            query.push(("page", page.to_string()));
        }
        if let Some(size) = params.page_size {
            query.push(("pageSize", size.to_string()));
        }
        if let Some(format) = params.format {
            query.push(("format", format.as_str().to_string()));
        }
        if let Some(status) = params.status {
            query.push(("status", status.to_string()));
        }
        self.client.get_json(HISTORY_PATH, &query).await
    }

    async fn download(&self, operation_id: &str, format: ExportFormat) -> Result<Vec<u8>, ApiError> {
        let path = format!("/export/{}/download/{}", format.as_str(), path_segment(operation_id));
        self.client.get_bytes(&path).await
    }
}
