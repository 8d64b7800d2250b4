//! Test doubles
//!
//! [`StubServer`] is an in-process HTTP stub for client tests. It serves
//! canned responses keyed by method and path (query string ignored for
//! matching) and records every request it receives. Unmatched requests
//! get a 404.
//!
//! The `Mock*Api` types stand in for the API traits when testing the
//! workflow, the store thunks and the poller. They record call names so
//! tests can assert that no request was made.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use parking_lot::Mutex;
use serde_json::{Map, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use crate::error::ApiError;
use crate::services::export_client::ExportApi;
use crate::services::import_client::ImportApi;
use crate::services::service_client::ServiceApi;
use crate::types::{
    BulkDeleteResponse, BulkImportResult, ExportFormat, ExportHistoryParams, ExportHistoryResponse,
    ExportOperationResponse, ExportRequest, ExportStatus, ExportStatusResponse, HealthStatus,
    ImportResult, ServiceDetail, ServiceListItem, ServiceListParams, ServiceListResponse,
    ServiceUpsertRequest, ValidationOutcome,
};

#[derive(Debug, Clone)]
pub struct StubResponse {
    pub status: u16,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

impl StubResponse {
    pub fn json(status: u16, body: Value) -> Self {
        Self {
            status,
            content_type: "application/json",
            body: body.to_string().into_bytes(),
        }
    }

    pub fn text(status: u16, body: &str) -> Self {
        Self {
            status,
            content_type: "text/plain",
            body: body.as_bytes().to_vec(),
        }
    }

    pub fn bytes(status: u16, body: &[u8]) -> Self {
        Self {
            status,
            content_type: "application/octet-stream",
            body: body.to_vec(),
        }
    }

    pub fn empty(status: u16) -> Self {
        Self {
            status,
            content_type: "text/plain",
            body: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    /// Path including the query string
    pub path: String,
    pub body: String,
    pub authorization: Option<String>,
}

impl RecordedRequest {
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap_or(Value::Null)
    }
}

struct Route {
    method: &'static str,
    path: &'static str,
    /// Served in order; the last one repeats
    responses: VecDeque<StubResponse>,
}

#[derive(Default)]
struct StubState {
    routes: Vec<Route>,
    requests: Vec<RecordedRequest>,
}

pub struct StubServer {
    pub base_url: String,
    state: Arc<Mutex<StubState>>,
}

impl StubServer {
    pub async fn start(routes: Vec<(&'static str, &'static str, StubResponse)>) -> Self {
        Self::start_sequence(
            routes
                .into_iter()
                .map(|(method, path, response)| (method, path, vec![response]))
                .collect(),
        )
        .await
    }

    /// Each route answers with its responses in order, repeating the last
    pub async fn start_sequence(routes: Vec<(&'static str, &'static str, Vec<StubResponse>)>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let state = Arc::new(Mutex::new(StubState {
            routes: routes
                .into_iter()
                .map(|(method, path, responses)| Route {
                    method,
                    path,
                    responses: responses.into(),
                })
                .collect(),
            requests: Vec::new(),
        }));

        let shared = Arc::clone(&state);
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let state = Arc::clone(&shared);
                tokio::spawn(async move {
                    let _ = handle_connection(stream, state).await;
                });
            }
        });

        Self {
            base_url: format!("http://{}", addr),
            state,
        }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().requests.clone()
    }
}

async fn handle_connection(mut stream: TcpStream, state: Arc<Mutex<StubState>>) -> std::io::Result<()> {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Ok(());
        }
        buffer.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buffer.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buffer[..header_end]).into_owned();
    let mut lines = head.lines();
    let request_line = lines.next().unwrap_or_default();
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or_default().to_string();
    let path = parts.next().unwrap_or_default().to_string();

    let mut content_length = 0usize;
    let mut authorization = None;
    for line in lines {
        if let Some((name, value)) = line.split_once(':') {
            let name = name.trim().to_ascii_lowercase();
            let value = value.trim();
            if name == "content-length" {
                content_length = value.parse().unwrap_or(0);
            } else if name == "authorization" {
                authorization = Some(value.to_string());
            }
        }
    }

    while buffer.len() < header_end + content_length {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        buffer.extend_from_slice(&chunk[..n]);
    }
    let body_end = buffer.len().min(header_end + content_length);
    let body = String::from_utf8_lossy(&buffer[header_end..body_end]).into_owned();

    let response = {
        let mut state = state.lock();
        state.requests.push(RecordedRequest {
            method: method.clone(),
            path: path.clone(),
            body,
            authorization,
        });

        let route_path = path.split('?').next().unwrap_or_default();
        state
            .routes
            .iter_mut()
            .find(|r| r.method == method && r.path == route_path)
            .and_then(|route| {
                if route.responses.len() > 1 {
                    route.responses.pop_front()
                } else {
                    route.responses.front().cloned()
                }
            })
            .unwrap_or_else(|| StubResponse::json(404, serde_json::json!({"message": "no stub"})))
    };

    let reason = reqwest::StatusCode::from_u16(response.status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("Unknown");
    let head = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        response.status,
        reason,
        response.content_type,
        response.body.len()
    );

    stream.write_all(head.as_bytes()).await?;
    stream.write_all(&response.body).await?;
    stream.shutdown().await?;
    Ok(())
}

// ==========================================================================
// Import API double
// ==========================================================================

struct ImportScript {
    validation: Result<ValidationOutcome, ApiError>,
    import: Result<ImportResult, ApiError>,
    /// `None` answers every bulk request with all items succeeding
    bulk: Option<Result<BulkImportResult, ApiError>>,
    calls: Vec<&'static str>,
    bulk_sizes: Vec<usize>,
}

#[derive(Clone)]
pub struct MockImportApi {
    script: Arc<Mutex<ImportScript>>,
}

impl MockImportApi {
    /// Validates everything and imports everything successfully
    pub fn new() -> Self {
        Self {
            script: Arc::new(Mutex::new(ImportScript {
                validation: Ok(ValidationOutcome::valid()),
                import: Ok(ImportResult {
                    success: true,
                    service_id: Some(1),
                    service_code: Some("SVC-1".to_string()),
                    message: None,
                    errors: None,
                }),
                bulk: None,
                calls: Vec::new(),
                bulk_sizes: Vec::new(),
            })),
        }
    }

    pub fn with_validation(self, outcome: Result<ValidationOutcome, ApiError>) -> Self {
        self.script.lock().validation = outcome;
        self
    }

    pub fn with_import(self, result: Result<ImportResult, ApiError>) -> Self {
        self.set_import(result);
        self
    }

    pub fn with_bulk(self, result: Result<BulkImportResult, ApiError>) -> Self {
        self.script.lock().bulk = Some(result);
        self
    }

    pub fn set_import(&self, result: Result<ImportResult, ApiError>) {
        self.script.lock().import = result;
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.script.lock().calls.clone()
    }

    pub fn bulk_sizes(&self) -> Vec<usize> {
        self.script.lock().bulk_sizes.clone()
    }
}

#[async_trait]
impl ImportApi for MockImportApi {
    async fn validate(&self, _document: &Value) -> Result<ValidationOutcome, ApiError> {
        let mut script = self.script.lock();
        script.calls.push("validate");
        script.validation.clone()
    }

    async fn import_one(&self, _document: &Value) -> Result<ImportResult, ApiError> {
        let mut script = self.script.lock();
        script.calls.push("import_one");
        script.import.clone()
    }

    async fn import_bulk(&self, documents: &[Value]) -> Result<BulkImportResult, ApiError> {
        let mut script = self.script.lock();
        script.calls.push("import_bulk");
        script.bulk_sizes.push(documents.len());
        match &script.bulk {
            Some(result) => result.clone(),
            None => Ok(BulkImportResult {
                total_count: documents.len(),
                success_count: documents.len(),
                fail_count: 0,
                results: documents
                    .iter()
                    .map(|_| ImportResult {
                        success: true,
                        service_id: None,
                        service_code: None,
                        message: None,
                        errors: None,
                    })
                    .collect(),
            }),
        }
    }

    async fn check_health(&self) -> Result<HealthStatus, ApiError> {
        self.script.lock().calls.push("check_health");
        Ok(HealthStatus {
            status: "Healthy".to_string(),
            service: "ImportService".to_string(),
            timestamp: String::new(),
        })
    }
}

// ==========================================================================
// Export API double
// ==========================================================================

pub fn status_response(status: ExportStatus, progress: u32) -> ExportStatusResponse {
    ExportStatusResponse {
        operation_id: None,
        status,
        progress,
        message: None,
        download_url: None,
        file_name: None,
        file_size: None,
        completed_at: None,
        error: None,
    }
}

struct ExportScript {
    start: Result<ExportOperationResponse, ApiError>,
    /// Served in order; the last one repeats
    statuses: VecDeque<Result<ExportStatusResponse, ApiError>>,
    cancel: Result<(), ApiError>,
    calls: Vec<&'static str>,
}

#[derive(Clone)]
pub struct MockExportApi {
    script: Arc<Mutex<ExportScript>>,
}

impl MockExportApi {
    pub fn new(operation_id: &str) -> Self {
        Self {
            script: Arc::new(Mutex::new(ExportScript {
                start: Ok(ExportOperationResponse {
                    operation_id: operation_id.to_string(),
                    status: ExportStatus::Pending,
                    created_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
                    estimated_completion_time: None,
                }),
                statuses: VecDeque::from(vec![Ok(status_response(ExportStatus::Pending, 0))]),
                cancel: Ok(()),
                calls: Vec::new(),
            })),
        }
    }

    pub fn with_start(self, result: Result<ExportOperationResponse, ApiError>) -> Self {
        self.script.lock().start = result;
        self
    }

    pub fn with_statuses(self, statuses: Vec<Result<ExportStatusResponse, ApiError>>) -> Self {
        self.script.lock().statuses = statuses.into();
        self
    }

    pub fn with_cancel(self, result: Result<(), ApiError>) -> Self {
        self.script.lock().cancel = result;
        self
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.script.lock().calls.clone()
    }

    pub fn status_calls(&self) -> usize {
        self.calls().iter().filter(|c| **c == "status").count()
    }
}

#[async_trait]
impl ExportApi for MockExportApi {
    async fn start(&self, _request: &ExportRequest) -> Result<ExportOperationResponse, ApiError> {
        let mut script = self.script.lock();
        script.calls.push("start");
        script.start.clone()
    }

    async fn status(&self, _operation_id: &str, _format: ExportFormat) -> Result<ExportStatusResponse, ApiError> {
        let mut script = self.script.lock();
        script.calls.push("status");
        if script.statuses.len() > 1 {
            script.statuses.pop_front().unwrap_or(Err(ApiError::Timeout))
        } else {
            script.statuses.front().cloned().unwrap_or(Err(ApiError::Timeout))
        }
    }

    async fn cancel(&self, _operation_id: &str) -> Result<(), ApiError> {
        let mut script = self.script.lock();
        script.calls.push("cancel");
        script.cancel.clone()
    }

    async fn history(&self, params: &ExportHistoryParams) -> Result<ExportHistoryResponse, ApiError> {
        self.script.lock().calls.push("history");
        Ok(ExportHistoryResponse {
            items: Vec::new(),
            total_count: 0,
            page: params.page.unwrap_or(1),
            page_size: params.page_size.unwrap_or(10),
        })
    }

    async fn download(&self, _operation_id: &str, _format: ExportFormat) -> Result<Vec<u8>, ApiError> {
        self.script.lock().calls.push("download");
        Ok(b"exported".to_vec())
    }
}

// ==========================================================================
// Service API double
// ==========================================================================

pub fn list_item(id: i64) -> ServiceListItem {
    ServiceListItem {
        service_id: id,
        service_code: format!("SVC-{}", id),
        service_name: format!("Service {}", id),
        version: "1.0".to_string(),
        category_id: None,
        category_name: None,
        description: String::new(),
        is_active: true,
        is_published: false,
        created_at: None,
        updated_at: None,
    }
}

pub fn detail(id: i64, name: &str) -> ServiceDetail {
    ServiceDetail {
        service_id: id,
        service_code: format!("SVC-{}", id),
        service_name: name.to_string(),
        version: "1.0".to_string(),
        category_id: None,
        description: String::new(),
        notes: None,
        is_active: true,
        is_published: false,
        extra: Map::new(),
    }
}

struct ServiceScript {
    list: Result<ServiceListResponse, ApiError>,
    detail: Result<ServiceDetail, ApiError>,
    delete: Result<(), ApiError>,
    bulk_delete: Result<BulkDeleteResponse, ApiError>,
    calls: Vec<&'static str>,
    last_params: Option<ServiceListParams>,
}

#[derive(Clone)]
pub struct MockServiceApi {
    script: Arc<Mutex<ServiceScript>>,
}

impl MockServiceApi {
    /// A list page holding `ids`, 20 per page
    pub fn with_items(ids: &[i64]) -> Self {
        Self {
            script: Arc::new(Mutex::new(ServiceScript {
                list: Ok(ServiceListResponse {
                    items: ids.iter().copied().map(list_item).collect(),
                    total_count: ids.len() as u64,
                    page: 1,
                    page_size: 20,
                    total_pages: 1,
                }),
                detail: Ok(detail(ids.first().copied().unwrap_or(1), "Detail")),
                delete: Ok(()),
                bulk_delete: Ok(BulkDeleteResponse {
                    deleted_count: 0,
                    failed_ids: Vec::new(),
                    errors: Vec::new(),
                }),
                calls: Vec::new(),
                last_params: None,
            })),
        }
    }

    pub fn with_list(self, result: Result<ServiceListResponse, ApiError>) -> Self {
        self.script.lock().list = result;
        self
    }

    pub fn with_detail(self, result: Result<ServiceDetail, ApiError>) -> Self {
        self.script.lock().detail = result;
        self
    }

    pub fn with_delete(self, result: Result<(), ApiError>) -> Self {
        self.script.lock().delete = result;
        self
    }

    pub fn with_bulk_delete(self, result: Result<BulkDeleteResponse, ApiError>) -> Self {
        self.script.lock().bulk_delete = result;
        self
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.script.lock().calls.clone()
    }

    pub fn last_params(&self) -> Option<ServiceListParams> {
        self.script.lock().last_params.clone()
    }
}

#[async_trait]
impl ServiceApi for MockServiceApi {
    async fn list(&self, params: &ServiceListParams) -> Result<ServiceListResponse, ApiError> {
        let mut script = self.script.lock();
        script.calls.push("list");
        script.last_params = Some(params.clone());
        script.list.clone()
    }

    async fn get(&self, _id: i64) -> Result<ServiceDetail, ApiError> {
        let mut script = self.script.lock();
        script.calls.push("get");
        script.detail.clone()
    }

    async fn create(&self, _request: &ServiceUpsertRequest) -> Result<ServiceDetail, ApiError> {
        let mut script = self.script.lock();
        script.calls.push("create");
        script.detail.clone()
    }

    async fn update(&self, _id: i64, _request: &ServiceUpsertRequest) -> Result<ServiceDetail, ApiError> {
        let mut script = self.script.lock();
        script.calls.push("update");
        script.detail.clone()
    }

    async fn delete(&self, _id: i64) -> Result<(), ApiError> {
        let mut script = self.script.lock();
        script.calls.push("delete");
        script.delete.clone()
    }

    async fn duplicate(&self, _id: i64) -> Result<ServiceDetail, ApiError> {
        let mut script = self.script.lock();
        script.calls.push("duplicate");
        script.detail.clone()
    }

    async fn bulk_delete(&self, _ids: &[i64]) -> Result<BulkDeleteResponse, ApiError> {
        let mut script = self.script.lock();
        script.calls.push("bulk_delete");
        script.bulk_delete.clone()
    }
}
