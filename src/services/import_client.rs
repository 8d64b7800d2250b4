//! Service import client
//!
//! Single and bulk import endpoints. HTTP 400 from validate / import is a
//! business outcome and comes back as data; every other failure is an
//! [`ApiError`] for the caller to handle.

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{ApiError, ParseError};
use crate::services::api_client::{ApiClient, RawResponse};
use crate::types::{
    BulkImportResult, HealthStatus, ImportFile, ImportResult, ValidationError, ValidationOutcome,
};

const VALIDATE_PATH: &str = "/services/import/validate";
const IMPORT_PATH: &str = "/services/import";
const BULK_IMPORT_PATH: &str = "/services/import/bulk";
const HEALTH_PATH: &str = "/services/import/health";

/// Import API - abstraction so the workflow can run against a test double
#[async_trait]
pub trait ImportApi: Send + Sync {
    /// Validate a document without importing it
    async fn validate(&self, document: &Value) -> Result<ValidationOutcome, ApiError>;

    /// Import a single document
    async fn import_one(&self, document: &Value) -> Result<ImportResult, ApiError>;

    /// Import a list of documents in one request
    async fn import_bulk(&self, documents: &[Value]) -> Result<BulkImportResult, ApiError>;

    /// Liveness probe of the import endpoints
    async fn check_health(&self) -> Result<HealthStatus, ApiError>;
}

/// Decode the selected file as a JSON document, ignoring a leading UTF-8
/// byte order mark. Makes no network call.
pub fn parse_document(file: &ImportFile) -> Result<Value, ParseError> {
    let text = std::str::from_utf8(&file.contents).map_err(|_| ParseError::Unreadable)?;
    let text = text.strip_prefix('\u{FEFF}').unwrap_or(text);
    serde_json::from_str(text).map_err(|_| ParseError::InvalidJson)
}

/// Bulk submission always receives a list
pub fn normalize_bulk(document: Value) -> Vec<Value> {
    match document {
        Value::Array(items) => items,
        single => vec![single],
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ValidateBody {
    is_valid: bool,
    #[serde(default)]
    errors: Option<Vec<ValidationError>>,
}

/// Invalid outcomes always carry at least one error. An explicit empty
/// `errors` list counts as none supplied and gets the `General` entry.
fn invalid_outcome(errors: Option<Vec<ValidationError>>, message: Option<String>) -> ValidationOutcome {
    match errors {
        Some(errors) if !errors.is_empty() => ValidationOutcome::invalid(errors),
        _ => {
            let message = message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| "Validation failed".to_string());
            ValidationOutcome::invalid(vec![ValidationError::general(message)])
        }
    }
}

/// Interpret a validate response
pub fn validation_from_response(response: RawResponse) -> Result<ValidationOutcome, ApiError> {
    if response.status == StatusCode::BAD_REQUEST {
        return Ok(match response.error_body() {
            Some(body) => invalid_outcome(body.errors, body.message),
            None => invalid_outcome(None, Some(response.text())),
        });
    }

    let body: ValidateBody = response.error_for_status()?.json()?;
    if body.is_valid {
        Ok(ValidationOutcome::valid())
    } else {
        Ok(invalid_outcome(body.errors, None))
    }
}

/// Interpret an import response
pub fn import_result_from_response(response: RawResponse) -> Result<ImportResult, ApiError> {
    if response.status == StatusCode::BAD_REQUEST {
        let body = response.error_body().unwrap_or_default();
        return Ok(ImportResult::failed(body.message, body.errors.unwrap_or_default()));
    }

    response.error_for_status()?.json()
}

/// Interpret a bulk import response, checking that the counts agree
pub fn bulk_result_from_response(response: RawResponse) -> Result<BulkImportResult, ApiError> {
    let result: BulkImportResult = response.error_for_status()?.json()?;
    if !result.is_consistent() {
        warn!(
            "Bulk import counts disagree: total={} success={} fail={} results={}",
            result.total_count,
            result.success_count,
            result.fail_count,
            result.results.len()
        );
        return Err(ApiError::MalformedResponse(format!(
            "bulk import reported {} total but {} succeeded, {} failed and {} results",
            result.total_count,
            result.success_count,
            result.fail_count,
            result.results.len()
        )));
    }
    Ok(result)
}

/// HTTP implementation of [`ImportApi`]
pub struct HttpImportApi<'a> {
    client: &'a ApiClient,
}

impl<'a> HttpImportApi<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ImportApi for HttpImportApi<'_> {
    async fn validate(&self, document: &Value) -> Result<ValidationOutcome, ApiError> {
        let response = self
            .client
            .send(Method::POST, VALIDATE_PATH, &[], Some(document))
            .await?;
        let outcome = validation_from_response(response)?;
        debug!("Validation finished: valid={} errors={}", outcome.is_valid, outcome.errors.len());
        Ok(outcome)
    }

    async fn import_one(&self, document: &Value) -> Result<ImportResult, ApiError> {
        let response = self
            .client
            .send(Method::POST, IMPORT_PATH, &[], Some(document))
            .await?;
        import_result_from_response(response)
    }

    async fn import_bulk(&self, documents: &[Value]) -> Result<BulkImportResult, ApiError> {
        let response = self
            .client
            .send(Method::POST, BULK_IMPORT_PATH, &[], Some(documents))
            .await?;
        bulk_result_from_response(response)
    }

    async fn check_health(&self) -> Result<HealthStatus, ApiError> {
        self.client.get_json(HEALTH_PATH, &[]).await
    }
}
