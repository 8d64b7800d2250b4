//! HTTP client for the Service Catalogue API
//!
//! Wraps a single `reqwest::Client` and turns every failure into an
//! [`ApiError`]. Callers that treat some statuses as business outcomes
//! (the import endpoints and HTTP 400) use [`ApiClient::send`] and inspect
//! the raw response themselves; everyone else uses the typed helpers,
//! which fail on any non-2xx status.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::auth::AuthProvider;
use crate::config::Config;
use crate::error::ApiError;
use crate::types::ValidationError;

/// Error payload the API returns alongside non-2xx statuses
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub errors: Option<Vec<ValidationError>>,
}

/// Status and body of a response, before any interpretation
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Decode the body; an undecodable body is a transport failure
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        serde_json::from_slice(&self.body).map_err(|e| {
            ApiError::MalformedResponse(format!("HTTP {}: {}", self.status.as_u16(), e))
        })
    }

    /// Best-effort decode of the error payload
    pub fn error_body(&self) -> Option<ErrorBody> {
        serde_json::from_slice(&self.body).ok()
    }

    /// Convert a non-2xx response into a transport error
    pub fn into_error(self) -> ApiError {
        let body = self.error_body().unwrap_or_default();
        let message = body
            .message
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| {
                format!(
                    "HTTP {}: {}",
                    self.status.as_u16(),
                    self.status.canonical_reason().unwrap_or("Unknown")
                )
            });

        ApiError::Status {
            status: self.status.as_u16(),
            message,
            code: body.code,
        }
    }

    pub fn error_for_status(self) -> Result<Self, ApiError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(self.into_error())
        }
    }
}

/// Catalogue API client
pub struct ApiClient {
    base_url: String,
    client: reqwest::Client,
    auth: Arc<dyn AuthProvider>,
}

impl ApiClient {
    /// Create a new client
    pub fn new(base_url: &str, timeout: Duration, auth: Arc<dyn AuthProvider>) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("catalogue-client/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::InvalidRequest(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            auth,
        })
    }

    pub fn from_config(config: &Config, auth: Arc<dyn AuthProvider>) -> Result<Self, ApiError> {
        Self::new(&config.api_base_url, config.http_timeout, auth)
    }

    /// Send a request and return the response whatever its status
    pub async fn send<B>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&B>,
    ) -> Result<RawResponse, ApiError>
    where
        B: Serialize + ?Sized,
    {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.client.request(method.clone(), &url);

        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(token) = self.auth.bearer_token().await {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?.to_vec();

        debug!("{} {} -> {}", method, path, status.as_u16());

        Ok(RawResponse { status, body })
    }

    pub async fn get_json<T>(&self, path: &str, query: &[(&str, String)]) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        self.send::<()>(Method::GET, path, query, None)
            .await?
            .error_for_status()?
            .json()
    }

    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(Method::POST, path, &[], Some(body))
            .await?
            .error_for_status()?
            .json()
    }

    pub async fn put_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(Method::PUT, path, &[], Some(body))
            .await?
            .error_for_status()?
            .json()
    }

    /// POST without a body, ignoring whatever the server sends back
    pub async fn post_empty(&self, path: &str) -> Result<(), ApiError> {
        self.send::<()>(Method::POST, path, &[], None)
            .await?
            .error_for_status()
            .map(|_| ())
    }

    /// POST without a body, decoding the response
    pub async fn post_empty_json<T>(&self, path: &str) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        self.send::<()>(Method::POST, path, &[], None)
            .await?
            .error_for_status()?
            .json()
    }

    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.send::<()>(Method::DELETE, path, &[], None)
            .await?
            .error_for_status()
            .map(|_| ())
    }

    pub async fn get_bytes(&self, path: &str) -> Result<Vec<u8>, ApiError> {
        Ok(self
            .send::<()>(Method::GET, path, &[], None)
            .await?
            .error_for_status()?
            .body)
    }
}

/// Percent-encode an opaque id for use as a path segment
pub fn path_segment(raw: &str) -> String {
    urlencoding::encode(raw).into_owned()
}
