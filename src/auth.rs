//! Bearer token supply for API requests
//!
//! Token acquisition belongs to the identity provider; the client only
//! asks for the current token before each request. A provider that
//! cannot produce one returns `None` and the request is sent
//! unauthenticated.

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::Config;

/// Source of the bearer token attached to every request
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn bearer_token(&self) -> Option<String>;

    /// Provider name for logging
    fn name(&self) -> &'static str;
}

/// Fixed token, typically from `CATALOGUE_API_TOKEN`
pub struct StaticToken {
    token: String,
}

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self { token: token.into() }
    }
}

#[async_trait]
impl AuthProvider for StaticToken {
    async fn bearer_token(&self) -> Option<String> {
        Some(self.token.clone())
    }

    fn name(&self) -> &'static str {
        "static"
    }
}

/// No credentials
pub struct Anonymous;

#[async_trait]
impl AuthProvider for Anonymous {
    async fn bearer_token(&self) -> Option<String> {
        None
    }

    fn name(&self) -> &'static str {
        "anonymous"
    }
}

/// Pick the provider matching the configuration
pub fn provider_from_config(config: &Config) -> Arc<dyn AuthProvider> {
    match config.api_token.as_deref() {
        Some(token) if !token.trim().is_empty() => Arc::new(StaticToken::new(token.trim())),
        _ => Arc::new(Anonymous),
    }
}
