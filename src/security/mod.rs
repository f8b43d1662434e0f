//! Security Module
//!
//! Provides API key authentication for the service surface. Authentication
//! is disabled when no API key is configured (development default).

use async_trait::async_trait;
use axum::{
    body::Body,
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::api::app_state::AppState;
use crate::error::{AppError, Result};

/// Credentials extracted from an incoming request
#[derive(Debug, Clone)]
pub struct Credentials {
    /// API key (if provided)
    pub api_key: Option<String>,
}

impl Credentials {
    pub fn new(api_key: Option<String>) -> Self {
        Self { api_key }
    }

    /// Try to extract credentials from the request headers
    ///
    /// Accepts `Authorization: ApiKey <key>` or `X-Api-Key: <key>`.
    pub fn from_request(req: &Request<Body>) -> Self {
        if let Some(value) = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
        {
            if let Some(key) = value.strip_prefix("ApiKey ") {
                return Self::new(Some(key.to_string()));
            }
        }

        let api_key = req
            .headers()
            .get("x-api-key")
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string());

        Self::new(api_key)
    }
}

/// Authentication interface
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn authenticate(&self, credentials: &Credentials) -> Result<()>;
}

/// Static API key authenticator
pub struct ApiKeyAuthenticator {
    api_key: Option<String>,
}

impl ApiKeyAuthenticator {
    /// Create an authenticator; an empty configured key disables auth
    pub fn new(configured_key: &str) -> Self {
        let api_key = if configured_key.is_empty() {
            None
        } else {
            Some(configured_key.to_string())
        };
        Self { api_key }
    }

    /// Development authenticator with auth disabled
    pub fn development() -> Self {
        Self::new("")
    }
}

#[async_trait]
impl Authenticator for ApiKeyAuthenticator {
    async fn authenticate(&self, credentials: &Credentials) -> Result<()> {
        let Some(expected) = &self.api_key else {
            return Ok(());
        };

        match &credentials.api_key {
            Some(provided) if provided == expected => Ok(()),
            Some(_) => Err(AppError::Authentication("Invalid API key".to_string())),
            None => Err(AppError::Authentication("Missing API key".to_string())),
        }
    }
}

/// Authentication middleware for the API surface
pub async fn auth_middleware(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> std::result::Result<Response, AppError> {
    let credentials = Credentials::from_request(&req);
    state.authenticator.authenticate(&credentials).await?;
    Ok(next.run(req).await)
}

/// 创建认证器
pub fn create_authenticator(configured_key: &str) -> Arc<dyn Authenticator> {
    Arc::new(ApiKeyAuthenticator::new(configured_key))
}
