//! Record listing and classification collaborators.
//!
//! `HttpApi` is a thin `reqwest` wrapper over the backend's `/messages/` and
//! `/classify/{id}` routes. Response parsing lives in pure functions
//! (`parse_messages`, `parse_classification`) for testability.
//!
//! ERROR HANDLING
//! ==============
//! Every failure comes back as an `ApiError`. The coordinators in `state`
//! turn those into display text; nothing here panics or retries.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use std::time::Duration;

use super::types::{Classification, ListQuery, Message, MessageId, MessagesPage};
use crate::config::DashboardConfig;

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by collaborator calls.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// The request never produced a response (connect, timeout, body read).
    #[error("request failed: {0}")]
    Transport(String),

    /// The backend answered with a non-success status.
    #[error("server responded with status {status}")]
    Status { status: u16, body: String },

    /// The response body did not match the expected shape.
    #[error("malformed response: {0}")]
    Decode(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

// =============================================================================
// COLLABORATOR TRAITS
// =============================================================================

/// Source of message lists.
#[async_trait::async_trait]
pub trait RecordSource: Send + Sync {
    /// Fetch the messages matching `query`.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport failure, non-success status, or a
    /// malformed payload.
    async fn list_messages(&self, query: &ListQuery) -> Result<Vec<Message>, ApiError>;
}

/// Server-side classification of a single message.
#[async_trait::async_trait]
pub trait Classifier: Send + Sync {
    /// Classify message `id` and return the server's description.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport failure, non-success status, or a
    /// malformed payload.
    async fn classify(&self, id: MessageId) -> Result<String, ApiError>;
}

// =============================================================================
// HTTP CLIENT
// =============================================================================

/// HTTP implementation of both collaborators.
#[derive(Clone)]
pub struct HttpApi {
    http: reqwest::Client,
    base_url: String,
}

impl HttpApi {
    /// Build a client for `config.api_base` with the configured timeouts.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::HttpClientBuild`] if the TLS backend fails to initialize.
    pub fn new(config: &DashboardConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()
            .map_err(|e| ApiError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, base_url: config.api_base.trim_end_matches('/').to_owned() })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn read_body(response: reqwest::Response) -> Result<String, ApiError> {
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        if !status.is_success() {
            return Err(ApiError::Status { status: status.as_u16(), body: text });
        }
        Ok(text)
    }
}

#[async_trait::async_trait]
impl RecordSource for HttpApi {
    async fn list_messages(&self, query: &ListQuery) -> Result<Vec<Message>, ApiError> {
        let url = format!("{}/messages/", self.base_url);
        let response = self
            .http
            .get(url)
            .query(&query.params())
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        let text = Self::read_body(response).await?;
        parse_messages(&text)
    }
}

#[async_trait::async_trait]
impl Classifier for HttpApi {
    async fn classify(&self, id: MessageId) -> Result<String, ApiError> {
        let url = format!("{}/classify/{id}", self.base_url);
        let response = self
            .http
            .post(url)
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        let text = Self::read_body(response).await?;
        parse_classification(&text)
    }
}

// =============================================================================
// PARSING
// =============================================================================

/// Parse a `/messages/` body. An absent or null `data` field yields an empty list.
///
/// # Errors
///
/// Returns [`ApiError::Decode`] if the body is not a valid page.
pub fn parse_messages(body: &str) -> Result<Vec<Message>, ApiError> {
    let page: MessagesPage = serde_json::from_str(body).map_err(|e| ApiError::Decode(e.to_string()))?;
    Ok(page.data.unwrap_or_default())
}

/// Parse a `/classify/{id}` body into its `message` text.
///
/// # Errors
///
/// Returns [`ApiError::Decode`] if `message` is missing or not a string.
pub fn parse_classification(body: &str) -> Result<String, ApiError> {
    let parsed: Classification = serde_json::from_str(body).map_err(|e| ApiError::Decode(e.to_string()))?;
    Ok(parsed.message)
}
