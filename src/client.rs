//! HTTP client for the planboard API.
//!
//! Configuration is via environment variables:
//! - `PLANBOARD_URL` - Base URL of the server (default: `http://127.0.0.1:4000`)

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

use crate::models::*;

/// Default URL for local development.
pub const DEFAULT_URL: &str = "http://127.0.0.1:4000";

/// HTTP client errors.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Server error: {0}")]
    Server(String),
}

/// Body of a `/health` response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Health {
    pub status: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// HTTP client for the planboard API.
#[derive(Debug, Clone)]
pub struct PlanClient {
    base_url: String,
    client: Client,
}

impl PlanClient {
    /// Create client from environment variables.
    pub fn from_env() -> Self {
        let base_url = std::env::var("PLANBOARD_URL").unwrap_or_else(|_| DEFAULT_URL.to_string());
        Self::new(base_url)
    }

    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        self.client.request(method, &url)
    }

    /// Handle response, converting HTTP errors to ClientError.
    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .map(|e| e.message)
            .unwrap_or(body);
        match status {
            StatusCode::NOT_FOUND => Err(ClientError::NotFound(message)),
            StatusCode::BAD_REQUEST => Err(ClientError::BadRequest(message)),
            _ => Err(ClientError::Server(format!("{}: {}", status, message))),
        }
    }

    pub async fn health(&self) -> Result<Health, ClientError> {
        let response = self.request(reqwest::Method::GET, "/health").send().await?;
        self.handle_response(response).await
    }

    // ============================================================
    // Plan Operations
    // ============================================================

    /// All plans, newest first.
    pub async fn list_plans(&self) -> Result<Vec<Plan>, ClientError> {
        let response = self
            .request(reqwest::Method::GET, "/api/plans")
            .send()
            .await?;
        self.handle_response(response).await
    }

    pub async fn get_plan(&self, id: Uuid) -> Result<Plan, ClientError> {
        let response = self
            .request(reqwest::Method::GET, &format!("/api/plans/{}", id))
            .send()
            .await?;
        self.handle_response(response).await
    }

    pub async fn create_plan(&self, input: &CreatePlanInput) -> Result<Plan, ClientError> {
        let response = self
            .request(reqwest::Method::POST, "/api/plans")
            .json(input)
            .send()
            .await?;
        self.handle_response(response).await
    }

    pub async fn update_plan(
        &self,
        id: Uuid,
        input: &UpdatePlanInput,
    ) -> Result<Plan, ClientError> {
        let response = self
            .request(reqwest::Method::PUT, &format!("/api/plans/{}", id))
            .json(input)
            .send()
            .await?;
        self.handle_response(response).await
    }

    pub async fn delete_plan(&self, id: Uuid) -> Result<DeletedPlan, ClientError> {
        let response = self
            .request(reqwest::Method::DELETE, &format!("/api/plans/{}", id))
            .send()
            .await?;
        self.handle_response(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_dropped_from_base_url() {
        let client = PlanClient::new("http://localhost:4000/");
        assert_eq!(client.base_url(), "http://localhost:4000");
    }
}
