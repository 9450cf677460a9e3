//! HTTP client for the family registry API.
//!
//! Configuration is via environment variables:
//! - `FAMREG_URL` - Base URL (default: `http://127.0.0.1:3000`)

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;
use uuid::Uuid;

use crate::models::*;

/// Default URL for a locally running server.
pub const DEFAULT_URL: &str = "http://127.0.0.1:3000";

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

/// HTTP client for the family registry API.
#[derive(Debug, Clone)]
pub struct RegistryClient {
    base_url: String,
    client: Client,
}

impl RegistryClient {
    /// Create client from environment variables.
    pub fn from_env() -> Self {
        let base_url = std::env::var("FAMREG_URL").unwrap_or_else(|_| DEFAULT_URL.to_string());
        Self::new(base_url)
    }

    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: Client::new(),
        }
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
        let response = Self::check_status(response).await?;
        Ok(response.json().await?)
    }

    /// Handle response that returns an empty body (204 No Content).
    async fn handle_empty_response(&self, response: reqwest::Response) -> Result<(), ClientError> {
        Self::check_status(response).await.map(|_| ())
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        match status {
            StatusCode::NOT_FOUND => Err(ClientError::NotFound(body)),
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                Err(ClientError::BadRequest(body))
            }
            _ => Err(ClientError::Server(format!("{}: {}", status, body))),
        }
    }

    // ============================================================
    // Person Operations
    // ============================================================

    pub async fn create_person(&self, input: &CreatePersonInput) -> Result<Person, ClientError> {
        let response = self
            .request(reqwest::Method::POST, "/persons")
            .json(input)
            .send()
            .await?;
        self.handle_response(response).await
    }

    pub async fn list_persons(&self) -> Result<Vec<Person>, ClientError> {
        let response = self
            .request(reqwest::Method::GET, "/persons")
            .send()
            .await?;
        self.handle_response(response).await
    }

    pub async fn get_person(&self, id: Uuid) -> Result<Person, ClientError> {
        let response = self
            .request(reqwest::Method::GET, &format!("/persons/{}", id))
            .send()
            .await?;
        self.handle_response(response).await
    }

    pub async fn delete_person(&self, id: Uuid) -> Result<(), ClientError> {
        let response = self
            .request(reqwest::Method::DELETE, &format!("/persons/{}", id))
            .send()
            .await?;
        self.handle_empty_response(response).await
    }

    // ============================================================
    // Relationship Operations
    // ============================================================

    /// Add an existing person as a parent. Returns the updated child.
    pub async fn add_parent(&self, child_id: Uuid, parent: &Person) -> Result<Person, ClientError> {
        let response = self
            .request(reqwest::Method::PUT, &format!("/persons/{}/parents", child_id))
            .json(parent)
            .send()
            .await?;
        self.handle_response(response).await
    }

    pub async fn get_parents(&self, id: Uuid) -> Result<Vec<Person>, ClientError> {
        let response = self
            .request(reqwest::Method::GET, &format!("/persons/{}/parents", id))
            .send()
            .await?;
        self.handle_response(response).await
    }

    pub async fn get_children(&self, id: Uuid) -> Result<Vec<Person>, ClientError> {
        let response = self
            .request(reqwest::Method::GET, &format!("/persons/{}/children", id))
            .send()
            .await?;
        self.handle_response(response).await
    }

    pub async fn get_ancestry(&self, id: Uuid) -> Result<AncestryNode, ClientError> {
        let response = self
            .request(reqwest::Method::GET, &format!("/persons/{}/ancestry", id))
            .send()
            .await?;
        self.handle_response(response).await
    }
}
