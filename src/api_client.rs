use async_trait::async_trait;
use regex::Regex;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

pub type ApiResult<T> = Result<T, ApiError>;

/// Closed error-kind set for the backend boundary. Callers branch on
/// the kind, never on message contents.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Rejected before any network dispatch
    #[error("{0}")]
    Validation(String),

    /// Network failure or non-success HTTP status
    #[error("{0}")]
    Transport(String),

    /// The server already has a source with that name
    #[error("{0}")]
    Conflict(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        ApiError::Transport(e.to_string())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub embedding_model: String,
    pub databases_count: usize,
}

/// One named, independently searchable collection on the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceDescriptor {
    pub name: String,
    pub document_count: usize,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub vector_size: usize,
}

/// A single scored row as returned by `/search`, scoped to one source.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchRow {
    #[serde(default)]
    pub id: String,
    pub text: String,
    pub score: f32,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AddTextResponse {
    pub message: String,
    pub document_id: String,
    pub database_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceStats {
    pub name: String,
    pub document_count: usize,
    pub vector_size: usize,
    pub distance_metric: String,
    #[serde(default)]
    pub metadata: Value,
}

/// The REST boundary the panel consumes. No retries, no caching.
#[async_trait]
pub trait ContextBackend: Send + Sync {
    async fn health(&self) -> ApiResult<HealthResponse>;
    async fn list_sources(&self) -> ApiResult<Vec<SourceDescriptor>>;
    async fn create_source(&self, name: &str) -> ApiResult<()>;
    async fn delete_source(&self, name: &str) -> ApiResult<()>;
    async fn search(
        &self,
        source: &str,
        query: &str,
        limit: usize,
        min_score: f32,
    ) -> ApiResult<Vec<SearchRow>>;
    async fn add_text(
        &self,
        source: &str,
        text: &str,
        metadata: Map<String, Value>,
    ) -> ApiResult<AddTextResponse>;
    async fn source_stats(&self, name: &str) -> ApiResult<SourceStats>;
}

/// Source names follow the server rule: letters, digits, spaces,
/// hyphens and underscores, at most 100 chars.
pub fn validate_source_name(name: &str) -> ApiResult<()> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ApiError::Validation("Source name is empty".to_string()));
    }
    let pattern = Regex::new(r"^[A-Za-z0-9 _-]{1,100}$").expect("source name pattern is valid");
    if !pattern.is_match(name) {
        return Err(ApiError::Validation(
            "Source names may only contain letters, numbers, spaces, hyphens and underscores"
                .to_string(),
        ));
    }
    Ok(())
}

#[derive(Clone)]
pub struct HttpBackend {
    base_url: String,
    client: reqwest::Client,
}

impl HttpBackend {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Pull the FastAPI `detail` field out of an error body, falling
    /// back to the raw body or the status line.
    async fn failure(status: StatusCode, response: reqwest::Response) -> ApiError {
        let body = response.text().await.unwrap_or_default();
        let detail = serde_json::from_str::<Value>(&body)
            .ok()
            .and_then(|v| v.get("detail").and_then(Value::as_str).map(String::from))
            .unwrap_or(body);

        let message = if detail.trim().is_empty() {
            format!("Server returned {}", status)
        } else {
            detail
        };

        if status == StatusCode::BAD_REQUEST || status == StatusCode::CONFLICT {
            ApiError::Conflict(message)
        } else {
            ApiError::Transport(message)
        }
    }
}

#[async_trait]
impl ContextBackend for HttpBackend {
    async fn health(&self) -> ApiResult<HealthResponse> {
        let response = self.client.get(self.url("/health")).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Transport(format!("Server returned {}", status)));
        }
        Ok(response.json().await?)
    }

    async fn list_sources(&self) -> ApiResult<Vec<SourceDescriptor>> {
        let response = self.client.get(self.url("/databases")).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Transport(format!("Server returned {}", status)));
        }
        Ok(response.json().await?)
    }

    async fn create_source(&self, name: &str) -> ApiResult<()> {
        validate_source_name(name)?;
        let response = self
            .client
            .post(self.url("/databases"))
            .json(&serde_json::json!({ "name": name.trim() }))
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Self::failure(status, response).await);
        }
        Ok(())
    }

    async fn delete_source(&self, name: &str) -> ApiResult<()> {
        let response = self
            .client
            .delete(self.url(&format!("/databases/{}", name)))
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Transport(format!("Server returned {}", status)));
        }
        Ok(())
    }

    async fn search(
        &self,
        source: &str,
        query: &str,
        limit: usize,
        min_score: f32,
    ) -> ApiResult<Vec<SearchRow>> {
        let response = self
            .client
            .post(self.url("/search"))
            .json(&serde_json::json!({
                "database_name": source,
                "query": query,
                "limit": limit,
                "min_score": min_score,
            }))
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Transport(format!("Server returned {}", status)));
        }
        Ok(response.json().await?)
    }

    async fn add_text(
        &self,
        source: &str,
        text: &str,
        metadata: Map<String, Value>,
    ) -> ApiResult<AddTextResponse> {
        let response = self
            .client
            .post(self.url("/add-text"))
            .json(&serde_json::json!({
                "database_name": source,
                "text": text,
                "metadata": metadata,
            }))
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Self::failure(status, response).await);
        }
        Ok(response.json().await?)
    }

    async fn source_stats(&self, name: &str) -> ApiResult<SourceStats> {
        let response = self
            .client
            .get(self.url(&format!("/databases/{}/stats", name)))
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Transport(format!("Server returned {}", status)));
        }
        Ok(response.json().await?)
    }
}
