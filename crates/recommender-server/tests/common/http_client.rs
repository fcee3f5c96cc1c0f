//! HTTP client helpers for tests.

use std::time::Duration;

use recommender::engine::AssessmentRecord;
use serde::{Deserialize, Serialize};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
const STATUS_HEADER: &str = "x-recommender-status";

pub struct TestClient {
    client: reqwest::Client,
    base_url: String,
}

impl TestClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Posts `{query}`; returns the records and the status header.
    pub async fn recommend(
        &self,
        query: &str,
    ) -> Result<(Vec<AssessmentRecord>, String), TestClientError> {
        let resp = self
            .client
            .post(self.url("/recommend"))
            .json(&RecommendRequest {
                query: query.to_string(),
            })
            .send()
            .await?;

        let status_header = resp
            .headers()
            .get(STATUS_HEADER)
            .and_then(|h| h.to_str().ok())
            .unwrap_or("unknown")
            .to_string();

        match resp.status().as_u16() {
            200 => {
                let body: RecommendResponse = resp.json().await?;
                Ok((body.recommended_assessments, status_header))
            }
            400 | 422 => Err(TestClientError::BadRequest(resp.text().await?)),
            status => {
                let body = resp.text().await.unwrap_or_default();
                Err(TestClientError::UnexpectedStatus(status, body))
            }
        }
    }

    /// Sends an arbitrary body to `/recommend`; returns status and body text.
    pub async fn recommend_raw(&self, body: &str) -> Result<(u16, String), TestClientError> {
        let resp = self
            .client
            .post(self.url("/recommend"))
            .header("Content-Type", "application/json")
            .body(body.to_string())
            .send()
            .await?;
        let status = resp.status().as_u16();
        Ok((status, resp.text().await?))
    }

    pub async fn health(&self) -> Result<HealthResponse, TestClientError> {
        let resp = self.client.get(self.url("/health")).send().await?;

        if resp.status().is_success() {
            Ok(resp.json().await?)
        } else {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            Err(TestClientError::UnexpectedStatus(status, body))
        }
    }

    /// `/ready` body along with its HTTP status; 503 is not an error here.
    pub async fn ready(&self) -> Result<(u16, ReadyResponse), TestClientError> {
        let resp = self.client.get(self.url("/ready")).send().await?;
        let status = resp.status().as_u16();
        Ok((status, resp.json().await?))
    }
}

#[derive(Debug, Clone, Serialize)]
struct RecommendRequest {
    query: String,
}

#[derive(Debug, Clone, Deserialize)]
struct RecommendResponse {
    recommended_assessments: Vec<AssessmentRecord>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReadyResponse {
    pub status: String,
    #[serde(default)]
    pub catalog_rows: Option<usize>,
    #[serde(default)]
    pub embedder_mode: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ReadyResponse {
    pub fn is_ready(&self) -> bool {
        self.status == "ready"
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TestClientError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Unexpected HTTP status: {0} - Body: {1}")]
    UnexpectedStatus(u16, String),

    #[error("Bad request: {0}")]
    BadRequest(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_url_building() {
        let client = TestClient::new("http://localhost:8000");
        assert_eq!(client.url("/health"), "http://localhost:8000/health");
        assert_eq!(client.url("health"), "http://localhost:8000/health");
    }
}
