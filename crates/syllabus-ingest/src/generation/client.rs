//! HTTP client for the question generation endpoint

use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, Client};

use crate::config::GenerationConfig;
use crate::error::{Error, Result};
use crate::types::{GenerationRequest, GenerationResult};

use super::{GenerationError, QuestionGenerator};

/// One synchronous POST per unit chunk
pub struct QuestionGenClient {
    client: Client,
    endpoint: String,
}

impl QuestionGenClient {
    /// Create a client; the configured timeout bounds every call
    pub fn new(config: &GenerationConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .pool_max_idle_per_host(5)
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: config.endpoint_url(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl QuestionGenerator for QuestionGenClient {
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> std::result::Result<GenerationResult, GenerationError> {
        let body = serde_json::to_vec(request)
            .map_err(|e| GenerationError::Serialization(e.to_string()))?;

        let response = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| GenerationError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| GenerationError::Transport(e.to_string()))?;

        serde_json::from_slice(&bytes).map_err(|e| GenerationError::Decode(e.to_string()))
    }

    fn name(&self) -> &str {
        "http"
    }
}
