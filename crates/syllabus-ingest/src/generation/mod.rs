//! Question generation through the external generation service

mod client;

pub use client::QuestionGenClient;

use async_trait::async_trait;
use thiserror::Error;

use crate::types::{GenerationRequest, GenerationResult};

/// Failure of a single generation call. Every kind is terminal for that call; no retry happens here.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    /// The request could not be encoded
    #[error("failed to encode generation request: {0}")]
    Serialization(String),

    /// The call could not complete (connect, timeout, body read)
    #[error("generation service request failed: {0}")]
    Transport(String),

    /// Non-success response status
    #[error("llm service error | status={status} | response={body}")]
    Upstream { status: u16, body: String },

    /// Success response whose body could not be parsed
    #[error("failed to decode generation response: {0}")]
    Decode(String),

    /// A fan-out task panicked or was aborted before reporting
    #[error("generation task failed: {0}")]
    TaskFailed(String),
}

/// Something that turns one unit request into generated questions
#[async_trait]
pub trait QuestionGenerator: Send + Sync {
    /// Perform exactly one generation call
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> std::result::Result<GenerationResult, GenerationError>;

    /// Provider name for logging
    fn name(&self) -> &str;
}
