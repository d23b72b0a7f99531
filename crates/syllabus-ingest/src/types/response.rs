//! Response bodies for the HTTP surface

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::generation::GenerationResult;

/// Response for a successful upload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub message: String,
    /// Id of the persisted material
    pub content_id: Uuid,
    /// Generated question sets, one per unit chunk
    pub questions: Vec<GenerationResult>,
    /// Blob URL of the stored PDF (name kept for existing clients)
    #[serde(rename = "cloudinaryUrl")]
    pub blob_url: String,
}

impl UploadResponse {
    pub fn new(content_id: Uuid, questions: Vec<GenerationResult>, blob_url: String) -> Self {
        Self {
            message: "Material uploaded successfully".to_string(),
            content_id,
            questions,
            blob_url,
        }
    }
}

/// Acknowledgement for a reprocess request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReprocessResponse {
    pub message: String,
}

impl Default for ReprocessResponse {
    fn default() -> Self {
        Self {
            message: "material uploaded to ai for question generation".to_string(),
        }
    }
}
