//! Materials, unit chunks and chunk events

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::generation::GenerationResult;

/// An uploaded PDF, alive for one request only
#[derive(Debug, Clone)]
pub struct RawDocument {
    /// Original filename from the multipart part
    pub filename: String,
    /// PDF bytes
    pub data: bytes::Bytes,
}

impl RawDocument {
    pub fn new(filename: impl Into<String>, data: impl Into<bytes::Bytes>) -> Self {
        Self {
            filename: filename.into(),
            data: data.into(),
        }
    }
}

/// Label used when no unit heading is detected
pub const UNKNOWN_UNIT: &str = "Unknown";

/// A contiguous span of syllabus text tied to one unit heading
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitChunk {
    /// Heading text as it appeared in the document (e.g. "UNIT 1", "Unit-IV")
    pub unit: String,
    /// Text between this heading and the next
    pub content: String,
}

impl UnitChunk {
    pub fn new(unit: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            unit: unit.into(),
            content: content.into(),
        }
    }
}

/// Requested number of questions per mark category
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionCounts {
    #[serde(rename = "num3Marks")]
    pub three_marks: u32,
    #[serde(rename = "num4Marks")]
    pub four_marks: u32,
    #[serde(rename = "num10Marks")]
    pub ten_marks: u32,
}

impl QuestionCounts {
    pub fn new(three_marks: u32, four_marks: u32, ten_marks: u32) -> Self {
        Self {
            three_marks,
            four_marks,
            ten_marks,
        }
    }
}

/// Material fields known before the repository assigns an id
#[derive(Debug, Clone)]
pub struct NewMaterial {
    pub subject: String,
    pub owner_id: String,
    pub role: String,
    pub chunks: Vec<UnitChunk>,
    pub generated: Vec<GenerationResult>,
    pub blob_url: String,
}

/// Persisted record of one uploaded syllabus and its generated questions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    /// Repository-assigned id
    pub id: Uuid,
    /// Subject name
    pub subject: String,
    /// User id of the uploader
    pub owner_id: String,
    /// Role given at upload time
    pub role: String,
    /// Unit chunks in source order
    pub chunks: Vec<UnitChunk>,
    /// Generated question sets, one per chunk, in arrival order
    pub generated: Vec<GenerationResult>,
    /// Location of the original PDF in the blob store
    pub blob_url: String,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

impl Material {
    /// Assign an id and creation timestamp
    pub fn create(new: NewMaterial) -> Self {
        Self {
            id: Uuid::new_v4(),
            subject: new.subject,
            owner_id: new.owner_id,
            role: new.role,
            chunks: new.chunks,
            generated: new.generated,
            blob_url: new.blob_url,
            created_at: Utc::now(),
        }
    }
}

/// Message published per chunk when a material is reprocessed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkEvent {
    /// Fresh id, unrelated to any ingestion-time id
    pub chunk_id: Uuid,
    pub unit: String,
    pub content: String,
    pub subject: String,
    pub teacher_id: String,
    pub uploaded_by: String,
    pub created_at: DateTime<Utc>,
}
