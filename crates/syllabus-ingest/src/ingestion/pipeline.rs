//! Extraction → normalization → segmentation for one uploaded PDF

use crate::error::{Error, Result};
use crate::types::material::{RawDocument, UnitChunk};

use super::{PdfTextExtractor, TextNormalizer, UnitSegmenter};

/// Turns a PDF into ordered unit chunks
#[derive(Debug, Clone, Copy, Default)]
pub struct SyllabusPipeline;

impl SyllabusPipeline {
    pub fn new() -> Self {
        Self
    }

    /// Run all three steps synchronously
    pub fn chunk_bytes(&self, filename: &str, data: &[u8]) -> Result<Vec<UnitChunk>> {
        let raw = PdfTextExtractor::extract(filename, data)?;
        let normalized = TextNormalizer::normalize(&raw);
        Ok(UnitSegmenter::segment(&normalized))
    }

    /// Run the CPU-bound steps on the blocking pool
    pub async fn chunk_document(&self, document: &RawDocument) -> Result<Vec<UnitChunk>> {
        let pipeline = *self;
        let filename = document.filename.clone();
        let data = document.data.clone();

        tokio::task::spawn_blocking(move || pipeline.chunk_bytes(&filename, &data))
            .await
            .map_err(|e| Error::internal(format!("Task join error: {}", e)))?
    }
}
