//! Upload and reprocess flows

use std::sync::Arc;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::ingestion::SyllabusPipeline;
use crate::providers::BlobStore;
use crate::storage::MaterialRepository;
use crate::types::{
    AuthContext, GenerationResult, Material, NewMaterial, QuestionCounts, RawDocument,
};

use super::fan_out::FanOutCoordinator;
use super::republisher::EventRepublisher;

/// Decoded upload form
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub subject: String,
    pub role: String,
    pub counts: QuestionCounts,
    pub document: RawDocument,
}

/// What a successful upload produced
#[derive(Debug, Clone)]
pub struct IngestOutcome {
    pub material_id: Uuid,
    pub questions: Vec<GenerationResult>,
    pub blob_url: String,
}

/// Orchestrates chunking, fan-out and persistence
#[derive(Clone)]
pub struct IngestService {
    pipeline: SyllabusPipeline,
    coordinator: FanOutCoordinator,
    blob_store: Arc<dyn BlobStore>,
    repository: Arc<dyn MaterialRepository>,
    republisher: EventRepublisher,
}

impl IngestService {
    pub fn new(
        coordinator: FanOutCoordinator,
        blob_store: Arc<dyn BlobStore>,
        repository: Arc<dyn MaterialRepository>,
        republisher: EventRepublisher,
    ) -> Self {
        Self {
            pipeline: SyllabusPipeline::new(),
            coordinator,
            blob_store,
            repository,
            republisher,
        }
    }

    /// Ingest one PDF.
    ///
    /// Nothing is stored unless every unit's generation call succeeded. Once fan-out
    /// succeeds the blob is uploaded first, then the material is inserted; an insert
    /// failure leaves the uploaded blob behind.
    pub async fn ingest(&self, caller: &AuthContext, request: UploadRequest) -> Result<IngestOutcome> {
        let subject = request.subject.trim();
        if subject.is_empty() {
            return Err(Error::input("subject is required"));
        }
        let role = request.role.trim();
        if role.is_empty() {
            return Err(Error::input("role is required"));
        }
        if request.document.data.is_empty() {
            return Err(Error::input("file is empty"));
        }

        let chunks = self.pipeline.chunk_document(&request.document).await?;
        tracing::info!(
            "Split '{}' into {} units for subject '{}'",
            request.document.filename,
            chunks.len(),
            subject
        );

        let questions = self
            .coordinator
            .run(subject, &chunks, request.counts)
            .await
            .map_err(|e| {
                tracing::error!(
                    "Question generation failed for '{}': {}",
                    request.document.filename,
                    e
                );
                Error::from(e)
            })?;

        let blob_url = self
            .blob_store
            .upload(&request.document.data, &request.document.filename)
            .await?;

        let material = Material::create(NewMaterial {
            subject: subject.to_string(),
            owner_id: caller.user_id.clone(),
            role: role.to_string(),
            chunks,
            generated: questions.clone(),
            blob_url: blob_url.clone(),
        });

        let material_id = self.repository.insert(&material).await.map_err(|e| {
            tracing::error!("Stored blob {} but material insert failed: {}", blob_url, e);
            e
        })?;

        tracing::info!(
            "Material {} stored ({} question sets, blob via {})",
            material_id,
            questions.len(),
            self.blob_store.name()
        );

        Ok(IngestOutcome {
            material_id,
            questions,
            blob_url,
        })
    }

    /// Launch reprocessing of a stored material in the background
    pub fn reprocess(&self, id: Uuid, caller: AuthContext) -> JoinHandle<()> {
        let service = self.clone();
        tokio::spawn(async move {
            match service.republish_material(id, &caller).await {
                Ok(published) => {
                    tracing::info!("Reprocessed material {} ({} events)", id, published)
                }
                Err(e) => tracing::warn!("Reprocessing material {} failed: {}", id, e),
            }
        })
    }

    /// Fetch, re-chunk and publish one material; returns how many events were accepted
    async fn republish_material(&self, id: Uuid, caller: &AuthContext) -> Result<usize> {
        let material = self.repository.fetch_by_id(&id).await?;
        let data = self.blob_store.download(&material.blob_url).await?;

        let document = RawDocument::new(blob_filename(&material.blob_url), data);
        let chunks = self.pipeline.chunk_document(&document).await?;

        let events = EventRepublisher::events(&material.subject, caller, &chunks);
        Ok(self.republisher.publish_all(events).await)
    }
}

fn blob_filename(url: &str) -> &str {
    url.rsplit('/').next().unwrap_or(url)
}
