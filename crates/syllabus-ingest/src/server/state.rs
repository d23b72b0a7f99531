//! Application state for the ingestion server

use std::sync::Arc;

use crate::config::{AppConfig, BlobBackend, StorageConfig};
use crate::error::{Error, Result};
use crate::generation::QuestionGenClient;
use crate::processing::{EventRepublisher, FanOutCoordinator, IngestService};
use crate::providers::{event_publisher, BlobStore, LocalBlobStore};
#[cfg(feature = "gcp")]
use crate::providers::GcsBlobStore;
use crate::storage::SqliteMaterialRepository;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AppConfig,
    ingest: IngestService,
}

impl AppState {
    /// Wire every collaborator from configuration
    pub async fn new(config: AppConfig) -> Result<Self> {
        tracing::info!(
            "Initializing ingestion state (blob backend: {:?})...",
            config.storage.blob_backend
        );

        let repository = Arc::new(SqliteMaterialRepository::open(&config.storage.database_path)?);
        tracing::info!("Material database at {}", config.storage.database_path.display());

        let blob_store = build_blob_store(&config.storage).await?;
        tracing::info!("Blob store initialized ({})", blob_store.name());

        let generator = Arc::new(QuestionGenClient::new(&config.generation)?);
        tracing::info!(
            "Question generation endpoint: {} (timeout {}s, max concurrency {:?})",
            generator.endpoint(),
            config.generation.timeout_secs,
            config.generation.max_concurrency
        );

        let publisher = event_publisher::from_config(&config.broker)?;
        tracing::info!(
            "Chunk events go to topic '{}' via {}",
            config.broker.topic,
            publisher.name()
        );

        let ingest = IngestService::new(
            FanOutCoordinator::new(generator, config.generation.max_concurrency),
            blob_store,
            repository,
            EventRepublisher::from_config(publisher, &config.broker),
        );

        Ok(Self::from_parts(config, ingest))
    }

    /// Assemble state from an already-built service
    pub fn from_parts(config: AppConfig, ingest: IngestService) -> Self {
        Self {
            inner: Arc::new(AppStateInner { config, ingest }),
        }
    }

    /// Get configuration
    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    /// Get the ingest service
    pub fn ingest(&self) -> &IngestService {
        &self.inner.ingest
    }
}

async fn build_blob_store(config: &StorageConfig) -> Result<Arc<dyn BlobStore>> {
    match config.blob_backend {
        BlobBackend::Local => Ok(Arc::new(LocalBlobStore::new(&config.blob_dir)?)),
        #[cfg(feature = "gcp")]
        BlobBackend::Gcs => {
            let bucket = config
                .gcs_bucket
                .clone()
                .ok_or_else(|| Error::Config("gcs_bucket is required for the gcs backend".into()))?;
            Ok(Arc::new(
                GcsBlobStore::new(bucket, config.gcs_prefix.clone()).await?,
            ))
        }
        #[cfg(not(feature = "gcp"))]
        BlobBackend::Gcs => Err(Error::Config(
            "gcs backend requires building with the `gcp` feature".into(),
        )),
    }
}
