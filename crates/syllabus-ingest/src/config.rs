//! Configuration for the ingestion service

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};

/// Main service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Question generation service configuration
    #[serde(default)]
    pub generation: GenerationConfig,
    /// Blob and database storage configuration
    #[serde(default)]
    pub storage: StorageConfig,
    /// Message broker configuration
    #[serde(default)]
    pub broker: BrokerConfig,
}

impl AppConfig {
    /// Load configuration from an optional TOML file, then apply environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path).map_err(|e| {
                    Error::Config(format!("Failed to read {}: {}", path.display(), e))
                })?;
                Self::from_toml(&raw)?
            }
            None => Self::default(),
        };

        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(raw: &str) -> Result<Self> {
        toml::from_str(raw).map_err(|e| Error::Config(format!("Invalid config file: {}", e)))
    }

    /// Apply overrides using the environment variable names of the deployed service
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("PORT") {
            self.server.port = port
                .parse()
                .map_err(|_| Error::Config(format!("PORT is not a valid port: {}", port)))?;
        }
        if let Some(uri) = lookup("LLM_URI") {
            self.generation.base_url = uri;
        }
        if let Some(path) = lookup("DATABASE_PATH") {
            self.storage.database_path = PathBuf::from(path);
        }
        if let Some(dir) = lookup("BLOB_DIR") {
            self.storage.blob_dir = PathBuf::from(dir);
        }
        if let Some(bucket) = lookup("GCS_BUCKET") {
            self.storage.blob_backend = BlobBackend::Gcs;
            self.storage.gcs_bucket = Some(bucket);
        }
        if let Some(url) = lookup("KAFKA_REST_URL") {
            self.broker.rest_url = Some(url);
        }
        Ok(())
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Enable CORS
    pub enable_cors: bool,
    /// Maximum upload size in bytes (default: 20MB)
    pub max_upload_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8002,
            enable_cors: true,
            max_upload_size: 20 * 1024 * 1024,
        }
    }
}

/// Question generation service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Base URL of the generation service
    pub base_url: String,
    /// Path of the question generation endpoint
    pub endpoint_path: String,
    /// Per-call timeout in seconds
    pub timeout_secs: u64,
    /// Upper bound on concurrent calls within one batch (None = one task per chunk, unbounded)
    pub max_concurrency: Option<usize>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8003".to_string(),
            endpoint_path: "/generate-questions".to_string(),
            timeout_secs: 120,
            max_concurrency: None,
        }
    }
}

impl GenerationConfig {
    /// Full URL of the generation endpoint
    pub fn endpoint_url(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.endpoint_path.trim_start_matches('/')
        )
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Blob store backend selection
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum BlobBackend {
    /// Local filesystem directory
    #[default]
    Local,
    /// Google Cloud Storage (requires the `gcp` feature)
    Gcs,
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// SQLite database holding materials
    pub database_path: PathBuf,
    /// Blob backend
    #[serde(default)]
    pub blob_backend: BlobBackend,
    /// Directory for the local blob backend
    pub blob_dir: PathBuf,
    /// GCS bucket (required when blob_backend = gcs)
    #[serde(default)]
    pub gcs_bucket: Option<String>,
    /// GCS object prefix (default: "pdf_files/")
    #[serde(default = "default_gcs_prefix")]
    pub gcs_prefix: String,
}

fn default_gcs_prefix() -> String {
    "pdf_files/".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("syllabus-ingest");

        Self {
            database_path: data_dir.join("materials.db"),
            blob_backend: BlobBackend::Local,
            blob_dir: data_dir.join("pdf_files"),
            gcs_bucket: None,
            gcs_prefix: default_gcs_prefix(),
        }
    }
}

/// Message broker configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrokerConfig {
    /// Kafka REST proxy URL; events are only logged when unset
    pub rest_url: Option<String>,
    /// Topic receiving chunk events
    pub topic: String,
    /// Partition key attached to every event
    pub partition_key: String,
    /// Publish request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            rest_url: None,
            topic: "syllabus".to_string(),
            partition_key: "unit".to_string(),
            timeout_secs: 10,
        }
    }
}
