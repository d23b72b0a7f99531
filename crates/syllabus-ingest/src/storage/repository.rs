//! Async material repository over the SQLite store

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

use super::database::MaterialDb;
use crate::error::{Error, Result};
use crate::types::Material;

/// Trait for material persistence
#[async_trait]
pub trait MaterialRepository: Send + Sync {
    /// Store a new material and return its id
    async fn insert(&self, material: &Material) -> Result<Uuid>;

    /// Fetch a material; `Error::NotFound` when the id is unknown
    async fn fetch_by_id(&self, id: &Uuid) -> Result<Material>;

    /// Get provider name for logging
    fn name(&self) -> &str;
}

/// Repository backed by a SQLite file
pub struct SqliteMaterialRepository {
    db: Arc<MaterialDb>,
}

impl SqliteMaterialRepository {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self {
            db: Arc::new(MaterialDb::new(path)?),
        })
    }

    #[cfg(test)]
    pub fn in_memory() -> Result<Self> {
        Ok(Self {
            db: Arc::new(MaterialDb::in_memory()?),
        })
    }
}

#[async_trait]
impl MaterialRepository for SqliteMaterialRepository {
    async fn insert(&self, material: &Material) -> Result<Uuid> {
        // MaterialDb is sync, wrap in blocking task
        let db = self.db.clone();
        let material = material.clone();
        tokio::task::spawn_blocking(move || db.insert_material(&material))
            .await
            .map_err(|e| Error::internal(format!("Task join error: {}", e)))?
    }

    async fn fetch_by_id(&self, id: &Uuid) -> Result<Material> {
        let db = self.db.clone();
        let id = *id;
        tokio::task::spawn_blocking(move || db.get_material(&id))
            .await
            .map_err(|e| Error::internal(format!("Task join error: {}", e)))??
            .ok_or_else(|| Error::NotFound(id.to_string()))
    }

    fn name(&self) -> &str {
        "sqlite"
    }
}
