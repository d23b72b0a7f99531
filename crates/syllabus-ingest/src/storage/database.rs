//! SQLite database for persistent material storage

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::types::Material;

/// SQLite-based material table
pub struct MaterialDb {
    conn: Arc<Mutex<Connection>>,
}

/// Raw column values of one `materials` row
struct MaterialRow {
    id: String,
    subject: String,
    owner_id: String,
    role: String,
    chunks: String,
    generated: String,
    blob_url: String,
    created_at: String,
}

impl MaterialDb {
    /// Create or open the database at the given path
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)
            .map_err(|e| Error::persistence(format!("Failed to open database: {}", e)))?;

        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };

        db.migrate()?;
        Ok(db)
    }

    /// Create an in-memory database (for testing)
    #[cfg(test)]
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|e| {
            Error::persistence(format!("Failed to open in-memory database: {}", e))
        })?;

        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };

        db.migrate()?;
        Ok(db)
    }

    /// Run database migrations
    fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock();

        conn.execute_batch(
            r#"
            PRAGMA journal_mode=WAL;
            PRAGMA synchronous=NORMAL;
            PRAGMA temp_store=MEMORY;
        "#,
        )
        .map_err(|e| Error::persistence(format!("Failed to set pragmas: {}", e)))?;

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS materials (
                id TEXT PRIMARY KEY,
                subject TEXT NOT NULL,
                owner_id TEXT NOT NULL,
                role TEXT NOT NULL,
                chunks TEXT NOT NULL,
                generated TEXT NOT NULL,
                blob_url TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_materials_owner_id ON materials(owner_id);
        "#,
        )
        .map_err(|e| Error::persistence(format!("Failed to create tables: {}", e)))?;

        Ok(())
    }

    /// Insert a material; ids are never overwritten
    pub fn insert_material(&self, material: &Material) -> Result<Uuid> {
        let chunks = serde_json::to_string(&material.chunks)?;
        let generated = serde_json::to_string(&material.generated)?;

        let conn = self.conn.lock();
        conn.execute(
            r#"
            INSERT INTO materials (
                id, subject, owner_id, role, chunks, generated, blob_url, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                material.id.to_string(),
                material.subject,
                material.owner_id,
                material.role,
                chunks,
                generated,
                material.blob_url,
                material.created_at.to_rfc3339(),
            ],
        )
        .map_err(|e| Error::persistence(format!("Failed to insert material: {}", e)))?;

        Ok(material.id)
    }

    /// Get a material by id
    pub fn get_material(&self, id: &Uuid) -> Result<Option<Material>> {
        let row = {
            let conn = self.conn.lock();
            let mut stmt = conn
                .prepare(
                    "SELECT id, subject, owner_id, role, chunks, generated, blob_url, created_at \
                     FROM materials WHERE id = ?1",
                )
                .map_err(|e| Error::persistence(format!("Failed to prepare query: {}", e)))?;

            stmt.query_row(params![id.to_string()], |row| {
                Ok(MaterialRow {
                    id: row.get(0)?,
                    subject: row.get(1)?,
                    owner_id: row.get(2)?,
                    role: row.get(3)?,
                    chunks: row.get(4)?,
                    generated: row.get(5)?,
                    blob_url: row.get(6)?,
                    created_at: row.get(7)?,
                })
            })
            .optional()
            .map_err(|e| Error::persistence(format!("Failed to get material: {}", e)))?
        };

        row.map(row_to_material).transpose()
    }

    /// Number of stored materials
    #[cfg(test)]
    pub fn count(&self) -> Result<usize> {
        let conn = self.conn.lock();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM materials", [], |row| row.get(0))
            .map_err(|e| Error::persistence(format!("Failed to count materials: {}", e)))?;
        Ok(count as usize)
    }
}

fn row_to_material(row: MaterialRow) -> Result<Material> {
    let id = Uuid::parse_str(&row.id)
        .map_err(|e| Error::persistence(format!("Corrupt material id {}: {}", row.id, e)))?;
    let created_at = DateTime::parse_from_rfc3339(&row.created_at)
        .map_err(|e| Error::persistence(format!("Corrupt timestamp for {}: {}", id, e)))?
        .with_timezone(&Utc);

    Ok(Material {
        id,
        subject: row.subject,
        owner_id: row.owner_id,
        role: row.role,
        chunks: serde_json::from_str(&row.chunks)?,
        generated: serde_json::from_str(&row.generated)?,
        blob_url: row.blob_url,
        created_at,
    })
}
