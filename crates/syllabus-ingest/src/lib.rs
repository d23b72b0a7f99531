//! syllabus-ingest: syllabus PDF ingestion with per-unit question generation
//!
//! Uploaded PDFs are split into unit chunks, questions are generated for every unit
//! concurrently, and the material is persisted only if every unit succeeded. Stored
//! materials can later be re-chunked and published to a message broker.

pub mod config;
pub mod error;
pub mod generation;
pub mod ingestion;
pub mod processing;
pub mod providers;
pub mod server;
pub mod storage;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use config::AppConfig;
pub use error::{Error, Result};
pub use generation::{GenerationError, QuestionGenClient, QuestionGenerator};
pub use processing::{EventRepublisher, FanOutCoordinator, IngestService};
pub use types::{ChunkEvent, GenerationRequest, GenerationResult, Material, UnitChunk};
