//! Core types for the ingestion service

pub mod auth;
pub mod generation;
pub mod material;
pub mod response;

pub use auth::AuthContext;
pub use generation::{GenerationRequest, GenerationResult};
pub use material::{ChunkEvent, Material, NewMaterial, QuestionCounts, RawDocument, UnitChunk};
pub use response::{ReprocessResponse, UploadResponse};
