//! Storage module for persistent data storage
//!
//! Provides SQLite-based persistence for materials.

mod database;
mod repository;

pub use database::MaterialDb;
pub use repository::{MaterialRepository, SqliteMaterialRepository};
