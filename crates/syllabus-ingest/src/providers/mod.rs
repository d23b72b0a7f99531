//! Provider abstractions for blob storage and event publishing
//!
//! Trait-based so the local backends, GCS and the broker REST proxy can be swapped by config.

pub mod blob_store;
pub mod event_publisher;

#[cfg(feature = "gcp")]
pub mod gcs_store;

pub use blob_store::{BlobStore, LocalBlobStore};
pub use event_publisher::{EventPublisher, KafkaRestPublisher, LogPublisher};

#[cfg(feature = "gcp")]
pub use gcs_store::GcsBlobStore;
