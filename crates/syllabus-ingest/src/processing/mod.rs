//! Ingest orchestration: fan-out generation, persistence and republishing

mod fan_out;
mod ingest;
mod republisher;

pub use fan_out::FanOutCoordinator;
pub use ingest::{IngestOutcome, IngestService, UploadRequest};
pub use republisher::EventRepublisher;
