//! Best-effort re-publication of stored chunks to the broker

use chrono::Utc;
use futures::future::join_all;
use std::sync::Arc;
use uuid::Uuid;

use crate::config::BrokerConfig;
use crate::providers::EventPublisher;
use crate::types::{AuthContext, ChunkEvent, UnitChunk};

/// Emits one `ChunkEvent` per chunk to a fixed topic.
///
/// Publish failures are logged and never reach the caller.
#[derive(Clone)]
pub struct EventRepublisher {
    publisher: Arc<dyn EventPublisher>,
    topic: String,
    key: String,
}

impl EventRepublisher {
    pub fn new(
        publisher: Arc<dyn EventPublisher>,
        topic: impl Into<String>,
        key: impl Into<String>,
    ) -> Self {
        Self {
            publisher,
            topic: topic.into(),
            key: key.into(),
        }
    }

    pub fn from_config(publisher: Arc<dyn EventPublisher>, config: &BrokerConfig) -> Self {
        Self::new(publisher, config.topic.clone(), config.partition_key.clone())
    }

    /// Build events for the chunks, each with a fresh id
    pub fn events(subject: &str, caller: &AuthContext, chunks: &[UnitChunk]) -> Vec<ChunkEvent> {
        let created_at = Utc::now();
        chunks
            .iter()
            .map(|chunk| ChunkEvent {
                chunk_id: Uuid::new_v4(),
                unit: chunk.unit.clone(),
                content: chunk.content.clone(),
                subject: subject.to_string(),
                teacher_id: caller.user_id.clone(),
                uploaded_by: caller.role.clone(),
                created_at,
            })
            .collect()
    }

    /// Publish all events concurrently; returns how many were accepted
    pub async fn publish_all(&self, events: Vec<ChunkEvent>) -> usize {
        let total = events.len();
        let outcomes = join_all(events.iter().map(|event| async move {
            match self.publisher.publish(&self.topic, &self.key, event).await {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!(
                        "Failed to publish chunk {} ({}) via {}: {}",
                        event.chunk_id,
                        event.unit,
                        self.publisher.name(),
                        e
                    );
                    false
                }
            }
        }))
        .await;

        let published = outcomes.into_iter().filter(|ok| *ok).count();
        tracing::info!(
            "Published {}/{} chunk events to '{}'",
            published,
            total,
            self.topic
        );
        published
    }
}
