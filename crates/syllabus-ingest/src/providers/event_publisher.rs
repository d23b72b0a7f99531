//! Chunk event publishing

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde_json::json;
use std::time::Duration;

use crate::config::BrokerConfig;
use crate::error::{Error, Result};
use crate::types::ChunkEvent;

/// Trait for broker producers
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish one event under the given topic and partition key
    async fn publish(&self, topic: &str, key: &str, event: &ChunkEvent) -> Result<()>;

    /// Get provider name for logging
    fn name(&self) -> &str;
}

const KAFKA_JSON_V2: &str = "application/vnd.kafka.json.v2+json";

/// Producer speaking the Kafka REST proxy v2 protocol
pub struct KafkaRestPublisher {
    client: reqwest::Client,
    base_url: String,
}

impl KafkaRestPublisher {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("Failed to create broker client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn topic_url(&self, topic: &str) -> String {
        format!("{}/topics/{}", self.base_url, topic)
    }
}

#[async_trait]
impl EventPublisher for KafkaRestPublisher {
    async fn publish(&self, topic: &str, key: &str, event: &ChunkEvent) -> Result<()> {
        let body = json!({
            "records": [{ "key": key, "value": event }]
        });

        let response = self
            .client
            .post(self.topic_url(topic))
            .header(CONTENT_TYPE, KAFKA_JSON_V2)
            .body(serde_json::to_vec(&body)?)
            .send()
            .await
            .map_err(|e| Error::publish(format!("Broker request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(Error::publish(format!(
                "Broker returned {}: {}",
                status.as_u16(),
                text
            )));
        }

        Ok(())
    }

    fn name(&self) -> &str {
        "kafka-rest"
    }
}

/// Publisher used when no broker is configured; events go to the log only
#[derive(Debug, Default)]
pub struct LogPublisher;

#[async_trait]
impl EventPublisher for LogPublisher {
    async fn publish(&self, topic: &str, key: &str, event: &ChunkEvent) -> Result<()> {
        tracing::info!(
            topic,
            key,
            chunk_id = %event.chunk_id,
            unit = %event.unit,
            "Chunk event (no broker configured)"
        );
        Ok(())
    }

    fn name(&self) -> &str {
        "log"
    }
}

/// Build the publisher selected by config
pub fn from_config(config: &BrokerConfig) -> Result<std::sync::Arc<dyn EventPublisher>> {
    match &config.rest_url {
        Some(url) => Ok(std::sync::Arc::new(KafkaRestPublisher::new(
            url.clone(),
            Duration::from_secs(config.timeout_secs),
        )?)),
        None => Ok(std::sync::Arc::new(LogPublisher)),
    }
}
