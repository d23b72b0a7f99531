//! Concurrent question generation over the unit chunks of one document

use futures::future::join_all;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::Semaphore;

use crate::generation::{GenerationError, QuestionGenerator};
use crate::types::{GenerationRequest, GenerationResult, QuestionCounts, UnitChunk};

/// Runs one generation call per chunk and joins them as a batch.
///
/// Every call runs to completion even after a sibling fails; there is no cancellation.
/// The batch succeeds only if every call succeeded, in which case results come back in
/// completion order. Otherwise the first error to arrive is returned and later ones are
/// only logged.
#[derive(Clone)]
pub struct FanOutCoordinator {
    generator: Arc<dyn QuestionGenerator>,
    max_concurrency: Option<usize>,
}

impl FanOutCoordinator {
    /// `max_concurrency` caps in-flight calls per batch; `None` starts every call at once
    pub fn new(generator: Arc<dyn QuestionGenerator>, max_concurrency: Option<usize>) -> Self {
        Self {
            generator,
            max_concurrency,
        }
    }

    pub async fn run(
        &self,
        subject: &str,
        chunks: &[UnitChunk],
        counts: QuestionCounts,
    ) -> std::result::Result<Vec<GenerationResult>, GenerationError> {
        tracing::info!(
            "Generating questions for {} units of '{}' via {}",
            chunks.len(),
            subject,
            self.generator.name()
        );

        let results: Arc<Mutex<Vec<GenerationResult>>> =
            Arc::new(Mutex::new(Vec::with_capacity(chunks.len())));
        let first_error: Arc<Mutex<Option<GenerationError>>> = Arc::default();
        let limiter = self
            .max_concurrency
            .map(|n| Arc::new(Semaphore::new(n.max(1))));

        let handles: Vec<_> = chunks
            .iter()
            .enumerate()
            .map(|(index, chunk)| {
                let generator = self.generator.clone();
                let results = results.clone();
                let first_error = first_error.clone();
                let limiter = limiter.clone();
                let unit = chunk.unit.clone();
                let request = GenerationRequest::new(subject, chunk.content.clone(), counts);

                tokio::spawn(async move {
                    let _permit = match limiter {
                        Some(limiter) => match limiter.acquire_owned().await {
                            Ok(permit) => Some(permit),
                            Err(e) => {
                                record_error(&first_error, GenerationError::TaskFailed(e.to_string()));
                                return;
                            }
                        },
                        None => None,
                    };

                    match generator.generate(&request).await {
                        Ok(result) => {
                            tracing::debug!("Unit #{} ({}) generated", index, unit);
                            results.lock().push(result);
                        }
                        Err(e) => {
                            tracing::warn!("Unit #{} ({}) failed: {}", index, unit, e);
                            record_error(&first_error, e);
                        }
                    }
                })
            })
            .collect();

        for joined in join_all(handles).await {
            if let Err(e) = joined {
                record_error(&first_error, GenerationError::TaskFailed(e.to_string()));
            }
        }

        if let Some(error) = first_error.lock().take() {
            return Err(error);
        }

        let results = std::mem::take(&mut *results.lock());
        tracing::info!("Generated questions for all {} units", results.len());
        Ok(results)
    }
}

/// Keep the first error; later ones are dropped after logging
fn record_error(slot: &Mutex<Option<GenerationError>>, error: GenerationError) {
    let mut slot = slot.lock();
    if slot.is_none() {
        *slot = Some(error);
    } else {
        tracing::warn!("Discarding later generation error: {}", error);
    }
}
