//! Shared test fixtures: generated PDFs, a loopback HTTP server and in-memory doubles

use async_trait::async_trait;
use axum::Router;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::generation::{GenerationError, QuestionGenerator};
use crate::providers::{BlobStore, EventPublisher};
use crate::storage::MaterialRepository;
use crate::types::{ChunkEvent, GenerationRequest, GenerationResult, Material};

/// Build a PDF with one line of Courier text per page
pub(crate) fn sample_pdf(pages: &[&str]) -> Vec<u8> {
    build_pdf(pages.iter().map(|text| vec![*text]).collect())
}

/// Build a one-page PDF whose lines all sit in a single BT..ET text block
pub(crate) fn single_block_pdf(lines: &[&str]) -> Vec<u8> {
    build_pdf(vec![lines.to_vec()])
}

fn build_pdf(pages: Vec<Vec<&str>>) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for lines in pages {
        let mut operations = vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 12.into()]),
            Operation::new("Td", vec![72.into(), 720.into()]),
        ];
        for (i, line) in lines.iter().enumerate() {
            if i > 0 {
                operations.push(Operation::new("Td", vec![0.into(), (-14).into()]));
            }
            operations.push(Operation::new("Tj", vec![Object::string_literal(*line)]));
        }
        operations.push(Operation::new("ET", vec![]));

        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().expect("content stream encodes"),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf).expect("pdf serializes");
    buf
}

/// Serve a router on an ephemeral loopback port; returns its base URL
pub(crate) async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

/// In-memory blob store counting calls
#[derive(Default)]
pub(crate) struct SpyBlobStore {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
    pub uploads: AtomicUsize,
    pub downloads: AtomicUsize,
    pub fail_uploads: bool,
}

impl SpyBlobStore {
    pub fn failing() -> Self {
        Self {
            fail_uploads: true,
            ..Default::default()
        }
    }

    pub fn uploads(&self) -> usize {
        self.uploads.load(Ordering::SeqCst)
    }

    pub fn put(&self, url: &str, data: &[u8]) {
        self.blobs.lock().insert(url.to_string(), data.to_vec());
    }
}

#[async_trait]
impl BlobStore for SpyBlobStore {
    async fn upload(&self, data: &[u8], filename: &str) -> Result<String> {
        self.uploads.fetch_add(1, Ordering::SeqCst);
        if self.fail_uploads {
            return Err(Error::persistence("blob store unavailable"));
        }
        let url = format!("mem://{}-{}", Uuid::new_v4(), filename);
        self.put(&url, data);
        Ok(url)
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>> {
        self.downloads.fetch_add(1, Ordering::SeqCst);
        self.blobs
            .lock()
            .get(url)
            .cloned()
            .ok_or_else(|| Error::persistence(format!("no blob at {}", url)))
    }

    fn name(&self) -> &str {
        "spy"
    }
}

/// In-memory material repository counting inserts
#[derive(Default)]
pub(crate) struct SpyRepository {
    materials: Mutex<HashMap<Uuid, Material>>,
    pub inserts: AtomicUsize,
}

impl SpyRepository {
    pub fn inserts(&self) -> usize {
        self.inserts.load(Ordering::SeqCst)
    }

    pub fn get(&self, id: &Uuid) -> Option<Material> {
        self.materials.lock().get(id).cloned()
    }
}

#[async_trait]
impl MaterialRepository for SpyRepository {
    async fn insert(&self, material: &Material) -> Result<Uuid> {
        self.inserts.fetch_add(1, Ordering::SeqCst);
        self.materials.lock().insert(material.id, material.clone());
        Ok(material.id)
    }

    async fn fetch_by_id(&self, id: &Uuid) -> Result<Material> {
        self.get(id).ok_or_else(|| Error::NotFound(id.to_string()))
    }

    fn name(&self) -> &str {
        "spy"
    }
}

/// Scripted behaviour for one unit text
#[derive(Clone)]
pub(crate) struct Script {
    pub delay: Duration,
    pub outcome: std::result::Result<GenerationResult, GenerationError>,
}

/// Generator whose delay and outcome are scripted per unit text.
///
/// Unscripted units succeed immediately with their own text as the question payload.
#[derive(Default)]
pub(crate) struct ScriptedGenerator {
    scripts: HashMap<String, Script>,
    fail_containing: Option<(String, GenerationError)>,
    completed: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(mut self, unit_text: &str, delay: Duration) -> Self {
        self.scripts.insert(
            unit_text.to_string(),
            Script {
                delay,
                outcome: Ok(Self::echo(unit_text)),
            },
        );
        self
    }

    pub fn with_failure(mut self, unit_text: &str, delay: Duration, error: GenerationError) -> Self {
        self.scripts.insert(
            unit_text.to_string(),
            Script {
                delay,
                outcome: Err(error),
            },
        );
        self
    }

    /// Fail every unit whose text contains `needle`
    pub fn failing_when_contains(mut self, needle: &str, error: GenerationError) -> Self {
        self.fail_containing = Some((needle.to_string(), error));
        self
    }

    pub fn echo(unit_text: &str) -> GenerationResult {
        GenerationResult {
            success: true,
            questions: serde_json::Value::String(unit_text.to_string()),
        }
    }

    /// Calls that ran to completion, success or failure
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QuestionGenerator for ScriptedGenerator {
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> std::result::Result<GenerationResult, GenerationError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let script = self.scripts.get(&request.unit_syllabus).cloned();
        let matched_failure = self
            .fail_containing
            .as_ref()
            .filter(|(needle, _)| request.unit_syllabus.contains(needle.as_str()))
            .map(|(_, error)| error.clone());

        let outcome = match (script, matched_failure) {
            (Some(script), _) => {
                tokio::time::sleep(script.delay).await;
                script.outcome
            }
            (None, Some(error)) => {
                tokio::task::yield_now().await;
                Err(error)
            }
            (None, None) => {
                tokio::task::yield_now().await;
                Ok(Self::echo(&request.unit_syllabus))
            }
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.completed.fetch_add(1, Ordering::SeqCst);
        outcome
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Publisher recording every event; units listed in `fail_units` are rejected
#[derive(Default)]
pub(crate) struct RecordingPublisher {
    events: Mutex<Vec<(String, String, ChunkEvent)>>,
    fail_units: Vec<String>,
    attempts: AtomicUsize,
}

impl RecordingPublisher {
    pub fn failing_for(units: &[&str]) -> Self {
        Self {
            fail_units: units.iter().map(|u| u.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn events(&self) -> Vec<(String, String, ChunkEvent)> {
        self.events.lock().clone()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EventPublisher for RecordingPublisher {
    async fn publish(&self, topic: &str, key: &str, event: &ChunkEvent) -> Result<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail_units.contains(&event.unit) {
            return Err(Error::publish(format!("broker rejected {}", event.unit)));
        }
        self.events
            .lock()
            .push((topic.to_string(), key.to_string(), event.clone()));
        Ok(())
    }

    fn name(&self) -> &str {
        "recording"
    }
}

