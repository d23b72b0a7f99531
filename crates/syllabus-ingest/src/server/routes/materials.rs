//! Material upload and reprocess endpoints

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::processing::UploadRequest;
use crate::server::state::AppState;
use crate::types::{
    AuthContext, QuestionCounts, RawDocument, ReprocessResponse, UploadResponse,
};

/// POST /api/ingestion/upload - Chunk a syllabus PDF and generate questions for every unit
pub async fn upload_material(
    State(state): State<AppState>,
    caller: AuthContext,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>)> {
    let mut subject = None;
    let mut role = None;
    let mut counts = QuestionCounts::default();
    let mut document = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::input(format!("Failed to read multipart field: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();

        if name == "file" {
            let filename = field
                .file_name()
                .map(|s| s.to_string())
                .unwrap_or_else(|| "syllabus.pdf".to_string());
            let data = field
                .bytes()
                .await
                .map_err(|e| Error::input(format!("Failed to read file: {}", e)))?;
            tracing::info!("Received file: {} ({} bytes)", filename, data.len());
            document = Some(RawDocument::new(filename, data));
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| Error::input(format!("Failed to read field '{}': {}", name, e)))?;

        match name.as_str() {
            "subject" => subject = Some(value),
            "role" => role = Some(value),
            "num_3marks" => counts.three_marks = parse_count(&name, &value)?,
            "num_4marks" => counts.four_marks = parse_count(&name, &value)?,
            "num_10marks" => counts.ten_marks = parse_count(&name, &value)?,
            _ => tracing::debug!("Ignoring unknown field '{}'", name),
        }
    }

    let request = UploadRequest {
        subject: subject.ok_or_else(|| Error::input("subject is required"))?,
        role: role.ok_or_else(|| Error::input("role is required"))?,
        counts,
        document: document.ok_or_else(|| Error::input("file is required"))?,
    };

    let outcome = state.ingest().ingest(&caller, request).await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(UploadResponse::new(
            outcome.material_id,
            outcome.questions,
            outcome.blob_url,
        )),
    ))
}

/// POST /api/ingestion/reprocess/:id - Re-chunk a stored material and publish its chunks
pub async fn reprocess_material(
    State(state): State<AppState>,
    caller: AuthContext,
    Path(id): Path<String>,
) -> Result<Json<ReprocessResponse>> {
    let id = Uuid::parse_str(&id).map_err(|_| Error::input(format!("Invalid material id: {}", id)))?;

    tracing::info!("Reprocessing material {} for {}", id, caller.user_id);
    let _ = state.ingest().reprocess(id, caller);

    Ok(Json(ReprocessResponse::default()))
}

/// Empty means zero; anything else must be a non-negative integer
fn parse_count(field: &str, value: &str) -> Result<u32> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(0);
    }
    value
        .parse()
        .map_err(|_| Error::input(format!("{} must be a non-negative integer, got '{}'", field, value)))
}
