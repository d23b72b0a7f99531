//! API routes for the ingestion server

pub mod materials;

use axum::{extract::DefaultBodyLimit, routing::post, Router};

use crate::server::state::AppState;

/// Build all ingestion routes
pub fn api_routes(max_upload_size: usize) -> Router<AppState> {
    Router::new()
        .route(
            "/upload",
            post(materials::upload_material).layer(DefaultBodyLimit::max(max_upload_size)),
        )
        .route("/reprocess/:id", post(materials::reprocess_material))
}
