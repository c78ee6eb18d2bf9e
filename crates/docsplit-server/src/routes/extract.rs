//! Upload routes: `/extract-text/` and `/extract-chunks/`.
//!
//! Both accept a multipart body whose first file field is the document.
//! The format is chosen from that field's filename.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Multipart, Query, State};
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::debug;

use docsplit_core::Error;
use docsplit_ingest::{ChunkParams, Ingester};

use crate::error::ApiError;
use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/extract-text/", post(extract_text))
        .route("/extract-text", post(extract_text))
        .route("/extract-chunks/", post(extract_chunks))
        .route("/extract-chunks", post(extract_chunks))
}

#[derive(Debug, Default, Deserialize)]
pub struct ChunkQuery {
    pub sentences_per_chunk: Option<i64>,
    pub overlap: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct TextResponse {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct ChunksResponse {
    pub chunks: Vec<String>,
}

struct Upload {
    filename: String,
    bytes: Bytes,
}

/// POST /extract-text/: full text of the uploaded document.
async fn extract_text(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<TextResponse>, ApiError> {
    let upload = read_upload(&mut multipart).await?;

    let text = run_blocking(state, move |ingester| {
        ingester.extract_text(&upload.bytes, &upload.filename)
    })
    .await?;

    Ok(Json(TextResponse { text }))
}

/// POST /extract-chunks/: overlapping sentence windows of the document.
///
/// Query parameters are checked before the upload is read.
async fn extract_chunks(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ChunkQuery>, QueryRejection>,
    mut multipart: Multipart,
) -> Result<Json<ChunksResponse>, ApiError> {
    let Query(query) = query.map_err(|e| Error::InvalidParameters(e.body_text()))?;
    let params = ChunkParams::new(
        query
            .sentences_per_chunk
            .unwrap_or(state.config.default_sentences_per_chunk),
        query.overlap.unwrap_or(state.config.default_overlap),
    )?;

    let upload = read_upload(&mut multipart).await?;

    let chunks = run_blocking(state, move |ingester| {
        ingester.extract_chunks(&upload.bytes, &upload.filename, &params)
    })
    .await?;

    Ok(Json(ChunksResponse { chunks }))
}

/// First multipart field carrying a filename. Other fields are ignored.
async fn read_upload(multipart: &mut Multipart) -> Result<Upload, ApiError> {
    while let Some(field) = multipart.next_field().await? {
        let filename = match field.file_name() {
            Some(name) => name.to_string(),
            None => continue,
        };
        let bytes = field.bytes().await?;
        debug!("Received upload {} ({} bytes)", filename, bytes.len());
        return Ok(Upload { filename, bytes });
    }

    Err(Error::Http("request must include a file upload field".to_string()).into())
}

/// Run CPU-bound extraction off the async workers.
async fn run_blocking<T, F>(state: Arc<AppState>, job: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&Ingester<'_>) -> docsplit_core::Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(move || job(&state.ingester()))
        .await
        .map_err(|e| Error::Internal(format!("extraction task failed: {e}")))?
        .map_err(ApiError::from)
}
