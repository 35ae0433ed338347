//! Object streaming handlers (raw view and download)

use crate::{ApiError, AppState};
use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::Response,
};
use bucketgate_core::{download::CACHE_CONTROL, StreamDisposition};
use std::sync::Arc;

/// GET /raw/{region}/{bucket}/{filename} - Stream an object for inline display
pub async fn raw_file(
    State(state): State<Arc<AppState>>,
    Path((region, bucket, filename)): Path<(String, String, String)>,
) -> Result<Response, ApiError> {
    stream_file(&state, &region, &bucket, &filename, StreamDisposition::Inline).await
}

/// GET /download/{region}/{bucket}/{filename} - Stream an object as an attachment
pub async fn download_file(
    State(state): State<Arc<AppState>>,
    Path((region, bucket, filename)): Path<(String, String, String)>,
) -> Result<Response, ApiError> {
    stream_file(&state, &region, &bucket, &filename, StreamDisposition::Attachment).await
}

async fn stream_file(
    state: &AppState,
    region: &str,
    bucket: &str,
    filename: &str,
    disposition: StreamDisposition,
) -> Result<Response, ApiError> {
    let download = state
        .gateway
        .open(region, bucket, filename, disposition)
        .await?;

    let mut response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, download.content_type.as_str())
        .header(header::CACHE_CONTROL, CACHE_CONTROL);

    if let Some(length) = download.content_length {
        response = response.header(header::CONTENT_LENGTH, length);
    }
    if let Some(value) = download.content_disposition() {
        response = response.header(header::CONTENT_DISPOSITION, value);
    }

    tracing::debug!(
        region,
        bucket,
        key = filename,
        disposition = disposition.as_str(),
        "Streaming object"
    );

    response
        .body(Body::from_stream(download.body))
        .map_err(|e| ApiError::Internal(format!("failed to build response: {e}")))
}
