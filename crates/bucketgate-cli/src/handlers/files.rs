//! Bucket listing handler

use crate::{ApiError, AppState};
use axum::{
    extract::{Path, State},
    Json,
};
use bucketgate_core::FileInfo;
use std::sync::Arc;

/// GET /files/{region}/{bucket} - List every file in a bucket
pub async fn list_files(
    State(state): State<Arc<AppState>>,
    Path((region, bucket)): Path<(String, String)>,
) -> Result<Json<Vec<FileInfo>>, ApiError> {
    let files = state.gateway.list_files(&region, &bucket).await?;
    Ok(Json(files))
}
