//! Multipart upload handler

use crate::{ApiError, AppState};
use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use bucketgate_core::{sanitize, GatewayError, StagedFile};
use futures::TryStreamExt;
use serde::Serialize;
use std::sync::Arc;

/// Body of a successful upload
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub message: String,
    pub key: String,
}

fn multipart_error(err: MultipartError) -> GatewayError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        GatewayError::PayloadTooLarge(err.body_text())
    } else {
        GatewayError::InvalidUpload(err.body_text())
    }
}

fn non_empty(value: String) -> Option<String> {
    Some(value).filter(|v| !v.trim().is_empty())
}

/// POST /upload - Upload one file (`file`, `region`, `bucket` fields)
///
/// The file part is spooled to the upload directory, then sent to the backend
/// under its sanitized name.
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    let mut region: Option<String> = None;
    let mut bucket: Option<String> = None;
    let mut staged: Option<(String, StagedFile)> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("region") => region = non_empty(field.text().await.map_err(multipart_error)?),
            Some("bucket") => bucket = non_empty(field.text().await.map_err(multipart_error)?),
            Some("file") => {
                // No file name means no file chosen, or a plain text field.
                let Some(filename) = field
                    .file_name()
                    .filter(|name| !name.is_empty())
                    .map(str::to_string)
                else {
                    continue;
                };
                if staged.is_some() {
                    return Err(GatewayError::InvalidUpload(
                        "only one file may be uploaded per request".to_string(),
                    )
                    .into());
                }

                // Reject what can be rejected before touching the disk.
                sanitize(&filename)?;
                if let (Some(region), Some(bucket)) = (&region, &bucket) {
                    state.gateway.validate(region, bucket)?;
                }

                let body = field.map_err(multipart_error);
                let file = StagedFile::spool(&state.config.upload_dir, body).await?;
                staged = Some((filename, file));
            }
            _ => {}
        }
    }

    let (filename, file) = staged.ok_or(GatewayError::MissingFile)?;
    let (Some(region), Some(bucket)) = (region, bucket) else {
        return Err(GatewayError::MissingTarget.into());
    };
    let target = state.gateway.validate(&region, &bucket)?;

    let outcome = state.gateway.upload(&target, &filename, file).await?;

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            success: true,
            message: outcome.message(),
            key: outcome.key,
        }),
    )
        .into_response())
}
