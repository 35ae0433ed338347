//! Error types and HTTP error codes

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use bucketgate_core::GatewayError;
use serde::Serialize;
use thiserror::Error;

/// Machine-readable error codes carried in error bodies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    InvalidRegion,
    InvalidBucket,
    MissingFile,
    MissingTarget,
    InvalidFilename,
    InvalidUpload,
    NotFound,
    PayloadTooLarge,
    RateLimited,
    BackendError,
    InternalError,
}

impl ErrorCode {
    /// Get the error code string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidRegion => "InvalidRegion",
            Self::InvalidBucket => "InvalidBucket",
            Self::MissingFile => "MissingFile",
            Self::MissingTarget => "MissingTarget",
            Self::InvalidFilename => "InvalidFilename",
            Self::InvalidUpload => "InvalidUpload",
            Self::NotFound => "NotFound",
            Self::PayloadTooLarge => "PayloadTooLarge",
            Self::RateLimited => "RateLimited",
            Self::BackendError => "BackendError",
            Self::InternalError => "InternalError",
        }
    }

    /// Get the HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRegion
            | Self::InvalidBucket
            | Self::MissingFile
            | Self::MissingTarget
            | Self::InvalidFilename
            | Self::InvalidUpload => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::BackendError | Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// API error type
#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("Too many requests, please slow down.")]
    RateLimited,

    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: String,
    code: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl ApiError {
    /// Get the error code
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::Gateway(e) => match e {
                GatewayError::UnknownRegion(_) => ErrorCode::InvalidRegion,
                GatewayError::BucketNotAllowed { .. } => ErrorCode::InvalidBucket,
                GatewayError::MissingFile => ErrorCode::MissingFile,
                GatewayError::MissingTarget => ErrorCode::MissingTarget,
                GatewayError::InvalidFilename(_) => ErrorCode::InvalidFilename,
                GatewayError::InvalidUpload(_) => ErrorCode::InvalidUpload,
                GatewayError::ObjectNotFound { .. } => ErrorCode::NotFound,
                GatewayError::PayloadTooLarge(_) => ErrorCode::PayloadTooLarge,
                GatewayError::BackendFailure(_) => ErrorCode::BackendError,
                GatewayError::Staging(_) => ErrorCode::InternalError,
            },
            Self::RateLimited => ErrorCode::RateLimited,
            Self::Internal(_) => ErrorCode::InternalError,
        }
    }

    fn details(&self) -> Option<String> {
        match self {
            Self::Gateway(e) => e.details(),
            _ => None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let code = self.error_code();
        let status = code.status_code();

        if status.is_server_error() {
            tracing::error!(code = code.as_str(), error = %self, "Request failed");
        } else {
            tracing::debug!(code = code.as_str(), error = %self, "Request rejected");
        }

        // The request-id middleware stamps the header on the way out.
        let body = ErrorBody {
            error: self.to_string(),
            code: code.as_str(),
            details: self.details(),
        };
        (status, Json(body)).into_response()
    }
}
