//! Error types for the bucketgate-core crate

use bucketgate_store::StoreError;
use thiserror::Error;

/// Result type alias using `GatewayError`
pub type Result<T> = std::result::Result<T, GatewayError>;

/// Errors surfaced by the gateway services
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Region is not in the registry
    #[error("Invalid region: {0}")]
    UnknownRegion(String),

    /// Bucket is not whitelisted for the region
    #[error("Invalid bucket '{bucket}' for region '{region}'")]
    BucketNotAllowed { region: String, bucket: String },

    /// Upload request carried no file
    #[error("No file was uploaded.")]
    MissingFile,

    /// Upload request carried no region or bucket
    #[error("Region and bucket must be selected.")]
    MissingTarget,

    /// Filename has no usable base name
    #[error("Invalid filename: {0:?}")]
    InvalidFilename(String),

    /// Object could not be opened for streaming
    #[error("File not found.")]
    ObjectNotFound {
        bucket: String,
        key: String,
        #[source]
        source: StoreError,
    },

    /// Backend failure during listing or upload; the message is the backend's
    #[error("{0}")]
    BackendFailure(#[source] StoreError),

    /// Temp file I/O failed while staging an upload
    #[error("failed to stage upload: {0}")]
    Staging(#[from] std::io::Error),

    /// Multipart body could not be read
    #[error("malformed upload: {0}")]
    InvalidUpload(String),

    /// Upload exceeded the configured size limit
    #[error("upload too large: {0}")]
    PayloadTooLarge(String),
}

impl GatewayError {
    /// Detail string for not-found responses
    pub fn details(&self) -> Option<String> {
        match self {
            Self::ObjectNotFound { source, .. } => Some(source.to_string()),
            _ => None,
        }
    }
}
