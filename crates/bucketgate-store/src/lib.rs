//! # Bucketgate Store
//!
//! Object storage layer for the bucketgate file gateway.
//!
//! This crate provides:
//! - **ObjectStore trait**: Put, streamed get, and paginated listing
//! - **S3 backend**: Any S3-compatible endpoint via `aws-sdk-s3`
//! - **Memory backend**: In-process store for tests and local development
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │            Gateway Services             │
//! ├─────────────────────────────────────────┤
//! │           ObjectStore Trait             │
//! ├────────────────────┬────────────────────┤
//! │   S3ObjectStore    │ MemoryObjectStore  │
//! ├────────────────────┴────────────────────┤
//! │     S3-compatible object storage        │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use bucketgate_store::{ObjectStore, S3ObjectStore, S3StoreConfig};
//!
//! let store = S3ObjectStore::new(&config)?;
//! let page = store.list_objects_page("my-bucket", None, 1000).await?;
//! ```

pub mod error;
pub mod memory;
pub mod s3;

pub use error::{Result, StoreError};
pub use memory::MemoryObjectStore;
pub use s3::{S3ObjectStore, S3StoreConfig};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::stream::BoxStream;
use std::path::PathBuf;

/// Largest page a single listing call may request
pub const MAX_LIST_PAGE_SIZE: i32 = 1000;

/// Body of a streamed object download
pub type ByteStream = BoxStream<'static, std::io::Result<Bytes>>;

/// Source of the bytes written by [`ObjectStore::put_object`]
#[derive(Clone, Debug)]
pub enum PutBody {
    /// Stream the contents of a file on local disk
    File(PathBuf),
    /// Small in-memory payload
    Bytes(Bytes),
}

/// A single put-object call
#[derive(Clone, Debug)]
pub struct PutObjectRequest {
    pub bucket: String,
    pub key: String,
    pub content_type: String,
    /// Exact number of bytes in `body`
    pub content_length: u64,
    pub body: PutBody,
}

/// One entry of a listing page, as reported by the backend
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObjectSummary {
    /// Object key; some backends omit it on malformed entries
    pub key: Option<String>,
    pub size: u64,
    pub last_modified: Option<DateTime<Utc>>,
}

/// One page of a list-objects-v2 style listing
#[derive(Clone, Debug, Default)]
pub struct ListPage {
    pub objects: Vec<ObjectSummary>,
    /// Present when more pages follow
    pub next_continuation_token: Option<String>,
}

/// An object being streamed out of the store
pub struct ObjectStream {
    pub content_type: Option<String>,
    pub content_length: Option<u64>,
    pub body: ByteStream,
}

impl std::fmt::Debug for ObjectStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectStream")
            .field("content_type", &self.content_type)
            .field("content_length", &self.content_length)
            .finish_non_exhaustive()
    }
}

/// Trait for object storage backends
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store an object, replacing any existing object under the same key
    async fn put_object(&self, request: PutObjectRequest) -> Result<()>;

    /// Open an object for streaming
    async fn get_object(&self, bucket: &str, key: &str) -> Result<ObjectStream>;

    /// Fetch a single listing page of at most `max_keys` entries
    async fn list_objects_page(
        &self,
        bucket: &str,
        continuation_token: Option<&str>,
        max_keys: i32,
    ) -> Result<ListPage>;
}
