//! In-memory object store for testing and local development

use crate::{
    ListPage, ObjectStore, ObjectStream, ObjectSummary, PutBody, PutObjectRequest, Result,
    StoreError,
};
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use futures::StreamExt;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Size of the chunks handed out by [`MemoryObjectStore::get_object`]
const READ_CHUNK_SIZE: usize = 64 * 1024;

#[derive(Clone, Debug)]
struct StoredObject {
    data: Bytes,
    content_type: String,
    last_modified: DateTime<Utc>,
}

/// An in-memory object store
///
/// Buckets must be created up front; operations on unknown buckets fail with
/// [`StoreError::NoSuchBucket`] like a real backend would.
#[derive(Clone, Default)]
pub struct MemoryObjectStore {
    buckets: Arc<DashMap<String, BTreeMap<String, StoredObject>>>,
}

impl MemoryObjectStore {
    /// Create a new store without buckets
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store with the given empty buckets
    pub fn with_buckets<I, S>(buckets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let store = Self::new();
        for bucket in buckets {
            store.create_bucket(bucket);
        }
        store
    }

    /// Create an empty bucket (no-op if it exists)
    pub fn create_bucket(&self, bucket: impl Into<String>) {
        self.buckets.entry(bucket.into()).or_default();
    }

    /// Insert an object directly, bypassing `put_object`
    pub fn insert(&self, bucket: &str, key: &str, content_type: &str, data: impl Into<Bytes>) {
        self.buckets.entry(bucket.to_string()).or_default().insert(
            key.to_string(),
            StoredObject {
                data: data.into(),
                content_type: content_type.to_string(),
                last_modified: Utc::now(),
            },
        );
    }

    /// Raw contents of an object, if present
    pub fn object_data(&self, bucket: &str, key: &str) -> Option<Bytes> {
        self.buckets
            .get(bucket)
            .and_then(|objects| objects.get(key).map(|o| o.data.clone()))
    }

    /// Stored content type of an object, if present
    pub fn content_type(&self, bucket: &str, key: &str) -> Option<String> {
        self.buckets
            .get(bucket)
            .and_then(|objects| objects.get(key).map(|o| o.content_type.clone()))
    }

    /// Number of objects in a bucket
    pub fn object_count(&self, bucket: &str) -> usize {
        self.buckets.get(bucket).map(|o| o.len()).unwrap_or(0)
    }

    /// All keys in a bucket, in byte order
    pub fn keys(&self, bucket: &str) -> Vec<String> {
        self.buckets
            .get(bucket)
            .map(|objects| objects.keys().cloned().collect())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put_object(&self, request: PutObjectRequest) -> Result<()> {
        let data = match request.body {
            PutBody::File(path) => Bytes::from(tokio::fs::read(&path).await?),
            PutBody::Bytes(bytes) => bytes,
        };

        if data.len() as u64 != request.content_length {
            return Err(StoreError::backend(format!(
                "content length mismatch: declared {} bytes, received {}",
                request.content_length,
                data.len()
            )));
        }

        let mut objects = self
            .buckets
            .get_mut(&request.bucket)
            .ok_or_else(|| StoreError::NoSuchBucket(request.bucket.clone()))?;

        objects.insert(
            request.key,
            StoredObject {
                data,
                content_type: request.content_type,
                last_modified: Utc::now(),
            },
        );
        Ok(())
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<ObjectStream> {
        let object = {
            let objects = self
                .buckets
                .get(bucket)
                .ok_or_else(|| StoreError::NoSuchBucket(bucket.to_string()))?;
            objects
                .get(key)
                .cloned()
                .ok_or_else(|| StoreError::NoSuchKey {
                    bucket: bucket.to_string(),
                    key: key.to_string(),
                })?
        };

        let data = object.data;
        let len = data.len();
        let chunks: Vec<Bytes> = (0..len)
            .step_by(READ_CHUNK_SIZE)
            .map(|start| data.slice(start..(start + READ_CHUNK_SIZE).min(len)))
            .collect();

        Ok(ObjectStream {
            content_type: Some(object.content_type),
            content_length: Some(len as u64),
            body: futures::stream::iter(chunks.into_iter().map(Ok)).boxed(),
        })
    }

    async fn list_objects_page(
        &self,
        bucket: &str,
        continuation_token: Option<&str>,
        max_keys: i32,
    ) -> Result<ListPage> {
        let objects = self
            .buckets
            .get(bucket)
            .ok_or_else(|| StoreError::NoSuchBucket(bucket.to_string()))?;

        let page_size = usize::try_from(max_keys.max(1)).unwrap_or(1);
        let remaining: Vec<_> = objects
            .iter()
            .filter(|(key, _)| continuation_token.is_none_or(|token| key.as_str() > token))
            .take(page_size + 1)
            .collect();

        let truncated = remaining.len() > page_size;
        let page: Vec<ObjectSummary> = remaining
            .into_iter()
            .take(page_size)
            .map(|(key, object)| ObjectSummary {
                key: Some(key.clone()),
                size: object.data.len() as u64,
                last_modified: Some(object.last_modified),
            })
            .collect();

        // The token is the last key handed out; the next page starts after it.
        let next_continuation_token = if truncated {
            page.last().and_then(|o| o.key.clone())
        } else {
            None
        };

        Ok(ListPage {
            objects: page,
            next_continuation_token,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::TryStreamExt;

    fn put(bucket: &str, key: &str, data: &'static [u8]) -> PutObjectRequest {
        PutObjectRequest {
            bucket: bucket.to_string(),
            key: key.to_string(),
            content_type: "text/plain".to_string(),
            content_length: data.len() as u64,
            body: PutBody::Bytes(Bytes::from_static(data)),
        }
    }

    #[tokio::test]
    async fn test_memory_store_put_and_get() {
        let store = MemoryObjectStore::with_buckets(["files"]);
        store.put_object(put("files", "a.txt", b"hello")).await.unwrap();

        let object = store.get_object("files", "a.txt").await.unwrap();
        assert_eq!(object.content_type.as_deref(), Some("text/plain"));
        assert_eq!(object.content_length, Some(5));

        let chunks: Vec<Bytes> = object.body.try_collect().await.unwrap();
        assert_eq!(chunks.concat(), b"hello");
    }

    #[tokio::test]
    async fn test_memory_store_put_overwrites() {
        let store = MemoryObjectStore::with_buckets(["files"]);
        store.put_object(put("files", "a.txt", b"first")).await.unwrap();
        store.put_object(put("files", "a.txt", b"second")).await.unwrap();

        assert_eq!(store.object_count("files"), 1);
        assert_eq!(store.object_data("files", "a.txt").unwrap(), "second");
    }

    #[tokio::test]
    async fn test_memory_store_put_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("upload");
        std::fs::write(&path, b"from disk").unwrap();

        let store = MemoryObjectStore::with_buckets(["files"]);
        store
            .put_object(PutObjectRequest {
                bucket: "files".to_string(),
                key: "disk.bin".to_string(),
                content_type: "application/octet-stream".to_string(),
                content_length: 9,
                body: PutBody::File(path),
            })
            .await
            .unwrap();

        assert_eq!(store.object_data("files", "disk.bin").unwrap(), "from disk");
    }

    #[tokio::test]
    async fn test_memory_store_rejects_length_mismatch() {
        let store = MemoryObjectStore::with_buckets(["files"]);
        let mut request = put("files", "a.txt", b"hello");
        request.content_length = 10;

        let result = store.put_object(request).await;
        assert!(matches!(result, Err(StoreError::Backend(_))));
        assert_eq!(store.object_count("files"), 0);
    }

    #[tokio::test]
    async fn test_memory_store_not_found() {
        let store = MemoryObjectStore::with_buckets(["files"]);

        let result = store.get_object("files", "missing").await;
        assert!(matches!(result, Err(StoreError::NoSuchKey { .. })));

        let result = store.get_object("nope", "missing").await;
        assert!(matches!(result, Err(StoreError::NoSuchBucket(_))));
    }

    #[tokio::test]
    async fn test_memory_store_large_object_is_chunked() {
        let store = MemoryObjectStore::with_buckets(["files"]);
        store.insert("files", "big.bin", "application/octet-stream", vec![7u8; 200 * 1024]);

        let object = store.get_object("files", "big.bin").await.unwrap();
        let chunks: Vec<Bytes> = object.body.try_collect().await.unwrap();
        assert_eq!(chunks.len(), 4);
        assert_eq!(chunks.iter().map(Bytes::len).sum::<usize>(), 200 * 1024);
    }

    #[tokio::test]
    async fn test_memory_store_pagination() {
        let store = MemoryObjectStore::with_buckets(["files"]);
        for key in ["c", "a", "e", "b", "d"] {
            store.insert("files", key, "text/plain", "x");
        }

        let first = store.list_objects_page("files", None, 2).await.unwrap();
        let keys: Vec<_> = first.objects.iter().filter_map(|o| o.key.clone()).collect();
        assert_eq!(keys, ["a", "b"]);
        assert_eq!(first.next_continuation_token.as_deref(), Some("b"));

        let second = store.list_objects_page("files", Some("b"), 2).await.unwrap();
        let keys: Vec<_> = second.objects.iter().filter_map(|o| o.key.clone()).collect();
        assert_eq!(keys, ["c", "d"]);

        let last = store.list_objects_page("files", Some("d"), 2).await.unwrap();
        assert_eq!(last.objects.len(), 1);
        assert!(last.next_continuation_token.is_none());
    }

    #[tokio::test]
    async fn test_memory_store_list_unknown_bucket() {
        let store = MemoryObjectStore::new();
        let result = store.list_objects_page("nope", None, 10).await;
        assert!(matches!(result, Err(StoreError::NoSuchBucket(_))));
    }
}
