//! Upload staging and forwarding

use crate::{classify, sanitize, GatewayError, Result, ValidatedTarget};
use bucketgate_store::{ObjectStore, PutBody, PutObjectRequest};
use bytes::Bytes;
use futures::{Stream, StreamExt};
use std::path::Path;
use tempfile::TempPath;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

/// An upload body spooled to a temp file
///
/// The file is deleted when this value is dropped, whichever path the request
/// takes.
#[derive(Debug)]
pub struct StagedFile {
    path: TempPath,
    size: u64,
}

impl StagedFile {
    /// Write `body` chunk by chunk into a new temp file under `dir`
    ///
    /// A failing chunk aborts the spool and removes the partial file.
    pub async fn spool<S>(dir: &Path, body: S) -> Result<Self>
    where
        S: Stream<Item = Result<Bytes>>,
    {
        tokio::fs::create_dir_all(dir).await?;
        let named = tempfile::Builder::new()
            .prefix("bucketgate-")
            .suffix(".part")
            .tempfile_in(dir)?;
        let mut file = tokio::fs::File::from_std(named.as_file().try_clone()?);
        let path = named.into_temp_path();

        let mut body = std::pin::pin!(body);
        let mut size = 0u64;
        while let Some(chunk) = body.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            size += chunk.len() as u64;
        }
        file.flush().await?;
        drop(file);

        debug!(path = %path.display(), size, "Staged upload");
        Ok(Self { path, size })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    /// Remove the temp file now, logging instead of failing
    pub fn discard(self) {
        let shown = self.path.display().to_string();
        if let Err(e) = self.path.close() {
            warn!(path = %shown, error = %e, "Failed to delete staged upload");
        }
    }
}

/// Result of a successful upload
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadOutcome {
    pub key: String,
    pub size: u64,
    pub content_type: &'static str,
}

impl UploadOutcome {
    pub fn message(&self) -> String {
        format!("File '{}' uploaded successfully!", self.key)
    }
}

/// Store a staged upload under the sanitized form of `original_filename`
///
/// The content type comes from the sanitized name; whatever the client sent is
/// ignored. The staged file is removed before returning.
pub async fn upload_file(
    store: &dyn ObjectStore,
    target: &ValidatedTarget,
    original_filename: &str,
    staged: StagedFile,
) -> Result<UploadOutcome> {
    let key = sanitize(original_filename)?;
    let content_type = classify(&key).mime_type;

    let result = store
        .put_object(PutObjectRequest {
            bucket: target.bucket().to_string(),
            key: key.clone(),
            content_type: content_type.to_string(),
            content_length: staged.size(),
            body: PutBody::File(staged.path().to_path_buf()),
        })
        .await;

    let size = staged.size();
    staged.discard();
    result.map_err(GatewayError::BackendFailure)?;

    Ok(UploadOutcome {
        key,
        size,
        content_type,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validator::tests::test_registry;
    use crate::RequestValidator;
    use async_trait::async_trait;
    use bucketgate_store::{ListPage, MemoryObjectStore, ObjectStream, StoreError};
    use std::path::PathBuf;
    use std::sync::Mutex;

    fn target() -> ValidatedTarget {
        RequestValidator::new(test_registry())
            .validate("london-2", "london-files")
            .unwrap()
    }

    fn chunks(parts: &[&'static [u8]]) -> impl Stream<Item = Result<Bytes>> {
        futures::stream::iter(
            parts
                .iter()
                .map(|p| Ok(Bytes::from_static(p)))
                .collect::<Vec<_>>(),
        )
    }

    fn dir_entries(dir: &Path) -> usize {
        std::fs::read_dir(dir).unwrap().count()
    }

    /// Rejects every put after checking the staged file is readable
    struct FailingStore {
        seen_path: Mutex<Option<PathBuf>>,
    }

    #[async_trait]
    impl ObjectStore for FailingStore {
        async fn put_object(&self, request: PutObjectRequest) -> bucketgate_store::Result<()> {
            if let PutBody::File(path) = &request.body {
                assert!(path.exists());
                *self.seen_path.lock().unwrap() = Some(path.clone());
            }
            Err(StoreError::backend("InvalidAccessKeyId: key does not exist"))
        }

        async fn get_object(&self, _bucket: &str, _key: &str) -> bucketgate_store::Result<ObjectStream> {
            unimplemented!()
        }

        async fn list_objects_page(
            &self,
            _bucket: &str,
            _continuation_token: Option<&str>,
            _max_keys: i32,
        ) -> bucketgate_store::Result<ListPage> {
            unimplemented!()
        }
    }

    #[tokio::test]
    async fn test_spool_writes_all_chunks() {
        let dir = tempfile::tempdir().unwrap();
        let staged = StagedFile::spool(dir.path(), chunks(&[b"hello ", b"world"]))
            .await
            .unwrap();

        assert_eq!(staged.size(), 11);
        assert_eq!(std::fs::read(staged.path()).unwrap(), b"hello world");
        let name = staged.path().file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("bucketgate-") && name.ends_with(".part"));

        drop(staged);
        assert_eq!(dir_entries(dir.path()), 0);
    }

    #[test_log::test(tokio::test)]
    async fn test_discard_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let staged = StagedFile::spool(dir.path(), chunks(&[b"data"])).await.unwrap();
        let path = staged.path().to_path_buf();
        assert!(path.exists());

        staged.discard();
        assert!(!path.exists());
        assert_eq!(dir_entries(dir.path()), 0);
    }

    #[tokio::test]
    async fn test_spool_creates_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("uploads").join("tmp");
        let staged = StagedFile::spool(&nested, chunks(&[])).await.unwrap();
        assert_eq!(staged.size(), 0);
        assert!(nested.is_dir());
    }

    #[tokio::test]
    async fn test_failed_spool_leaves_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let body = futures::stream::iter(vec![
            Ok(Bytes::from_static(b"partial")),
            Err(GatewayError::InvalidUpload("connection reset".to_string())),
        ]);

        let err = StagedFile::spool(dir.path(), body).await.unwrap_err();
        assert!(matches!(err, GatewayError::InvalidUpload(_)));
        assert_eq!(dir_entries(dir.path()), 0);
    }

    #[tokio::test]
    async fn test_upload_sanitizes_and_classifies() {
        let dir = tempfile::tempdir().unwrap();
        let store = MemoryObjectStore::with_buckets(["london-files"]);
        let staged = StagedFile::spool(dir.path(), chunks(&[b"root:x:0:0"]))
            .await
            .unwrap();

        let outcome = upload_file(&store, &target(), "../../etc/My Photo.JPG", staged)
            .await
            .unwrap();

        assert_eq!(outcome.key, "My_Photo.JPG");
        assert_eq!(outcome.content_type, "image/jpeg");
        assert_eq!(outcome.message(), "File 'My_Photo.JPG' uploaded successfully!");
        assert_eq!(store.keys("london-files"), vec!["My_Photo.JPG"]);
        assert_eq!(
            store.content_type("london-files", "My_Photo.JPG").as_deref(),
            Some("image/jpeg")
        );
        assert_eq!(dir_entries(dir.path()), 0);
    }

    #[tokio::test]
    async fn test_upload_overwrites_existing_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = MemoryObjectStore::with_buckets(["london-files"]);
        store.insert("london-files", "notes.txt", "text/plain", "old");

        let staged = StagedFile::spool(dir.path(), chunks(&[b"new contents"]))
            .await
            .unwrap();
        upload_file(&store, &target(), "notes.txt", staged).await.unwrap();

        assert_eq!(
            store.object_data("london-files", "notes.txt").unwrap(),
            Bytes::from_static(b"new contents")
        );
        assert_eq!(store.object_count("london-files"), 1);
    }

    #[tokio::test]
    async fn test_temp_file_removed_after_failed_put() {
        let dir = tempfile::tempdir().unwrap();
        let store = FailingStore {
            seen_path: Mutex::new(None),
        };
        let staged = StagedFile::spool(dir.path(), chunks(&[b"data"])).await.unwrap();

        let err = upload_file(&store, &target(), "a.txt", staged).await.unwrap_err();
        match err {
            GatewayError::BackendFailure(source) => {
                assert!(source.to_string().contains("InvalidAccessKeyId"))
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let seen = store.seen_path.lock().unwrap().clone().unwrap();
        assert!(!seen.exists());
        assert_eq!(dir_entries(dir.path()), 0);
    }

    #[tokio::test]
    async fn test_invalid_filename_still_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let store = MemoryObjectStore::with_buckets(["london-files"]);
        let staged = StagedFile::spool(dir.path(), chunks(&[b"x"])).await.unwrap();

        let err = upload_file(&store, &target(), "//", staged).await.unwrap_err();
        assert!(matches!(err, GatewayError::InvalidFilename(_)));
        assert_eq!(dir_entries(dir.path()), 0);
        assert_eq!(store.object_count("london-files"), 0);
    }
}
