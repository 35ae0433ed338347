//! Entry point tying validation, client lookup and the file services together

use crate::download::open_download;
use crate::listing::list_files;
use crate::upload::upload_file;
use crate::{
    Download, FileInfo, RegionRegistry, RequestValidator, Result, StagedFile, StoreFactory,
    StreamDisposition, UploadOutcome, ValidatedTarget,
};
use bucketgate_store::MAX_LIST_PAGE_SIZE;
use std::sync::Arc;
use tracing::{error, info, instrument};

/// File gateway over a fixed set of regions
#[derive(Clone)]
pub struct Gateway {
    registry: Arc<RegionRegistry>,
    validator: RequestValidator,
    factory: Arc<dyn StoreFactory>,
    list_page_size: i32,
}

impl Gateway {
    pub fn new(registry: Arc<RegionRegistry>, factory: Arc<dyn StoreFactory>) -> Self {
        Self {
            validator: RequestValidator::new(Arc::clone(&registry)),
            registry,
            factory,
            list_page_size: MAX_LIST_PAGE_SIZE,
        }
    }

    /// Override the listing page size (clamped to 1..=1000 when used)
    pub fn with_list_page_size(mut self, page_size: i32) -> Self {
        self.list_page_size = page_size;
        self
    }

    pub fn registry(&self) -> &RegionRegistry {
        &self.registry
    }

    pub fn validate(&self, region: &str, bucket: &str) -> Result<ValidatedTarget> {
        self.validator.validate(region, bucket)
    }

    /// All files in a bucket, sorted by name
    #[instrument(skip(self))]
    pub async fn list_files(&self, region: &str, bucket: &str) -> Result<Vec<FileInfo>> {
        let target = self.validate(region, bucket)?;
        let store = self.factory.store_for(&target)?;
        list_files(store.as_ref(), &target, self.list_page_size)
            .await
            .inspect_err(|e| error!(region, bucket, error = %e, "Error fetching files"))
    }

    /// Store a staged upload in an already validated target
    #[instrument(
        skip(self, target, staged),
        fields(region = target.region(), bucket = target.bucket(), size = staged.size())
    )]
    pub async fn upload(
        &self,
        target: &ValidatedTarget,
        original_filename: &str,
        staged: StagedFile,
    ) -> Result<UploadOutcome> {
        let store = self.factory.store_for(target)?;
        let outcome = upload_file(store.as_ref(), target, original_filename, staged)
            .await
            .inspect_err(|e| {
                error!(
                    region = target.region(),
                    bucket = target.bucket(),
                    filename = original_filename,
                    error = %e,
                    "Upload failed"
                )
            })?;
        info!(
            region = target.region(),
            bucket = target.bucket(),
            key = %outcome.key,
            size = outcome.size,
            "Uploaded file"
        );
        Ok(outcome)
    }

    /// Open an object for streaming with the given disposition
    #[instrument(skip(self))]
    pub async fn open(
        &self,
        region: &str,
        bucket: &str,
        filename: &str,
        disposition: StreamDisposition,
    ) -> Result<Download> {
        let target = self.validate(region, bucket)?;
        let store = self.factory.store_for(&target)?;
        open_download(store.as_ref(), &target, filename, disposition).await
    }
}

impl std::fmt::Debug for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway")
            .field("regions", &self.registry.regions().collect::<Vec<_>>())
            .field("list_page_size", &self.list_page_size)
            .finish_non_exhaustive()
    }
}
