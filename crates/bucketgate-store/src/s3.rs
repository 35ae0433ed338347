//! S3-compatible object store backed by `aws-sdk-s3`

use crate::{
    ListPage, ObjectStore, ObjectStream, ObjectSummary, PutBody, PutObjectRequest, Result,
    StoreError,
};
use async_trait::async_trait;
use aws_sdk_s3::config::{
    BehaviorVersion, Credentials, Region, RequestChecksumCalculation, ResponseChecksumValidation,
};
use aws_sdk_s3::error::{DisplayErrorContext, SdkError};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use chrono::{DateTime, Utc};
use futures::StreamExt;
use tokio_util::io::ReaderStream;
use tracing::debug;

/// Connection parameters for one S3-compatible endpoint
#[derive(Clone)]
pub struct S3StoreConfig {
    /// Endpoint URL, e.g. `https://london-2.linodeobjects.com`
    pub endpoint: String,
    /// Signing region
    pub region: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    /// Address buckets as `/{bucket}/{key}` instead of virtual hosts
    pub force_path_style: bool,
}

impl std::fmt::Debug for S3StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3StoreConfig")
            .field("endpoint", &self.endpoint)
            .field("region", &self.region)
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("force_path_style", &self.force_path_style)
            .finish()
    }
}

/// Object store talking to an S3-compatible endpoint
#[derive(Clone, Debug)]
pub struct S3ObjectStore {
    client: Client,
}

impl S3ObjectStore {
    /// Build a client bound to the endpoint and static credentials
    pub fn new(config: &S3StoreConfig) -> Result<Self> {
        url::Url::parse(&config.endpoint).map_err(|e| {
            StoreError::Configuration(format!("invalid endpoint '{}': {}", config.endpoint, e))
        })?;

        let credentials = Credentials::new(
            &config.access_key_id,
            &config.secret_access_key,
            None,
            None,
            "bucketgate",
        );

        // Third-party S3 implementations reject the flexible checksum trailers
        // the SDK sends by default.
        let s3_config = aws_sdk_s3::config::Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .endpoint_url(&config.endpoint)
            .credentials_provider(credentials)
            .force_path_style(config.force_path_style)
            .request_checksum_calculation(RequestChecksumCalculation::WhenRequired)
            .response_checksum_validation(ResponseChecksumValidation::WhenRequired)
            .build();

        Ok(Self {
            client: Client::from_conf(s3_config),
        })
    }
}

/// HTTP status of the raw response behind an SDK error, if one was received
fn raw_status<E>(err: &SdkError<E>) -> Option<u16> {
    err.raw_response().map(|r| r.status().as_u16())
}

fn to_chrono(ts: &aws_sdk_s3::primitives::DateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(ts.secs(), ts.subsec_nanos())
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put_object(&self, request: PutObjectRequest) -> Result<()> {
        let body = match &request.body {
            PutBody::File(path) => ByteStream::from_path(path)
                .await
                .map_err(|e| StoreError::backend(format!("failed to open upload body: {}", e)))?,
            PutBody::Bytes(bytes) => ByteStream::from(bytes.clone()),
        };

        let content_length = i64::try_from(request.content_length)
            .map_err(|_| StoreError::backend("object too large"))?;

        debug!(
            bucket = %request.bucket,
            key = %request.key,
            size = request.content_length,
            "S3 put_object"
        );

        self.client
            .put_object()
            .bucket(&request.bucket)
            .key(&request.key)
            .content_type(&request.content_type)
            .content_length(content_length)
            .body(body)
            .send()
            .await
            .map_err(|e| StoreError::backend(DisplayErrorContext(&e)))?;

        Ok(())
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<ObjectStream> {
        let output = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                let missing = e.as_service_error().is_some_and(|se| se.is_no_such_key())
                    || raw_status(&e) == Some(404);
                if missing {
                    StoreError::NoSuchKey {
                        bucket: bucket.to_string(),
                        key: key.to_string(),
                    }
                } else {
                    StoreError::backend(DisplayErrorContext(&e))
                }
            })?;

        let content_type = output.content_type().map(ToOwned::to_owned);
        let content_length = output.content_length().and_then(|n| u64::try_from(n).ok());
        let reader = output.body.into_async_read();

        Ok(ObjectStream {
            content_type,
            content_length,
            body: ReaderStream::new(reader).boxed(),
        })
    }

    async fn list_objects_page(
        &self,
        bucket: &str,
        continuation_token: Option<&str>,
        max_keys: i32,
    ) -> Result<ListPage> {
        let output = self
            .client
            .list_objects_v2()
            .bucket(bucket)
            .max_keys(max_keys)
            .set_continuation_token(continuation_token.map(ToOwned::to_owned))
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error().is_some_and(|se| se.is_no_such_bucket()) {
                    StoreError::NoSuchBucket(bucket.to_string())
                } else {
                    StoreError::backend(DisplayErrorContext(&e))
                }
            })?;

        let objects = output
            .contents()
            .iter()
            .map(|obj| ObjectSummary {
                key: obj.key().map(ToOwned::to_owned),
                size: obj.size().and_then(|n| u64::try_from(n).ok()).unwrap_or(0),
                last_modified: obj.last_modified().and_then(to_chrono),
            })
            .collect();

        let next_continuation_token = if output.is_truncated() == Some(true) {
            output.next_continuation_token().map(ToOwned::to_owned)
        } else {
            None
        };

        Ok(ListPage {
            objects,
            next_continuation_token,
        })
    }
}
