//! Streaming objects back to clients

use crate::{classify, GatewayError, Result, ValidatedTarget};
use bucketgate_store::{ByteStream, ObjectStore};
use tracing::warn;

/// Cache policy sent with every streamed object
pub const CACHE_CONTROL: &str = "public, max-age=31536000";

/// How the client should present a streamed object
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StreamDisposition {
    /// Render in place
    Inline,
    /// Save as a file
    Attachment,
}

impl StreamDisposition {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Inline => "inline",
            Self::Attachment => "attachment",
        }
    }
}

/// An opened object ready to be proxied
pub struct Download {
    pub key: String,
    pub content_type: String,
    pub content_length: Option<u64>,
    pub disposition: StreamDisposition,
    pub body: ByteStream,
}

impl std::fmt::Debug for Download {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Download")
            .field("key", &self.key)
            .field("content_type", &self.content_type)
            .field("content_length", &self.content_length)
            .field("disposition", &self.disposition)
            .finish_non_exhaustive()
    }
}

impl Download {
    /// `Content-Disposition` value; only attachments carry one
    pub fn content_disposition(&self) -> Option<String> {
        match self.disposition {
            StreamDisposition::Inline => None,
            StreamDisposition::Attachment => Some(attachment_header(&self.key)),
        }
    }
}

/// Build an `attachment` disposition for `filename`
///
/// The quoted form is restricted to printable ASCII. Names with anything else
/// also get an RFC 5987 `filename*` parameter carrying the exact UTF-8 name.
pub fn attachment_header(filename: &str) -> String {
    let mut quoted = String::with_capacity(filename.len());
    for c in filename.chars() {
        match c {
            '"' | '\\' => {
                quoted.push('\\');
                quoted.push(c);
            }
            ' '..='~' => quoted.push(c),
            _ => quoted.push('_'),
        }
    }

    if filename.chars().all(|c| matches!(c, ' '..='~')) {
        format!("attachment; filename=\"{quoted}\"")
    } else {
        format!(
            "attachment; filename=\"{quoted}\"; filename*=UTF-8''{}",
            urlencoding::encode(filename)
        )
    }
}

/// Open `key` in the target bucket for streaming
///
/// Any backend failure while acquiring the stream is reported as
/// [`GatewayError::ObjectNotFound`].
pub async fn open_download(
    store: &dyn ObjectStore,
    target: &ValidatedTarget,
    key: &str,
    disposition: StreamDisposition,
) -> Result<Download> {
    let object = match store.get_object(target.bucket(), key).await {
        Ok(object) => object,
        Err(e) => {
            if e.is_not_found() {
                warn!(
                    region = target.region(),
                    bucket = target.bucket(),
                    key = %key,
                    "Requested object does not exist"
                );
            } else {
                warn!(
                    region = target.region(),
                    bucket = target.bucket(),
                    key = %key,
                    error = %e,
                    "Failed to open object"
                );
            }
            return Err(GatewayError::ObjectNotFound {
                bucket: target.bucket().to_string(),
                key: key.to_string(),
                source: e,
            });
        }
    };

    let content_type = object
        .content_type
        .filter(|ct| !ct.is_empty())
        .unwrap_or_else(|| classify(key).mime_type.to_string());

    Ok(Download {
        key: key.to_string(),
        content_type,
        content_length: object.content_length,
        disposition,
        body: object.body,
    })
}
