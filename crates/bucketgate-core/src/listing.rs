//! Bucket listings with per-file metadata

use crate::{classify, ContentClass, GatewayError, Result, ValidatedTarget};
use bucketgate_store::{ObjectStore, ObjectSummary, StoreError, MAX_LIST_PAGE_SIZE};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashSet;
use tracing::{debug, warn};

/// One object of a bucket listing as returned to clients
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileInfo {
    pub name: String,
    pub size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<DateTime<Utc>>,
    pub mime_type: &'static str,
    pub content_class: ContentClass,
    pub viewable: bool,
}

impl FileInfo {
    /// Build from a listing entry; `None` when the entry has no key
    pub fn from_summary(summary: ObjectSummary) -> Option<Self> {
        let name = summary.key?;
        let info = classify(&name);
        Some(Self {
            size: summary.size,
            last_modified: summary.last_modified,
            mime_type: info.mime_type,
            content_class: info.content_class,
            viewable: info.content_class.is_viewable(),
            name,
        })
    }
}

/// ASCII punctuation and symbols in root collation order
const PUNCTUATION_ORDER: &str = "_-,;:!?.'\"()[]{}@*/\\&#%`^+<=>|~$";

/// Primary collation weight: character group, then rank inside the group
///
/// Groups are whitespace, punctuation and symbols, digits, letters, then
/// everything else. Letters compare without case.
fn primary_weight(c: char) -> (u8, u32) {
    if c.is_whitespace() {
        (0, c as u32)
    } else if let Some(rank) = PUNCTUATION_ORDER.find(c) {
        (1, rank as u32)
    } else if let Some(digit) = c.to_digit(10) {
        (2, digit)
    } else if c.is_alphabetic() {
        let lower = c.to_lowercase().next().unwrap_or(c);
        (3, lower as u32)
    } else {
        (4, c as u32)
    }
}

/// Listing order, close to a locale-aware `localeCompare`
///
/// Names are compared by [`primary_weight`] first. Ties are broken with
/// lowercase before uppercase at the first case difference, then by code
/// point so the order stays total.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    a.chars()
        .map(primary_weight)
        .cmp(b.chars().map(primary_weight))
        .then_with(|| {
            a.chars()
                .map(char::is_uppercase)
                .cmp(b.chars().map(char::is_uppercase))
        })
        .then_with(|| a.cmp(b))
}

/// List every object in the target bucket, following continuation tokens
///
/// Entries without a key are dropped. The result is sorted with
/// [`compare_names`].
pub async fn list_files(
    store: &dyn ObjectStore,
    target: &ValidatedTarget,
    page_size: i32,
) -> Result<Vec<FileInfo>> {
    let page_size = page_size.clamp(1, MAX_LIST_PAGE_SIZE);
    let mut files = Vec::new();
    let mut seen_tokens = HashSet::new();
    let mut token: Option<String> = None;
    let mut pages = 0usize;

    loop {
        let page = store
            .list_objects_page(target.bucket(), token.as_deref(), page_size)
            .await
            .map_err(GatewayError::BackendFailure)?;
        pages += 1;

        let listed = page.objects.len();
        let kept_before = files.len();
        files.extend(page.objects.into_iter().filter_map(FileInfo::from_summary));
        let dropped = listed - (files.len() - kept_before);
        if dropped > 0 {
            debug!(
                region = target.region(),
                bucket = target.bucket(),
                dropped,
                "Skipped listing entries without a key"
            );
        }

        match page.next_continuation_token {
            Some(next) => {
                if !seen_tokens.insert(next.clone()) {
                    warn!(
                        region = target.region(),
                        bucket = target.bucket(),
                        token = %next,
                        "Backend repeated a continuation token"
                    );
                    return Err(GatewayError::BackendFailure(StoreError::backend(format!(
                        "listing of {} did not advance past continuation token",
                        target.bucket()
                    ))));
                }
                token = Some(next);
            }
            None => break,
        }
    }

    files.sort_by(|a, b| compare_names(&a.name, &b.name));
    debug!(
        region = target.region(),
        bucket = target.bucket(),
        files = files.len(),
        pages,
        "Listed bucket"
    );
    Ok(files)
}
