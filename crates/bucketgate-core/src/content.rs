//! Content-type inference from file names

use serde::{Deserialize, Serialize};

/// MIME type used when the extension is unknown
pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// Extension to MIME type table; lookups use the lowercased extension
const MIME_TYPES: &[(&str, &str)] = &[
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("png", "image/png"),
    ("gif", "image/gif"),
    ("webp", "image/webp"),
    ("svg", "image/svg+xml"),
    ("bmp", "image/bmp"),
    ("pdf", "application/pdf"),
    ("txt", "text/plain"),
    ("html", "text/html"),
    ("css", "text/css"),
    ("js", "application/javascript"),
    ("json", "application/json"),
    ("xml", "application/xml"),
    ("csv", "text/csv"),
    ("md", "text/markdown"),
    ("mp4", "video/mp4"),
    ("webm", "video/webm"),
    ("mov", "video/quicktime"),
    ("mp3", "audio/mpeg"),
    ("wav", "audio/wav"),
    ("ogg", "audio/ogg"),
    ("zip", "application/zip"),
    ("rar", "application/x-rar-compressed"),
    ("doc", "application/msword"),
    (
        "docx",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    ),
    ("xls", "application/vnd.ms-excel"),
    (
        "xlsx",
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    ),
];

/// Coarse file category used to pick a viewer
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentClass {
    Image,
    Video,
    Audio,
    Text,
    Pdf,
    Other,
}

impl ContentClass {
    /// Derive the class from a MIME type
    pub fn from_mime(mime_type: &str) -> Self {
        if mime_type.starts_with("image/") {
            Self::Image
        } else if mime_type.starts_with("video/") {
            Self::Video
        } else if mime_type.starts_with("audio/") {
            Self::Audio
        } else if mime_type == "application/pdf" {
            Self::Pdf
        } else if mime_type.starts_with("text/")
            || mime_type.contains("json")
            || mime_type.contains("xml")
            || mime_type.contains("javascript")
        {
            Self::Text
        } else {
            Self::Other
        }
    }

    /// Whether a browser can render the file inline
    pub fn is_viewable(self) -> bool {
        self != Self::Other
    }

    /// Get the string representation
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
            Self::Audio => "audio",
            Self::Text => "text",
            Self::Pdf => "pdf",
            Self::Other => "other",
        }
    }
}

/// Result of [`classify`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ContentInfo {
    pub mime_type: &'static str,
    pub content_class: ContentClass,
}

/// Map a file name to its MIME type and content class
///
/// Only the extension of the base name is consulted, case-insensitively.
/// Dot files such as `.env` have no extension.
pub fn classify(filename: &str) -> ContentInfo {
    let mime_type = extension(filename)
        .and_then(|ext| {
            MIME_TYPES
                .iter()
                .find(|(known, _)| known.eq_ignore_ascii_case(ext))
                .map(|(_, mime)| *mime)
        })
        .unwrap_or(DEFAULT_MIME_TYPE);

    ContentInfo {
        mime_type,
        content_class: ContentClass::from_mime(mime_type),
    }
}

fn extension(filename: &str) -> Option<&str> {
    let base = filename.rsplit(['/', '\\']).next().unwrap_or(filename);
    match base.rfind('.') {
        Some(0) | None => None,
        Some(idx) => Some(&base[idx + 1..]).filter(|ext| !ext.is_empty()),
    }
}
