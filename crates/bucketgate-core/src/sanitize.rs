//! Storage-safe object keys from client-supplied file names

use crate::{GatewayError, Result};

fn is_separator(c: char) -> bool {
    c == '/' || c == '\\'
}

fn is_allowed(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')
}

/// Final path component of `raw`, ignoring trailing separators
pub fn base_name(raw: &str) -> &str {
    let trimmed = raw.trim_end_matches(is_separator);
    trimmed.rsplit(is_separator).next().unwrap_or(trimmed)
}

/// Turn a client-supplied file name into an object key
///
/// Keeps the base name and replaces every character outside
/// `[A-Za-z0-9._-]` with `_`. The bare names `.` and `..` become `_` and `__`
/// so a key never reads as a relative path. Idempotent.
pub fn sanitize(raw: &str) -> Result<String> {
    let base = base_name(raw);
    if base.is_empty() {
        return Err(GatewayError::InvalidFilename(raw.to_string()));
    }

    if base == "." || base == ".." {
        return Ok("_".repeat(base.len()));
    }

    Ok(base
        .chars()
        .map(|c| if is_allowed(c) { c } else { '_' })
        .collect())
}
