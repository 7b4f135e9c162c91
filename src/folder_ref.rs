use crate::{GalleryError, Result};
use regex::Regex;

/// Extracts the canonical folder id from a user-supplied reference.
///
/// Shapes are tried in order and the first match wins: a `/folders/<id>`
/// path segment, an `id=<id>` query parameter, then the entire trimmed
/// input as a bare identifier. The ordering matters: a full share URL can
/// contain both a path segment and query noise and must resolve via the
/// path segment.
pub fn extract_folder_id(reference: &str) -> Result<String> {
    let trimmed = reference.trim();
    if trimmed.is_empty() {
        return Err(GalleryError::InvalidReference(trimmed.to_string()));
    }

    let folders_re = Regex::new(r"/folders/([A-Za-z0-9_-]+)").expect("folders regex");
    if let Some(caps) = folders_re.captures(trimmed) {
        return Ok(caps[1].to_string());
    }

    let query_re = Regex::new(r"id=([A-Za-z0-9_-]+)").expect("id query regex");
    if let Some(caps) = query_re.captures(trimmed) {
        return Ok(caps[1].to_string());
    }

    let bare_re = Regex::new(r"^[A-Za-z0-9_-]+$").expect("bare id regex");
    if bare_re.is_match(trimmed) {
        return Ok(trimmed.to_string());
    }

    Err(GalleryError::InvalidReference(trimmed.to_string()))
}
