use crate::models::MediaType;

/// Number of leading bytes the partial-content probe reads; every
/// signature below fits well inside this prefix.
pub const SNIFF_PREFIX_BYTES: usize = 2048;

/// Classifies a byte prefix against the known content signatures.
///
/// Deterministic: the same prefix always yields the same pair. Returns
/// `None` when no signature matches, which the validator treats as
/// inconclusive rather than as a failure.
pub fn classify_prefix(prefix: &[u8]) -> Option<(MediaType, &'static str)> {
    if prefix.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return Some((MediaType::Image, "JPEG"));
    }
    if prefix.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
        return Some((MediaType::Image, "PNG"));
    }
    if prefix.starts_with(b"GIF87a") || prefix.starts_with(b"GIF89a") {
        return Some((MediaType::Image, "GIF"));
    }
    if prefix.len() >= 12 && prefix.starts_with(b"RIFF") && &prefix[8..12] == b"WEBP" {
        return Some((MediaType::Image, "WEBP"));
    }
    if prefix.starts_with(b"BM") {
        return Some((MediaType::Image, "BMP"));
    }
    if leading_markup_is_svg(prefix) {
        return Some((MediaType::Image, "SVG"));
    }
    if prefix.starts_with(&[0x49, 0x49, 0x2A, 0x00]) || prefix.starts_with(&[0x4D, 0x4D, 0x00, 0x2A])
    {
        return Some((MediaType::Image, "TIFF"));
    }
    if prefix.len() >= 8 && &prefix[4..8] == b"ftyp" {
        return Some((MediaType::Video, "MP4"));
    }
    if prefix.starts_with(&[0x1A, 0x45, 0xDF, 0xA3]) {
        return Some((MediaType::Video, "WEBM"));
    }
    if prefix.starts_with(&[0x46, 0x4C, 0x56, 0x01]) {
        return Some((MediaType::Video, "FLV"));
    }
    if prefix.starts_with(&[0x00, 0x00, 0x01, 0xBA]) || prefix.starts_with(&[0x00, 0x00, 0x01, 0xB3])
    {
        return Some((MediaType::Video, "MPEG"));
    }
    None
}

// SVG bodies often open with an XML declaration or whitespace before the
// root element, so scan past that instead of demanding `<svg` at byte 0.
fn leading_markup_is_svg(prefix: &[u8]) -> bool {
    let text = String::from_utf8_lossy(prefix);
    let trimmed = text.trim_start();
    if trimmed.starts_with("<svg") || trimmed.starts_with("<SVG") {
        return true;
    }
    if trimmed.starts_with("<?xml") {
        return trimmed.contains("<svg") || trimmed.contains("<SVG");
    }
    false
}
