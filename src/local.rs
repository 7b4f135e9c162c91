use crate::models::{DiscoveryStrategy, MediaItem, MediaType, ValidationConfidence, FORMAT_UNKNOWN};
use crate::Result;
use std::path::Path;
use walkdir::WalkDir;

const IMAGE_EXTS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "webp", "bmp", "svg", "tif", "tiff", "avif", "heic",
];
const VIDEO_EXTS: &[&str] = &["mp4", "mov", "m4v", "webm", "mkv", "avi", "flv", "mpg", "mpeg"];

/// Local-directory source: a recursive walk filtered by media extension.
/// Items carry the file path as their identifier and bypass validation
/// (the extension is taken at face value, hence `Forced` confidence).
pub fn scan_local_dir(root: &Path) -> Result<Vec<MediaItem>> {
    let mut items: Vec<MediaItem> = Vec::new();

    for entry in WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| entry.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let Some(ext) = path
            .extension()
            .and_then(|v| v.to_str())
            .map(|v| v.to_ascii_lowercase())
        else {
            continue;
        };

        let media_type = if IMAGE_EXTS.contains(&ext.as_str()) {
            MediaType::Image
        } else if VIDEO_EXTS.contains(&ext.as_str()) {
            MediaType::Video
        } else {
            continue;
        };

        let display_name = path
            .file_name()
            .map(|v| v.to_string_lossy().to_string())
            .unwrap_or_else(|| FORMAT_UNKNOWN.to_string());

        items.push(MediaItem {
            identifier: path.to_string_lossy().to_string(),
            display_name,
            media_type,
            format: ext.to_ascii_uppercase(),
            discovery_strategy: DiscoveryStrategy::LocalScan,
            validation_confidence: ValidationConfidence::Forced,
        });
    }

    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_picks_media_files_and_skips_the_rest() {
        let dir = tempfile::tempdir().expect("tempdir");
        let nested = dir.path().join("trip");
        std::fs::create_dir_all(&nested).expect("mkdir");
        std::fs::write(dir.path().join("a.jpg"), b"x").expect("write");
        std::fs::write(dir.path().join("notes.txt"), b"x").expect("write");
        std::fs::write(nested.join("b.MP4"), b"x").expect("write");
        std::fs::write(nested.join("c"), b"x").expect("write");

        let items = scan_local_dir(dir.path()).expect("scan");
        assert_eq!(items.len(), 2);
        assert!(items.iter().any(|i| {
            i.display_name == "a.jpg" && i.media_type == MediaType::Image && i.format == "JPG"
        }));
        assert!(items.iter().any(|i| {
            i.display_name == "b.MP4" && i.media_type == MediaType::Video && i.format == "MP4"
        }));
        assert!(items
            .iter()
            .all(|i| i.validation_confidence == ValidationConfidence::Forced));
    }

    #[test]
    fn scan_of_empty_dir_returns_empty_collection() {
        let dir = tempfile::tempdir().expect("tempdir");
        let items = scan_local_dir(dir.path()).expect("scan");
        assert!(items.is_empty());
    }
}
