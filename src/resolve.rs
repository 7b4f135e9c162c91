use crate::models::{MediaItem, MediaType};
use crate::sniff;
use crate::{GalleryError, Result};
use serde::{Deserialize, Serialize};
use std::io::Read;

/// Size hint requested from the CDN / thumbnail endpoints. Large enough
/// for full-screen display without asking for original-resolution bytes.
const CDN_SIZE: u32 = 4096;

const CDN_BASE: &str = "https://lh3.googleusercontent.com/d";
const EXPORT_VIEW: &str = "https://drive.google.com/uc?export=view&id=";
const EXPORT_DOWNLOAD: &str = "https://drive.google.com/uc?export=download&id=";
const THUMBNAIL_BASE: &str = "https://drive.google.com/thumbnail";
const EMBED_VIEW_BASE: &str = "https://drive.google.com/embeddedfolderview";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    Grid,
    List,
}

/// Ordered list of direct-access URLs for one item. The consumer tries
/// them in order and keeps the first response that yields renderable
/// bytes; this function performs no I/O.
pub fn access_urls(item: &MediaItem) -> Vec<String> {
    let id = &item.identifier;
    vec![
        format!("{CDN_BASE}/{id}=s{CDN_SIZE}"),
        format!("{EXPORT_VIEW}{id}"),
        format!("{THUMBNAIL_BASE}?id={id}&sz=w{CDN_SIZE}"),
        format!("{CDN_BASE}/{id}"),
        format!("{EXPORT_DOWNLOAD}{id}"),
    ]
}

/// URL of the provider's own embeddable folder-view widget.
pub fn embed_view_url(folder_id: &str, mode: ViewMode) -> String {
    let fragment = match mode {
        ViewMode::Grid => "grid",
        ViewMode::List => "list",
    };
    format!("{EMBED_VIEW_BASE}?id={folder_id}#{fragment}")
}

/// Walks the item's access URLs and returns the first 2xx body whose
/// declared content type or sniffed prefix matches the item's media
/// type. For `Unknown`/assumed items any non-HTML 2xx body is accepted.
pub fn fetch_first_renderable(agent: &ureq::Agent, item: &MediaItem) -> Result<Vec<u8>> {
    let mut last_status: Option<u16> = None;
    for url in access_urls(item) {
        let mut response = match agent.get(&url).call() {
            Ok(resp) => resp,
            Err(_) => continue,
        };
        let status = response.status().as_u16();
        if !(200..300).contains(&status) {
            last_status = Some(status);
            continue;
        }

        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_ascii_lowercase();

        let mut data = Vec::new();
        if response.body_mut().as_reader().read_to_end(&mut data).is_err() {
            continue;
        }
        if data.is_empty() {
            continue;
        }
        if body_matches_item(item, &content_type, &data) {
            return Ok(data);
        }
    }

    Err(GalleryError::Fetch {
        status: last_status,
        cause: format!(
            "no access endpoint yielded renderable bytes for {}",
            item.identifier
        ),
    })
}

fn body_matches_item(item: &MediaItem, content_type: &str, data: &[u8]) -> bool {
    let sniffed = sniff::classify_prefix(&data[..data.len().min(sniff::SNIFF_PREFIX_BYTES)]);
    match item.media_type {
        MediaType::Image => {
            content_type.starts_with("image/")
                || matches!(sniffed, Some((MediaType::Image, _)))
                // Assumed items accept any non-page payload; interstitial
                // HTML means this endpoint refused to serve bytes.
                || (!content_type.contains("html") && sniffed.is_none() && item.format == crate::models::FORMAT_ASSUMED)
        }
        MediaType::Video => {
            content_type.starts_with("video/") || matches!(sniffed, Some((MediaType::Video, _)))
        }
        MediaType::Unknown => !content_type.contains("html"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DiscoveryStrategy, ValidationConfidence, FORMAT_ASSUMED};

    fn item(id: &str, media_type: MediaType, format: &str) -> MediaItem {
        MediaItem {
            identifier: id.to_string(),
            display_name: "Image 001".to_string(),
            media_type,
            format: format.to_string(),
            discovery_strategy: DiscoveryStrategy::RawScan,
            validation_confidence: ValidationConfidence::Confirmed,
        }
    }

    #[test]
    fn access_urls_are_ranked_cdn_first_download_last() {
        let urls = access_urls(&item("AbC", MediaType::Image, "JPEG"));
        assert_eq!(urls.len(), 5);
        assert_eq!(urls[0], "https://lh3.googleusercontent.com/d/AbC=s4096");
        assert_eq!(urls[1], "https://drive.google.com/uc?export=view&id=AbC");
        assert_eq!(
            urls[2],
            "https://drive.google.com/thumbnail?id=AbC&sz=w4096"
        );
        assert_eq!(urls[3], "https://lh3.googleusercontent.com/d/AbC");
        assert_eq!(
            urls[4],
            "https://drive.google.com/uc?export=download&id=AbC"
        );
    }

    #[test]
    fn embed_view_url_carries_mode_fragment() {
        assert_eq!(
            embed_view_url("F1", ViewMode::Grid),
            "https://drive.google.com/embeddedfolderview?id=F1#grid"
        );
        assert_eq!(
            embed_view_url("F1", ViewMode::List),
            "https://drive.google.com/embeddedfolderview?id=F1#list"
        );
    }

    #[test]
    fn body_match_accepts_declared_or_sniffed_type() {
        let image = item("a", MediaType::Image, "JPEG");
        assert!(body_matches_item(&image, "image/jpeg", b"\xFF\xD8\xFF\xE0"));
        assert!(body_matches_item(
            &image,
            "application/octet-stream",
            b"\x89PNG\r\n\x1a\n rest"
        ));
        assert!(!body_matches_item(
            &image,
            "text/html",
            b"<!DOCTYPE html><html>"
        ));

        let video = item("b", MediaType::Video, "MP4");
        assert!(body_matches_item(
            &video,
            "application/octet-stream",
            b"\x00\x00\x00\x18ftypisom"
        ));
        assert!(!body_matches_item(&video, "image/png", b"\x89PNG\r\n\x1a\n"));
    }

    #[test]
    fn assumed_items_accept_unclassified_non_html_bytes() {
        let assumed = item("c", MediaType::Image, FORMAT_ASSUMED);
        assert!(body_matches_item(
            &assumed,
            "application/octet-stream",
            b"no known signature here"
        ));
        assert!(!body_matches_item(
            &assumed,
            "text/html; charset=utf-8",
            b"<html>interstitial</html>"
        ));
    }
}
