use crate::models::{DiscoveryStrategy, MediaItem, MediaType, ValidationConfidence, FORMAT_UNKNOWN};
use crate::{GalleryError, Result};
use serde::Deserialize;
use std::io::Read;
use url::Url;

const API_FILES_URL: &str = "https://www.googleapis.com/drive/v3/files";
const PAGE_SIZE: u32 = 1000;
/// Pagination budget; a folder needing more pages than this is beyond
/// what a slideshow session can use anyway.
const MAX_PAGES: usize = 20;
const LIST_FIELDS: &str = "nextPageToken,files(id,name,mimeType,thumbnailLink,webContentLink)";
const MAX_BODY_BYTES: u64 = 8 * 1024 * 1024;
const MAX_ERROR_BODY_BYTES: usize = 16 * 1024;

/// Credential for the official listing path. Obtaining it (API console
/// key, or a token minted from service-account credentials) is the
/// caller's concern.
#[derive(Debug, Clone)]
pub enum ApiCredential {
    ApiKey(String),
    BearerToken(String),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileListPage {
    #[serde(default)]
    next_page_token: Option<String>,
    #[serde(default)]
    files: Vec<FileEntry>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileEntry {
    id: String,
    name: String,
    #[serde(default)]
    mime_type: String,
    #[serde(default)]
    thumbnail_link: Option<String>,
    #[serde(default)]
    web_content_link: Option<String>,
}

/// Structured alternative to scraping: exact listings via the provider
/// API, paginated on an opaque token. Output feeds the same Sequencer and
/// Resolver as the scraped path.
pub fn list_folder_items(
    agent: &ureq::Agent,
    folder_id: &str,
    credential: &ApiCredential,
) -> Result<Vec<MediaItem>> {
    let mut items: Vec<MediaItem> = Vec::new();
    let mut page_token: Option<String> = None;

    for _ in 0..MAX_PAGES {
        let page = fetch_page(agent, folder_id, credential, page_token.as_deref())?;
        for entry in &page.files {
            if let Some(item) = media_item_from_entry(entry) {
                items.push(item);
            }
        }
        match page.next_page_token {
            Some(token) if !token.is_empty() => page_token = Some(token),
            _ => break,
        }
    }

    if items.is_empty() {
        return Err(GalleryError::NoCandidates);
    }
    Ok(items)
}

fn fetch_page(
    agent: &ureq::Agent,
    folder_id: &str,
    credential: &ApiCredential,
    page_token: Option<&str>,
) -> Result<FileListPage> {
    let url = build_list_url(folder_id, credential, page_token);

    let mut request = agent.get(url.as_str());
    if let ApiCredential::BearerToken(token) = credential {
        let authorization = format!("Bearer {token}");
        request = request.header("Authorization", authorization.as_str());
    }

    let mut response = request.call().map_err(|err| GalleryError::Fetch {
        status: None,
        cause: err.to_string(),
    })?;

    let status = response.status().as_u16();
    let mut body = String::new();
    response
        .body_mut()
        .as_reader()
        .take(MAX_BODY_BYTES)
        .read_to_string(&mut body)
        .map_err(|err| GalleryError::Fetch {
            status: Some(status),
            cause: format!("failed reading listing body: {err}"),
        })?;

    if !(200..300).contains(&status) {
        if body.len() > MAX_ERROR_BODY_BYTES {
            let mut cut = MAX_ERROR_BODY_BYTES;
            while !body.is_char_boundary(cut) {
                cut -= 1;
            }
            body.truncate(cut);
        }
        return Err(GalleryError::ApiListing { status, body });
    }

    Ok(serde_json::from_str(&body)?)
}

fn build_list_url(folder_id: &str, credential: &ApiCredential, page_token: Option<&str>) -> Url {
    let mut url = Url::parse(API_FILES_URL).expect("listing endpoint url");
    {
        let mut pairs = url.query_pairs_mut();
        pairs.append_pair("q", &format!("'{folder_id}' in parents and trashed = false"));
        pairs.append_pair("fields", LIST_FIELDS);
        pairs.append_pair("pageSize", &PAGE_SIZE.to_string());
        if let Some(token) = page_token {
            pairs.append_pair("pageToken", token);
        }
        if let ApiCredential::ApiKey(key) = credential {
            pairs.append_pair("key", key);
        }
    }
    url
}

// The API declares exact mime types, so entries arrive pre-classified;
// anything that is not image/video (subfolders, documents) is skipped.
fn media_item_from_entry(entry: &FileEntry) -> Option<MediaItem> {
    let media_type = if entry.mime_type.starts_with("image/") {
        MediaType::Image
    } else if entry.mime_type.starts_with("video/") {
        MediaType::Video
    } else {
        return None;
    };

    let format = entry
        .mime_type
        .split('/')
        .nth(1)
        .filter(|v| !v.is_empty())
        .map(|v| v.to_ascii_uppercase())
        .unwrap_or_else(|| FORMAT_UNKNOWN.to_string());

    Some(MediaItem {
        identifier: entry.id.clone(),
        display_name: entry.name.clone(),
        media_type,
        format,
        discovery_strategy: DiscoveryStrategy::ApiListing,
        validation_confidence: ValidationConfidence::Confirmed,
    })
}
