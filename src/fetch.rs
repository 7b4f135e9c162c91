use crate::{GalleryError, Result};
use std::io::Read;
use std::time::Duration;

pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 45;
pub const MIN_FETCH_TIMEOUT_SECS: u64 = 5;
pub const MAX_FETCH_TIMEOUT_SECS: u64 = 120;

// The folder view is a browser-facing surface; a bare client UA gets a
// reduced or blocked payload.
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/130.0.0.0 Safari/537.36";
const ACCEPT_HTML: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8";
const ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";

const FOLDER_VIEW_URL: &str = "https://drive.google.com/drive/folders";
const EMBED_VIEW_URL: &str = "https://drive.google.com/embeddedfolderview";

/// Folder pages can be large; cap the body read so a hostile or broken
/// response cannot exhaust memory.
const MAX_HTML_BYTES: u64 = 16 * 1024 * 1024;

pub fn build_agent(timeout_secs: u64) -> ureq::Agent {
    let timeout = timeout_secs.clamp(MIN_FETCH_TIMEOUT_SECS, MAX_FETCH_TIMEOUT_SECS);
    let mut config = ureq::Agent::config_builder();
    config = config
        .http_status_as_error(false)
        .timeout_global(Some(Duration::from_secs(timeout)))
        .user_agent(BROWSER_USER_AGENT);
    config.build().into()
}

/// One GET of the folder-view page. No retries here; retry policy belongs
/// to the caller, which can consult `GalleryError::fetch_is_retryable`.
pub fn fetch_folder_html(agent: &ureq::Agent, folder_id: &str) -> Result<String> {
    fetch_html(agent, &folder_view_url(folder_id))
}

/// Best-effort fetch of the embedded folder-view widget page, which lists
/// entries in markup the main page sometimes omits.
pub fn fetch_embed_html(agent: &ureq::Agent, folder_id: &str) -> Result<String> {
    fetch_html(agent, &format!("{EMBED_VIEW_URL}?id={folder_id}#grid"))
}

pub fn folder_view_url(folder_id: &str) -> String {
    format!("{FOLDER_VIEW_URL}/{folder_id}")
}

fn fetch_html(agent: &ureq::Agent, url: &str) -> Result<String> {
    let mut response = agent
        .get(url)
        .header("Accept", ACCEPT_HTML)
        .header("Accept-Language", ACCEPT_LANGUAGE)
        .call()
        .map_err(|err| GalleryError::Fetch {
            status: None,
            cause: err.to_string(),
        })?;

    let status = response.status().as_u16();
    if !(200..300).contains(&status) {
        return Err(GalleryError::Fetch {
            status: Some(status),
            cause: format!("folder page returned HTTP {status}"),
        });
    }

    let mut buf = Vec::new();
    response
        .body_mut()
        .as_reader()
        .take(MAX_HTML_BYTES)
        .read_to_end(&mut buf)
        .map_err(|err| GalleryError::Fetch {
            status: Some(status),
            cause: format!("failed reading folder page body: {err}"),
        })?;

    Ok(String::from_utf8_lossy(&buf).into_owned())
}
