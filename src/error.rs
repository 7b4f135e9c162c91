use thiserror::Error;

#[derive(Debug, Error)]
pub enum GalleryError {
    #[error("unrecognized folder reference: {0}; paste a folder share link or a bare folder id")]
    InvalidReference(String),

    #[error("failed to fetch folder page (status={status:?}): {cause}; check that the folder is shared publicly (\"anyone with the link\")")]
    Fetch { status: Option<u16>, cause: String },

    #[error("no media found in folder; check sharing permissions, that the folder contains images or videos, and that they are not nested in subfolders")]
    NoCandidates,

    #[error("listing api error (status={status}): {body}")]
    ApiListing { status: u16, body: String },

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl GalleryError {
    /// Callers may retry fetch failures by default; a 4xx means the folder
    /// is missing or not public and retrying will not help.
    pub fn fetch_is_retryable(&self) -> bool {
        match self {
            GalleryError::Fetch { status, .. } => {
                !matches!(status, Some(code) if (400..500).contains(code))
            }
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, GalleryError>;
