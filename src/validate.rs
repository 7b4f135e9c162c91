use crate::models::{
    Candidate, MediaItem, MediaType, ValidationConfidence, FORMAT_ASSUMED, FORMAT_UNKNOWN,
};
use crate::sniff;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;

pub const DEFAULT_PROBE_CONCURRENCY: usize = 12;
pub const MAX_PROBE_CONCURRENCY: usize = 32;

const PROBE_VIEW_URL: &str = "https://drive.google.com/uc?export=view&id=";

/// What to do with a candidate no probe tier could classify.
///
/// `Lenient` is the zero-skip mode: real folders contain items whose
/// metadata the host systematically mis-reports, and losing a real item
/// is worse than showing an occasional dud. `Strict` trades completeness
/// for purity and drops anything unconfirmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkipPolicy {
    Strict,
    Lenient,
}

impl Default for SkipPolicy {
    fn default() -> Self {
        SkipPolicy::Lenient
    }
}

/// Probe seam for the validator. Implementations must treat transport
/// failures and timeouts as `None` (inconclusive); tests substitute
/// canned outcomes here.
pub trait MediaProbe: Sync {
    /// Header-only request against the item's direct-access endpoint;
    /// returns the declared content type when the endpoint answers.
    fn metadata_content_type(&self, identifier: &str) -> Option<String>;

    /// First ~2 KB of item content for signature sniffing.
    fn content_prefix(&self, identifier: &str) -> Option<Vec<u8>>;
}

/// HTTP-backed probe against the provider's export-view endpoint.
pub struct HttpProbe {
    agent: ureq::Agent,
}

impl HttpProbe {
    pub fn new(agent: ureq::Agent) -> Self {
        Self { agent }
    }
}

impl MediaProbe for HttpProbe {
    fn metadata_content_type(&self, identifier: &str) -> Option<String> {
        let url = format!("{PROBE_VIEW_URL}{identifier}");
        let response = self.agent.head(&url).call().ok()?;
        let status = response.status().as_u16();
        if !(200..300).contains(&status) {
            return None;
        }
        response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_ascii_lowercase())
    }

    fn content_prefix(&self, identifier: &str) -> Option<Vec<u8>> {
        let url = format!("{PROBE_VIEW_URL}{identifier}");
        let range = format!("bytes=0-{}", sniff::SNIFF_PREFIX_BYTES - 1);
        let mut response = self
            .agent
            .get(&url)
            .header("Range", range.as_str())
            .call()
            .ok()?;
        let status = response.status().as_u16();
        if !(200..300).contains(&status) {
            return None;
        }
        let mut buf = Vec::with_capacity(sniff::SNIFF_PREFIX_BYTES);
        response
            .body_mut()
            .as_reader()
            .take(sniff::SNIFF_PREFIX_BYTES as u64)
            .read_to_end(&mut buf)
            .ok()?;
        if buf.is_empty() {
            return None;
        }
        Some(buf)
    }
}

/// Classifies one candidate through the escalating probe tiers, stopping
/// at the first conclusive answer. Returns `None` only when the candidate
/// is dropped; probe failures never escape as errors.
pub fn validate_candidate(
    candidate: &Candidate,
    policy: SkipPolicy,
    probe: &dyn MediaProbe,
) -> Option<MediaItem> {
    if let Some(content_type) = probe.metadata_content_type(&candidate.identifier) {
        if let Some((media_type, format)) = classify_content_type(&content_type) {
            return Some(confirmed_item(candidate, media_type, format));
        }
    }

    if let Some(prefix) = probe.content_prefix(&candidate.identifier) {
        if let Some((media_type, format)) = sniff::classify_prefix(&prefix) {
            return Some(confirmed_item(candidate, media_type, format.to_string()));
        }
    }

    match policy {
        SkipPolicy::Strict => None,
        SkipPolicy::Lenient => Some(MediaItem {
            identifier: candidate.identifier.clone(),
            display_name: candidate.identifier.clone(),
            media_type: MediaType::Image,
            format: FORMAT_ASSUMED.to_string(),
            discovery_strategy: candidate.discovery_strategy,
            validation_confidence: ValidationConfidence::Assumed,
        }),
    }
}

/// Validates a batch over a bounded worker pool. Candidates are
/// independent; only final membership matters, but the output preserves
/// input order so display-name renumbering stays deterministic.
pub fn validate_candidates(
    candidates: &[Candidate],
    policy: SkipPolicy,
    probe: &dyn MediaProbe,
    concurrency: usize,
) -> Vec<MediaItem> {
    if candidates.is_empty() {
        return Vec::new();
    }

    let workers = concurrency
        .clamp(1, MAX_PROBE_CONCURRENCY)
        .min(candidates.len());
    let next = AtomicUsize::new(0);
    let (tx, rx) = mpsc::channel::<(usize, Option<MediaItem>)>();

    thread::scope(|scope| {
        for _ in 0..workers {
            let tx = tx.clone();
            let next = &next;
            scope.spawn(move || loop {
                let index = next.fetch_add(1, Ordering::SeqCst);
                if index >= candidates.len() {
                    break;
                }
                let item = validate_candidate(&candidates[index], policy, probe);
                if tx.send((index, item)).is_err() {
                    break;
                }
            });
        }
        drop(tx);

        let mut slots: Vec<Option<MediaItem>> = vec![None; candidates.len()];
        for (index, item) in rx {
            slots[index] = item;
        }
        slots.into_iter().flatten().collect()
    })
}

/// Renumbers display names so they are globally sequential and unique in
/// the final ordered collection.
pub fn renumber_display_names(items: &mut [MediaItem]) {
    for (index, item) in items.iter_mut().enumerate() {
        let label = match item.media_type {
            MediaType::Image => "Image",
            MediaType::Video => "Video",
            MediaType::Unknown => "Item",
        };
        item.display_name = format!("{label} {:03}", index + 1);
    }
}

fn confirmed_item(candidate: &Candidate, media_type: MediaType, format: String) -> MediaItem {
    MediaItem {
        identifier: candidate.identifier.clone(),
        display_name: candidate.identifier.clone(),
        media_type,
        format,
        discovery_strategy: candidate.discovery_strategy,
        validation_confidence: ValidationConfidence::Confirmed,
    }
}

fn classify_content_type(content_type: &str) -> Option<(MediaType, String)> {
    let essence = content_type.split(';').next().unwrap_or("").trim();
    let (kind, subtype) = essence.split_once('/')?;
    let media_type = match kind {
        "image" => MediaType::Image,
        "video" => MediaType::Video,
        _ => return None,
    };
    let format = if subtype.is_empty() {
        FORMAT_UNKNOWN.to_string()
    } else {
        subtype.to_ascii_uppercase()
    };
    Some((media_type, format))
}
