use crate::candidates::{extract_candidates, extract_embed_entries, filter_candidates};
use crate::fetch::{fetch_embed_html, fetch_folder_html};
use crate::folder_ref::extract_folder_id;
use crate::models::{Candidate, MediaItem, ValidationConfidence};
use crate::validate::{renumber_display_names, validate_candidates, MediaProbe, SkipPolicy};
use crate::{GalleryError, Result};
use std::collections::HashSet;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct DiscoveryRequest {
    pub folder_reference: String,
    pub skip_policy: SkipPolicy,
    pub probe_concurrency: usize,
}

#[derive(Debug, Clone)]
pub struct DiscoverySummary {
    pub operation_id: String,
    pub folder_id: String,
    pub candidates_found: usize,
    pub candidates_kept: usize,
    pub assumed_items: usize,
    pub items: Vec<MediaItem>,
}

/// Single-flow load operation: extract the folder id, fetch the folder
/// page (plus the embed-view page, best effort), run the strategy
/// battery, filter, validate over the worker pool, and renumber display
/// names. Extraction and fetch failures abort the load; everything after
/// that degrades per candidate.
pub fn load_gallery<FLog>(
    request: &DiscoveryRequest,
    agent: &ureq::Agent,
    probe: &dyn MediaProbe,
    mut log_line: FLog,
) -> Result<DiscoverySummary>
where
    FLog: FnMut(&str, &str, serde_json::Value) -> Result<()>,
{
    let operation_id = Uuid::new_v4().to_string();
    let folder_id = extract_folder_id(&request.folder_reference)?;

    log_line(
        "info",
        "gallery_load_started",
        serde_json::json!({
            "operation_id": operation_id,
            "folder_id": folder_id,
            "skip_policy": request.skip_policy,
        }),
    )?;

    let folder_html = fetch_folder_html(agent, &folder_id)?;
    log_line(
        "info",
        "folder_page_fetched",
        serde_json::json!({
            "operation_id": operation_id,
            "bytes": folder_html.len(),
        }),
    )?;

    // The embed widget is an enrichment, not a requirement; a blocked or
    // changed embed endpoint must not fail the load.
    let embed_html = match fetch_embed_html(agent, &folder_id) {
        Ok(html) => Some(html),
        Err(err) => {
            log_line(
                "warn",
                "embed_view_fetch_failed",
                serde_json::json!({
                    "operation_id": operation_id,
                    "error": err.to_string(),
                }),
            )?;
            None
        }
    };

    let mut summary = discover_from_html(
        &folder_id,
        &folder_html,
        embed_html.as_deref(),
        request.skip_policy,
        probe,
        request.probe_concurrency,
    )?;
    summary.operation_id = operation_id.clone();

    log_line(
        "info",
        "gallery_load_completed",
        serde_json::json!({
            "operation_id": operation_id,
            "candidates_found": summary.candidates_found,
            "candidates_kept": summary.candidates_kept,
            "items": summary.items.len(),
            "assumed_items": summary.assumed_items,
        }),
    )?;

    Ok(summary)
}

/// Convenience entry point wiring the HTTP agent and probe up from a
/// `GalleryConfig`.
pub fn load_gallery_http<FLog>(
    folder_reference: &str,
    config: &crate::config::GalleryConfig,
    log_line: FLog,
) -> Result<DiscoverySummary>
where
    FLog: FnMut(&str, &str, serde_json::Value) -> Result<()>,
{
    let agent = crate::fetch::build_agent(config.fetch_timeout_secs);
    let probe = crate::validate::HttpProbe::new(agent.clone());
    let request = DiscoveryRequest {
        folder_reference: folder_reference.to_string(),
        skip_policy: config.skip_policy,
        probe_concurrency: config.probe_concurrency,
    };
    load_gallery(&request, &agent, &probe, log_line)
}

/// The fetch-free tail of the pipeline, split out so it can run against
/// canned page text.
pub fn discover_from_html(
    folder_id: &str,
    folder_html: &str,
    embed_html: Option<&str>,
    skip_policy: SkipPolicy,
    probe: &dyn MediaProbe,
    probe_concurrency: usize,
) -> Result<DiscoverySummary> {
    let mut found = extract_candidates(folder_html, folder_id);
    if let Some(embed) = embed_html {
        let mut extra = extract_embed_entries(embed, folder_id);
        extra.extend(extract_candidates(embed, folder_id));
        found = merge_candidates(found, extra);
    }

    let candidates_found = found.len();
    let kept = filter_candidates(found, folder_id);
    if kept.is_empty() {
        return Err(GalleryError::NoCandidates);
    }
    let candidates_kept = kept.len();

    let mut items = validate_candidates(&kept, skip_policy, probe, probe_concurrency);
    if items.is_empty() {
        return Err(GalleryError::NoCandidates);
    }
    renumber_display_names(&mut items);

    let assumed_items = items
        .iter()
        .filter(|item| item.validation_confidence == ValidationConfidence::Assumed)
        .count();

    Ok(DiscoverySummary {
        operation_id: String::new(),
        folder_id: folder_id.to_string(),
        candidates_found,
        candidates_kept,
        assumed_items,
        items,
    })
}

// Union with set semantics on identifier value; earlier entries keep
// their strategy attribution.
fn merge_candidates(base: Vec<Candidate>, extra: Vec<Candidate>) -> Vec<Candidate> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut out: Vec<Candidate> = Vec::new();
    for candidate in base.into_iter().chain(extra.into_iter()) {
        if seen.insert(candidate.identifier.clone()) {
            out.push(candidate);
        }
    }
    out
}
