use drivegallery::discovery::discover_from_html;
use drivegallery::folder_ref::extract_folder_id;
use drivegallery::gallery::GalleryState;
use drivegallery::models::{MediaType, ValidationConfidence};
use drivegallery::validate::{MediaProbe, SkipPolicy};
use drivegallery::GalleryError;
use std::collections::HashMap;

const LONG_ID: &str = "QWdefgh12345678901234567890AB";

struct CannedProbe {
    content_types: HashMap<String, String>,
}

impl CannedProbe {
    fn empty() -> Self {
        Self {
            content_types: HashMap::new(),
        }
    }

    fn with_content_type(id: &str, content_type: &str) -> Self {
        let mut content_types = HashMap::new();
        content_types.insert(id.to_string(), content_type.to_string());
        Self { content_types }
    }
}

impl MediaProbe for CannedProbe {
    fn metadata_content_type(&self, identifier: &str) -> Option<String> {
        self.content_types.get(identifier).cloned()
    }

    fn content_prefix(&self, _identifier: &str) -> Option<Vec<u8>> {
        None
    }
}

#[test]
fn reference_shapes_resolve_to_embedded_identifiers() {
    // Scenario A: full share URL resolves via the path segment.
    assert_eq!(
        extract_folder_id("https://provider.example/drive/folders/ABC123?usp=sharing")
            .expect("share url"),
        "ABC123"
    );

    // Scenario B: query-parameter shape and bare id.
    assert_eq!(extract_folder_id("id=XYZ789").expect("query shape"), "XYZ789");
    assert_eq!(extract_folder_id("XYZ789").expect("bare id"), "XYZ789");
}

#[test]
fn confirmed_candidate_flows_through_to_a_media_item() {
    // Scenario C: a long mixed-class token next to the folder's own id.
    let html = format!(
        r#"<script>var ids = ["{LONG_ID}", "ABC123"];</script>"#
    );
    let probe = CannedProbe::with_content_type(LONG_ID, "image/png");

    let summary = discover_from_html("ABC123", &html, None, SkipPolicy::Strict, &probe, 8)
        .expect("summary");

    assert_eq!(summary.items.len(), 1);
    let item = &summary.items[0];
    assert_eq!(item.identifier, LONG_ID);
    assert_eq!(item.media_type, MediaType::Image);
    assert_eq!(item.format, "PNG");
    assert_eq!(item.validation_confidence, ValidationConfidence::Confirmed);
    assert_eq!(item.display_name, "Image 001");
}

#[test]
fn probe_timeout_follows_the_skip_policy() {
    // Scenario D: the probe never answers for this candidate.
    let html = format!(r#"var a = "{LONG_ID}";"#);
    let probe = CannedProbe::empty();

    let lenient = discover_from_html("ABC123", &html, None, SkipPolicy::Lenient, &probe, 8)
        .expect("lenient keeps the item");
    assert_eq!(lenient.items.len(), 1);
    assert_eq!(lenient.items[0].media_type, MediaType::Image);
    assert_eq!(
        lenient.items[0].validation_confidence,
        ValidationConfidence::Assumed
    );

    let strict = discover_from_html("ABC123", &html, None, SkipPolicy::Strict, &probe, 8);
    assert!(matches!(strict, Err(GalleryError::NoCandidates)));
}

#[test]
fn embed_view_entries_union_with_the_folder_page() {
    let folder_html = format!(r#"var a = "{LONG_ID}";"#);
    let embed_html = r#"
        <div class="flip-entry" id="entry-1AbCdEfGhIjKlMnOpQrStUvWxYz12">
          <img src="thumb.jpg">
        </div>
    "#;
    let probe = CannedProbe::empty();

    let summary = discover_from_html(
        "ABC123",
        &folder_html,
        Some(embed_html),
        SkipPolicy::Lenient,
        &probe,
        8,
    )
    .expect("summary");

    let ids: Vec<&str> = summary
        .items
        .iter()
        .map(|item| item.identifier.as_str())
        .collect();
    assert!(ids.contains(&LONG_ID), "ids={ids:?}");
    assert!(ids.contains(&"1AbCdEfGhIjKlMnOpQrStUvWxYz12"), "ids={ids:?}");

    // Display names are renumbered globally across both sources.
    let names: Vec<&str> = summary
        .items
        .iter()
        .map(|item| item.display_name.as_str())
        .collect();
    assert_eq!(names, vec!["Image 001", "Image 002"]);
}

#[test]
fn sequencer_wraps_at_both_ends_with_loop_enabled() {
    // Scenario E: five items, loop on.
    let html = format!(
        r#""1AbCdEfGhIjKlMnOpQrStUvWx{}" "{LONG_ID}" "2BcDeFgHiJkLmNoPqRsTuVwXy99"
           "3CdEfGhIjKlMnOpQrStUvWxYz88" "4DeFgHiJkLmNoPqRsTuVwXyZa77""#,
        "Yz11"
    );
    let probe = CannedProbe::empty();
    let summary = discover_from_html("ABC123", &html, None, SkipPolicy::Lenient, &probe, 8)
        .expect("summary");
    assert_eq!(summary.items.len(), 5);

    let mut state = GalleryState::new(summary.items);
    state.set_loop_enabled(true);
    state.jump(4);
    state.next();
    assert_eq!(state.current_index(), 0);
    state.prev();
    assert_eq!(state.current_index(), 4);
}
