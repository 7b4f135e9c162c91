use crate::models::{Candidate, DiscoveryStrategy};
use regex::Regex;
use scraper::{Html, Selector};
use std::collections::HashSet;

/// Length window for the host's addressable-object id shape. Observed
/// folder/file ids are 25-44 chars of `[A-Za-z0-9_-]`. These are tunable
/// heuristics against an undocumented surface, not guarantees.
pub const ID_MIN_LEN: usize = 25;
pub const ID_MAX_LEN: usize = 44;

/// Byte window scanned on either side of an explicit MIME token.
const MIME_WINDOW_BYTES: usize = 160;

const MEDIA_FILENAME_EXTS: &str = "jpe?g|png|gif|webp|bmp|svg|tiff?|avif|heic|mp4|mov|m4v|webm|mkv|avi|flv|mpe?g";

fn id_pattern() -> String {
    format!("[A-Za-z0-9_-]{{{ID_MIN_LEN},{ID_MAX_LEN}}}")
}

struct CandidateSet {
    exclude_id: String,
    seen: HashSet<String>,
    out: Vec<Candidate>,
}

impl CandidateSet {
    fn new(exclude_id: &str) -> Self {
        Self {
            exclude_id: exclude_id.to_string(),
            seen: HashSet::new(),
            out: Vec::new(),
        }
    }

    // Identifier equality decides dedup; the first strategy to record an
    // identifier keeps the attribution.
    fn record(&mut self, identifier: &str, strategy: DiscoveryStrategy) {
        if identifier == self.exclude_id {
            return;
        }
        if self.seen.insert(identifier.to_string()) {
            self.out.push(Candidate {
                identifier: identifier.to_string(),
                discovery_strategy: strategy,
            });
        }
    }
}

/// Runs the full strategy battery over one folder page and unions the
/// results with set semantics on identifier value. Every strategy
/// tolerates zero matches; none of them can fail.
pub fn extract_candidates(html: &str, exclude_id: &str) -> Vec<Candidate> {
    let mut set = CandidateSet::new(exclude_id);
    let unescaped = unescape_inline_json(html);

    scan_quoted_literals(html, &mut set);
    scan_quoted_literals(&unescaped, &mut set);
    scan_data_blobs(html, &mut set);
    scan_mime_adjacent(&unescaped, &mut set);
    scan_thumbnail_urls(&unescaped, &mut set);
    scan_raw_tokens(&unescaped, &mut set);
    scan_structured_literals(&unescaped, &mut set);

    set.out
}

/// Scraper pass over the provider's embedded folder-view widget markup,
/// where each entry node carries an `entry-<id>` element id. Used in
/// addition to the regex battery when the embed page is available.
pub fn extract_embed_entries(html: &str, exclude_id: &str) -> Vec<Candidate> {
    let document = Html::parse_document(html);
    let selector = Selector::parse(r#"[id^="entry-"]"#).expect("entry selector");
    let mut set = CandidateSet::new(exclude_id);

    for node in document.select(&selector) {
        let Some(raw) = node.value().attr("id") else {
            continue;
        };
        let Some(identifier) = raw.strip_prefix("entry-") else {
            continue;
        };
        if is_id_shaped(identifier) {
            set.record(identifier, DiscoveryStrategy::EmbedView);
        }
    }

    set.out
}

/// Removes the folder's own id, rejects single-character-class spans
/// (all-digit, all-upper, all-lower runs of id length are overwhelmingly
/// minified-script noise, not real ids), and dedups with stable
/// first-seen order. Heuristic: a legitimately unlucky id could in
/// principle be rejected, and mixed noise can pass.
pub fn filter_candidates(candidates: Vec<Candidate>, exclude_id: &str) -> Vec<Candidate> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut out: Vec<Candidate> = Vec::new();
    for candidate in candidates {
        if candidate.identifier == exclude_id {
            continue;
        }
        if is_single_character_class(&candidate.identifier) {
            continue;
        }
        if seen.insert(candidate.identifier.clone()) {
            out.push(candidate);
        }
    }
    out
}

pub fn is_id_shaped(value: &str) -> bool {
    (ID_MIN_LEN..=ID_MAX_LEN).contains(&value.len())
        && value
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

fn is_single_character_class(value: &str) -> bool {
    value.bytes().all(|b| b.is_ascii_digit())
        || value.bytes().all(|b| b.is_ascii_uppercase())
        || value.bytes().all(|b| b.is_ascii_lowercase())
}

// Folder pages carry most of their payload inside script strings where
// quotes and slashes arrive escaped.
fn unescape_inline_json(html: &str) -> String {
    html.replace("\\\"", "\"")
        .replace("\\/", "/")
        .replace("\\x22", "\"")
        .replace("\\x5b", "[")
        .replace("\\x5d", "]")
}

fn is_id_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'_'
}

// A match is only a token when it is not embedded in a longer id-charset
// run (the length window would otherwise slice prefixes out of hashes and
// base64 blobs).
fn has_token_boundaries(text: &str, start: usize, end: usize) -> bool {
    let bytes = text.as_bytes();
    if start > 0 && is_id_byte(bytes[start - 1]) {
        return false;
    }
    if end < bytes.len() && is_id_byte(bytes[end]) {
        return false;
    }
    true
}

fn scan_quoted_literals(text: &str, set: &mut CandidateSet) {
    let re = Regex::new(&format!(r#"["']({})["']"#, id_pattern())).expect("quoted literal regex");
    for caps in re.captures_iter(text) {
        set.record(&caps[1], DiscoveryStrategy::QuotedLiteral);
    }
}

fn scan_data_blobs(html: &str, set: &mut CandidateSet) {
    // The folder view assigns its item table to a recognizable internal
    // variable as one large escaped array literal; extract the blob first,
    // then re-scan inside it.
    let blob_re = Regex::new(
        r#"(?s)(?:_DRIVE_ivd|AF_initDataCallback).{0,40}?['"]((?:[^'"\\]|\\.){64,})['"]"#,
    )
    .expect("data blob regex");
    let token_re = Regex::new(&id_pattern()).expect("blob token regex");

    for caps in blob_re.captures_iter(html) {
        let blob = unescape_inline_json(&caps[1]);
        for m in token_re.find_iter(&blob) {
            if has_token_boundaries(&blob, m.start(), m.end()) {
                set.record(m.as_str(), DiscoveryStrategy::DataBlob);
            }
        }
    }
}

fn scan_mime_adjacent(text: &str, set: &mut CandidateSet) {
    let mime_re = Regex::new(r"(?:image|video)/[a-z0-9.+-]+").expect("mime token regex");
    let token_re = Regex::new(&id_pattern()).expect("mime window token regex");

    for m in mime_re.find_iter(text) {
        let lo = clamp_to_char_boundary(text, m.start().saturating_sub(MIME_WINDOW_BYTES));
        let hi = clamp_to_char_boundary(text, (m.end() + MIME_WINDOW_BYTES).min(text.len()));
        let window = &text[lo..hi];
        for token in token_re.find_iter(window) {
            if has_token_boundaries(window, token.start(), token.end()) {
                set.record(token.as_str(), DiscoveryStrategy::MimeAdjacent);
            }
        }
    }
}

fn scan_thumbnail_urls(text: &str, set: &mut CandidateSet) {
    let patterns = [
        format!(r"googleusercontent\.com/d/({})", id_pattern()),
        format!(r"thumbnail\?id=({})", id_pattern()),
        format!(r"/file/d/({})", id_pattern()),
    ];
    for pattern in patterns {
        let re = Regex::new(&pattern).expect("thumbnail url regex");
        for caps in re.captures_iter(text) {
            set.record(&caps[1], DiscoveryStrategy::ThumbnailUrl);
        }
    }
}

// Last-resort superset: every id-shaped token anywhere in the document.
// Relies on the filter stage to shed the noise this inevitably sweeps up.
fn scan_raw_tokens(text: &str, set: &mut CandidateSet) {
    let re = Regex::new(&id_pattern()).expect("raw token regex");
    for m in re.find_iter(text) {
        if has_token_boundaries(text, m.start(), m.end()) {
            set.record(m.as_str(), DiscoveryStrategy::RawScan);
        }
    }
}

fn scan_structured_literals(text: &str, set: &mut CandidateSet) {
    let id = id_pattern();
    let filename = format!(r#"[^"\[\]]{{1,200}}\.(?:{MEDIA_FILENAME_EXTS})"#);
    let patterns = [
        // ["<id>","<name.ext>" ...
        format!(r#"(?i)[\[{{]\s*"({id})"\s*,\s*"{filename}""#),
        // ["<name.ext>", ... "<id>"]
        format!(r#"(?i)[\[{{]\s*"{filename}"\s*,\s*"({id})""#),
    ];
    for pattern in patterns {
        let re = Regex::new(&pattern).expect("structured literal regex");
        for caps in re.captures_iter(text) {
            set.record(&caps[1], DiscoveryStrategy::StructuredLiteral);
        }
    }
}

fn clamp_to_char_boundary(text: &str, mut index: usize) -> usize {
    while index > 0 && !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_ID: &str = "QWdefgh12345678901234567890AB";

    #[test]
    fn quoted_literal_strategy_finds_plain_and_escaped_ids() {
        let html = format!(r#"var a = "{SAMPLE_ID}"; var b = \"1AbCdEfGhIjKlMnOpQrStUvWxYz12\";"#);
        let out = extract_candidates(&html, "ABC123");
        let ids: Vec<&str> = out.iter().map(|c| c.identifier.as_str()).collect();
        assert!(ids.contains(&SAMPLE_ID), "ids={ids:?}");
        assert!(ids.contains(&"1AbCdEfGhIjKlMnOpQrStUvWxYz12"), "ids={ids:?}");
        assert_eq!(
            out[0].discovery_strategy,
            DiscoveryStrategy::QuotedLiteral
        );
    }

    #[test]
    fn data_blob_strategy_rescans_extracted_blob() {
        let html = format!(
            r#"window['_DRIVE_ivd'] = '[[\x5b\x22{SAMPLE_ID}\x22,\x22photo.jpg\x22\x5d,null,null,null,null,null,null,null,null,null,null,null]]';"#
        );
        let out = extract_candidates(&html, "ABC123");
        assert!(
            out.iter().any(|c| c.identifier == SAMPLE_ID),
            "candidates={out:?}"
        );
    }

    #[test]
    fn mime_adjacent_strategy_uses_bounded_window() {
        let html = format!(r#"[null,"{SAMPLE_ID}",null,"image/jpeg",null]"#);
        let out = extract_candidates(&html, "ABC123");
        assert!(out
            .iter()
            .any(|c| c.identifier == SAMPLE_ID));
    }

    #[test]
    fn thumbnail_url_strategy_reads_path_segments() {
        let html = format!(
            "<img src=\"https://lh3.googleusercontent.com/d/{SAMPLE_ID}=s220\">\
             <a href=\"https://drive.google.com/thumbnail?id=1AbCdEfGhIjKlMnOpQrStUvWxYz12&sz=w400\">x</a>"
        );
        let out = extract_candidates(&html, "ABC123");
        let ids: Vec<&str> = out.iter().map(|c| c.identifier.as_str()).collect();
        assert!(ids.contains(&SAMPLE_ID));
        assert!(ids.contains(&"1AbCdEfGhIjKlMnOpQrStUvWxYz12"));
    }

    #[test]
    fn raw_scan_respects_token_boundaries() {
        // Embedded in a longer charset run: not a token.
        let html = format!("xxxx{SAMPLE_ID}yyyy {SAMPLE_ID} zzz");
        let out = extract_candidates(&html, "ABC123");
        let hits = out.iter().filter(|c| c.identifier == SAMPLE_ID).count();
        assert_eq!(hits, 1, "candidates={out:?}");
    }

    #[test]
    fn structured_literal_strategy_accepts_both_orders() {
        let html = format!(
            r#"["{SAMPLE_ID}","sunset.jpg"] ["holiday.png","1AbCdEfGhIjKlMnOpQrStUvWxYz12"]"#
        );
        let out = extract_candidates(&html, "ABC123");
        let ids: Vec<&str> = out.iter().map(|c| c.identifier.as_str()).collect();
        assert!(ids.contains(&SAMPLE_ID), "ids={ids:?}");
        assert!(ids.contains(&"1AbCdEfGhIjKlMnOpQrStUvWxYz12"), "ids={ids:?}");
    }

    #[test]
    fn overlapping_strategies_never_duplicate_an_identifier() {
        // Quoted, thumbnail URL and raw scan all see this id.
        let html = format!(
            r#""{SAMPLE_ID}" https://lh3.googleusercontent.com/d/{SAMPLE_ID} {SAMPLE_ID}"#
        );
        let out = extract_candidates(&html, "ABC123");
        let hits = out.iter().filter(|c| c.identifier == SAMPLE_ID).count();
        assert_eq!(hits, 1);
    }

    #[test]
    fn extractor_never_emits_the_excluded_folder_id() {
        let folder = "1FolderOwnIdAbCdEfGhIjKlMnOp";
        let html = format!(r#""{folder}" "{SAMPLE_ID}""#);
        let out = extract_candidates(&html, folder);
        assert!(out.iter().all(|c| c.identifier != folder));
        assert!(out.iter().any(|c| c.identifier == SAMPLE_ID));
    }

    #[test]
    fn embed_entries_are_parsed_from_entry_nodes() {
        let html = format!(
            r#"<div class="flip-entry" id="entry-{SAMPLE_ID}">
                 <img src="x.jpg"></div>
               <div id="entry-short">skip</div>"#
        );
        let out = extract_embed_entries(&html, "ABC123");
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].identifier, SAMPLE_ID);
        assert_eq!(out[0].discovery_strategy, DiscoveryStrategy::EmbedView);
    }

    #[test]
    fn filter_drops_excluded_id_and_single_class_spans() {
        let make = |id: &str| Candidate {
            identifier: id.to_string(),
            discovery_strategy: DiscoveryStrategy::RawScan,
        };
        let input = vec![
            make("ABC123"),
            make(SAMPLE_ID),
            make("1111111111111111111111111111"),
            make("ABCDEFGHIJKLMNOPQRSTUVWXYZAB"),
            make("abcdefghijklmnopqrstuvwxyzab"),
            make(SAMPLE_ID),
        ];
        let out = filter_candidates(input, "ABC123");
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].identifier, SAMPLE_ID);
    }

    #[test]
    fn filter_order_is_stable_for_the_same_input() {
        let make = |id: &str| Candidate {
            identifier: id.to_string(),
            discovery_strategy: DiscoveryStrategy::RawScan,
        };
        let input: Vec<Candidate> = vec![
            make("1AbCdEfGhIjKlMnOpQrStUvWxYz12"),
            make(SAMPLE_ID),
            make("1AbCdEfGhIjKlMnOpQrStUvWxYz12"),
        ];
        let a = filter_candidates(input.clone(), "ABC123");
        let b = filter_candidates(input, "ABC123");
        let ids_a: Vec<&str> = a.iter().map(|c| c.identifier.as_str()).collect();
        let ids_b: Vec<&str> = b.iter().map(|c| c.identifier.as_str()).collect();
        assert_eq!(ids_a, ids_b);
        assert_eq!(ids_a, vec!["1AbCdEfGhIjKlMnOpQrStUvWxYz12", SAMPLE_ID]);
    }
}
