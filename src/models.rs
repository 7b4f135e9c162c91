use serde::{Deserialize, Serialize};

/// Format string used when validation could not establish a real format.
pub const FORMAT_UNKNOWN: &str = "UNKNOWN";
/// Format string used when the zero-skip policy kept an unverified candidate.
pub const FORMAT_ASSUMED: &str = "ASSUMED";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Image,
    Video,
    Unknown,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Image => "image",
            MediaType::Video => "video",
            MediaType::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationConfidence {
    /// A probe tier positively identified the media type.
    Confirmed,
    /// No probe was conclusive; kept under the lenient skip policy.
    Assumed,
    /// Injected by a caller that bypassed validation (api listing, local scan).
    Forced,
}

impl ValidationConfidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationConfidence::Confirmed => "confirmed",
            ValidationConfidence::Assumed => "assumed",
            ValidationConfidence::Forced => "forced",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscoveryStrategy {
    QuotedLiteral,
    DataBlob,
    MimeAdjacent,
    ThumbnailUrl,
    RawScan,
    StructuredLiteral,
    EmbedView,
    ApiListing,
    LocalScan,
}

impl DiscoveryStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiscoveryStrategy::QuotedLiteral => "quoted_literal",
            DiscoveryStrategy::DataBlob => "data_blob",
            DiscoveryStrategy::MimeAdjacent => "mime_adjacent",
            DiscoveryStrategy::ThumbnailUrl => "thumbnail_url",
            DiscoveryStrategy::RawScan => "raw_scan",
            DiscoveryStrategy::StructuredLiteral => "structured_literal",
            DiscoveryStrategy::EmbedView => "embed_view",
            DiscoveryStrategy::ApiListing => "api_listing",
            DiscoveryStrategy::LocalScan => "local_scan",
        }
    }
}

/// An unverified identifier found in the folder page, tagged with the
/// strategy that first recorded it. Equality for dedup purposes is on the
/// identifier value, never the strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    pub identifier: String,
    pub discovery_strategy: DiscoveryStrategy,
}

/// Durable output unit of discovery. Never mutated after creation except
/// for display-name renumbering when the final ordered collection is
/// assembled; the whole collection is replaced wholesale on every load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaItem {
    pub identifier: String,
    pub display_name: String,
    pub media_type: MediaType,
    pub format: String,
    pub discovery_strategy: DiscoveryStrategy,
    pub validation_confidence: ValidationConfidence,
}
