use crate::fetch::{DEFAULT_FETCH_TIMEOUT_SECS, MAX_FETCH_TIMEOUT_SECS, MIN_FETCH_TIMEOUT_SECS};
use crate::gallery::{DEFAULT_SLIDE_DURATION_SECS, MAX_SLIDE_DURATION_SECS, MIN_SLIDE_DURATION_SECS};
use crate::validate::{SkipPolicy, DEFAULT_PROBE_CONCURRENCY, MAX_PROBE_CONCURRENCY};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GalleryConfig {
    /// Explicit zero-skip switch; changing this materially changes which
    /// items end up in the gallery, so it is a named, persisted choice.
    #[serde(default)]
    pub skip_policy: SkipPolicy,
    #[serde(default = "default_slide_duration")]
    pub slide_duration_seconds: u64,
    #[serde(default = "default_loop_enabled")]
    pub loop_enabled: bool,
    #[serde(default = "default_probe_concurrency")]
    pub probe_concurrency: usize,
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,
}

fn default_slide_duration() -> u64 {
    DEFAULT_SLIDE_DURATION_SECS
}

fn default_loop_enabled() -> bool {
    true
}

fn default_probe_concurrency() -> usize {
    DEFAULT_PROBE_CONCURRENCY
}

fn default_fetch_timeout() -> u64 {
    DEFAULT_FETCH_TIMEOUT_SECS
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            skip_policy: SkipPolicy::default(),
            slide_duration_seconds: default_slide_duration(),
            loop_enabled: default_loop_enabled(),
            probe_concurrency: default_probe_concurrency(),
            fetch_timeout_secs: default_fetch_timeout(),
        }
    }
}

impl GalleryConfig {
    pub fn normalized(mut self) -> Self {
        self.slide_duration_seconds = self
            .slide_duration_seconds
            .clamp(MIN_SLIDE_DURATION_SECS, MAX_SLIDE_DURATION_SECS);
        self.probe_concurrency = self.probe_concurrency.clamp(1, MAX_PROBE_CONCURRENCY);
        self.fetch_timeout_secs = self
            .fetch_timeout_secs
            .clamp(MIN_FETCH_TIMEOUT_SECS, MAX_FETCH_TIMEOUT_SECS);
        self
    }
}

pub fn load_config(path: &Path) -> Result<GalleryConfig> {
    if !path.exists() {
        return Ok(GalleryConfig::default());
    }
    let bytes = std::fs::read(path)?;
    let parsed: GalleryConfig = serde_json::from_slice(&bytes)?;
    Ok(parsed.normalized())
}

pub fn save_config(path: &Path, config: &GalleryConfig) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(path, format!("{json}\n"))?;
    Ok(())
}
