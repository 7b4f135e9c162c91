use crate::models::MediaItem;
use rand::Rng;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

pub const DEFAULT_SLIDE_DURATION_SECS: u64 = 5;
pub const MIN_SLIDE_DURATION_SECS: u64 = 1;
pub const MAX_SLIDE_DURATION_SECS: u64 = 300;

/// Pure state machine over the ordered item collection. Fields are
/// private: every mutation goes through a method so the index invariant
/// (`0 <= current_index < len` whenever items is non-empty) holds at all
/// times. One instance belongs to one session context; commands within a
/// session are processed one at a time.
#[derive(Debug, Clone, Serialize)]
pub struct GalleryState {
    items: Vec<MediaItem>,
    current_index: usize,
    autoplay_enabled: bool,
    loop_enabled: bool,
    slide_duration_seconds: u64,
}

impl GalleryState {
    pub fn new(items: Vec<MediaItem>) -> Self {
        Self {
            items,
            current_index: 0,
            autoplay_enabled: false,
            loop_enabled: true,
            slide_duration_seconds: DEFAULT_SLIDE_DURATION_SECS,
        }
    }

    /// Wholesale replacement on a new load; there is no incremental merge.
    pub fn replace_items(&mut self, items: Vec<MediaItem>) {
        self.items = items;
        self.current_index = 0;
    }

    pub fn items(&self) -> &[MediaItem] {
        &self.items
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_item(&self) -> Option<&MediaItem> {
        self.items.get(self.current_index)
    }

    pub fn autoplay_enabled(&self) -> bool {
        self.autoplay_enabled
    }

    pub fn loop_enabled(&self) -> bool {
        self.loop_enabled
    }

    pub fn slide_duration_seconds(&self) -> u64 {
        self.slide_duration_seconds
    }

    pub fn slide_duration(&self) -> Duration {
        Duration::from_secs(self.slide_duration_seconds)
    }

    pub fn set_loop_enabled(&mut self, enabled: bool) {
        self.loop_enabled = enabled;
    }

    pub fn set_slide_duration_seconds(&mut self, seconds: u64) {
        self.slide_duration_seconds =
            seconds.clamp(MIN_SLIDE_DURATION_SECS, MAX_SLIDE_DURATION_SECS);
    }

    pub fn first(&mut self) {
        if !self.items.is_empty() {
            self.current_index = 0;
        }
    }

    pub fn last(&mut self) {
        if !self.items.is_empty() {
            self.current_index = self.items.len() - 1;
        }
    }

    pub fn next(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let last = self.items.len() - 1;
        if self.current_index >= last {
            if self.loop_enabled {
                self.current_index = 0;
            }
        } else {
            self.current_index += 1;
        }
    }

    pub fn prev(&mut self) {
        if self.items.is_empty() {
            return;
        }
        if self.current_index == 0 {
            if self.loop_enabled {
                self.current_index = self.items.len() - 1;
            }
        } else {
            self.current_index -= 1;
        }
    }

    /// No-op for any index outside the collection.
    pub fn jump(&mut self, index: usize) {
        if index < self.items.len() {
            self.current_index = index;
        }
    }

    pub fn shuffle(&mut self) {
        if self.items.is_empty() {
            return;
        }
        self.current_index = rand::thread_rng().gen_range(0..self.items.len());
    }

    pub fn toggle_play(&mut self) {
        self.autoplay_enabled = !self.autoplay_enabled;
    }

    pub fn stop_and_reset(&mut self) {
        self.autoplay_enabled = false;
        self.current_index = 0;
    }

    /// Timer-driven advance: like `next()`, except reaching the end
    /// without loop switches autoplay off instead of stalling there.
    pub fn autoplay_tick(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let at_end = self.current_index == self.items.len() - 1;
        if at_end && !self.loop_enabled {
            self.autoplay_enabled = false;
            return;
        }
        self.next();
    }
}

/// Marker delivered on the tick channel when a scheduled slide interval
/// elapses without being cancelled first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoplayTick;

/// Replacement for the reference behavior of blocking the render thread
/// for the slide duration: a scheduled tick posted on a channel, and a
/// generation counter so cancelling (toggle off, new load, session end)
/// invalidates any tick still sleeping.
#[derive(Debug, Clone, Default)]
pub struct AutoplayTimer {
    generation: Arc<AtomicU64>,
}

impl AutoplayTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules one tick after `delay`. The previous schedule, if any,
    /// is superseded; at most one pending tick can ever fire.
    pub fn schedule(&self, delay: Duration, sender: Sender<AutoplayTick>) {
        let armed = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let generation = self.generation.clone();
        thread::spawn(move || {
            thread::sleep(delay);
            if generation.load(Ordering::SeqCst) == armed {
                let _ = sender.send(AutoplayTick);
            }
        });
    }

    /// Invalidates any pending tick.
    pub fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }
}
