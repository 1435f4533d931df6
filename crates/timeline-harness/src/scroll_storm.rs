#![forbid(unsafe_code)]

//! Scroll storm generator and replay.
//!
//! Generates deterministic scroll offset sequences and feeds them through a
//! [`ListController`] several events per simulated display frame, so that the
//! render scheduler has bursts to coalesce. Every emitted frame is written as
//! one JSON line.
//!
//! # JSONL Schema
//!
//! ```json
//! {"event":"storm_start","seed":42,"pattern":"fling","events":180,"events_per_frame":4,"items":1189}
//! {"event":"frame","frame":1,"scroll":0,"start":0,"end":8,"mounted":9,"total_height":216134,"coalesced":3,"triggers":["scroll","resize","sequence"],"tracks":{"CHP0001":["track_main"]}}
//! {"event":"storm_complete","frames":45,"triggers":183,"coalesced":138,"max_mounted":22,"checksum":"..."}
//! ```
//!
//! `start`/`end` are `null` for an empty sequence. `triggers` lists the
//! distinct trigger kinds folded into the frame. `tracks` maps each mounted
//! card that takes part in at least one ordering track to its track ids; it
//! is empty unless the storm is replayed with
//! [`ScrollStorm::replay_with_tracks`].
//!
//! # Usage
//!
//! ```
//! use timeline_core::config::LayoutConfig;
//! use timeline_harness::scroll_storm::{ScrollStorm, StormConfig, StormPattern};
//! use timeline_widgets::list_controller::{ListController, ReplaceOptions};
//!
//! let mut list: ListController<u32> = ListController::new(LayoutConfig::default());
//! let _ = list.replace_items(0..500, ReplaceOptions::default());
//!
//! let config = StormConfig::default().with_pattern(StormPattern::Jump { count: 40 });
//! let storm = ScrollStorm::new(config, 80_000);
//! let mut out = Vec::<u8>::new();
//! let summary = storm.replay(&mut list, &mut out).unwrap();
//! assert_eq!(summary.frames, 10);
//! ```

use std::hash::Hash;
use std::io::{self, Write};

use serde_json::{Map, Value, json};
use timeline_core::render_scheduler::Trigger;
use timeline_widgets::list_controller::ListController;

use crate::tracks::TrackIndex;

// ============================================================================
// Configuration
// ============================================================================

/// Shape of the generated offset sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StormPattern {
    /// Even steps from the top to the bottom.
    Sweep {
        /// Number of scroll events.
        steps: usize,
    },
    /// Flick gestures decelerating towards rest.
    Fling {
        /// Number of gestures.
        flings: usize,
    },
    /// Random jumps anywhere in the scrollable range.
    Jump {
        /// Number of scroll events.
        count: usize,
    },
}

impl StormPattern {
    /// Pattern name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Sweep { .. } => "sweep",
            Self::Fling { .. } => "fling",
            Self::Jump { .. } => "jump",
        }
    }

    /// Build a pattern from its name and a size parameter.
    pub fn from_name(name: &str, size: usize) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "sweep" => Some(Self::Sweep { steps: size }),
            "fling" => Some(Self::Fling { flings: size }),
            "jump" => Some(Self::Jump { count: size }),
            _ => None,
        }
    }
}

impl Default for StormPattern {
    fn default() -> Self {
        Self::Sweep { steps: 120 }
    }
}

/// Configuration for scroll storm generation and replay.
#[derive(Debug, Clone)]
pub struct StormConfig {
    /// Random seed for deterministic generation.
    pub seed: u64,
    /// Storm pattern to generate.
    pub pattern: StormPattern,
    /// Raw scroll events delivered between two display frames. At least 1.
    pub events_per_frame: usize,
    /// Toggle expansion of the first mounted card every N frames.
    pub expand_every: Option<usize>,
    /// Viewport height during the storm.
    pub viewport_height: u64,
}

impl Default for StormConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            pattern: StormPattern::default(),
            events_per_frame: 4,
            expand_every: None,
            viewport_height: 800,
        }
    }
}

impl StormConfig {
    /// Set the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the storm pattern.
    pub fn with_pattern(mut self, pattern: StormPattern) -> Self {
        self.pattern = pattern;
        self
    }

    /// Set how many scroll events arrive per frame.
    pub fn with_events_per_frame(mut self, events: usize) -> Self {
        self.events_per_frame = events.max(1);
        self
    }

    /// Toggle expansion every `frames` frames (0 disables).
    pub fn with_expand_every(mut self, frames: usize) -> Self {
        self.expand_every = (frames > 0).then_some(frames);
        self
    }

    /// Set the viewport height.
    pub fn with_viewport_height(mut self, height: u64) -> Self {
        self.viewport_height = height.max(1);
        self
    }
}

// ============================================================================
// Seeded RNG
// ============================================================================

/// Simple LCG PRNG for deterministic generation.
#[derive(Debug, Clone)]
struct SeededRng {
    state: u64,
}

impl SeededRng {
    fn new(seed: u64) -> Self {
        Self {
            state: seed.wrapping_add(1),
        }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.state
    }

    fn next_range(&mut self, min: u64, max: u64) -> u64 {
        if max <= min {
            return min;
        }
        min + (self.next_u64() % (max - min))
    }

    fn next_offset(&mut self, max: u64) -> u64 {
        match max.checked_add(1) {
            Some(end) => self.next_range(0, end),
            None => self.next_u64(),
        }
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() as f64) / (u64::MAX as f64)
    }

    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }
}

// ============================================================================
// Storm
// ============================================================================

/// A generated scroll storm over `[0, max_scroll]`.
#[derive(Debug, Clone)]
pub struct ScrollStorm {
    config: StormConfig,
    max_scroll: u64,
    offsets: Vec<u64>,
}

/// Totals reported after a replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StormSummary {
    /// Frames emitted.
    pub frames: u64,
    /// Triggers folded into those frames.
    pub triggers: u64,
    /// Recomputes avoided by coalescing.
    pub coalesced: u64,
    /// Largest mounted window seen.
    pub max_mounted: usize,
}

impl ScrollStorm {
    /// Generate the offset sequence for `max_scroll`.
    pub fn new(config: StormConfig, max_scroll: u64) -> Self {
        let mut storm = Self {
            config,
            max_scroll,
            offsets: Vec::new(),
        };
        storm.generate();
        storm
    }

    pub fn config(&self) -> &StormConfig {
        &self.config
    }

    /// Generated scroll offsets, in delivery order.
    pub fn offsets(&self) -> &[u64] {
        &self.offsets
    }

    fn generate(&mut self) {
        let mut rng = SeededRng::new(self.config.seed);
        self.offsets = match self.config.pattern {
            StormPattern::Sweep { steps } => self.generate_sweep(steps),
            StormPattern::Fling { flings } => self.generate_fling(&mut rng, flings),
            StormPattern::Jump { count } => self.generate_jump(&mut rng, count),
        };
    }

    fn generate_sweep(&self, steps: usize) -> Vec<u64> {
        (0..steps)
            .map(|i| {
                let t = if steps > 1 {
                    i as f64 / (steps - 1) as f64
                } else {
                    1.0
                };
                ((self.max_scroll as f64 * t).round() as u64).min(self.max_scroll)
            })
            .collect()
    }

    fn generate_fling(&self, rng: &mut SeededRng, flings: usize) -> Vec<u64> {
        let mut offsets = Vec::new();
        let max = i64::try_from(self.max_scroll).unwrap_or(i64::MAX);
        let mut position = 0i64;

        for _ in 0..flings {
            let mut velocity = rng.next_range(1_500, 9_000) as f64;
            if position > 0 && (position == max || rng.chance(0.4)) {
                velocity = -velocity;
            }
            while velocity.abs() >= 40.0 {
                position = position.saturating_add(velocity as i64).clamp(0, max);
                offsets.push(position as u64);
                if position == 0 || position == max {
                    break;
                }
                velocity *= 0.82;
            }
        }
        offsets
    }

    fn generate_jump(&self, rng: &mut SeededRng, count: usize) -> Vec<u64> {
        (0..count).map(|_| rng.next_offset(self.max_scroll)).collect()
    }

    /// FNV-1a checksum of the offset sequence (little-endian `u64`s).
    ///
    /// Stable across platforms and toolchains, so logged checksums can be
    /// compared between runs.
    pub fn sequence_checksum(&self) -> String {
        const FNV_OFFSET: u64 = 0xcbf29ce484222325;
        const FNV_PRIME: u64 = 0x00000100000001B3;

        let mut h = FNV_OFFSET;
        for offset in &self.offsets {
            for byte in offset.to_le_bytes() {
                h ^= u64::from(byte);
                h = h.wrapping_mul(FNV_PRIME);
            }
        }
        format!("{h:016x}")
    }

    /// Drive `list` through the storm, writing one JSON line per frame.
    ///
    /// Pending triggers from before the storm fold into the first frame.
    pub fn replay<K, W>(&self, list: &mut ListController<K>, out: &mut W) -> io::Result<StormSummary>
    where
        K: Clone + Eq + Hash,
        W: Write,
    {
        self.replay_annotated(list, out, |_| None)
    }

    /// Like [`replay`](Self::replay), also reporting the ordering tracks of
    /// every mounted card in each frame line.
    pub fn replay_with_tracks<K, W>(
        &self,
        list: &mut ListController<K>,
        tracks: &TrackIndex,
        out: &mut W,
    ) -> io::Result<StormSummary>
    where
        K: Clone + Eq + Hash + AsRef<str>,
        W: Write,
    {
        self.replay_annotated(list, out, |id: &K| {
            let id = id.as_ref();
            let names: Vec<&str> = tracks.tracks_of(id).collect();
            (!names.is_empty()).then(|| (id.to_owned(), json!(names)))
        })
    }

    fn replay_annotated<K, W, F>(
        &self,
        list: &mut ListController<K>,
        out: &mut W,
        mut tracks_of: F,
    ) -> io::Result<StormSummary>
    where
        K: Clone + Eq + Hash,
        W: Write,
        F: FnMut(&K) -> Option<(String, Value)>,
    {
        let _ = list.on_resize(self.config.viewport_height);
        write_line(
            out,
            &json!({
                "event": "storm_start",
                "seed": self.config.seed,
                "pattern": self.config.pattern.name(),
                "events": self.offsets.len(),
                "events_per_frame": self.config.events_per_frame,
                "items": list.len(),
            }),
        )?;

        let mut summary = StormSummary::default();
        let mut first_mounted: Option<K> = None;

        for (chunk_index, chunk) in self
            .offsets
            .chunks(self.config.events_per_frame.max(1))
            .enumerate()
        {
            for &offset in chunk {
                let _ = list.on_scroll(offset);
            }
            if let (Some(every), Some(id)) = (self.config.expand_every, &first_mounted)
                && (chunk_index + 1) % every == 0
            {
                let _ = list.set_expanded(id);
            }

            let Some(scheduled) = list.on_frame() else {
                continue;
            };
            let frame = scheduled.frame;
            let mounted = frame.window.as_ref().map_or(0, |w| w.len());
            first_mounted = frame
                .window
                .as_ref()
                .and_then(|w| w.items.first())
                .map(|item| item.id.clone());

            summary.frames += 1;
            summary.triggers += u64::from(scheduled.batch.triggers);
            summary.coalesced += u64::from(scheduled.batch.coalesced());
            summary.max_mounted = summary.max_mounted.max(mounted);

            let triggers: Vec<&str> = scheduled.batch.kinds().map(Trigger::as_str).collect();
            let tracks: Map<String, Value> = frame
                .window
                .iter()
                .flat_map(|w| w.items.iter())
                .filter_map(|item| tracks_of(&item.id))
                .collect();

            write_line(
                out,
                &json!({
                    "event": "frame",
                    "frame": scheduled.batch.frame,
                    "scroll": frame.scroll_offset,
                    "start": frame.window.as_ref().map(|w| w.start_index),
                    "end": frame.window.as_ref().map(|w| w.end_index),
                    "mounted": mounted,
                    "total_height": frame.total_height,
                    "coalesced": scheduled.batch.coalesced(),
                    "triggers": triggers,
                    "tracks": tracks,
                }),
            )?;
        }

        write_line(
            out,
            &json!({
                "event": "storm_complete",
                "frames": summary.frames,
                "triggers": summary.triggers,
                "coalesced": summary.coalesced,
                "max_mounted": summary.max_mounted,
                "checksum": self.sequence_checksum(),
            }),
        )?;
        Ok(summary)
    }
}

fn write_line<W: Write>(out: &mut W, value: &Value) -> io::Result<()> {
    serde_json::to_writer(&mut *out, value)?;
    out.write_all(b"\n")
}
