#![forbid(unsafe_code)]

//! Closed-form card layout and visible-window location.
//!
//! Cards share one base height and are separated by a constant gap. At most
//! one card is expanded, and it grows by a fixed extra height that pushes
//! every later card down by the same amount. Under those rules the offset of
//! any card is plain arithmetic:
//!
//! ```text
//! top(i)    = i * (height + gap) + (extra if expanded < i)
//! height(i) = height + (extra if expanded == i)
//! total     = n * height + (n - 1) * gap + (extra if expanded) + margin
//! ```
//!
//! `top` is monotonic in `i`, so [`Layout::locate`] finds both window edges
//! with a binary search over the formula: O(log n) with no per-item storage,
//! which keeps recomputes cheap on sequences of tens of thousands of cards.
//!
//! # Invariants
//!
//! 1. `top(i + 1) >= top(i) + height(i)` (cards never overlap).
//! 2. An expanded index outside `[0, n)` behaves as "nothing expanded".
//! 3. An empty layout reports the placeholder height, never zero.

use std::ops::RangeInclusive;

use timeline_core::config::LayoutConfig;
use timeline_core::geometry::{ItemSpan, Viewport};

/// Pure per-item metric functions for a card configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemMetrics {
    config: LayoutConfig,
}

impl Default for ItemMetrics {
    fn default() -> Self {
        Self::new(LayoutConfig::default())
    }
}

impl From<LayoutConfig> for ItemMetrics {
    fn from(config: LayoutConfig) -> Self {
        Self::new(config)
    }
}

impl ItemMetrics {
    /// Create metrics from a layout configuration.
    #[must_use]
    pub const fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    /// The underlying configuration.
    #[inline]
    pub const fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Distance between the tops of two collapsed cards.
    #[inline]
    pub const fn stride(&self) -> u64 {
        self.config.stride()
    }

    /// Height of card `index`.
    #[inline]
    pub fn height_of(&self, index: usize, expanded: Option<usize>) -> u64 {
        let base = u64::from(self.config.card_height);
        if expanded == Some(index) {
            base + u64::from(self.config.expanded_extra)
        } else {
            base
        }
    }

    /// Top offset of card `index`. O(1).
    ///
    /// `expanded` is taken at face value; use [`ItemMetrics::layout`] to
    /// discard an out-of-range expansion first.
    #[inline]
    pub fn top_of(&self, index: usize, expanded: Option<usize>) -> u64 {
        let top = (index as u64).saturating_mul(self.stride());
        if expanded.is_some_and(|e| e < index) {
            top.saturating_add(u64::from(self.config.expanded_extra))
        } else {
            top
        }
    }

    /// Total scrollable height of `count` cards.
    ///
    /// An `expanded` index outside `[0, count)` adds nothing. An empty list
    /// reports the configured placeholder height.
    pub fn total_height(&self, count: usize, expanded: Option<usize>) -> u64 {
        if count == 0 {
            return u64::from(self.config.empty_height);
        }
        let count = count as u64;
        let mut total = count
            .saturating_mul(u64::from(self.config.card_height))
            .saturating_add((count - 1).saturating_mul(u64::from(self.config.gap)))
            .saturating_add(u64::from(self.config.bottom_margin));
        if expanded.is_some_and(|e| (e as u64) < count) {
            total = total.saturating_add(u64::from(self.config.expanded_extra));
        }
        total
    }

    /// Snapshot the layout of `count` cards, normalizing the expansion.
    #[must_use]
    pub fn layout(&self, count: usize, expanded: Option<usize>) -> Layout {
        Layout {
            metrics: *self,
            count,
            expanded: expanded.filter(|&e| e < count),
        }
    }
}

/// Layout of a concrete sequence: metrics, item count and a validated
/// expanded position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    metrics: ItemMetrics,
    count: usize,
    expanded: Option<usize>,
}

impl Layout {
    /// Number of cards.
    #[inline]
    pub const fn len(&self) -> usize {
        self.count
    }

    /// Whether there are no cards.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Expanded position, guaranteed to be in range.
    #[inline]
    pub const fn expanded(&self) -> Option<usize> {
        self.expanded
    }

    /// Metrics this layout was built from.
    #[inline]
    pub const fn metrics(&self) -> &ItemMetrics {
        &self.metrics
    }

    /// Height of card `index`.
    #[inline]
    pub fn height_of(&self, index: usize) -> u64 {
        self.metrics.height_of(index, self.expanded)
    }

    /// Top offset of card `index`.
    #[inline]
    pub fn top_of(&self, index: usize) -> u64 {
        self.metrics.top_of(index, self.expanded)
    }

    /// Bottom edge (exclusive) of card `index`.
    #[inline]
    pub fn bottom_of(&self, index: usize) -> u64 {
        self.top_of(index).saturating_add(self.height_of(index))
    }

    /// Span of card `index`, or `None` when out of range.
    pub fn span_of(&self, index: usize) -> Option<ItemSpan> {
        (index < self.count).then(|| ItemSpan::new(self.top_of(index), self.height_of(index)))
    }

    /// Total scrollable height.
    #[inline]
    pub fn total_height(&self) -> u64 {
        self.metrics.total_height(self.count, self.expanded)
    }

    /// Locate the inclusive index range covering `[target_top, target_bottom]`.
    ///
    /// `start` is the first card whose bottom edge reaches `target_top`;
    /// `end` is the last card, searching from `start`, whose top edge is at
    /// or above `target_bottom`. Both are clamped into `[0, len)`, so a
    /// target past the end yields the last card alone. Returns `None` for an
    /// empty layout. O(log n).
    pub fn locate(&self, target_top: u64, target_bottom: u64) -> Option<RangeInclusive<usize>> {
        if self.count == 0 {
            return None;
        }
        let (target_top, target_bottom) = if target_top <= target_bottom {
            (target_top, target_bottom)
        } else {
            (target_bottom, target_top)
        };
        let last = self.count - 1;

        let start = partition_point(0, self.count, |i| self.bottom_of(i) < target_top).min(last);
        let past_end = partition_point(start, self.count, |i| self.top_of(i) <= target_bottom);
        let end = if past_end > start { past_end - 1 } else { start };

        Some(start..=end)
    }

    /// Locate the cards to mount for a viewport, overscan included.
    pub fn window_for(&self, viewport: &Viewport) -> Option<RangeInclusive<usize>> {
        let (top, bottom) = viewport.target_range(self.metrics.stride());
        self.locate(top, bottom)
    }
}

/// First index in `[lo, hi)` for which `pred` is false, assuming `pred`
/// holds for a prefix of the range.
fn partition_point<F>(mut lo: usize, mut hi: usize, pred: F) -> usize
where
    F: Fn(usize) -> bool,
{
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        if pred(mid) {
            lo = mid + 1;
        } else {
            hi = mid;
        }
    }
    lo
}
