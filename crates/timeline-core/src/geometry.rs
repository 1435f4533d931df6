#![forbid(unsafe_code)]

//! Geometric primitives for a one-dimensional scrolling list.
//!
//! All quantities are unsigned pixels measured from the top of the scrollable
//! content, carried as `u64` so even very long sequences of very tall items
//! keep distinct offsets. Arithmetic saturates instead of wrapping.

/// Vertical extent of one mounted item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct ItemSpan {
    /// Top edge (inclusive).
    pub top: u64,
    /// Height in pixels.
    pub height: u64,
}

impl ItemSpan {
    /// Create a new span.
    #[inline]
    pub const fn new(top: u64, height: u64) -> Self {
        Self { top, height }
    }

    /// Bottom edge (exclusive).
    #[inline]
    pub const fn bottom(&self) -> u64 {
        self.top.saturating_add(self.height)
    }

    /// Check whether the span overlaps the closed pixel range
    /// `[range_top, range_bottom]`.
    #[inline]
    pub const fn intersects(&self, range_top: u64, range_bottom: u64) -> bool {
        self.top <= range_bottom && self.bottom() > range_top
    }

    /// Check whether the span lies entirely inside `[range_top, range_bottom)`.
    #[inline]
    pub const fn is_within(&self, range_top: u64, range_bottom: u64) -> bool {
        self.top >= range_top && self.bottom() <= range_bottom
    }
}

/// Scroll position and size of the visible area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Viewport {
    /// Distance scrolled from the top of the content.
    pub scroll_offset: u64,
    /// Visible height. Never zero.
    pub height: u64,
    /// Extra items to mount beyond each visible edge.
    pub overscan: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(0, 1)
    }
}

impl Viewport {
    /// Create a viewport without overscan. A zero height is raised to one.
    #[inline]
    pub const fn new(scroll_offset: u64, height: u64) -> Self {
        Self {
            scroll_offset,
            height: if height == 0 { 1 } else { height },
            overscan: 0,
        }
    }

    /// Set the overscan item count.
    #[inline]
    #[must_use]
    pub const fn with_overscan(mut self, overscan: u32) -> Self {
        self.overscan = overscan;
        self
    }

    /// Bottom edge of the visible area (exclusive).
    #[inline]
    pub const fn bottom(&self) -> u64 {
        self.scroll_offset.saturating_add(self.height)
    }

    /// Overscan margin in pixels for items laid out every `stride` pixels.
    #[inline]
    pub const fn overscan_px(&self, stride: u64) -> u64 {
        (self.overscan as u64).saturating_mul(stride)
    }

    /// Pixel range that must be covered by mounted items: the visible area
    /// extended by the overscan margin on both sides.
    #[inline]
    pub const fn target_range(&self, stride: u64) -> (u64, u64) {
        let margin = self.overscan_px(stride);
        (
            self.scroll_offset.saturating_sub(margin),
            self.bottom().saturating_add(margin),
        )
    }

    /// Largest scroll offset that still shows content for a given total height.
    #[inline]
    pub const fn max_scroll(&self, total_height: u64) -> u64 {
        total_height.saturating_sub(self.height)
    }

    /// Clamp the scroll offset into `[0, max_scroll(total_height)]`.
    #[inline]
    #[must_use]
    pub const fn clamped(mut self, total_height: u64) -> Self {
        let max = self.max_scroll(total_height);
        if self.scroll_offset > max {
            self.scroll_offset = max;
        }
        self
    }
}
