#![forbid(unsafe_code)]

//! State owner for the virtualized card list.
//!
//! [`ListController`] holds the active (already filtered and ordered) item
//! sequence, the selected and expanded identifiers, and the viewport. Every
//! mutation is a named method that records a [`Trigger`] with the internal
//! [`RenderScheduler`]; the host asks for a display frame when told to and
//! calls [`ListController::on_frame`] from it. The frame resolves identifiers
//! to positions once, lays out the sequence in closed form, and emits the
//! window of cards to mount.
//!
//! # Invariants
//!
//! - At most one item is expanded. Expanding another item collapses the
//!   previous one; expanding the expanded item again collapses it.
//! - `selected` and `expanded` always name items of the active sequence
//!   (or are `None`). Sequence replacement repairs them.
//! - The controller stores identifiers, never positions, across mutations.
//!
//! # Example
//!
//! ```
//! use timeline_core::config::LayoutConfig;
//! use timeline_widgets::list_controller::{ListController, ReplaceOptions};
//!
//! let mut list: ListController<u32> = ListController::new(LayoutConfig::default());
//! let _ = list.replace_items(0..1000, ReplaceOptions::default());
//! let _ = list.on_resize(800);
//! let _ = list.on_scroll(3640);
//!
//! let frame = list.on_frame().expect("frame was scheduled").frame;
//! let window = frame.window.expect("list is not empty");
//! assert_eq!(window.start_index, 12);
//! ```

use std::collections::HashMap;
use std::hash::Hash;

use timeline_core::config::LayoutConfig;
use timeline_core::geometry::{ItemSpan, Viewport};
use timeline_core::render_scheduler::{FrameBatch, RenderScheduler, Schedule, Trigger};
use timeline_core::{debug, trace, trace_span};

use crate::layout::{ItemMetrics, Layout};

/// What happens to the scroll offset when the sequence is replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollPolicy {
    /// Jump back to the top of the new sequence.
    #[default]
    ResetToTop,
    /// Keep the current offset, clamped to the new scrollable extent.
    KeepPosition,
}

/// Options for [`ListController::replace_items`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplaceOptions<K> {
    /// Scroll handling for the new sequence.
    pub scroll: ScrollPolicy,
    /// Selection to fall back to when the current one disappears. Ignored
    /// if it is not part of the new sequence; the first item is used then.
    pub default_selection: Option<K>,
}

impl<K> Default for ReplaceOptions<K> {
    fn default() -> Self {
        Self {
            scroll: ScrollPolicy::default(),
            default_selection: None,
        }
    }
}

impl<K> ReplaceOptions<K> {
    /// Keep the scroll position across the replacement.
    #[must_use]
    pub fn keep_position(mut self) -> Self {
        self.scroll = ScrollPolicy::KeepPosition;
        self
    }

    /// Set the fallback selection.
    #[must_use]
    pub fn with_default_selection(mut self, id: K) -> Self {
        self.default_selection = Some(id);
        self
    }
}

/// Where to place an item when scrolling it into view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    /// Item top at viewport top.
    Start,
    /// Item centered in the viewport.
    Center,
    /// Item bottom at viewport bottom.
    End,
    /// Scroll the minimal distance; do nothing if already fully visible.
    #[default]
    Nearest,
}

/// Outcome of a sequence replacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplaceReport {
    /// Whether the selection had to be moved.
    pub selection_reset: bool,
    /// Whether the expanded item vanished and was collapsed.
    pub expansion_cleared: bool,
    /// Scheduling decision for the caller.
    pub schedule: Schedule,
}

/// One card the presentation layer must mount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountedItem<K> {
    /// Position in the active sequence.
    pub index: usize,
    /// Stable identifier.
    pub id: K,
    /// Top offset within the scroll container.
    pub top: u64,
    /// Card height.
    pub height: u64,
    /// Whether this card is the expanded one.
    pub expanded: bool,
    /// Whether this card is selected.
    pub selected: bool,
}

impl<K> MountedItem<K> {
    /// Vertical extent of the card.
    #[inline]
    pub fn span(&self) -> ItemSpan {
        ItemSpan::new(self.top, self.height)
    }
}

/// Contiguous range of cards to mount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibleWindow<K> {
    /// First mounted position (inclusive).
    pub start_index: usize,
    /// Last mounted position (inclusive).
    pub end_index: usize,
    /// Mounted cards in sequence order.
    pub items: Vec<MountedItem<K>>,
}

impl<K> VisibleWindow<K> {
    /// Number of mounted cards.
    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Always false: an empty list produces no window at all.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Result of one recompute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListFrame<K> {
    /// Cards to mount, or `None` when the sequence is empty ("no items").
    pub window: Option<VisibleWindow<K>>,
    /// Height of the scroll container.
    pub total_height: u64,
    /// Scroll offset the window was computed for.
    pub scroll_offset: u64,
}

impl<K> ListFrame<K> {
    /// Whether the presentation layer should show the empty-state message.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.window.is_none()
    }
}

/// A recompute performed for a scheduled frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledFrame<K> {
    /// Triggers that were folded into this frame.
    pub batch: FrameBatch,
    /// The recomputed window.
    pub frame: ListFrame<K>,
}

/// Owns the active sequence, selection, expansion and viewport.
#[derive(Debug, Clone)]
pub struct ListController<K> {
    items: Vec<K>,
    positions: HashMap<K, usize>,
    selected: Option<K>,
    expanded: Option<K>,
    viewport: Viewport,
    metrics: ItemMetrics,
    scheduler: RenderScheduler,
}

impl<K> ListController<K>
where
    K: Clone + Eq + Hash,
{
    /// Create an empty controller.
    #[must_use]
    pub fn new(config: LayoutConfig) -> Self {
        Self {
            items: Vec::new(),
            positions: HashMap::new(),
            selected: None,
            expanded: None,
            viewport: Viewport::default().with_overscan(config.overscan),
            metrics: ItemMetrics::new(config),
            scheduler: RenderScheduler::new(),
        }
    }

    // ── Queries ─────────────────────────────────────────────────────────

    /// Number of items in the active sequence.
    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the active sequence is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The active sequence.
    #[inline]
    pub fn items(&self) -> &[K] {
        &self.items
    }

    /// Position of `id` in the active sequence. O(1).
    #[inline]
    pub fn index_of(&self, id: &K) -> Option<usize> {
        self.positions.get(id).copied()
    }

    /// Whether `id` is in the active sequence. O(1).
    #[inline]
    pub fn contains(&self, id: &K) -> bool {
        self.positions.contains_key(id)
    }

    /// Currently selected identifier.
    #[inline]
    pub fn selected_id(&self) -> Option<&K> {
        self.selected.as_ref()
    }

    /// Currently expanded identifier.
    #[inline]
    pub fn expanded_id(&self) -> Option<&K> {
        self.expanded.as_ref()
    }

    /// Whether `id` is the expanded item.
    #[inline]
    pub fn is_expanded(&self, id: &K) -> bool {
        self.expanded.as_ref() == Some(id)
    }

    /// Current viewport.
    #[inline]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Card metrics.
    #[inline]
    pub fn metrics(&self) -> &ItemMetrics {
        &self.metrics
    }

    /// Scheduler state (pending flag and counters).
    #[inline]
    pub fn scheduler(&self) -> &RenderScheduler {
        &self.scheduler
    }

    /// Layout of the active sequence with the expanded id resolved.
    pub fn layout(&self) -> Layout {
        let expanded = self.expanded.as_ref().and_then(|id| self.index_of(id));
        self.metrics.layout(self.items.len(), expanded)
    }

    /// Total scrollable height.
    pub fn total_height(&self) -> u64 {
        self.layout().total_height()
    }

    /// Top offset and height of `id`, for scrolling it into view.
    pub fn position_of(&self, id: &K) -> Option<ItemSpan> {
        let index = self.index_of(id)?;
        self.layout().span_of(index)
    }

    // ── Mutations ───────────────────────────────────────────────────────

    /// Replace the active sequence wholesale.
    ///
    /// Repairs selection (to `options.default_selection`, else the first
    /// item, else `None`) and collapses the expanded item if it is gone.
    /// Duplicate identifiers keep their first position.
    pub fn replace_items<I>(&mut self, items: I, options: ReplaceOptions<K>) -> ReplaceReport
    where
        I: IntoIterator<Item = K>,
    {
        self.items = items.into_iter().collect();
        self.positions.clear();
        self.positions.reserve(self.items.len());
        for (index, id) in self.items.iter().enumerate() {
            self.positions.entry(id.clone()).or_insert(index);
        }

        let selection_reset = !self.selected.as_ref().is_some_and(|id| self.contains(id));
        if selection_reset {
            self.selected = options
                .default_selection
                .filter(|id| self.contains(id))
                .or_else(|| self.items.first().cloned());
        }

        let expansion_cleared = self.expanded.as_ref().is_some_and(|id| !self.contains(id));
        if expansion_cleared {
            self.expanded = None;
        }

        match options.scroll {
            ScrollPolicy::ResetToTop => self.viewport.scroll_offset = 0,
            ScrollPolicy::KeepPosition => {
                self.viewport = self.viewport.clamped(self.total_height());
            }
        }

        debug!(
            count = self.items.len(),
            selection_reset,
            expansion_cleared,
            "sequence replaced"
        );

        ReplaceReport {
            selection_reset,
            expansion_cleared,
            schedule: self.scheduler.request(Trigger::Sequence),
        }
    }

    /// Record a new scroll offset.
    pub fn on_scroll(&mut self, scroll_offset: u64) -> Schedule {
        self.viewport.scroll_offset = scroll_offset;
        self.scheduler.request(Trigger::Scroll)
    }

    /// Record a new viewport height. Zero is raised to one.
    pub fn on_resize(&mut self, height: u64) -> Schedule {
        self.viewport.height = height.max(1);
        self.scheduler.request(Trigger::Resize)
    }

    /// Change the overscan item count.
    pub fn set_overscan(&mut self, overscan: u32) -> Schedule {
        self.viewport.overscan = overscan;
        self.scheduler.request(Trigger::Resize)
    }

    /// Toggle expansion of `id`.
    ///
    /// Expanding a different item collapses the previous one. Returns `None`
    /// without changing anything if `id` is not in the active sequence.
    pub fn set_expanded(&mut self, id: &K) -> Option<Schedule> {
        if !self.contains(id) {
            return None;
        }
        if self.is_expanded(id) {
            self.expanded = None;
            debug!("collapsed");
        } else {
            self.expanded = Some(id.clone());
            debug!(index = self.index_of(id), "expanded");
        }
        Some(self.scheduler.request(Trigger::Expand))
    }

    /// Collapse the expanded item, if any.
    pub fn collapse(&mut self) -> Option<Schedule> {
        self.expanded.take()?;
        Some(self.scheduler.request(Trigger::Expand))
    }

    /// Select `id`. Returns `None` if it is not in the active sequence.
    pub fn select(&mut self, id: &K) -> Option<Schedule> {
        if !self.contains(id) {
            return None;
        }
        self.selected = Some(id.clone());
        Some(self.scheduler.request(Trigger::Navigate))
    }

    /// Move the selection one item down (or to the first item).
    pub fn select_next(&mut self) -> Option<Schedule> {
        let next = match self.selected.as_ref().and_then(|id| self.index_of(id)) {
            Some(index) => (index + 1).min(self.items.len().checked_sub(1)?),
            None => 0,
        };
        let id = self.items.get(next)?.clone();
        self.selected = Some(id);
        Some(self.scheduler.request(Trigger::Navigate))
    }

    /// Move the selection one item up (or to the first item).
    pub fn select_previous(&mut self) -> Option<Schedule> {
        let previous = self
            .selected
            .as_ref()
            .and_then(|id| self.index_of(id))
            .map_or(0, |index| index.saturating_sub(1));
        let id = self.items.get(previous)?.clone();
        self.selected = Some(id);
        Some(self.scheduler.request(Trigger::Navigate))
    }

    /// Scroll so that `id` is placed according to `align`.
    ///
    /// The offset is clamped to the scrollable range. Returns `None` if
    /// `id` is not in the active sequence.
    pub fn scroll_to(&mut self, id: &K, align: Align) -> Option<Schedule> {
        let span = self.position_of(id)?;
        let vp = self.viewport;
        let offset = match align {
            Align::Start => span.top,
            Align::End => span.bottom().saturating_sub(vp.height),
            Align::Center => span
                .top
                .saturating_add(span.height / 2)
                .saturating_sub(vp.height / 2),
            Align::Nearest => {
                if span.is_within(vp.scroll_offset, vp.bottom()) {
                    vp.scroll_offset
                } else if span.top < vp.scroll_offset || span.height >= vp.height {
                    span.top
                } else {
                    span.bottom().saturating_sub(vp.height)
                }
            }
        };
        self.viewport.scroll_offset = offset;
        self.viewport = self.viewport.clamped(self.total_height());
        Some(self.scheduler.request(Trigger::Navigate))
    }

    // ── Recompute ───────────────────────────────────────────────────────

    /// Run the pending recompute, if any. Call once per display frame.
    pub fn on_frame(&mut self) -> Option<ScheduledFrame<K>> {
        let batch = self.scheduler.begin_frame()?;
        Some(ScheduledFrame {
            batch,
            frame: self.recompute(),
        })
    }

    /// Compute the window for the current state. Pure: identical state
    /// always yields an identical frame.
    pub fn recompute(&self) -> ListFrame<K> {
        let _span = trace_span!("timeline.recompute", count = self.items.len()).entered();

        let layout = self.layout();
        let total_height = layout.total_height();
        let window = layout.window_for(&self.viewport).map(|range| {
            let (start_index, end_index) = (*range.start(), *range.end());
            let items = self.items[start_index..=end_index]
                .iter()
                .enumerate()
                .map(|(offset, id)| {
                    let index = start_index + offset;
                    MountedItem {
                        index,
                        id: id.clone(),
                        top: layout.top_of(index),
                        height: layout.height_of(index),
                        expanded: layout.expanded() == Some(index),
                        selected: self.selected.as_ref() == Some(id),
                    }
                })
                .collect();
            VisibleWindow {
                start_index,
                end_index,
                items,
            }
        });

        trace!(
            start = window.as_ref().map(|w| w.start_index),
            end = window.as_ref().map(|w| w.end_index),
            total_height,
            "window computed"
        );

        ListFrame {
            window,
            total_height,
            scroll_offset: self.viewport.scroll_offset,
        }
    }
}
