#![forbid(unsafe_code)]

//! Frame-coalescing scheduler for list recomputation.
//!
//! Scroll and resize events can arrive many times per display refresh. Each
//! one invalidates the visible window, but recomputing per raw event wastes
//! work on large lists. [`RenderScheduler`] collapses every trigger that
//! arrives before the next frame into one pending recompute.
//!
//! # Design
//!
//! The scheduler holds a single pending flag plus a record of which trigger
//! kinds were folded into it. It never stores scroll offsets or ids: the
//! recompute reads current state when the frame runs, so a burst of triggers
//! always resolves to the latest state and there is nothing to cancel.
//!
//! # Usage
//!
//! ```
//! use timeline_core::render_scheduler::{RenderScheduler, Schedule, Trigger};
//!
//! let mut scheduler = RenderScheduler::new();
//!
//! // First trigger asks the host for a frame callback.
//! assert_eq!(scheduler.request(Trigger::Scroll), Schedule::RequestFrame);
//! // Subsequent triggers fold into the pending frame.
//! assert_eq!(scheduler.request(Trigger::Scroll), Schedule::Coalesced);
//! assert_eq!(scheduler.request(Trigger::Resize), Schedule::Coalesced);
//!
//! let batch = scheduler.begin_frame().expect("frame pending");
//! assert_eq!(batch.triggers, 3);
//! assert!(batch.contains(Trigger::Resize));
//! assert!(!scheduler.is_pending());
//! ```

/// Why a recompute was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trigger {
    /// Scroll offset changed.
    Scroll,
    /// Viewport height changed.
    Resize,
    /// An item was expanded or collapsed.
    Expand,
    /// The active item sequence was replaced.
    Sequence,
    /// Selection moved or an explicit scroll-into-view was requested.
    Navigate,
}

impl Trigger {
    /// Every trigger kind, in bit order.
    pub const ALL: [Self; 5] = [
        Self::Scroll,
        Self::Resize,
        Self::Expand,
        Self::Sequence,
        Self::Navigate,
    ];

    #[inline]
    const fn bit(self) -> u8 {
        match self {
            Self::Scroll => 1 << 0,
            Self::Resize => 1 << 1,
            Self::Expand => 1 << 2,
            Self::Sequence => 1 << 3,
            Self::Navigate => 1 << 4,
        }
    }

    /// Stable lowercase name for logs.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Scroll => "scroll",
            Self::Resize => "resize",
            Self::Expand => "expand",
            Self::Sequence => "sequence",
            Self::Navigate => "navigate",
        }
    }
}

/// What the caller must do after [`RenderScheduler::request`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum Schedule {
    /// No frame was pending: ask the host for a frame callback.
    RequestFrame,
    /// A frame is already pending and will observe this change.
    Coalesced,
}

impl Schedule {
    /// Whether the host must request a new frame callback.
    #[inline]
    pub const fn needs_frame(self) -> bool {
        matches!(self, Self::RequestFrame)
    }
}

/// Triggers folded into one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameBatch {
    /// Monotonic frame number, starting at 1.
    pub frame: u64,
    /// Number of triggers coalesced into this frame.
    pub triggers: u32,
    kinds: u8,
}

impl FrameBatch {
    /// Whether a trigger of `kind` was folded into this frame.
    #[inline]
    pub const fn contains(&self, kind: Trigger) -> bool {
        self.kinds & kind.bit() != 0
    }

    /// Distinct trigger kinds folded into this frame, in [`Trigger::ALL`] order.
    pub fn kinds(&self) -> impl Iterator<Item = Trigger> + '_ {
        Trigger::ALL
            .into_iter()
            .filter(move |&kind| self.contains(kind))
    }

    /// Triggers beyond the first, i.e. recomputes avoided.
    #[inline]
    pub const fn coalesced(&self) -> u32 {
        self.triggers.saturating_sub(1)
    }
}

/// Cumulative counters, useful for verifying that bursts were collapsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SchedulerStats {
    /// Total triggers received.
    pub triggers: u64,
    /// Frames actually started.
    pub frames: u64,
}

/// Collapses bursts of triggers into at most one recompute per frame.
///
/// # Thread Safety
///
/// Not thread-safe. It is meant to live next to the state it guards on the
/// single event-processing thread.
#[derive(Debug, Clone, Default)]
pub struct RenderScheduler {
    pending: Option<FrameBatch>,
    stats: SchedulerStats,
}

impl RenderScheduler {
    /// Create an idle scheduler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a trigger.
    ///
    /// Returns [`Schedule::RequestFrame`] only for the first trigger after
    /// the previous frame started; later triggers are folded in.
    pub fn request(&mut self, kind: Trigger) -> Schedule {
        self.stats.triggers = self.stats.triggers.saturating_add(1);
        match &mut self.pending {
            Some(batch) => {
                batch.triggers = batch.triggers.saturating_add(1);
                batch.kinds |= kind.bit();
                Schedule::Coalesced
            }
            None => {
                self.pending = Some(FrameBatch {
                    frame: self.stats.frames + 1,
                    triggers: 1,
                    kinds: kind.bit(),
                });
                Schedule::RequestFrame
            }
        }
    }

    /// Take the pending batch at the start of a frame.
    ///
    /// Clears the pending flag, so a trigger raised while the caller is
    /// recomputing schedules the next frame. Returns `None` when nothing was
    /// requested, e.g. a spurious frame callback.
    pub fn begin_frame(&mut self) -> Option<FrameBatch> {
        let batch = self.pending.take()?;
        self.stats.frames = batch.frame;
        Some(batch)
    }

    /// Whether a recompute is pending.
    #[inline]
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Cumulative counters.
    #[must_use]
    pub fn stats(&self) -> SchedulerStats {
        self.stats
    }
}
