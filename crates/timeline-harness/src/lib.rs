#![forbid(unsafe_code)]

//! Harness for the virtualized timeline list.
//!
//! Loads the generated timeline data file, applies the upstream filter and
//! replays deterministic scroll storms through a
//! [`ListController`](timeline_widgets::ListController), reporting every
//! emitted frame as JSONL.

pub mod cli;
pub mod dataset;
pub mod filter;
pub mod scroll_storm;
pub mod tracks;

use std::error::Error;
use std::io::Write;

use timeline_core::config::LayoutConfig;
use timeline_core::geometry::Viewport;
use timeline_widgets::list_controller::{ListController, ReplaceOptions};

use crate::cli::Opts;
use crate::dataset::Timeline;
use crate::filter::TimelineFilter;
use crate::scroll_storm::{ScrollStorm, StormConfig, StormSummary};
use crate::tracks::TrackIndex;

/// Build the filter described by `opts`.
pub fn filter_from_opts(opts: &Opts) -> TimelineFilter {
    let mut filter = TimelineFilter::default();
    if let Some(lane) = &opts.lane {
        filter = filter.with_lane(lane.clone());
    }
    if let Some(book) = &opts.book {
        filter = filter.with_book(book.clone());
    }
    if let Some(query) = &opts.query {
        filter = filter.with_query(query);
    }
    filter
}

/// Load, filter and replay one storm, writing JSONL frames to `out`.
pub fn run<W: Write>(
    opts: &Opts,
    config: LayoutConfig,
    out: &mut W,
) -> Result<StormSummary, Box<dyn Error + Send + Sync>> {
    let timeline = Timeline::load(&opts.data)?;
    let tracks = TrackIndex::from_edges(&timeline.edges_by_track);
    tracing::info!(
        records = timeline.len(),
        lanes = timeline.lanes.len(),
        tracked = tracks.len(),
        "timeline loaded"
    );

    if let Some(lane) = &opts.lane
        && timeline.lane(lane).is_none()
    {
        tracing::warn!(lane = %lane, "lane not declared in the data file");
    }

    let ids = filter_from_opts(opts).apply(&timeline);
    tracing::info!(visible = ids.len(), "filter applied");

    let mut list: ListController<String> = ListController::new(config);
    let _ = list.replace_items(ids, ReplaceOptions::default());

    let viewport = Viewport::new(0, u64::from(opts.viewport));
    let max_scroll = viewport.max_scroll(list.total_height());
    let pattern = opts
        .storm_pattern()
        .ok_or_else(|| format!("unknown storm pattern {}", opts.pattern))?;
    let storm_config = StormConfig::default()
        .with_seed(opts.seed)
        .with_pattern(pattern)
        .with_events_per_frame(opts.burst)
        .with_expand_every(opts.expand_every)
        .with_viewport_height(u64::from(opts.viewport));

    let storm = ScrollStorm::new(storm_config, max_scroll);
    let summary = storm.replay_with_tracks(&mut list, &tracks, out)?;
    tracing::info!(
        frames = summary.frames,
        coalesced = summary.coalesced,
        max_mounted = summary.max_mounted,
        "storm complete"
    );
    Ok(summary)
}
