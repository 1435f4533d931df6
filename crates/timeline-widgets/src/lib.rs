#![forbid(unsafe_code)]

//! Virtualized card list for the timeline viewer.
//!
//! - [`layout`]: closed-form card metrics and binary-search window location.
//! - [`list_controller`]: sequence, selection, expansion and frame emission.

pub mod layout;
pub mod list_controller;

pub use layout::{ItemMetrics, Layout};
pub use list_controller::{
    Align, ListController, ListFrame, MountedItem, ReplaceOptions, ReplaceReport,
    ScheduledFrame, ScrollPolicy, VisibleWindow,
};
