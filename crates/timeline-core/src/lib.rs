#![forbid(unsafe_code)]

//! Core: viewport geometry, layout configuration, frame scheduling and logging.

pub mod config;
pub mod geometry;
pub mod logging;
pub mod render_scheduler;

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{debug, debug_span, info, trace, trace_span, warn};
