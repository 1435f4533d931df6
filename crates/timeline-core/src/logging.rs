#![forbid(unsafe_code)]

//! Logging and tracing support.
//!
//! With the `tracing` feature the usual `tracing` macros are re-exported so the
//! virtualizer can emit spans around every recompute. Without it, macros of the
//! same names expand to nothing and span guards become zero-sized stand-ins,
//! which keeps every call site identical in both builds.
//!
//! The `tracing-json` feature additionally provides [`init_json_subscriber`]
//! for binaries (the harness) that want line-delimited JSON logs filtered by
//! the [`LOG_ENV`] variable.

/// Environment variable holding the `EnvFilter` directive for binaries.
pub const LOG_ENV: &str = "TIMELINE_LOG";

#[cfg(feature = "tracing")]
pub use tracing::{debug, debug_span, info, trace, trace_span, warn};

#[cfg(not(feature = "tracing"))]
mod noop_macros {
    /// Discards its arguments when tracing is disabled.
    #[macro_export]
    macro_rules! debug {
        ($($arg:tt)*) => {};
    }

    /// Discards its arguments when tracing is disabled.
    #[macro_export]
    macro_rules! info {
        ($($arg:tt)*) => {};
    }

    /// Discards its arguments when tracing is disabled.
    #[macro_export]
    macro_rules! trace {
        ($($arg:tt)*) => {};
    }

    /// Discards its arguments when tracing is disabled.
    #[macro_export]
    macro_rules! warn {
        ($($arg:tt)*) => {};
    }

    /// Evaluates to a [`NoopSpan`](crate::logging::NoopSpan).
    #[macro_export]
    macro_rules! debug_span {
        ($($arg:tt)*) => {
            $crate::logging::NoopSpan
        };
    }

    /// Evaluates to a [`NoopSpan`](crate::logging::NoopSpan).
    #[macro_export]
    macro_rules! trace_span {
        ($($arg:tt)*) => {
            $crate::logging::NoopSpan
        };
    }
}

/// Span stand-in used when tracing is compiled out.
#[cfg(not(feature = "tracing"))]
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSpan;

#[cfg(not(feature = "tracing"))]
impl NoopSpan {
    /// Borrowing enter, mirroring `tracing::Span::enter`.
    pub fn enter(&self) -> NoopGuard {
        NoopGuard
    }

    /// Owning enter, mirroring `tracing::Span::entered`.
    pub fn entered(self) -> NoopGuard {
        NoopGuard
    }
}

/// Guard returned by [`NoopSpan`].
#[cfg(not(feature = "tracing"))]
#[derive(Debug)]
pub struct NoopGuard;

/// Install a global JSON `tracing` subscriber.
///
/// The filter comes from [`LOG_ENV`] when set and parseable, otherwise from
/// `default_directive` (e.g. `"info"`). Fails if a global subscriber is
/// already installed.
#[cfg(feature = "tracing-json")]
pub fn init_json_subscriber(
    default_directive: &str,
) -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_directive));
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
}

#[cfg(all(test, not(feature = "tracing")))]
mod tests {
    #[test]
    fn noop_macros_accept_tracing_syntax() {
        let count = 3usize;
        crate::debug!(count, "replaced sequence");
        crate::trace!(start = 0, end = 2, "window");
        crate::warn!("ignored {}", count);
        let _guard = crate::trace_span!("timeline.recompute", count).entered();
        let span = crate::debug_span!("outer");
        let _inner = span.enter();
    }
}
