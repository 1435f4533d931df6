#![forbid(unsafe_code)]

//! Tracing integration tests.
//!
//! Spans enabled:
//!   cargo test -p timeline-widgets --features tracing --test tracing_tests
//!
//! Without the feature the same calls must compile and emit nothing:
//!   cargo test -p timeline-widgets --test tracing_tests

use std::sync::{Arc, Mutex};

use timeline_core::config::LayoutConfig;
use timeline_widgets::list_controller::{ListController, ReplaceOptions};

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;

// ============================================================================
// Test Infrastructure
// ============================================================================

/// A captured span or event name.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Captured {
    Span(String),
    Event(String),
}

/// A tracing Layer that records span and event names.
struct NameCapture {
    seen: Arc<Mutex<Vec<Captured>>>,
}

impl<S> tracing_subscriber::Layer<S> for NameCapture
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(
        &self,
        attrs: &tracing::span::Attributes<'_>,
        _id: &tracing::span::Id,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        self.seen
            .lock()
            .unwrap()
            .push(Captured::Span(attrs.metadata().name().to_string()));
    }

    fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        let mut visitor = MessageVisitor(None);
        event.record(&mut visitor);
        if let Some(message) = visitor.0 {
            self.seen.lock().unwrap().push(Captured::Event(message));
        }
    }
}

/// Extracts the `message` field of an event.
struct MessageVisitor(Option<String>);

impl tracing::field::Visit for MessageVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.0 = Some(format!("{value:?}"));
        }
    }
}

/// Run a closure under a capturing subscriber.
fn with_capture<F>(f: F) -> Vec<Captured>
where
    F: FnOnce(),
{
    let seen = Arc::new(Mutex::new(Vec::new()));
    let layer = NameCapture { seen: seen.clone() };
    let subscriber = tracing_subscriber::registry().with(layer);
    tracing::subscriber::with_default(subscriber, f);
    let captured = seen.lock().unwrap().clone();
    captured
}

fn exercise_controller() {
    let mut list: ListController<u32> = ListController::new(LayoutConfig::default());
    let _ = list.replace_items(0..500, ReplaceOptions::default());
    let _ = list.on_resize(800);
    let _ = list.set_expanded(&3);
    let _ = list.on_scroll(4_000);
    let _ = list.on_frame();
}

// ============================================================================
// Tests
// ============================================================================

/// Every recompute opens a `timeline.recompute` span.
#[test]
#[cfg(feature = "tracing")]
fn recompute_emits_span() {
    let captured = with_capture(exercise_controller);
    assert!(
        captured.contains(&Captured::Span("timeline.recompute".into())),
        "missing recompute span: {captured:?}"
    );
}

/// Sequence replacement and expansion are logged as events.
#[test]
#[cfg(feature = "tracing")]
fn mutations_emit_events() {
    let captured = with_capture(exercise_controller);
    assert!(captured.contains(&Captured::Event("sequence replaced".into())));
    assert!(captured.contains(&Captured::Event("expanded".into())));
    assert!(captured.contains(&Captured::Event("window computed".into())));
}

/// Without the feature the controller emits nothing.
#[test]
#[cfg(not(feature = "tracing"))]
fn zero_overhead_without_feature() {
    let captured = with_capture(exercise_controller);
    assert!(captured.is_empty(), "unexpected output: {captured:?}");
}
