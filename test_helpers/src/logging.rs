//! Capturing `tracing` subscriber for asserting on emitted diagnostics.
//!
//! Registration surfaces report recoverable conditions as `tracing` events
//! rather than hard errors, so behavioural tests need a way to observe those
//! events. [`capture`] installs a subscriber for the duration of a closure and
//! hands back everything the closure emitted, in order.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt as _};
use tracing_subscriber::registry::LookupSpan;

/// A single event recorded by [`capture`].
#[derive(Clone, Debug)]
pub struct CapturedEvent {
    /// Severity the event was emitted at.
    pub level: Level,
    /// Module path target recorded by the `tracing` macro.
    pub target: String,
    /// The event's `message` field, empty when none was recorded.
    pub message: String,
    /// Remaining fields as `(name, rendered value)` pairs.
    pub fields: Vec<(String, String)>,
}

impl CapturedEvent {
    /// Returns the recorded value of field `name`, if the event carried it.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Whether the event was emitted at `WARN`.
    #[must_use]
    pub fn is_warning(&self) -> bool {
        self.level == Level::WARN
    }
}

/// Layer that appends every event to a shared buffer.
#[derive(Clone, Default)]
struct CaptureLayer {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

/// Visitor splitting the `message` field from the remaining event fields.
struct FieldVisitor {
    message: String,
    fields: Vec<(String, String)>,
}

impl Visit for FieldVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        } else {
            self.fields
                .push((field.name().to_owned(), format!("{value:?}")));
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_owned();
        } else {
            self.fields.push((field.name().to_owned(), value.to_owned()));
        }
    }
}

impl<S> tracing_subscriber::Layer<S> for CaptureLayer
where
    S: Subscriber + for<'lookup> LookupSpan<'lookup>,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = FieldVisitor {
            message: String::new(),
            fields: Vec::new(),
        };
        event.record(&mut visitor);
        self.events.lock().push(CapturedEvent {
            level: *event.metadata().level(),
            target: event.metadata().target().to_owned(),
            message: visitor.message,
            fields: visitor.fields,
        });
    }
}

/// Runs `f` with a subscriber recording every event emitted on the current
/// thread, returning the closure's output alongside the recorded events.
#[must_use]
pub fn capture<F, T>(f: F) -> (T, Vec<CapturedEvent>)
where
    F: FnOnce() -> T,
{
    let layer = CaptureLayer::default();
    let events = Arc::clone(&layer.events);
    let subscriber = tracing_subscriber::registry().with(layer);
    let output = tracing::subscriber::with_default(subscriber, f);
    let recorded = std::mem::take(&mut *events.lock());
    (output, recorded)
}
