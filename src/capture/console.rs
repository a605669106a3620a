//! Log-event capture: a `tracing` layer that tees events into the console
//! ring while the host's own subscriber stack keeps producing its output.

use chrono::Utc;
use std::sync::Weak;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

use super::types::{ConsoleLogEntry, LogLevel};
use super::CaptureSession;

/// Events from targets under this prefix are the widget's own diagnostics
/// and are excluded, so the SDK never feeds the buffers it manages.
const SELF_TARGET_PREFIX: &str = "owl_report";

/// Additive capture layer.
///
/// Composes with whatever subscriber the host already runs; emitting stays
/// untouched, capture is the only side effect. Handed out at most once per
/// session via [`CaptureSession::console_layer`].
pub struct ConsoleLayer {
    pub(crate) session: Weak<CaptureSession>,
}

impl<S: Subscriber> Layer<S> for ConsoleLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if event.metadata().target().starts_with(SELF_TARGET_PREFIX) {
            return;
        }
        let Some(session) = self.session.upgrade() else {
            return;
        };
        session.push_console(entry_from_event(event));
    }
}

pub(crate) fn entry_from_event(event: &Event<'_>) -> ConsoleLogEntry {
    let mut collector = FieldCollector::default();
    event.record(&mut collector);
    ConsoleLogEntry {
        level: level_of(event.metadata().level()),
        message: collector.message,
        raw_args: collector.fields,
        timestamp: Utc::now(),
    }
}

fn level_of(level: &Level) -> LogLevel {
    if *level == Level::ERROR {
        LogLevel::Error
    } else if *level == Level::WARN {
        LogLevel::Warn
    } else if *level == Level::INFO {
        LogLevel::Info
    } else {
        LogLevel::Log
    }
}

/// Splits an event into its message and remaining structured fields.
#[derive(Default)]
struct FieldCollector {
    message: String,
    fields: Vec<serde_json::Value>,
}

impl FieldCollector {
    fn field(&mut self, field: &Field, value: serde_json::Value) {
        let mut entry = serde_json::Map::new();
        entry.insert(field.name().to_string(), value);
        self.fields.push(serde_json::Value::Object(entry));
    }
}

impl Visit for FieldCollector {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        } else {
            self.field(field, serde_json::Value::String(format!("{value:?}")));
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.field(field, serde_json::Value::String(value.to_string()));
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.field(field, serde_json::Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.field(field, serde_json::Value::from(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.field(field, serde_json::Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.field(field, serde_json::Value::from(value));
    }
}

/// Entry synthesized for an uncaught panic
pub(crate) fn panic_entry(message: &str, location: Option<&str>) -> ConsoleLogEntry {
    let message = match location {
        Some(location) => format!("Uncaught panic at {location}: {message}"),
        None => format!("Uncaught panic: {message}"),
    };
    ConsoleLogEntry {
        level: LogLevel::Error,
        message,
        raw_args: Vec::new(),
        timestamp: Utc::now(),
    }
}
