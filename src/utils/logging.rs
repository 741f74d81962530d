//! Structured log sink plus conditional logging macros that check a
//! module-level `ENABLE_LOGS` flag.
//!
//! Analyzers never touch global logger state directly: they hold an
//! `Arc<dyn LogSink>` handed to them at construction. The default sink
//! forwards to the `log` facade, so the binary still gets `env_logger` output.
//!
//! Usage:
//! ```ignore
//! // In your module, define the flag first:
//! const ENABLE_LOGS: bool = true;
//!
//! // Then use the macros (they're exported at the crate root):
//! use crate::{log_debug, log_info};
//!
//! log_info!(self.sink, "rep_completed", reps = 3u64, score = 85.0);
//! ```

use std::fmt;
use std::sync::{Arc, Mutex};

pub use log::Level;

/// A single structured field value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Num(f64),
    Count(u64),
    Text(String),
    Flag(bool),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Num(v) => write!(f, "{v:.2}"),
            FieldValue::Count(v) => write!(f, "{v}"),
            FieldValue::Text(v) => write!(f, "{v}"),
            FieldValue::Flag(v) => write!(f, "{v}"),
        }
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Num(value)
    }
}

impl From<u64> for FieldValue {
    fn from(value: u64) -> Self {
        FieldValue::Count(value)
    }
}

impl From<u32> for FieldValue {
    fn from(value: u32) -> Self {
        FieldValue::Count(u64::from(value))
    }
}

impl From<usize> for FieldValue {
    fn from(value: usize) -> Self {
        FieldValue::Count(value as u64)
    }
}

impl From<u8> for FieldValue {
    fn from(value: u8) -> Self {
        FieldValue::Count(u64::from(value))
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Flag(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

/// One structured log event: a short snake_case event name plus key/value fields.
#[derive(Debug, Clone)]
pub struct LogRecord<'a> {
    pub level: Level,
    pub target: &'static str,
    pub event: &'a str,
    pub fields: &'a [(&'static str, FieldValue)],
}

impl LogRecord<'_> {
    pub fn field(&self, key: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
    }
}

impl fmt::Display for LogRecord<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.event)?;
        for (key, value) in self.fields {
            write!(f, " {key}={value}")?;
        }
        Ok(())
    }
}

/// Destination for analyzer log events.
pub trait LogSink: Send + Sync {
    fn emit(&self, record: &LogRecord<'_>);
}

/// Forwards every record to the `log` facade under the emitting module's target.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogCrateSink;

impl LogSink for LogCrateSink {
    fn emit(&self, record: &LogRecord<'_>) {
        log::log!(target: record.target, record.level, "{record}");
    }
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl LogSink for NullSink {
    fn emit(&self, _record: &LogRecord<'_>) {}
}

/// Owned copy of a record kept by [`MemorySink`].
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedRecord {
    pub level: Level,
    pub target: String,
    pub event: String,
    pub fields: Vec<(String, FieldValue)>,
}

impl CapturedRecord {
    pub fn field(&self, key: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }
}

/// Captures records in memory, mostly for tests.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<CapturedRecord>>,
}

impl MemorySink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn records(&self) -> Vec<CapturedRecord> {
        self.records
            .lock()
            .map(|records| records.clone())
            .unwrap_or_default()
    }

    pub fn events(&self, event: &str) -> Vec<CapturedRecord> {
        self.records()
            .into_iter()
            .filter(|r| r.event == event)
            .collect()
    }
}

impl LogSink for MemorySink {
    fn emit(&self, record: &LogRecord<'_>) {
        if let Ok(mut records) = self.records.lock() {
            records.push(CapturedRecord {
                level: record.level,
                target: record.target.to_string(),
                event: record.event.to_string(),
                fields: record
                    .fields
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.clone()))
                    .collect(),
            });
        }
    }
}

/// Default sink used when the caller does not inject one.
pub fn default_sink() -> Arc<dyn LogSink> {
    Arc::new(LogCrateSink)
}

/// Macro for conditional structured logging at an explicit level.
/// Checks the `ENABLE_LOGS` const in the calling module.
///
/// Each module that uses this macro must define:
/// ```ignore
/// const ENABLE_LOGS: bool = true; // or false
/// ```
#[macro_export]
macro_rules! log_event {
    ($sink:expr, $level:expr, $event:expr $(, $key:ident = $value:expr)* $(,)?) => {
        if ENABLE_LOGS {
            $sink.emit(&$crate::utils::logging::LogRecord {
                level: $level,
                target: module_path!(),
                event: $event,
                fields: &[$((
                    stringify!($key),
                    $crate::utils::logging::FieldValue::from($value),
                )),*],
            });
        }
    };
}

/// Macro for conditional debug logging through a sink.
#[macro_export]
macro_rules! log_debug {
    ($sink:expr, $($arg:tt)*) => {
        $crate::log_event!($sink, $crate::utils::logging::Level::Debug, $($arg)*)
    };
}

/// Macro for conditional info logging through a sink.
#[macro_export]
macro_rules! log_info {
    ($sink:expr, $($arg:tt)*) => {
        $crate::log_event!($sink, $crate::utils::logging::Level::Info, $($arg)*)
    };
}

/// Macro for conditional warn logging through a sink.
#[macro_export]
macro_rules! log_warn {
    ($sink:expr, $($arg:tt)*) => {
        $crate::log_event!($sink, $crate::utils::logging::Level::Warn, $($arg)*)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENABLE_LOGS: bool = true;

    #[test]
    fn memory_sink_captures_fields() {
        let sink = MemorySink::new();
        crate::log_info!(sink, "rep_completed", reps = 2u64, score = 85.0, exercise = "pistol");

        let records = sink.events("rep_completed");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].level, Level::Info);
        assert_eq!(records[0].field("reps"), Some(&FieldValue::Count(2)));
        assert_eq!(records[0].field("score"), Some(&FieldValue::Num(85.0)));
        assert_eq!(
            records[0].field("exercise"),
            Some(&FieldValue::Text("pistol".into()))
        );
    }

    #[test]
    fn record_display_lists_fields_in_order() {
        let fields = [("from", FieldValue::from("top")), ("frames", FieldValue::from(3u64))];
        let record = LogRecord {
            level: Level::Debug,
            target: "test",
            event: "phase_transition",
            fields: &fields,
        };
        assert_eq!(record.to_string(), "phase_transition from=top frames=3");
    }
}
