pub mod logging;

pub use logging::{default_sink, LogCrateSink, LogSink, MemorySink, NullSink};
