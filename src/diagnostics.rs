//! Diagnostic sinks for filter status messages
//!
//! The filter never prints. It hands human-readable messages to a
//! [`DiagnosticSink`], and only when its `verbose` flag is set.

use log::Level;

/// Log target used by [`LogSink`]
pub const LOG_TARGET: &str = "linear_kalman";

/// Receiver of filter diagnostics
pub trait DiagnosticSink {
    fn emit(&mut self, level: Level, message: &str);
}

/// Forwards diagnostics to the `log` facade
#[derive(Clone, Copy, Debug, Default)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn emit(&mut self, level: Level, message: &str) {
        log::log!(target: LOG_TARGET, level, "{}", message);
    }
}

/// Keeps every diagnostic in memory
#[derive(Clone, Debug, Default)]
pub struct RecordingSink {
    pub messages: Vec<(Level, String)>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// True if any recorded message contains `needle`
    pub fn contains(&self, needle: &str) -> bool {
        self.messages.iter().any(|(_, m)| m.contains(needle))
    }

    pub fn count_at(&self, level: Level) -> usize {
        self.messages.iter().filter(|(l, _)| *l == level).count()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }
}

impl DiagnosticSink for RecordingSink {
    fn emit(&mut self, level: Level, message: &str) {
        self.messages.push((level, message.to_string()));
    }
}

impl<F> DiagnosticSink for F
where
    F: FnMut(Level, &str),
{
    fn emit(&mut self, level: Level, message: &str) {
        self(level, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_sink() {
        let mut sink = RecordingSink::new();
        assert!(sink.is_empty());

        sink.emit(Level::Info, "KALMAN:INFO: init <2,2> filter");
        sink.emit(Level::Error, "KALMAN:ERROR: observation has nan or inf values");

        assert_eq!(sink.len(), 2);
        assert_eq!(sink.count_at(Level::Error), 1);
        assert!(sink.contains("nan or inf"));

        sink.clear();
        assert!(sink.is_empty());
    }

    #[test]
    fn test_closure_sink() {
        let mut seen = Vec::new();
        {
            let mut sink = |level: Level, message: &str| seen.push((level, message.len()));
            sink.emit(Level::Warn, "abc");
        }
        assert_eq!(seen, vec![(Level::Warn, 3)]);
    }

    #[test]
    fn test_log_sink_does_not_panic() {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut sink = LogSink;
        sink.emit(Level::Info, "KALMAN:INFO: init <1,1> filter");
    }
}
