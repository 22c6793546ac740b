//! Logger - injectable callback interface for core diagnostics.
//!
//! The core emits on material-map misses and grid-size-limit violations.
//! Implementations must be thread-safe: polygonization calls this from
//! worker threads during a run.

/// Log severity, matching the six levels the core distinguishes between.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
  Trace,
  Debug,
  Info,
  Warning,
  Error,
  CriticalError,
}

/// Callback interface for core diagnostics.
///
/// Must be thread-safe as it may be invoked from worker threads during a
/// polygonization run.
pub trait Logger: Send + Sync {
  /// Called for every diagnostic event the core emits.
  fn log(&self, severity: Severity, message: &str);
}

/// No-op implementation for headless operation and tests.
pub struct NullLogger;

impl Logger for NullLogger {
  fn log(&self, _severity: Severity, _message: &str) {
    // No-op
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::Mutex;

  struct RecordingLogger(Mutex<Vec<(Severity, String)>>);

  impl Logger for RecordingLogger {
    fn log(&self, severity: Severity, message: &str) {
      self.0.lock().unwrap().push((severity, message.to_string()));
    }
  }

  #[test]
  fn null_logger_accepts_any_severity() {
    let logger = NullLogger;
    logger.log(Severity::CriticalError, "ignored");
  }

  #[test]
  fn recording_logger_captures_events() {
    let logger = RecordingLogger(Mutex::new(Vec::new()));
    logger.log(Severity::Error, "material map miss for id 7");
    let events = logger.0.lock().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].0, Severity::Error);
  }
}
