/*
 * log.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Injectable logging sink for the load phase.
//!
//! Every I/O and parse problem found while loading content is reported through
//! a [`LogSink`]. The default sink forwards to `tracing`, so binaries decide
//! where messages go by installing a subscriber.

use std::fmt;
use std::sync::Arc;

/// Severity of a load-phase message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Debug,
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Severity::Debug => "debug",
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        f.write_str(name)
    }
}

/// A `(severity, message)` sink shared by the loader's worker threads.
#[derive(Clone)]
pub struct LogSink(Arc<dyn Fn(Severity, &str) + Send + Sync>);

impl LogSink {
    pub fn new(sink: impl Fn(Severity, &str) + Send + Sync + 'static) -> Self {
        LogSink(Arc::new(sink))
    }

    /// A sink that forwards to `tracing` events.
    pub fn tracing() -> Self {
        Self::new(|severity, message| match severity {
            Severity::Debug => tracing::debug!("{message}"),
            Severity::Info => tracing::info!("{message}"),
            Severity::Warning => tracing::warn!("{message}"),
            Severity::Error => tracing::error!("{message}"),
        })
    }

    pub fn log(&self, severity: Severity, message: &str) {
        (self.0)(severity, message);
    }

    pub fn debug(&self, message: &str) {
        self.log(Severity::Debug, message);
    }

    pub fn info(&self, message: &str) {
        self.log(Severity::Info, message);
    }

    pub fn warn(&self, message: &str) {
        self.log(Severity::Warning, message);
    }

    pub fn error(&self, message: &str) {
        self.log(Severity::Error, message);
    }
}

impl Default for LogSink {
    fn default() -> Self {
        Self::tracing()
    }
}

impl fmt::Debug for LogSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("LogSink")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_custom_sink_receives_messages() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let captured = Arc::clone(&seen);
        let sink = LogSink::new(move |severity, message| {
            captured.lock().unwrap().push((severity, message.to_string()));
        });

        sink.info("loading");
        sink.error("failed");

        let seen = seen.lock().unwrap();
        assert_eq!(
            *seen,
            vec![
                (Severity::Info, "loading".to_string()),
                (Severity::Error, "failed".to_string()),
            ]
        );
    }

    #[test]
    fn test_severity_display() {
        assert_eq!(Severity::Warning.to_string(), "warning");
        assert!(Severity::Error > Severity::Debug);
    }
}
