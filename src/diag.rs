//! Diagnostics sinks injected into the engines.
//!
//! Components never write to process-global logging state. Each takes a
//! sink at construction and records through it; the binary passes
//! [`TracingSink`], everything else defaults to [`NoopSink`].

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagLevel {
    Debug,
    Info,
    Warn,
    Error,
}

pub trait DiagSink {
    fn record(&self, level: DiagLevel, message: &str);
}

/// Default sink; drops every record.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl DiagSink for NoopSink {
    fn record(&self, _level: DiagLevel, _message: &str) {}
}

/// Forwards records to the `tracing` subscriber installed by the binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagSink for TracingSink {
    fn record(&self, level: DiagLevel, message: &str) {
        match level {
            DiagLevel::Debug => tracing::debug!("{message}"),
            DiagLevel::Info => tracing::info!("{message}"),
            DiagLevel::Warn => tracing::warn!("{message}"),
            DiagLevel::Error => tracing::error!("{message}"),
        }
    }
}

/// Shared-buffer sink so tests can assert on recorded diagnostics.
#[cfg(test)]
#[derive(Clone, Default)]
pub struct CaptureSink {
    events: std::rc::Rc<std::cell::RefCell<Vec<(DiagLevel, String)>>>,
}

#[cfg(test)]
impl CaptureSink {
    pub fn events(&self) -> Vec<(DiagLevel, String)> {
        self.events.borrow().clone()
    }
}

#[cfg(test)]
impl DiagSink for CaptureSink {
    fn record(&self, level: DiagLevel, message: &str) {
        self.events.borrow_mut().push((level, message.to_string()));
    }
}
