use std::sync::{Arc, Mutex};
use tracing::error;

use super::anomaly::Anomaly;

/// Where anomalies go besides the returned outcome.
pub trait DiagnosticsSink: Send + Sync {
    /// `source` names what was being validated, usually a file.
    fn record(&self, source: &str, anomaly: &Anomaly);
}

/// Emits every anomaly as an ERROR event.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticsSink for TracingSink {
    fn record(&self, source: &str, anomaly: &Anomaly) {
        error!(file = %source, kind = ?anomaly.kind(), "{}", anomaly);
    }
}

/// Collects anomalies in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    entries: Mutex<Vec<(String, Anomaly)>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<(String, Anomaly)> {
        match self.entries.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn len(&self) -> usize {
        match self.entries.lock() {
            Ok(guard) => guard.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Anomalies recorded for one source, in order.
    pub fn for_source(&self, source: &str) -> Vec<Anomaly> {
        self.entries()
            .into_iter()
            .filter(|(s, _)| s == source)
            .map(|(_, a)| a)
            .collect()
    }
}

impl DiagnosticsSink for MemorySink {
    fn record(&self, source: &str, anomaly: &Anomaly) {
        let mut guard = match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.push((source.to_string(), anomaly.clone()));
    }
}

/// Forwards to every inner sink.
#[derive(Default, Clone)]
pub struct Fanout {
    sinks: Vec<Arc<dyn DiagnosticsSink>>,
}

impl Fanout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, sink: Arc<dyn DiagnosticsSink>) -> Self {
        self.sinks.push(sink);
        self
    }
}

impl DiagnosticsSink for Fanout {
    fn record(&self, source: &str, anomaly: &Anomaly) {
        for sink in &self.sinks {
            sink.record(source, anomaly);
        }
    }
}
