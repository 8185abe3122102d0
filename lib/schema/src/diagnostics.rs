//! Reporting of records dropped during batch transforms
//!
//! A batch never fails because of one bad record. The record is left out of
//! the result and a [`DroppedRecord`] goes to the registry's sink instead.

use parking_lot::Mutex;
use serde::Serialize;
use serde_json::Value;

/// A record excluded from a batch because it failed validation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DroppedRecord {
    pub dataset: String,
    /// Position in the input batch
    pub index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub errors: Vec<String>,
    pub raw: Value,
}

/// Receives drop reports
pub trait DiagnosticSink: Send + Sync {
    fn record_dropped(&self, dropped: &DroppedRecord);
}

impl<F> DiagnosticSink for F
where
    F: Fn(&DroppedRecord) + Send + Sync,
{
    fn record_dropped(&self, dropped: &DroppedRecord) {
        self(dropped)
    }
}

/// Logs each drop as a warning
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn record_dropped(&self, dropped: &DroppedRecord) {
        tracing::warn!(
            dataset = %dropped.dataset,
            index = dropped.index,
            id = ?dropped.id,
            errors = ?dropped.errors,
            "Invalid item transformation, record dropped"
        );
    }
}

/// Discards every report
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn record_dropped(&self, _dropped: &DroppedRecord) {}
}

/// Keeps every report in memory
#[derive(Debug, Default)]
pub struct CollectingSink {
    dropped: Mutex<Vec<DroppedRecord>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.dropped.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.dropped.lock().is_empty()
    }

    /// Copy of the reports collected so far
    pub fn dropped(&self) -> Vec<DroppedRecord> {
        self.dropped.lock().clone()
    }

    /// Take the reports collected so far
    pub fn drain(&self) -> Vec<DroppedRecord> {
        std::mem::take(&mut *self.dropped.lock())
    }
}

impl DiagnosticSink for CollectingSink {
    fn record_dropped(&self, dropped: &DroppedRecord) {
        self.dropped.lock().push(dropped.clone());
    }
}
