//! Dataset registry
//!
//! Holds the known adapters, keyed by dataset type, and the one that is
//! active. Registries are plain values: an application owns one and hands it
//! to whatever needs it, and tests build as many isolated ones as they like.
//!
//! Batch transforms run against an [`ActiveDataset`] snapshot, so switching
//! datasets mid-batch never mixes two configurations in one result.

use crate::adapter::{DatasetAdapter, Validation};
use crate::config::AdapterConfig;
use crate::diagnostics::{DiagnosticSink, DroppedRecord, TracingSink};
use crate::templates;
use ahash::AHashMap;
use parking_lot::RwLock;
use rayon::prelude::*;
use reelx_core::{Error, NormalizedRecord, Result};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

/// Type and display name of a registered dataset
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct DatasetSummary {
    #[serde(rename = "type")]
    pub dataset_type: String,
    pub name: String,
}

/// Per-record result of a detailed transform
#[derive(Debug, Clone)]
pub struct TransformOutcome {
    pub index: usize,
    /// Id read from the mapped record, when one could be read
    pub id: Option<String>,
    pub record: std::result::Result<NormalizedRecord, Validation>,
}

impl TransformOutcome {
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.record.is_ok()
    }
}

pub struct DatasetRegistry {
    adapters: RwLock<AHashMap<String, Arc<DatasetAdapter>>>,
    active: RwLock<Option<Arc<DatasetAdapter>>>,
    sink: Arc<dyn DiagnosticSink>,
}

impl DatasetRegistry {
    /// Registry with the movies dataset registered and nothing active,
    /// logging dropped records through `tracing`
    pub fn new() -> Self {
        Self::with_sink(Arc::new(TracingSink))
    }

    pub fn with_sink(sink: Arc<dyn DiagnosticSink>) -> Self {
        let registry = Self::empty(sink);
        registry.register(templates::movies());
        registry
    }

    /// Registry with no datasets at all
    pub fn empty(sink: Arc<dyn DiagnosticSink>) -> Self {
        Self {
            adapters: RwLock::new(AHashMap::new()),
            active: RwLock::new(None),
            sink,
        }
    }

    /// Add or replace the adapter for `config.dataset_type`
    ///
    /// Replacing the active dataset's adapter does not change what is
    /// active; call [`DatasetRegistry::set_active`] again to pick up the new
    /// configuration.
    pub fn register(&self, config: AdapterConfig) -> Arc<DatasetAdapter> {
        let adapter = Arc::new(DatasetAdapter::new(config));
        let replaced = self
            .adapters
            .write()
            .insert(adapter.dataset_type().to_string(), adapter.clone())
            .is_some();
        tracing::debug!(dataset = adapter.dataset_type(), replaced, "Registered dataset adapter");
        adapter
    }

    pub fn get(&self, dataset_type: &str) -> Option<Arc<DatasetAdapter>> {
        self.adapters.read().get(dataset_type).cloned()
    }

    pub fn contains(&self, dataset_type: &str) -> bool {
        self.adapters.read().contains_key(dataset_type)
    }

    /// Make a registered dataset the active one
    ///
    /// # Errors
    /// [`Error::UnknownDataset`] when nothing is registered under
    /// `dataset_type`; the active dataset is left unchanged.
    pub fn set_active(&self, dataset_type: &str) -> Result<Arc<DatasetAdapter>> {
        let adapter = self
            .get(dataset_type)
            .ok_or_else(|| Error::UnknownDataset(dataset_type.to_string()))?;
        *self.active.write() = Some(adapter.clone());
        tracing::debug!(dataset = dataset_type, "Switched active dataset");
        Ok(adapter)
    }

    pub fn active(&self) -> Option<Arc<DatasetAdapter>> {
        self.active.read().clone()
    }

    /// Registered datasets ordered by type
    pub fn available_datasets(&self) -> Vec<DatasetSummary> {
        let mut datasets: Vec<DatasetSummary> = self
            .adapters
            .read()
            .values()
            .map(|adapter| DatasetSummary {
                dataset_type: adapter.dataset_type().to_string(),
                name: adapter.name().to_string(),
            })
            .collect();
        datasets.sort();
        datasets
    }

    /// Pin the active adapter for a batch
    pub fn snapshot(&self) -> Result<ActiveDataset> {
        let adapter = self.active().ok_or(Error::NoActiveDataset)?;
        Ok(ActiveDataset {
            adapter,
            sink: self.sink.clone(),
        })
    }

    /// Normalize a batch with the active adapter, dropping invalid records
    ///
    /// # Errors
    /// [`Error::NoActiveDataset`] when no dataset has been activated.
    pub fn transform(&self, raw: &[Value]) -> Result<Vec<NormalizedRecord>> {
        Ok(self.snapshot()?.transform(raw))
    }

    /// Like [`DatasetRegistry::transform`] but keeps every outcome
    pub fn transform_detailed(&self, raw: &[Value]) -> Result<Vec<TransformOutcome>> {
        Ok(self.snapshot()?.transform_detailed(raw))
    }
}

impl Default for DatasetRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// The adapter that was active when the snapshot was taken
#[derive(Clone)]
pub struct ActiveDataset {
    adapter: Arc<DatasetAdapter>,
    sink: Arc<dyn DiagnosticSink>,
}

impl ActiveDataset {
    pub fn adapter(&self) -> &DatasetAdapter {
        &self.adapter
    }

    /// Valid records in input order; each invalid one is reported to the sink
    pub fn transform(&self, raw: &[Value]) -> Vec<NormalizedRecord> {
        let outcomes = self.transform_detailed(raw);
        let mut records = Vec::with_capacity(outcomes.len());
        let mut dropped = 0usize;

        for (outcome, source) in outcomes.into_iter().zip(raw) {
            match outcome.record {
                Ok(record) => records.push(record),
                Err(validation) => {
                    dropped += 1;
                    self.sink.record_dropped(&DroppedRecord {
                        dataset: self.adapter.dataset_type().to_string(),
                        index: outcome.index,
                        id: outcome.id,
                        errors: validation.messages(),
                        raw: source.clone(),
                    });
                }
            }
        }

        tracing::debug!(
            dataset = self.adapter.dataset_type(),
            total = raw.len(),
            kept = records.len(),
            dropped,
            "Transformed batch"
        );
        records
    }

    /// Every record's outcome in input order
    pub fn transform_detailed(&self, raw: &[Value]) -> Vec<TransformOutcome> {
        raw.par_iter()
            .enumerate()
            .map(|(index, item)| {
                let transformed = self.adapter.transform(item);
                TransformOutcome {
                    index,
                    id: transformed.id(),
                    record: self.adapter.into_normalized(transformed),
                }
            })
            .collect()
    }
}
