//! # reelx Schema
//!
//! Dataset adapters for reelx.
//!
//! ## Overview
//!
//! Search results come from heterogeneous collections: movies, climate
//! studies, social issue reports, or anything a user describes with a JSON
//! configuration. This crate maps each of them into the one
//! [`NormalizedRecord`](reelx_core::NormalizedRecord) shape the ranking and
//! similarity code works on.
//!
//! **How it works:**
//! 1. An [`AdapterConfig`] names the source field (or fallback fields) behind
//!    each normalized field and the [`Processor`] that coerces its value
//! 2. A [`DatasetAdapter`] applies the configuration and validates the result
//! 3. A [`DatasetRegistry`] holds the adapters, tracks the active one and
//!    normalizes whole batches, reporting dropped records to a
//!    [`DiagnosticSink`]
//!
//! ## Example
//!
//! ```rust
//! use reelx_schema::{templates, DatasetRegistry};
//! use serde_json::json;
//!
//! let registry = DatasetRegistry::new();
//! registry.register(templates::climate());
//! registry.set_active(templates::CLIMATE).unwrap();
//!
//! let records = registry.transform(&[json!({
//!     "_id": "c-1",
//!     "study_title": "Glacier retreat",
//!     "abstract": "Alpine glaciers since 1950",
//!     "publication_year": 2020,
//!     "embedding": [0.3, 0.7],
//!     "impact_score": 90,
//!     "research_areas": "Glaciology, Hydrology"
//! })]).unwrap();
//!
//! assert_eq!(records[0].rating, Some(9.0));
//! assert_eq!(records[0].genres, vec!["Glaciology", "Hydrology"]);
//! ```

pub mod mapping;
pub mod processor;
pub mod config;
pub mod adapter;
pub mod diagnostics;
pub mod registry;
pub mod templates;

pub use mapping::FieldMapping;
pub use processor::Processor;
pub use config::AdapterConfig;
pub use adapter::{DatasetAdapter, TransformedRecord, Validation, ValidationError};
pub use diagnostics::{CollectingSink, DiagnosticSink, DroppedRecord, NullSink, TracingSink};
pub use registry::{ActiveDataset, DatasetRegistry, DatasetSummary, TransformOutcome};
