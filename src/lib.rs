//! # reelx
//!
//! Embedding similarity, dataset adaptation and result ranking for semantic
//! search front-ends.
//!
//! A search backend returns raw documents with an embedding attached. reelx
//! maps those documents from whatever collection they came from into one
//! normalized record shape, filters and sorts them, compares their embeddings
//! and explains why each one matched a query.
//!
//! ## Quick Start
//!
//! ### As a Command
//!
//! ```bash
//! reelx rank --dataset movies --filters filters.json results.json
//! reelx matrix results.json
//! ```
//!
//! ### As a Library
//!
//! ```rust
//! use reelx::prelude::*;
//! use serde_json::json;
//!
//! let registry = DatasetRegistry::new();
//! registry.set_active("movies").unwrap();
//!
//! let records = registry.transform(&[
//!     json!({"_id": "1", "title": "Heat", "overview": "Heist", "year": 1995,
//!            "embedding": [1.0, 0.0], "genres": ["Crime"], "imdb": {"rating": 8.3}}),
//!     json!({"_id": "2", "title": "Alien", "overview": "Horror", "year": 1979,
//!            "embedding": [0.6, 0.8], "genres": ["Horror"], "imdb": {"rating": 8.5}}),
//! ]).unwrap();
//!
//! let spec = FilterSpec::default().with_sort(SortBy::Rating);
//! let ranked = rank(&records, &spec);
//! assert_eq!(ranked[0].title, "Alien");
//!
//! let matrix = similarity_matrix(&ranked);
//! assert_eq!(matrix.get(0, 0), Some(1.0));
//! ```
//!
//! ## Crate Structure
//!
//! - [`reelx-core`](reelx_core) - Record model, vector math, filters and sorting
//! - [`reelx-similarity`](reelx_similarity) - Similarity matrix and search explanations
//! - [`reelx-schema`](reelx_schema) - Dataset adapters, configuration and the registry

// Re-export core types
pub use reelx_core::{
    cosine_similarity, cosine_similarity_or_zero,
    Vector, NormalizedRecord, RecordField, Embedded,
    Filter, FilterCondition, FilterSpec, ValueRange, SortBy,
    apply_filters, apply_sort, year_bounds,
    Error, Result,
};
pub use reelx_core::rank::rank;
pub use reelx_core::facets::available_genres;

// Re-export similarity
pub use reelx_similarity::{
    explain_results, similarity_matrix, ExplainResponse, MatchStrength, PlaygroundSelection,
    SearchExplanation, SimilarityMatrix,
};

// Re-export schema
pub use reelx_schema::{
    templates, AdapterConfig, DatasetAdapter, DatasetRegistry, DiagnosticSink, FieldMapping,
    Processor,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        Vector, NormalizedRecord, RecordField,
        FilterSpec, SortBy, rank, apply_filters, apply_sort,
        similarity_matrix, SimilarityMatrix, PlaygroundSelection,
        AdapterConfig, DatasetAdapter, DatasetRegistry,
        Error, Result,
    };
}
