//! # reelx Similarity
//!
//! Embedding comparisons over normalized records.
//!
//! - **Similarity matrix**: pairwise cosine scores for a handful of records,
//!   upper triangle computed once and mirrored
//! - **Playground selection**: the capped set of records a user compares
//! - **Explanations**: per-result similarity, keyword and genre evidence
//!
//! ## Example
//!
//! ```rust
//! use reelx_core::{NormalizedRecord, Vector};
//! use reelx_similarity::similarity_matrix;
//!
//! let records = vec![
//!     NormalizedRecord::new("1", "A", "", 2000, Vector::new(vec![1.0, 0.0])),
//!     NormalizedRecord::new("2", "B", "", 2001, Vector::new(vec![0.0, 1.0])),
//! ];
//! let matrix = similarity_matrix(&records);
//! assert_eq!(matrix.get(0, 0), Some(1.0));
//! assert_eq!(matrix.get(0, 1), matrix.get(1, 0));
//! ```

pub mod matrix;
pub mod explain;

pub use matrix::{similarity_matrix, PlaygroundSelection, SimilarityMatrix, MAX_PLAYGROUND_SELECTION};
pub use explain::{
    explain_results, query_terms, ExplainResponse, ExplanationSummary, MatchStrength,
    RelevanceFactors, SearchExplanation,
};
