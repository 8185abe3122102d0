//! # reelx Core
//!
//! Core library for reelx.
//!
//! This crate provides the shared data model and the pure computations
//! applied to search results:
//!
//! - [`Vector`] - Embedding vector with NaN-free cosine similarity
//! - [`NormalizedRecord`] - The canonical record shape all datasets map into
//! - [`FilterSpec`] - Year, rating, genre and runtime filters plus a sort key
//! - [`rank`] - Filter then stable sort, preserving upstream relevance on ties
//!
//! ## Example
//!
//! ```rust
//! use reelx_core::{NormalizedRecord, Vector, FilterSpec, SortBy, rank};
//!
//! let records = vec![
//!     NormalizedRecord::new("1", "Heat", "Heist drama", 1995, Vector::new(vec![1.0, 0.0]))
//!         .with_rating(8.3),
//!     NormalizedRecord::new("2", "Alien", "Space horror", 1979, Vector::new(vec![0.0, 1.0]))
//!         .with_rating(8.5),
//! ];
//!
//! let spec = FilterSpec::default()
//!     .with_year_range(1970, 2000)
//!     .with_sort(SortBy::Rating);
//! let ranked = rank::rank(&records, &spec);
//! assert_eq!(ranked[0].id, "2");
//! ```

pub mod error;
pub mod vector;
pub mod record;
pub mod filter;
pub mod rank;
pub mod facets;

pub use error::{Error, Result};
pub use vector::{cosine_similarity, cosine_similarity_or_zero, Vector};
pub use record::{Embedded, NormalizedRecord, RecordField, DATASET_TYPE_KEY, ORIGINAL_DATA_KEY};
pub use filter::{apply_filters, year_bounds, Filter, FilterCondition, FilterSpec, ValueRange};
pub use rank::{apply_sort, SortBy};
