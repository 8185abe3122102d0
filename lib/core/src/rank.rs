//! Result ordering
//!
//! Every sort here is stable: the incoming order is the upstream search
//! ranking, and ties must keep it.

use crate::filter::{apply_filters, FilterSpec};
use crate::NormalizedRecord;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::fmt;
use std::str::FromStr;

/// Sort key for a result list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    /// Keep the incoming order
    #[default]
    Relevance,
    /// Newest first
    Year,
    /// Highest first, missing ratings count as 0
    Rating,
    /// Case-insensitive A to Z
    Title,
    /// Longest first, missing runtimes count as 0
    Runtime,
}

impl SortBy {
    pub fn as_str(self) -> &'static str {
        match self {
            SortBy::Relevance => "relevance",
            SortBy::Year => "year",
            SortBy::Rating => "rating",
            SortBy::Title => "title",
            SortBy::Runtime => "runtime",
        }
    }
}

impl fmt::Display for SortBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortBy {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "relevance" => Ok(SortBy::Relevance),
            "year" => Ok(SortBy::Year),
            "rating" => Ok(SortBy::Rating),
            "title" => Ok(SortBy::Title),
            "runtime" => Ok(SortBy::Runtime),
            other => Err(crate::Error::InvalidConfig(format!("unknown sort key '{}'", other))),
        }
    }
}

/// Order `records` by `sort_by`
pub fn apply_sort(mut records: Vec<NormalizedRecord>, sort_by: SortBy) -> Vec<NormalizedRecord> {
    match sort_by {
        SortBy::Relevance => {}
        SortBy::Year => records.sort_by_key(|r| Reverse(r.year)),
        SortBy::Rating => records.sort_by_key(|r| Reverse(OrderedFloat(r.rating_or_default()))),
        SortBy::Title => records.sort_by_cached_key(|r| r.title.to_lowercase()),
        SortBy::Runtime => records.sort_by_key(|r| Reverse(r.runtime_or_default())),
    }
    records
}

/// Filter then sort, the full pipeline run on every filter change
pub fn rank(records: &[NormalizedRecord], spec: &FilterSpec) -> Vec<NormalizedRecord> {
    apply_sort(apply_filters(records, spec), spec.sort_by)
}
