//! Record filtering
//!
//! A [`FilterSpec`] is turned into a list of independent [`FilterCondition`]
//! stages. Each stage is a pure predicate over a single record, so the stages
//! commute: applying them in any order keeps the same records.

use crate::rank::SortBy;
use crate::NormalizedRecord;
use ahash::AHashSet;
use chrono::Datelike;
use serde::{Deserialize, Serialize};

/// Earliest year offered by the filter panel
pub const DEFAULT_MIN_YEAR: i32 = 1900;

/// Upper bound of the rating scale
pub const MAX_RATING: f32 = 10.0;

/// Upper bound of the runtime slider, in minutes
pub const DEFAULT_MAX_RUNTIME: u32 = 300;

pub trait Filter {
    fn matches(&self, record: &NormalizedRecord) -> bool;
}

/// Inclusive `[min, max]` range, serialized as a two-element array
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "(T, T)", into = "(T, T)")]
pub struct ValueRange<T: Copy> {
    pub min: T,
    pub max: T,
}

impl<T: Copy + PartialOrd> ValueRange<T> {
    #[inline]
    pub fn new(min: T, max: T) -> Self {
        Self { min, max }
    }

    #[inline]
    pub fn contains(&self, value: T) -> bool {
        value >= self.min && value <= self.max
    }
}

impl<T: Copy> From<(T, T)> for ValueRange<T> {
    fn from((min, max): (T, T)) -> Self {
        Self { min, max }
    }
}

impl<T: Copy> From<ValueRange<T>> for (T, T) {
    fn from(range: ValueRange<T>) -> Self {
        (range.min, range.max)
    }
}

/// A single filter stage
#[derive(Debug, Clone)]
pub enum FilterCondition {
    /// Keep records whose year is inside the range
    Year(ValueRange<i32>),
    /// Keep records whose rating (missing = 0) is inside the range
    Rating(ValueRange<f32>),
    /// Keep records sharing at least one genre with the set
    Genres(AHashSet<String>),
    /// Keep records whose runtime is inside the range; records without a
    /// runtime are kept
    Runtime(ValueRange<u32>),
    And(Vec<FilterCondition>),
}

impl FilterCondition {
    fn matches_condition(condition: &FilterCondition, record: &NormalizedRecord) -> bool {
        match condition {
            FilterCondition::Year(range) => range.contains(record.year),
            FilterCondition::Rating(range) => range.contains(record.rating_or_default()),
            FilterCondition::Genres(genres) => {
                genres.is_empty() || record.genres.iter().any(|g| genres.contains(g))
            }
            FilterCondition::Runtime(range) => {
                record.runtime.map(|r| range.contains(r)).unwrap_or(true)
            }
            FilterCondition::And(conditions) => conditions
                .iter()
                .all(|c| Self::matches_condition(c, record)),
        }
    }
}

impl Filter for FilterCondition {
    fn matches(&self, record: &NormalizedRecord) -> bool {
        Self::matches_condition(self, record)
    }
}

/// Caller-supplied filter and sort settings
///
/// Every range is optional; an absent range disables its stage. An empty
/// genre selection disables genre filtering.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterSpec {
    pub year_range: Option<ValueRange<i32>>,
    pub rating_range: Option<ValueRange<f32>>,
    pub selected_genres: Vec<String>,
    pub runtime_range: Option<ValueRange<u32>>,
    pub sort_by: SortBy,
}

impl FilterSpec {
    /// The settings the filter panel starts from
    pub fn panel_defaults() -> Self {
        Self {
            year_range: Some(ValueRange::new(DEFAULT_MIN_YEAR, current_year())),
            rating_range: Some(ValueRange::new(0.0, MAX_RATING)),
            selected_genres: Vec::new(),
            runtime_range: Some(ValueRange::new(0, DEFAULT_MAX_RUNTIME)),
            sort_by: SortBy::Relevance,
        }
    }

    #[must_use]
    pub fn with_year_range(mut self, min: i32, max: i32) -> Self {
        self.year_range = Some(ValueRange::new(min, max));
        self
    }

    #[must_use]
    pub fn with_rating_range(mut self, min: f32, max: f32) -> Self {
        self.rating_range = Some(ValueRange::new(min, max));
        self
    }

    #[must_use]
    pub fn with_runtime_range(mut self, min: u32, max: u32) -> Self {
        self.runtime_range = Some(ValueRange::new(min, max));
        self
    }

    #[must_use]
    pub fn with_genres<I, S>(mut self, genres: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selected_genres = genres.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_sort(mut self, sort_by: SortBy) -> Self {
        self.sort_by = sort_by;
        self
    }

    /// The enabled filter stages, in the default application order
    ///
    /// A runtime range covering the whole slider (`0` to
    /// [`DEFAULT_MAX_RUNTIME`]) adds no stage, so longer records survive the
    /// panel's starting settings.
    pub fn conditions(&self) -> Vec<FilterCondition> {
        let mut conditions = Vec::with_capacity(4);
        if let Some(range) = self.year_range {
            conditions.push(FilterCondition::Year(range));
        }
        if let Some(range) = self.rating_range {
            conditions.push(FilterCondition::Rating(range));
        }
        if !self.selected_genres.is_empty() {
            conditions.push(FilterCondition::Genres(
                self.selected_genres.iter().cloned().collect(),
            ));
        }
        if let Some(range) = self.runtime_range.filter(is_narrowed_runtime) {
            conditions.push(FilterCondition::Runtime(range));
        }
        conditions
    }

    /// Number of controls that differ from their neutral setting
    ///
    /// `year_bounds` is the full year span of the data (see [`year_bounds`]).
    pub fn active_filter_count(&self, year_bounds: ValueRange<i32>) -> usize {
        let mut count = 0;
        if let Some(range) = self.year_range {
            if range.min > year_bounds.min || range.max < year_bounds.max {
                count += 1;
            }
        }
        if let Some(range) = self.rating_range {
            if range.min > 0.0 || range.max < MAX_RATING {
                count += 1;
            }
        }
        if !self.selected_genres.is_empty() {
            count += 1;
        }
        if self.runtime_range.is_some_and(|range| is_narrowed_runtime(&range)) {
            count += 1;
        }
        if self.sort_by != SortBy::Relevance {
            count += 1;
        }
        count
    }
}

/// Year span for the filter panel: the data's years widened to at least
/// [`DEFAULT_MIN_YEAR`] and the current year
pub fn year_bounds(records: &[NormalizedRecord]) -> ValueRange<i32> {
    let this_year = current_year();
    records.iter().fold(
        ValueRange::new(DEFAULT_MIN_YEAR, this_year),
        |bounds, r| ValueRange::new(bounds.min.min(r.year), bounds.max.max(r.year)),
    )
}

fn is_narrowed_runtime(range: &ValueRange<u32>) -> bool {
    range.min > 0 || range.max < DEFAULT_MAX_RUNTIME
}

fn current_year() -> i32 {
    chrono::Utc::now().year()
}

/// Apply a list of filter stages in the given order
pub fn filter_with(records: &[NormalizedRecord], conditions: &[FilterCondition]) -> Vec<NormalizedRecord> {
    records
        .iter()
        .filter(|record| conditions.iter().all(|c| c.matches(record)))
        .cloned()
        .collect()
}

/// Narrow `records` to those passing every enabled stage of `spec`.
/// Input order is preserved.
pub fn apply_filters(records: &[NormalizedRecord], spec: &FilterSpec) -> Vec<NormalizedRecord> {
    filter_with(records, &spec.conditions())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Vector;

    fn record(id: &str, year: i32, rating: Option<f32>, genres: &[&str], runtime: Option<u32>) -> NormalizedRecord {
        let mut r = NormalizedRecord::new(id, id, "", year, Vector::new(vec![1.0]))
            .with_genres(genres.iter().copied());
        r.rating = rating;
        r.runtime = runtime;
        r
    }

    fn sample() -> Vec<NormalizedRecord> {
        vec![
            record("a", 1995, Some(8.1), &["Action", "Drama"], Some(120)),
            record("b", 2005, Some(6.0), &["Comedy"], Some(95)),
            record("c", 2015, None, &["Drama"], None),
            record("d", 1980, Some(9.0), &[], Some(200)),
        ]
    }

    fn ids(records: &[NormalizedRecord]) -> Vec<&str> {
        records.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn test_year_range_inclusive() {
        let spec = FilterSpec::default().with_year_range(1995, 2005);
        assert_eq!(ids(&apply_filters(&sample(), &spec)), vec!["a", "b"]);
    }

    #[test]
    fn test_missing_rating_counts_as_zero() {
        let spec = FilterSpec::default().with_rating_range(0.0, 5.0);
        assert_eq!(ids(&apply_filters(&sample(), &spec)), vec!["c"]);
    }

    #[test]
    fn test_genre_intersection() {
        let spec = FilterSpec::default().with_genres(["Drama", "Horror"]);
        assert_eq!(ids(&apply_filters(&sample(), &spec)), vec!["a", "c"]);
    }

    #[test]
    fn test_empty_genres_no_filtering() {
        let spec = FilterSpec::default();
        assert_eq!(apply_filters(&sample(), &spec).len(), 4);
    }

    #[test]
    fn test_runtime_skips_records_without_runtime() {
        let spec = FilterSpec::default().with_runtime_range(90, 150);
        assert_eq!(ids(&apply_filters(&sample(), &spec)), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_full_runtime_range_keeps_long_records() {
        let mut records = sample();
        records.push(record("long", 1969, Some(7.9), &["History"], Some(566)));
        let bounds = year_bounds(&records);

        let mut spec = FilterSpec::panel_defaults();
        spec.year_range = Some(bounds);
        assert_eq!(spec.active_filter_count(bounds), 0);
        assert_eq!(apply_filters(&records, &spec).len(), 5);

        // any narrower range filters again
        let spec = spec.with_runtime_range(0, 299);
        assert_eq!(spec.active_filter_count(bounds), 1);
        assert!(!ids(&apply_filters(&records, &spec)).contains(&"long"));
    }

    #[test]
    fn test_filters_commute() {
        let records = sample();
        let spec = FilterSpec::default()
            .with_year_range(1990, 2020)
            .with_rating_range(0.0, 7.0)
            .with_genres(["Drama", "Comedy"]);

        let mut conditions = spec.conditions();
        let forward = filter_with(&records, &conditions);
        conditions.reverse();
        let backward = filter_with(&records, &conditions);

        assert_eq!(ids(&forward), ids(&backward));
        assert_eq!(ids(&forward), vec!["b", "c"]);
    }

    #[test]
    fn test_and_condition() {
        let condition = FilterCondition::And(FilterSpec::default()
            .with_year_range(2000, 2020)
            .with_genres(["Drama"])
            .conditions());
        let kept: Vec<_> = sample().into_iter().filter(|r| condition.matches(r)).collect();
        assert_eq!(ids(&kept), vec!["c"]);
    }

    #[test]
    fn test_spec_from_json() {
        let spec: FilterSpec = serde_json::from_str(
            r#"{"yearRange": [1990, 2000], "selectedGenres": ["Action"], "sortBy": "rating"}"#,
        ).unwrap();
        assert_eq!(spec.year_range, Some(ValueRange::new(1990, 2000)));
        assert!(spec.rating_range.is_none());
        assert_eq!(spec.sort_by, SortBy::Rating);
    }

    #[test]
    fn test_panel_defaults_count_as_inactive() {
        let records = sample();
        let bounds = year_bounds(&records);
        assert_eq!(bounds.min, 1900);
        assert!(bounds.max >= 2015);

        let mut spec = FilterSpec::panel_defaults();
        spec.year_range = Some(bounds);
        assert_eq!(spec.active_filter_count(bounds), 0);

        let spec = spec.with_genres(["Drama"]).with_sort(SortBy::Title).with_rating_range(5.0, 10.0);
        assert_eq!(spec.active_filter_count(bounds), 3);
    }

    #[test]
    fn test_year_bounds_widen_to_data() {
        let records = vec![record("old", 1895, None, &[], None)];
        assert_eq!(year_bounds(&records).min, 1895);
    }
}
