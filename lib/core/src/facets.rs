//! Choices offered by the filter panel, derived from a result set

use crate::NormalizedRecord;

/// Distinct genres across `records`, sorted
pub fn available_genres(records: &[NormalizedRecord]) -> Vec<String> {
    let mut genres: Vec<String> = records
        .iter()
        .flat_map(|r| r.genres.iter().cloned())
        .collect();
    genres.sort_unstable();
    genres.dedup();
    genres
}
