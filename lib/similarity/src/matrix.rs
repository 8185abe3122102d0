//! Pairwise similarity matrices
//!
//! Only the upper triangle is computed; the lower triangle is mirrored and
//! the diagonal is fixed at exactly 1.0.

use reelx_core::{cosine_similarity_or_zero, Embedded, NormalizedRecord};
use serde::Serialize;

/// Largest selection the embeddings playground accepts
pub const MAX_PLAYGROUND_SELECTION: usize = 10;

/// Square, symmetric matrix of cosine similarities
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SimilarityMatrix {
    rows: Vec<Vec<f32>>,
}

impl SimilarityMatrix {
    /// Build the matrix for `items`
    ///
    /// Pairs where either side has no embedding, or where the embeddings
    /// cannot be compared (length mismatch, zero vector), score 0.0.
    pub fn compute<E: Embedded>(items: &[E]) -> Self {
        let n = items.len();
        let mut rows = vec![vec![0.0f32; n]; n];

        for i in 0..n {
            rows[i][i] = 1.0;
            for j in (i + 1)..n {
                let score = match (items[i].embedding(), items[j].embedding()) {
                    (Some(a), Some(b)) => cosine_similarity_or_zero(a.as_slice(), b.as_slice()),
                    _ => 0.0,
                };
                rows[i][j] = score;
                rows[j][i] = score;
            }
        }

        Self { rows }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Score at row `i`, column `j`
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> Option<f32> {
        self.rows.get(i).and_then(|row| row.get(j)).copied()
    }

    pub fn rows(&self) -> &[Vec<f32>] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Vec<f32>> {
        self.rows
    }

    /// The most similar pair of distinct items, as `(i, j, score)` with `i < j`
    pub fn most_similar_pair(&self) -> Option<(usize, usize, f32)> {
        let mut best: Option<(usize, usize, f32)> = None;
        for i in 0..self.len() {
            for j in (i + 1)..self.len() {
                let score = self.rows[i][j];
                if best.map_or(true, |(_, _, s)| score > s) {
                    best = Some((i, j, score));
                }
            }
        }
        best
    }
}

/// Shorthand for [`SimilarityMatrix::compute`]
pub fn similarity_matrix<E: Embedded>(items: &[E]) -> SimilarityMatrix {
    SimilarityMatrix::compute(items)
}

/// Records picked for side-by-side comparison in the embeddings playground
#[derive(Debug, Clone, Default)]
pub struct PlaygroundSelection {
    selected: Vec<NormalizedRecord>,
}

impl PlaygroundSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select records in order, up to [`MAX_PLAYGROUND_SELECTION`]
    ///
    /// A record whose id is already selected is skipped rather than toggled
    /// off.
    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a NormalizedRecord>,
    {
        let mut selection = Self::new();
        for record in records {
            if selection.selected.len() >= MAX_PLAYGROUND_SELECTION {
                break;
            }
            if !selection.is_selected(&record.id) {
                selection.selected.push(record.clone());
            }
        }
        selection
    }

    /// Add the record if it is not selected, remove it if it is.
    ///
    /// Additions beyond [`MAX_PLAYGROUND_SELECTION`] are ignored. Returns
    /// whether the record is selected afterwards.
    pub fn toggle(&mut self, record: &NormalizedRecord) -> bool {
        if let Some(pos) = self.selected.iter().position(|r| r.id == record.id) {
            self.selected.remove(pos);
            return false;
        }
        if self.selected.len() >= MAX_PLAYGROUND_SELECTION {
            tracing::debug!("playground selection full, ignoring {}", record.id);
            return false;
        }
        self.selected.push(record.clone());
        true
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.iter().any(|r| r.id == id)
    }

    pub fn selected(&self) -> &[NormalizedRecord] {
        &self.selected
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    /// Matrix over the current selection; `None` until two records are selected
    pub fn matrix(&self) -> Option<SimilarityMatrix> {
        if self.selected.len() < 2 {
            return None;
        }
        Some(SimilarityMatrix::compute(&self.selected))
    }
}
