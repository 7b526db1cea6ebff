//! Content similarity scoped to a candidate set.
//!
//! With an anchor that is part of the set, each candidate is scored by its
//! cosine similarity to the anchor. Without one, each candidate gets its mean
//! similarity to the whole set (own diagonal entry included), which is
//! quadratic in the set size.

use crate::error::{CatalogError, DataError, Result};
use crate::models::{CandidateSet, ItemId};
use crate::services::features::{FeatureIndex, SparseVector};
use ndarray::{Array2, Axis};
use tracing::debug;

pub struct SimilarityLayer<'a> {
    index: &'a FeatureIndex,
}

impl<'a> SimilarityLayer<'a> {
    pub fn new(index: &'a FeatureIndex) -> Self {
        Self { index }
    }

    /// One score in [0, 1] per candidate, aligned with `candidates.ids()`.
    pub fn content_similarity(&self, candidates: &CandidateSet<'_>, anchor: Option<ItemId>) -> Result<Vec<f64>> {
        let rows = self.rows(candidates.ids())?;

        match rows.len() {
            0 => return Ok(Vec::new()),
            1 => return Ok(vec![1.0]),
            _ => {}
        }

        let scores: Vec<f64> = match anchor.and_then(|id| candidates.ids().iter().position(|&c| c == id)) {
            Some(local) => {
                debug!(candidates = rows.len(), "Anchor similarity");
                let anchor_row = rows[local];
                rows.iter().map(|row| anchor_row.cosine(row)).collect()
            }
            None => {
                if anchor.is_some() {
                    debug!("Anchor not in candidate set; falling back to mean similarity");
                }
                let matrix = pairwise(&rows);
                matrix
                    .mean_axis(Axis(1))
                    .map(|means| means.to_vec())
                    .unwrap_or_default()
            }
        };

        Ok(scores.into_iter().map(|s| s.clamp(0.0, 1.0)).collect())
    }

    fn rows(&self, ids: &[ItemId]) -> Result<Vec<&'a SparseVector>> {
        ids.iter()
            .map(|&id| self.index.row(id).ok_or_else(|| CatalogError::from(DataError::UnknownItem(id))))
            .collect()
    }
}

/// Full symmetric cosine matrix over the given rows.
fn pairwise(rows: &[&SparseVector]) -> Array2<f64> {
    let n = rows.len();
    let mut matrix = Array2::<f64>::zeros((n, n));
    for i in 0..n {
        for j in i..n {
            let sim = rows[i].cosine(rows[j]);
            matrix[[i, j]] = sim;
            matrix[[j, i]] = sim;
        }
    }
    matrix
}

/// Convenience wrapper around [`SimilarityLayer::content_similarity`].
pub fn content_similarity(
    candidates: &CandidateSet<'_>,
    index: &FeatureIndex,
    anchor: Option<ItemId>,
) -> Result<Vec<f64>> {
    SimilarityLayer::new(index).content_similarity(candidates, anchor)
}
