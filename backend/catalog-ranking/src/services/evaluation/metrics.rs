//! Ranking quality metrics with binary relevance.

use std::collections::HashSet;
use std::hash::Hash;

/// Precision@K: hits among the first `k` recommendations, divided by the
/// number actually returned (`min(k, |recommended|)`).
pub fn precision_at_k<T: Eq + Hash>(recommended: &[T], relevant: &[T], k: usize) -> f64 {
    let returned = k.min(recommended.len());
    if relevant.is_empty() || returned == 0 {
        return 0.0;
    }
    hits(recommended, relevant, k) as f64 / returned as f64
}

/// Recall@K: hits among the first `k` recommendations over all relevant items.
pub fn recall_at_k<T: Eq + Hash>(recommended: &[T], relevant: &[T], k: usize) -> f64 {
    if relevant.is_empty() {
        return 0.0;
    }
    hits(recommended, relevant, k) as f64 / relevant.len() as f64
}

/// NDCG@K: Normalized Discounted Cumulative Gain.
pub fn ndcg_at_k<T: Eq + Hash>(recommended: &[T], relevant: &[T], k: usize) -> f64 {
    if relevant.is_empty() {
        return 0.0;
    }

    let relevant_set: HashSet<&T> = relevant.iter().collect();

    // rank is 0-indexed, hence +2
    let dcg: f64 = recommended
        .iter()
        .take(k)
        .enumerate()
        .filter(|(_, item)| relevant_set.contains(item))
        .map(|(rank, _)| 1.0 / (rank as f64 + 2.0).log2())
        .sum();

    let ideal_k = k.min(relevant.len());
    let idcg: f64 = (0..ideal_k).map(|rank| 1.0 / (rank as f64 + 2.0).log2()).sum();

    if idcg == 0.0 {
        0.0
    } else {
        dcg / idcg
    }
}

fn hits<T: Eq + Hash>(recommended: &[T], relevant: &[T], k: usize) -> usize {
    let relevant_set: HashSet<&T> = relevant.iter().collect();
    let recommended_k: HashSet<&T> = recommended.iter().take(k).collect();
    recommended_k.intersection(&relevant_set).count()
}
