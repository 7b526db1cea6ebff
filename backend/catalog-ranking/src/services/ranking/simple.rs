use crate::error::{CatalogError, Result};
use crate::models::{CandidateSet, ItemId, RankedResult, RankingWeights};
use crate::services::features::FeatureIndex;
use crate::services::similarity::SimilarityLayer;
use crate::utils::ratio_or_zero;
use tracing::debug;

/// Upper bound of the rating scale used for normalization
const MAX_RATING: f64 = 5.0;

/// Ranking Layer - weighted blend of rating, popularity and similarity
///
/// Stateless; the feature index is borrowed per call and never mutated.
pub struct RankingLayer;

impl Default for RankingLayer {
    fn default() -> Self {
        Self::new()
    }
}

impl RankingLayer {
    pub fn new() -> Self {
        Self
    }

    /// Top-k candidates by weighted score
    pub fn rank(
        &self,
        candidates: &CandidateSet<'_>,
        index: &FeatureIndex,
        weights: &RankingWeights,
        k: usize,
        anchor: Option<ItemId>,
    ) -> Result<Vec<RankedResult>> {
        validate(weights, k)?;
        if candidates.is_empty() {
            return Ok(Vec::new());
        }
        index.ensure_matches(candidates.catalog())?;

        let similarity = SimilarityLayer::new(index).content_similarity(candidates, anchor)?;
        Ok(self.score_and_sort(candidates, &similarity, weights, k))
    }

    /// Same ranking with the similarity contribution forced to 0.
    ///
    /// Similarity is never computed here; `similarity_norm` is reported as 0.0.
    pub fn rank_baseline(
        &self,
        candidates: &CandidateSet<'_>,
        weights: &RankingWeights,
        k: usize,
    ) -> Result<Vec<RankedResult>> {
        validate(weights, k)?;
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let similarity = vec![0.0; candidates.len()];
        Ok(self.score_and_sort(candidates, &similarity, &weights.without_similarity(), k))
    }

    fn score_and_sort(
        &self,
        candidates: &CandidateSet<'_>,
        similarity: &[f64],
        weights: &RankingWeights,
        k: usize,
    ) -> Vec<RankedResult> {
        let max_reviews = candidates
            .iter()
            .map(|(_, item)| item.number_of_reviews)
            .max()
            .unwrap_or(0);

        let mut ranked: Vec<RankedResult> = candidates
            .iter()
            .zip(similarity.iter())
            .map(|((item_id, item), &similarity_norm)| {
                let rating_norm = item.rating / MAX_RATING;
                let popularity_norm = ratio_or_zero(item.number_of_reviews as f64, max_reviews as f64);
                let weighted_score = weights.alpha * rating_norm
                    + weights.beta * popularity_norm
                    + weights.gamma * similarity_norm;

                RankedResult {
                    item_id,
                    rating_norm,
                    popularity_norm,
                    similarity_norm,
                    weighted_score,
                }
            })
            .collect();

        // Descending score under IEEE total order; ties fall back to catalog order
        ranked.sort_by(|a, b| {
            b.weighted_score
                .total_cmp(&a.weighted_score)
                .then_with(|| a.item_id.cmp(&b.item_id))
        });
        ranked.truncate(k);

        debug!(
            candidates = candidates.len(),
            returned = ranked.len(),
            top_score = ranked.first().map(|r| r.weighted_score),
            "Ranking complete"
        );

        ranked
    }
}

fn validate(weights: &RankingWeights, k: usize) -> Result<()> {
    weights.validate()?;
    if k == 0 {
        return Err(CatalogError::config("k must be greater than 0"));
    }
    Ok(())
}

/// Convenience wrapper around [`RankingLayer::rank`].
pub fn rank(
    candidates: &CandidateSet<'_>,
    index: &FeatureIndex,
    weights: &RankingWeights,
    k: usize,
    anchor: Option<ItemId>,
) -> Result<Vec<RankedResult>> {
    RankingLayer::new().rank(candidates, index, weights, k, anchor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DataError;
    use crate::models::{Catalog, CatalogItem};
    use crate::services::features::build_feature_index;
    use std::collections::HashSet;

    fn product(rating: f64, reviews: u64, text: &str) -> CatalogItem {
        CatalogItem {
            rating,
            number_of_reviews: reviews,
            combined_features: text.to_string(),
            ..Default::default()
        }
    }

    fn three_item_catalog() -> Catalog {
        Catalog::new(vec![
            product(5.0, 100, "cleanser oily daily salicylic"),
            product(3.0, 50, "cleanser oily daily salicylic"),
            product(1.0, 0, "cleanser oily daily salicylic"),
        ])
    }

    #[test]
    fn test_rating_only_scenario() {
        let catalog = three_item_catalog();
        let index = build_feature_index(&catalog).unwrap();
        let weights = RankingWeights::new(1.0, 0.0, 0.0).unwrap();

        let ranked = rank(&catalog.all(), &index, &weights, 3, None).unwrap();

        let order: Vec<ItemId> = ranked.iter().map(|r| r.item_id).collect();
        assert_eq!(order, vec![ItemId(0), ItemId(1), ItemId(2)]);
        let expected = [1.0, 0.6, 0.2];
        for (result, want) in ranked.iter().zip(expected) {
            assert!((result.weighted_score - want).abs() < 1e-9);
        }
    }

    #[test]
    fn test_popularity_normalized_by_candidate_max() {
        let catalog = three_item_catalog();
        let index = build_feature_index(&catalog).unwrap();
        let weights = RankingWeights::new(0.0, 1.0, 0.0).unwrap();

        let ranked = rank(&catalog.all(), &index, &weights, 3, None).unwrap();
        assert!((ranked[0].popularity_norm - 1.0).abs() < 1e-9);
        assert!((ranked[1].popularity_norm - 0.5).abs() < 1e-9);
        assert_eq!(ranked[2].popularity_norm, 0.0);
    }

    #[test]
    fn test_zero_reviews_everywhere() {
        let catalog = Catalog::new(vec![product(4.0, 0, "toner"), product(2.0, 0, "serum")]);
        let index = build_feature_index(&catalog).unwrap();

        let ranked = rank(&catalog.all(), &index, &RankingWeights::default(), 2, None).unwrap();
        assert!(ranked.iter().all(|r| r.popularity_norm == 0.0));
    }

    #[test]
    fn test_zero_weights_keep_catalog_order() {
        let catalog = Catalog::new(vec![
            product(1.0, 5, "mask clay"),
            product(5.0, 500, "serum vitamin"),
            product(3.0, 50, "toner rose"),
        ]);
        let index = build_feature_index(&catalog).unwrap();
        let weights = RankingWeights::new(0.0, 0.0, 0.0).unwrap();

        let ranked = rank(&catalog.all(), &index, &weights, 10, None).unwrap();
        assert!(ranked.iter().all(|r| r.weighted_score == 0.0));
        let order: Vec<ItemId> = ranked.iter().map(|r| r.item_id).collect();
        assert_eq!(order, vec![ItemId(0), ItemId(1), ItemId(2)]);
    }

    #[test]
    fn test_large_k_returns_every_candidate_once() {
        let catalog = three_item_catalog();
        let index = build_feature_index(&catalog).unwrap();

        let ranked = rank(&catalog.all(), &index, &RankingWeights::default(), 50, None).unwrap();
        assert_eq!(ranked.len(), 3);
        let unique: HashSet<ItemId> = ranked.iter().map(|r| r.item_id).collect();
        assert_eq!(unique.len(), 3);
    }

    #[test]
    fn test_rank_is_idempotent() {
        let catalog = Catalog::new(vec![
            product(4.1, 12, "serum niacinamide daily"),
            product(4.1, 12, "serum retinol night"),
            product(3.9, 80, "toner rose daily"),
            product(4.8, 3, "mask clay weekly"),
        ]);
        let index = build_feature_index(&catalog).unwrap();
        let set = catalog.all();

        let first = rank(&set, &index, &RankingWeights::default(), 3, None).unwrap();
        let second = rank(&set, &index, &RankingWeights::default(), 3, None).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_anchor_boosts_similar_items() {
        let catalog = Catalog::new(vec![
            product(4.0, 10, "retinol serum night"),
            product(4.0, 10, "clay mask weekly"),
            product(4.0, 10, "retinol serum night"),
        ]);
        let index = build_feature_index(&catalog).unwrap();
        let weights = RankingWeights::new(0.0, 0.0, 1.0).unwrap();

        let ranked = rank(&catalog.all(), &index, &weights, 3, Some(ItemId(2))).unwrap();
        let order: Vec<ItemId> = ranked.iter().map(|r| r.item_id).collect();
        assert_eq!(order, vec![ItemId(0), ItemId(2), ItemId(1)]);
    }

    #[test]
    fn test_invalid_parameters() {
        let catalog = three_item_catalog();
        let index = build_feature_index(&catalog).unwrap();
        let weights = RankingWeights {
            alpha: -1.0,
            beta: 0.0,
            gamma: 0.0,
        };

        assert!(matches!(
            rank(&catalog.all(), &index, &weights, 3, None),
            Err(CatalogError::Config(_))
        ));
        assert!(matches!(
            rank(&catalog.all(), &index, &RankingWeights::default(), 0, None),
            Err(CatalogError::Config(_))
        ));
    }

    #[test]
    fn test_stale_index_rejected() {
        let catalog = three_item_catalog();
        let other = Catalog::new(vec![product(1.0, 1, "toner")]);
        let stale = build_feature_index(&other).unwrap();

        let result = rank(&catalog.all(), &stale, &RankingWeights::default(), 3, None);
        assert!(matches!(
            result,
            Err(CatalogError::Data(DataError::StaleIndex { rows: 1, items: 3 }))
        ));
    }

    #[test]
    fn test_baseline_ignores_similarity() {
        let catalog = three_item_catalog();
        let weights = RankingWeights::new(0.4, 0.2, 0.9).unwrap();

        let ranked = RankingLayer::new()
            .rank_baseline(&catalog.all(), &weights, 2)
            .unwrap();
        assert_eq!(ranked.len(), 2);
        assert!(ranked.iter().all(|r| r.similarity_norm == 0.0));
        // 0.4 * 1.0 + 0.2 * 1.0
        assert!((ranked[0].weighted_score - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_ratings_are_not_clamped() {
        let catalog = Catalog::new(vec![product(7.5, 1, "toner"), product(-1.0, 1, "serum")]);
        let index = build_feature_index(&catalog).unwrap();
        let weights = RankingWeights::new(1.0, 0.0, 0.0).unwrap();

        let ranked = rank(&catalog.all(), &index, &weights, 2, None).unwrap();
        assert!((ranked[0].rating_norm - 1.5).abs() < 1e-9);
        assert!((ranked[1].rating_norm + 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_nan_scores_keep_a_total_order() {
        let items: Vec<CatalogItem> = (0..32)
            .map(|i| {
                let rating = if i % 5 == 0 { f64::NAN } else { (i % 7) as f64 };
                product(rating, (i * 3) as u64, "serum")
            })
            .collect();
        let catalog = Catalog::new(items);
        let index = build_feature_index(&catalog).unwrap();
        let weights = RankingWeights::new(0.5, 0.5, 0.0).unwrap();

        let first = rank(&catalog.all(), &index, &weights, 32, None).unwrap();
        let second = rank(&catalog.all(), &index, &weights, 32, None).unwrap();
        assert_eq!(first.len(), 32);

        let order: Vec<ItemId> = first.iter().map(|r| r.item_id).collect();
        let again: Vec<ItemId> = second.iter().map(|r| r.item_id).collect();
        assert_eq!(order, again);
        assert_eq!(order.iter().collect::<HashSet<_>>().len(), 32);

        // Finite scores stay in descending order among themselves
        let finite: Vec<f64> = first
            .iter()
            .map(|r| r.weighted_score)
            .filter(|s| s.is_finite())
            .collect();
        assert!(finite.windows(2).all(|w| w[0] >= w[1]));
    }
}
