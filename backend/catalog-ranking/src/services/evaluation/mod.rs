// ============================================
// Offline Evaluation Harness
// ============================================
//
// Ground truth is the same candidate set ranked by rating and popularity
// only (similarity forced to 0). The hybrid ranking is scored against it
// with precision / recall / NDCG @k.
//
// No external relevance labels exist, so these numbers measure agreement
// with a similarity-agnostic baseline. Raising gamma tends to lower them.

pub mod metrics;

pub use metrics::{ndcg_at_k, precision_at_k, recall_at_k};

use crate::error::{CatalogError, Result};
use crate::models::{CandidateSet, Catalog, EvaluationReport, FilterCriteria, ItemId, RankingWeights};
use crate::services::features::FeatureIndex;
use crate::services::filter::FilterLayer;
use crate::services::ranking::RankingLayer;
use crate::utils::mean;
use serde::Serialize;
use tracing::{debug, info, warn};

/// Default cut-off for the unfiltered catalog evaluation
pub const GLOBAL_EVAL_K: usize = 20;
/// Default cut-off for per-scenario evaluation
pub const SCENARIO_EVAL_K: usize = 10;

pub struct Evaluator {
    ranking: RankingLayer,
    filter: FilterLayer,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl Evaluator {
    pub fn new() -> Self {
        Self {
            ranking: RankingLayer::new(),
            filter: FilterLayer::new(),
        }
    }

    pub fn evaluate(
        &self,
        candidates: &CandidateSet<'_>,
        index: &FeatureIndex,
        weights: &RankingWeights,
        k: usize,
    ) -> Result<EvaluationReport> {
        self.evaluate_with_anchor(candidates, index, weights, k, None)
    }

    pub fn evaluate_with_anchor(
        &self,
        candidates: &CandidateSet<'_>,
        index: &FeatureIndex,
        weights: &RankingWeights,
        k: usize,
        anchor: Option<ItemId>,
    ) -> Result<EvaluationReport> {
        if candidates.is_empty() {
            // Parameters are still checked so misconfiguration is not masked
            weights.validate()?;
            if k == 0 {
                return Err(CatalogError::config("k must be greater than 0"));
            }
            return Ok(EvaluationReport::empty());
        }

        let ground_truth: Vec<ItemId> = self
            .ranking
            .rank_baseline(candidates, weights, k)?
            .into_iter()
            .map(|r| r.item_id)
            .collect();

        let recommended: Vec<ItemId> = self
            .ranking
            .rank(candidates, index, weights, k, anchor)?
            .into_iter()
            .map(|r| r.item_id)
            .collect();

        let report = EvaluationReport {
            precision: precision_at_k(&recommended, &ground_truth, k),
            recall: recall_at_k(&recommended, &ground_truth, k),
            ndcg: ndcg_at_k(&recommended, &ground_truth, k),
            ground_truth,
            recommended,
        };

        debug!(
            candidates = candidates.len(),
            k = k,
            precision = report.precision,
            recall = report.recall,
            ndcg = report.ndcg,
            "Evaluation complete"
        );

        Ok(report)
    }

    /// Filter the catalog per scenario and average the metrics over the
    /// scenarios that produced candidates. Each scenario is cut off at
    /// `min(k, |candidates|)`.
    pub fn evaluate_scenarios(
        &self,
        catalog: &Catalog,
        index: &FeatureIndex,
        weights: &RankingWeights,
        scenarios: &[FilterCriteria],
        k: usize,
    ) -> Result<ScenarioSummary> {
        let mut outcomes = Vec::with_capacity(scenarios.len());

        for criteria in scenarios {
            let candidates = match self.filter.filter(catalog, criteria) {
                Ok(set) => set,
                Err(err) if err.is_missing_price() => {
                    warn!(error = %err, "Scenario skipped");
                    continue;
                }
                Err(err) => return Err(err),
            };

            if candidates.is_empty() {
                debug!(?criteria, "Scenario produced no candidates; skipped");
                continue;
            }

            let k_actual = k.min(candidates.len());
            let report = self.evaluate(&candidates, index, weights, k_actual)?;
            outcomes.push(ScenarioOutcome {
                criteria: criteria.clone(),
                candidates: candidates.len(),
                k: k_actual,
                report,
            });
        }

        let summary = ScenarioSummary::from_outcomes(outcomes);
        info!(
            scenarios = scenarios.len(),
            evaluated = summary.outcomes.len(),
            avg_precision = summary.avg_precision,
            avg_recall = summary.avg_recall,
            avg_ndcg = summary.avg_ndcg,
            "Scenario evaluation complete"
        );
        Ok(summary)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ScenarioOutcome {
    pub criteria: FilterCriteria,
    pub candidates: usize,
    pub k: usize,
    pub report: EvaluationReport,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScenarioSummary {
    pub outcomes: Vec<ScenarioOutcome>,
    pub avg_precision: f64,
    pub avg_recall: f64,
    pub avg_ndcg: f64,
}

impl ScenarioSummary {
    fn from_outcomes(outcomes: Vec<ScenarioOutcome>) -> Self {
        let precisions: Vec<f64> = outcomes.iter().map(|o| o.report.precision).collect();
        let recalls: Vec<f64> = outcomes.iter().map(|o| o.report.recall).collect();
        let ndcgs: Vec<f64> = outcomes.iter().map(|o| o.report.ndcg).collect();
        let avg_precision = mean(&precisions);
        let avg_recall = mean(&recalls);
        let avg_ndcg = mean(&ndcgs);
        Self {
            outcomes,
            avg_precision,
            avg_recall,
            avg_ndcg,
        }
    }
}

/// Representative filter combinations: fully specified, partially
/// specified and unfiltered.
pub fn default_scenarios() -> Vec<FilterCriteria> {
    vec![
        FilterCriteria::new()
            .category("blush")
            .skin_type("oily")
            .gender("female")
            .usage_frequency("weekly"),
        FilterCriteria::new()
            .category("skincare")
            .skin_type("dry")
            .gender("female")
            .usage_frequency("daily"),
        FilterCriteria::new().category("makeup"),
        FilterCriteria::new()
            .skin_type("combination")
            .gender("male")
            .usage_frequency("monthly"),
        FilterCriteria::new(),
    ]
}

/// Convenience wrapper around [`Evaluator::evaluate`].
pub fn evaluate(
    candidates: &CandidateSet<'_>,
    index: &FeatureIndex,
    weights: &RankingWeights,
    k: usize,
) -> Result<EvaluationReport> {
    Evaluator::new().evaluate(candidates, index, weights, k)
}
