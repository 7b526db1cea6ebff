// ============================================
// Offline Evaluation Job
// ============================================
//
// Workflow:
// 1. Evaluate the unfiltered catalog at the global cut-off
// 2. Evaluate each representative filter scenario at the scenario cut-off
// 3. Log one JSON summary line

use crate::config::Config;
use crate::error::Result;
use crate::models::{Catalog, EvaluationReport, FilterCriteria, RankingWeights};
use crate::services::evaluation::{default_scenarios, Evaluator, ScenarioSummary};
use crate::services::features::FeatureIndex;
use serde::Serialize;
use std::time::Instant;
use tracing::info;

#[derive(Debug, Clone)]
pub struct OfflineEvalConfig {
    pub weights: RankingWeights,
    pub global_k: usize,
    pub scenario_k: usize,
    pub scenarios: Vec<FilterCriteria>,
}

impl OfflineEvalConfig {
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            weights: config.weights()?,
            global_k: config.ranking.global_k,
            scenario_k: config.ranking.scenario_k,
            scenarios: default_scenarios(),
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OfflineEvalReport {
    pub weights: RankingWeights,
    pub global_k: usize,
    pub global: EvaluationReport,
    pub scenarios: ScenarioSummary,
    pub duration_ms: u64,
}

pub fn run_offline_eval_job(
    config: &OfflineEvalConfig,
    catalog: &Catalog,
    index: &FeatureIndex,
) -> Result<OfflineEvalReport> {
    let started = Instant::now();
    let evaluator = Evaluator::new();

    info!(
        items = catalog.len(),
        alpha = config.weights.alpha,
        beta = config.weights.beta,
        gamma = config.weights.gamma,
        "Starting offline evaluation"
    );

    let global_k = config.global_k.min(catalog.len()).max(1);
    let global = evaluator.evaluate(&catalog.all(), index, &config.weights, global_k)?;
    let scenarios = evaluator.evaluate_scenarios(
        catalog,
        index,
        &config.weights,
        &config.scenarios,
        config.scenario_k,
    )?;

    let report = OfflineEvalReport {
        weights: config.weights,
        global_k,
        global,
        scenarios,
        duration_ms: started.elapsed().as_millis() as u64,
    };

    let summary = serde_json::json!({
        "global": {
            "k": report.global_k,
            "precision": report.global.precision,
            "recall": report.global.recall,
            "ndcg": report.global.ndcg,
        },
        "scenarios": {
            "evaluated": report.scenarios.outcomes.len(),
            "avg_precision": report.scenarios.avg_precision,
            "avg_recall": report.scenarios.avg_recall,
            "avg_ndcg": report.scenarios.avg_ndcg,
        },
    });
    info!(summary = %summary, duration_ms = report.duration_ms, "Offline evaluation completed");

    Ok(report)
}
