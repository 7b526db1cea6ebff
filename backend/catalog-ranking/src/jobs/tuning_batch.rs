// ============================================
// Weight Tuning Job
// ============================================
//
// Runs the grid search over the whole catalog and persists the table.
// The CSV is an output artifact only; nothing reads it back.

use crate::config::Config;
use crate::error::Result;
use crate::models::Catalog;
use crate::services::features::FeatureIndex;
use crate::services::tuning::{tune, TuningTable, WeightGrid};
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Clone)]
pub struct TuningBatchConfig {
    pub grid: WeightGrid,
    pub k: usize,
    pub output_path: PathBuf,
}

impl TuningBatchConfig {
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            grid: config.grid()?,
            k: config.tuning.k,
            output_path: PathBuf::from(&config.tuning.output_path),
        })
    }
}

pub fn run_tuning_job(config: &TuningBatchConfig, catalog: &Catalog, index: &FeatureIndex) -> Result<TuningTable> {
    info!(
        combinations = config.grid.len(),
        k = config.k,
        output = %config.output_path.display(),
        "Starting weight tuning"
    );

    let table = tune(&config.grid, catalog, index, config.k)?;
    table.write_csv(&config.output_path)?;

    if let Some(best) = table.best_by_ndcg() {
        info!(
            alpha = best.alpha,
            beta = best.beta,
            gamma = best.gamma,
            ndcg = best.ndcg,
            "Best weights by NDCG"
        );
    }

    Ok(table)
}
