// ============================================
// Weight Tuning (grid search)
// ============================================
//
// Every (alpha, beta, gamma) triple of the grid is evaluated over the whole
// catalog and recorded as one row. Evaluations run on the rayon pool; rows
// come back in grid order (alphas outermost, gammas innermost).

use crate::error::{CatalogError, Result};
use crate::models::{Catalog, RankingWeights};
use crate::services::evaluation::Evaluator;
use crate::services::features::FeatureIndex;
use rayon::prelude::*;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::time::Instant;
use tracing::info;

/// Default cut-off used by the tuning job
pub const TUNING_K: usize = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct WeightGrid {
    pub alphas: Vec<f64>,
    pub betas: Vec<f64>,
    pub gammas: Vec<f64>,
}

impl Default for WeightGrid {
    fn default() -> Self {
        Self {
            alphas: vec![0.1, 0.2, 0.3, 0.4],
            betas: vec![0.1, 0.2, 0.3, 0.4],
            gammas: vec![0.4, 0.5, 0.6, 0.7],
        }
    }
}

impl WeightGrid {
    pub fn new(alphas: Vec<f64>, betas: Vec<f64>, gammas: Vec<f64>) -> Result<Self> {
        let grid = Self { alphas, betas, gammas };
        grid.validate()?;
        Ok(grid)
    }

    pub fn validate(&self) -> Result<()> {
        for (name, axis) in [("alphas", &self.alphas), ("betas", &self.betas), ("gammas", &self.gammas)] {
            if axis.is_empty() {
                return Err(CatalogError::config(format!("weight grid axis {} is empty", name)));
            }
        }
        // Per-value checks are shared with RankingWeights
        self.triples().try_for_each(|w| w.validate())
    }

    pub fn len(&self) -> usize {
        self.alphas.len() * self.betas.len() * self.gammas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cartesian product in grid order
    pub fn triples(&self) -> impl Iterator<Item = RankingWeights> + '_ {
        self.alphas.iter().flat_map(move |&alpha| {
            self.betas.iter().flat_map(move |&beta| {
                self.gammas
                    .iter()
                    .map(move |&gamma| RankingWeights { alpha, beta, gamma })
            })
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TuningRow {
    pub alpha: f64,
    pub beta: f64,
    pub gamma: f64,
    pub precision: f64,
    pub recall: f64,
    pub ndcg: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TuningTable {
    pub rows: Vec<TuningRow>,
}

impl TuningTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row with the highest NDCG; the earliest row wins ties
    pub fn best_by_ndcg(&self) -> Option<&TuningRow> {
        self.rows.iter().fold(None, |best: Option<&TuningRow>, row| match best {
            Some(b) if b.ndcg >= row.ndcg => Some(b),
            _ => Some(row),
        })
    }

    /// Write the table as CSV with header `alpha,beta,gamma,precision,recall,ndcg`.
    pub fn write_csv(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path)?;
        self.write_to(file)?;
        info!(path = %path.display(), rows = self.rows.len(), "Tuning results written");
        Ok(())
    }

    pub fn write_to<W: Write>(&self, sink: W) -> Result<()> {
        let mut writer = csv::Writer::from_writer(sink);
        for row in &self.rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
        Ok(())
    }
}

/// Grid search over ranking weights, evaluating the full catalog per triple.
pub fn tune(grid: &WeightGrid, catalog: &Catalog, index: &FeatureIndex, k: usize) -> Result<TuningTable> {
    grid.validate()?;
    if k == 0 {
        return Err(CatalogError::config("k must be greater than 0"));
    }
    index.ensure_matches(catalog)?;

    let started = Instant::now();
    let evaluator = Evaluator::new();
    let candidates = catalog.all();
    let triples: Vec<RankingWeights> = grid.triples().collect();

    // collect() on an indexed parallel iterator keeps input order
    let rows = triples
        .par_iter()
        .map(|weights| -> Result<TuningRow> {
            let report = evaluator.evaluate(&candidates, index, weights, k)?;
            Ok(TuningRow {
                alpha: weights.alpha,
                beta: weights.beta,
                gamma: weights.gamma,
                precision: report.precision,
                recall: report.recall,
                ndcg: report.ndcg,
            })
        })
        .collect::<Result<Vec<TuningRow>>>()?;

    info!(
        combinations = rows.len(),
        items = catalog.len(),
        k = k,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Weight tuning complete"
    );

    Ok(TuningTable { rows })
}
