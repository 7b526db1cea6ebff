use crate::error::{CatalogError, Result};
use crate::models::RankingWeights;
use crate::services::evaluation::{GLOBAL_EVAL_K, SCENARIO_EVAL_K};
use crate::services::tuning::{WeightGrid, TUNING_K};
use crate::utils::parse_f64_list;
use serde::Deserialize;
use std::env;
use std::str::FromStr;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub catalog: CatalogConfig,
    pub ranking: RankingConfig,
    pub tuning: TuningConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    pub path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RankingConfig {
    pub alpha: f64,
    pub beta: f64,
    pub gamma: f64,
    pub global_k: usize,
    pub scenario_k: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TuningConfig {
    pub output_path: String,
    pub k: usize,
    pub alphas: Vec<f64>,
    pub betas: Vec<f64>,
    pub gammas: Vec<f64>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let grid = WeightGrid::default();
        let weights = RankingWeights::default();

        let config = Config {
            catalog: CatalogConfig {
                path: env::var("CATALOG_PATH")
                    .unwrap_or_else(|_| "data/catalog_normalized.csv".to_string()),
            },
            ranking: RankingConfig {
                alpha: var_or("RANKING_ALPHA", weights.alpha)?,
                beta: var_or("RANKING_BETA", weights.beta)?,
                gamma: var_or("RANKING_GAMMA", weights.gamma)?,
                global_k: var_or("EVAL_GLOBAL_K", GLOBAL_EVAL_K)?,
                scenario_k: var_or("EVAL_SCENARIO_K", SCENARIO_EVAL_K)?,
            },
            tuning: TuningConfig {
                output_path: env::var("TUNING_OUTPUT_PATH")
                    .unwrap_or_else(|_| "tuning_results.csv".to_string()),
                k: var_or("TUNING_K", TUNING_K)?,
                alphas: list_or("TUNING_ALPHAS", grid.alphas)?,
                betas: list_or("TUNING_BETAS", grid.betas)?,
                gammas: list_or("TUNING_GAMMAS", grid.gammas)?,
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Reject values the pipeline would refuse later anyway
    pub fn validate(&self) -> Result<()> {
        self.weights()?;
        self.grid()?;
        for (name, k) in [
            ("EVAL_GLOBAL_K", self.ranking.global_k),
            ("EVAL_SCENARIO_K", self.ranking.scenario_k),
            ("TUNING_K", self.tuning.k),
        ] {
            if k == 0 {
                return Err(CatalogError::config(format!("{} must be greater than 0", name)));
            }
        }
        Ok(())
    }

    pub fn weights(&self) -> Result<RankingWeights> {
        RankingWeights::new(self.ranking.alpha, self.ranking.beta, self.ranking.gamma)
    }

    pub fn grid(&self) -> Result<WeightGrid> {
        WeightGrid::new(
            self.tuning.alphas.clone(),
            self.tuning.betas.clone(),
            self.tuning.gammas.clone(),
        )
    }
}

fn var_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| CatalogError::config(format!("{} must be a valid number: {}", key, e))),
        Err(_) => Ok(default),
    }
}

fn list_or(key: &str, default: Vec<f64>) -> Result<Vec<f64>> {
    match env::var(key) {
        Ok(raw) => parse_f64_list(&raw)
            .map_err(|e| CatalogError::config(format!("{} must be a comma separated list: {}", key, e))),
        Err(_) => Ok(default),
    }
}
