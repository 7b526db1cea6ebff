use anyhow::{bail, Context};
use catalog_ranking::{
    build_feature_index,
    jobs::{run_offline_eval_job, run_tuning_job, OfflineEvalConfig, TuningBatchConfig},
    load_catalog, Config,
};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Evaluate,
    Tune,
    All,
}

impl Mode {
    fn parse(raw: &str) -> anyhow::Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "evaluate" | "eval" => Ok(Mode::Evaluate),
            "tune" | "tuning" => Ok(Mode::Tune),
            "all" => Ok(Mode::All),
            other => bail!("unknown mode '{}'; expected evaluate, tune or all", other),
        }
    }

    fn from_args() -> anyhow::Result<Self> {
        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            if let Some(value) = arg.strip_prefix("--mode=") {
                return Self::parse(value);
            }
            if arg == "--mode" {
                let value = args.next().context("--mode requires a value")?;
                return Self::parse(&value);
            }
        }
        Ok(Mode::All)
    }
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let mode = Mode::from_args()?;
    let config = Config::from_env().context("Failed to load config")?;

    info!(?mode, catalog = %config.catalog.path, "Starting catalog-ranking");

    let catalog = load_catalog(&config.catalog.path)
        .with_context(|| format!("Failed to load catalog from {}", config.catalog.path))?;

    // Built once, shared read-only by every job
    let index = build_feature_index(&catalog).context("Failed to build feature index")?;
    info!(rows = index.len(), dimensions = index.dimensions(), "Feature index ready");

    if matches!(mode, Mode::Evaluate | Mode::All) {
        let eval_config = OfflineEvalConfig::from_config(&config)?;
        run_offline_eval_job(&eval_config, &catalog, &index)?;
    }

    if matches!(mode, Mode::Tune | Mode::All) {
        let tuning_config = TuningBatchConfig::from_config(&config)?;
        let table = run_tuning_job(&tuning_config, &catalog, &index)?;
        info!(rows = table.len(), "Tuning job finished");
    }

    Ok(())
}
