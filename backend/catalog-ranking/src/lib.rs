pub mod config;
pub mod error;
pub mod jobs;
pub mod models;
pub mod services;
pub mod utils;

pub use config::Config;
pub use error::{CatalogError, DataError, Result};
pub use models::{
    CandidateSet, Catalog, CatalogItem, EvaluationReport, FilterCriteria, ItemId, PriceRange,
    RankedResult, RankingWeights,
};
pub use services::{
    build_feature_index, evaluate, filter, load_catalog, rank, tune, Evaluator, FeatureIndex,
    FilterLayer, RankingLayer, SimilarityLayer, TuningTable, WeightGrid,
};
