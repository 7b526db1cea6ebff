pub mod catalog;
pub mod evaluation;
pub mod features;
pub mod filter;
pub mod ranking;
pub mod similarity;
pub mod tuning;

pub use catalog::{load_catalog, read_catalog};
pub use evaluation::{evaluate, Evaluator, ScenarioSummary};
pub use features::{build_feature_index, FeatureIndex};
pub use filter::{filter, FilterLayer};
pub use ranking::{rank, RankingLayer};
pub use similarity::{content_similarity, SimilarityLayer};
pub use tuning::{tune, TuningTable, WeightGrid};
