// ============================================
// Offline Jobs
// ============================================
//
// Batch runners driven by the binary:
// 1. Offline evaluation (global + per-scenario metrics)
// 2. Weight tuning (grid search persisted as CSV)
//
// Usage:
//   catalog-ranking --mode evaluate | tune | all

pub mod offline_eval;
pub mod tuning_batch;

pub use offline_eval::{run_offline_eval_job, OfflineEvalConfig, OfflineEvalReport};
pub use tuning_batch::{run_tuning_job, TuningBatchConfig};
