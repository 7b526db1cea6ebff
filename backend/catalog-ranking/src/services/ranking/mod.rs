/// Ranking Module
///
/// Scores a candidate set with a linear blend of three normalized signals.
///
/// # Signals
/// - **Rating**: `rating / 5`, passed through unclamped
/// - **Popularity**: reviews divided by the candidate set's maximum (0 when that is 0)
/// - **Similarity**: anchor or mean content similarity within the set
///
/// # Ordering
/// Descending weighted score; equal scores keep catalog order so results are
/// reproducible.
pub mod simple;

pub use simple::{rank, RankingLayer};
