//! Turns per-item engagement into the ordered, filtered music list.

mod pipeline;
pub mod scoring;

pub use pipeline::{
    filter_by_search, filter_by_view, rank, ranked_music, sort_by_score, RankedList, ScoredMusic,
};
pub use scoring::weighted_score;

use crate::interaction::View;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RankingError {
    #[error("View {0:?} requires an authenticated user")]
    AuthenticationRequired(View),

    #[error("Store error: {0}")]
    Store(#[from] anyhow::Error),
}
