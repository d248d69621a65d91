//! The two per-user interaction state machines feeding the ranking.
//!
//! A mention answers "had you heard this before?" and can be given once.
//! A rating is a 1-10 quality score that can be edited freely. Clicks on
//! an entry's listen link are logged alongside.

mod interaction_store;
pub mod listen;
pub mod mention;
pub mod rating;

pub use interaction_store::{AggregateCounts, InsertOutcome, InteractionStore, View};
pub use listen::record_listen_click;
pub use mention::{has_mentioned, record_mention, MentionState};
pub use rating::{get_rating, submit_rating, RatingKind, RatingOutcome, RatingState};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum InteractionError {
    #[error("User {user_id} already answered for music {music_id}")]
    AlreadyAnswered { user_id: usize, music_id: usize },

    #[error("Rating must be an integer between 1 and 10, got {0}")]
    InvalidRating(String),

    #[error("Music {0} does not exist")]
    UnknownMusic(usize),

    #[error("Music {0} has no listen link")]
    NoListenLink(usize),

    #[error("Rating by user {user_id} for music {music_id} was created concurrently")]
    RatingConflict { user_id: usize, music_id: usize },

    #[error("Store error: {0}")]
    Store(#[from] anyhow::Error),
}
