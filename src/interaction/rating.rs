use super::{InsertOutcome, InteractionError, InteractionStore};
use crate::music::MusicStore;
use serde::Serialize;
use tracing::{debug, info};

pub const MIN_RATING: i64 = 1;
pub const MAX_RATING: i64 = 10;

/// Ratings at or above this value suggest the user shares the piece.
pub const SHARE_PROMPT_THRESHOLD: u8 = 7;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RatingState {
    Unrated,
    Rated { rating: u8 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RatingKind {
    Created,
    Edited,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct RatingOutcome {
    pub kind: RatingKind,
    pub rating: u8,
    pub should_prompt_share: bool,
}

pub fn validate_rating(rating: i64) -> Result<u8, InteractionError> {
    if (MIN_RATING..=MAX_RATING).contains(&rating) {
        Ok(rating as u8)
    } else {
        Err(InteractionError::InvalidRating(rating.to_string()))
    }
}

pub fn get_rating<S>(
    store: &S,
    user_id: usize,
    music_id: usize,
) -> Result<RatingState, InteractionError>
where
    S: InteractionStore + ?Sized,
{
    Ok(match store.get_rating(user_id, music_id)? {
        None => RatingState::Unrated,
        Some(rating) => RatingState::Rated { rating },
    })
}

/// Creates the user's rating for `music_id`, or overwrites it if one exists.
///
/// The value is validated before the store is touched. When a concurrent
/// request creates the rating between our read and our insert, the call fails
/// with [`InteractionError::RatingConflict`]; retrying will then edit.
pub fn submit_rating<S>(
    store: &S,
    user_id: usize,
    music_id: usize,
    rating: i64,
) -> Result<RatingOutcome, InteractionError>
where
    S: MusicStore + InteractionStore + ?Sized,
{
    let rating = validate_rating(rating)?;

    if store.get_music(music_id)?.is_none() {
        return Err(InteractionError::UnknownMusic(music_id));
    }

    let kind = match get_rating(store, user_id, music_id)? {
        RatingState::Unrated => match store.insert_rating(user_id, music_id, rating)? {
            InsertOutcome::Inserted => RatingKind::Created,
            InsertOutcome::Conflict => {
                debug!(
                    "Concurrent rating by user {} for music {} landed first",
                    user_id, music_id
                );
                return Err(InteractionError::RatingConflict { user_id, music_id });
            }
        },
        RatingState::Rated { .. } => {
            store.update_rating(user_id, music_id, rating)?;
            RatingKind::Edited
        }
    };

    info!(
        "User {} rated music {} with {} ({:?})",
        user_id, music_id, rating, kind
    );

    Ok(RatingOutcome {
        kind,
        rating,
        should_prompt_share: rating >= SHARE_PROMPT_THRESHOLD,
    })
}
