use super::{InsertOutcome, InteractionError, InteractionStore};
use crate::music::MusicStore;
use serde::Serialize;
use tracing::{debug, info};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum MentionState {
    Unanswered,
    Answered { mentioned: bool },
}

pub fn has_mentioned<S>(
    store: &S,
    user_id: usize,
    music_id: usize,
) -> Result<MentionState, InteractionError>
where
    S: InteractionStore + ?Sized,
{
    Ok(match store.get_mention(user_id, music_id)? {
        None => MentionState::Unanswered,
        Some(mentioned) => MentionState::Answered { mentioned },
    })
}

/// Stores the user's one and only answer for `music_id`.
///
/// A second answer fails with [`InteractionError::AlreadyAnswered`] and leaves
/// the first one in place, including when both answers race each other.
pub fn record_mention<S>(
    store: &S,
    user_id: usize,
    music_id: usize,
    mentioned: bool,
) -> Result<(), InteractionError>
where
    S: MusicStore + InteractionStore + ?Sized,
{
    if store.get_music(music_id)?.is_none() {
        return Err(InteractionError::UnknownMusic(music_id));
    }

    if let MentionState::Answered { .. } = has_mentioned(store, user_id, music_id)? {
        debug!(
            "User {} tried to answer again for music {}",
            user_id, music_id
        );
        return Err(InteractionError::AlreadyAnswered { user_id, music_id });
    }

    match store.insert_mention(user_id, music_id, mentioned)? {
        InsertOutcome::Inserted => {
            info!(
                "User {} answered mentioned={} for music {}",
                user_id, mentioned, music_id
            );
            Ok(())
        }
        InsertOutcome::Conflict => {
            debug!(
                "Concurrent answer by user {} for music {} landed first",
                user_id, music_id
            );
            Err(InteractionError::AlreadyAnswered { user_id, music_id })
        }
    }
}
