mod models;
mod music_store;
pub mod normalize;
pub mod share;

pub use models::{Music, NewMusic};
pub use music_store::MusicStore;
pub use normalize::MusicValidationError;

use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum AddMusicError {
    #[error("Invalid submission: {0}")]
    Invalid(#[from] MusicValidationError),

    #[error("'{title}' by {artist} is already in the catalog")]
    AlreadyExists { title: String, artist: String },

    #[error("Store error: {0}")]
    Store(#[from] anyhow::Error),
}

/// Validates and canonicalizes a moderated submission, then stores it.
/// Fails if the same title and artist are already cataloged.
pub fn add_moderated_music(
    store: &dyn MusicStore,
    submission: NewMusic,
) -> Result<usize, AddMusicError> {
    normalize::validate_music_fields(&submission.title, &submission.album, &submission.artist)?;

    let music = NewMusic {
        title: normalize::normalize_title(&submission.title),
        album: normalize::normalize_field(&submission.album),
        artist: normalize::normalize_field(&submission.artist),
        listen_link: submission
            .listen_link
            .map(|link| link.trim().to_string())
            .filter(|link| !link.is_empty()),
    };

    if store.music_exists(&music.title, &music.artist)? {
        return Err(AddMusicError::AlreadyExists {
            title: music.title,
            artist: music.artist,
        });
    }

    let title = music.title.clone();
    let id = store.add_music(music)?;
    info!("Added music {} '{}' to the catalog", id, title);
    Ok(id)
}
