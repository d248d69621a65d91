use super::{InteractionError, InteractionStore};
use crate::music::MusicStore;
use tracing::debug;

/// Logs a click on the listen link of `music_id` and hands the link back
/// for the client to open. Signed out visitors are logged without a user.
pub fn record_listen_click<S>(
    store: &S,
    user_id: Option<usize>,
    music_id: usize,
) -> Result<String, InteractionError>
where
    S: MusicStore + InteractionStore + ?Sized,
{
    let music = store
        .get_music(music_id)?
        .ok_or(InteractionError::UnknownMusic(music_id))?;
    let listen_link = music
        .listen_link
        .ok_or(InteractionError::NoListenLink(music_id))?;

    store.record_listen_click(user_id, music_id)?;
    debug!("Listen click on music {} by user {:?}", music_id, user_id);
    Ok(listen_link)
}
