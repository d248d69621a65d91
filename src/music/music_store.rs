use super::models::{Music, NewMusic};
use anyhow::Result;

pub trait MusicStore: Send + Sync {
    /// All catalog entries, ordered by id.
    fn list_all_music(&self) -> Result<Vec<Music>>;

    fn get_music(&self, music_id: usize) -> Result<Option<Music>>;

    /// Case insensitive lookup by title.
    fn get_music_by_title(&self, title: &str) -> Result<Option<Music>>;

    /// Whether an entry with the same title and artist is already cataloged.
    fn music_exists(&self, title: &str, artist: &str) -> Result<bool>;

    /// Inserts an entry as given and returns its id.
    fn add_music(&self, music: NewMusic) -> Result<usize>;
}
