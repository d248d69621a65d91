//! In-memory store used by unit tests, with knobs to inject failures and races.

use crate::interaction::{AggregateCounts, InsertOutcome, InteractionStore, View};
use crate::music::{Music, MusicStore, NewMusic};
use crate::user::{AuthTokenValue, UserStore};
use anyhow::{anyhow, bail, Result};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Mutex;

#[derive(Default)]
struct State {
    music: BTreeMap<usize, Music>,
    mentions: HashMap<(usize, usize), bool>,
    ratings: HashMap<(usize, usize), u8>,
    users: HashMap<String, usize>,
    tokens: HashMap<AuthTokenValue, usize>,
    listen_clicks: Vec<(Option<usize>, usize)>,
    counts_override: HashMap<usize, AggregateCounts>,
    failing_counts: HashSet<usize>,
    pending_mention: Option<(usize, usize, bool)>,
    pending_rating: Option<(usize, usize, u8)>,
    fail_reads: bool,
    fail_writes: bool,
}

#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
}

impl InMemoryStore {
    /// Catalog with the given titles, ids starting at 1.
    pub fn with_music(titles: &[&str]) -> Self {
        let store = Self::default();
        for title in titles {
            store
                .add_music(NewMusic {
                    title: title.to_string(),
                    album: format!("{} Album", title),
                    artist: "Artist".to_string(),
                    listen_link: None,
                })
                .unwrap();
        }
        store
    }

    /// Makes the aggregate reads of `music_id` return `counts`.
    pub fn set_counts(&self, music_id: usize, counts: AggregateCounts) {
        self.state
            .lock()
            .unwrap()
            .counts_override
            .insert(music_id, counts);
    }

    pub fn fail_counts_for(&self, music_id: usize) {
        self.state.lock().unwrap().failing_counts.insert(music_id);
    }

    /// Simulates another request storing a mention right before our insert.
    pub fn land_mention_before_next_insert(&self, user_id: usize, music_id: usize, mentioned: bool) {
        self.state.lock().unwrap().pending_mention = Some((user_id, music_id, mentioned));
    }

    /// Simulates another request storing a rating right before our insert.
    pub fn land_rating_before_next_insert(&self, user_id: usize, music_id: usize, rating: u8) {
        self.state.lock().unwrap().pending_rating = Some((user_id, music_id, rating));
    }

    pub fn fail_reads(&self) {
        self.state.lock().unwrap().fail_reads = true;
    }

    pub fn fail_writes(&self) {
        self.state.lock().unwrap().fail_writes = true;
    }

    fn counts(&self, music_id: usize) -> Result<AggregateCounts> {
        let state = self.state.lock().unwrap();
        if state.fail_reads || state.failing_counts.contains(&music_id) {
            bail!("Injected read failure for music {}", music_id);
        }
        if let Some(counts) = state.counts_override.get(&music_id) {
            return Ok(*counts);
        }
        let not_heard_before_count = state
            .mentions
            .iter()
            .filter(|((_, m), mentioned)| *m == music_id && !**mentioned)
            .count() as u64;
        let heard_not_rated_count = state
            .mentions
            .iter()
            .filter(|((u, m), mentioned)| {
                *m == music_id && **mentioned && !state.ratings.contains_key(&(*u, *m))
            })
            .count() as u64;
        let ratings = state
            .ratings
            .iter()
            .filter(|((_, m), _)| *m == music_id)
            .map(|(_, r)| *r as u64)
            .collect::<Vec<_>>();
        Ok(AggregateCounts {
            not_heard_before_count,
            heard_not_rated_count,
            rating_count: ratings.len() as u64,
            rating_sum_total: ratings.iter().sum(),
        })
    }
}

impl MusicStore for InMemoryStore {
    fn list_all_music(&self) -> Result<Vec<Music>> {
        let state = self.state.lock().unwrap();
        if state.fail_reads {
            bail!("Injected read failure");
        }
        Ok(state.music.values().cloned().collect())
    }

    fn get_music(&self, music_id: usize) -> Result<Option<Music>> {
        let state = self.state.lock().unwrap();
        if state.fail_reads {
            bail!("Injected read failure");
        }
        Ok(state.music.get(&music_id).cloned())
    }

    fn get_music_by_title(&self, title: &str) -> Result<Option<Music>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .music
            .values()
            .find(|m| m.title.eq_ignore_ascii_case(title))
            .cloned())
    }

    fn music_exists(&self, title: &str, artist: &str) -> Result<bool> {
        let state = self.state.lock().unwrap();
        Ok(state.music.values().any(|m| {
            m.title.eq_ignore_ascii_case(title) && m.artist.eq_ignore_ascii_case(artist)
        }))
    }

    fn add_music(&self, music: NewMusic) -> Result<usize> {
        let mut state = self.state.lock().unwrap();
        let id = state.music.keys().last().copied().unwrap_or(0) + 1;
        state.music.insert(
            id,
            Music {
                id,
                title: music.title,
                album: music.album,
                artist: music.artist,
                listen_link: music.listen_link,
            },
        );
        Ok(id)
    }
}

impl InteractionStore for InMemoryStore {
    fn count_not_heard_before(&self, music_id: usize) -> Result<u64> {
        Ok(self.counts(music_id)?.not_heard_before_count)
    }

    fn count_heard_not_rated(&self, music_id: usize) -> Result<u64> {
        Ok(self.counts(music_id)?.heard_not_rated_count)
    }

    fn count_ratings(&self, music_id: usize) -> Result<u64> {
        Ok(self.counts(music_id)?.rating_count)
    }

    fn sum_ratings(&self, music_id: usize) -> Result<u64> {
        Ok(self.counts(music_id)?.rating_sum_total)
    }

    fn get_mention(&self, user_id: usize, music_id: usize) -> Result<Option<bool>> {
        let state = self.state.lock().unwrap();
        if state.fail_reads {
            bail!("Injected read failure");
        }
        Ok(state.mentions.get(&(user_id, music_id)).copied())
    }

    fn insert_mention(
        &self,
        user_id: usize,
        music_id: usize,
        mentioned: bool,
    ) -> Result<InsertOutcome> {
        let mut state = self.state.lock().unwrap();
        if state.fail_writes {
            return Err(anyhow!("Injected write failure"));
        }
        if let Some((u, m, value)) = state.pending_mention.take() {
            state.mentions.insert((u, m), value);
        }
        if state.mentions.contains_key(&(user_id, music_id)) {
            return Ok(InsertOutcome::Conflict);
        }
        state.mentions.insert((user_id, music_id), mentioned);
        Ok(InsertOutcome::Inserted)
    }

    fn get_rating(&self, user_id: usize, music_id: usize) -> Result<Option<u8>> {
        let state = self.state.lock().unwrap();
        if state.fail_reads {
            bail!("Injected read failure");
        }
        Ok(state.ratings.get(&(user_id, music_id)).copied())
    }

    fn insert_rating(&self, user_id: usize, music_id: usize, rating: u8) -> Result<InsertOutcome> {
        let mut state = self.state.lock().unwrap();
        if state.fail_writes {
            return Err(anyhow!("Injected write failure"));
        }
        if let Some((u, m, value)) = state.pending_rating.take() {
            state.ratings.insert((u, m), value);
        }
        if state.ratings.contains_key(&(user_id, music_id)) {
            return Ok(InsertOutcome::Conflict);
        }
        state.ratings.insert((user_id, music_id), rating);
        Ok(InsertOutcome::Inserted)
    }

    fn update_rating(&self, user_id: usize, music_id: usize, rating: u8) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.fail_writes {
            bail!("Injected write failure");
        }
        match state.ratings.get_mut(&(user_id, music_id)) {
            Some(stored) => {
                *stored = rating;
                Ok(())
            }
            None => bail!("No rating by user {} for music {}", user_id, music_id),
        }
    }

    fn list_music_by_view(&self, user_id: usize, view: View) -> Result<Vec<usize>> {
        let state = self.state.lock().unwrap();
        if state.fail_reads {
            bail!("Injected read failure");
        }
        Ok(state
            .music
            .keys()
            .copied()
            .filter(|id| match view {
                View::All => true,
                View::NotRated => !state.ratings.contains_key(&(user_id, *id)),
                View::NotMentioned => !state.mentions.contains_key(&(user_id, *id)),
                View::NotHeardBefore => state.mentions.get(&(user_id, *id)) == Some(&false),
            })
            .collect())
    }

    fn record_listen_click(&self, user_id: Option<usize>, music_id: usize) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.fail_writes {
            bail!("Injected write failure");
        }
        state.listen_clicks.push((user_id, music_id));
        Ok(())
    }

    fn count_listen_clicks(&self, music_id: usize) -> Result<u64> {
        let state = self.state.lock().unwrap();
        if state.fail_reads {
            bail!("Injected read failure");
        }
        Ok(state
            .listen_clicks
            .iter()
            .filter(|(_, m)| *m == music_id)
            .count() as u64)
    }
}

impl UserStore for InMemoryStore {
    fn create_user(&self, user_handle: &str) -> Result<usize> {
        let mut state = self.state.lock().unwrap();
        if state.users.contains_key(user_handle) {
            bail!("User {} already exists", user_handle);
        }
        let id = state.users.len() + 1;
        state.users.insert(user_handle.to_string(), id);
        Ok(id)
    }

    fn get_user_id(&self, user_handle: &str) -> Result<Option<usize>> {
        Ok(self.state.lock().unwrap().users.get(user_handle).copied())
    }

    fn add_auth_token(&self, user_id: usize, token: &AuthTokenValue) -> Result<()> {
        self.state
            .lock()
            .unwrap()
            .tokens
            .insert(token.clone(), user_id);
        Ok(())
    }

    fn get_user_id_for_token(&self, token: &AuthTokenValue) -> Result<Option<usize>> {
        Ok(self.state.lock().unwrap().tokens.get(token).copied())
    }
}
