use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Personalized subsets of the catalog.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    #[default]
    All,
    /// Items the user has not rated.
    #[serde(alias = "notRated")]
    NotRated,
    /// Items the user has not answered the heard-before question for.
    #[serde(alias = "notMentioned")]
    NotMentioned,
    /// Items the user said they had not heard before.
    #[serde(alias = "notHeardBefore")]
    NotHeardBefore,
}

impl View {
    pub fn requires_user(&self) -> bool {
        *self != View::All
    }
}

/// Result of a write that must not replace an existing record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    /// A record with the same (user, music) key already exists.
    Conflict,
}

/// The four per-item numbers the score is computed from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct AggregateCounts {
    pub not_heard_before_count: u64,
    pub heard_not_rated_count: u64,
    pub rating_count: u64,
    pub rating_sum_total: u64,
}

pub trait InteractionStore: Send + Sync {
    /// Mentions with `mentioned = false`.
    fn count_not_heard_before(&self, music_id: usize) -> Result<u64>;

    /// Users who said they heard the piece before but have not rated it.
    fn count_heard_not_rated(&self, music_id: usize) -> Result<u64>;

    fn count_ratings(&self, music_id: usize) -> Result<u64>;

    fn sum_ratings(&self, music_id: usize) -> Result<u64>;

    fn get_mention(&self, user_id: usize, music_id: usize) -> Result<Option<bool>>;

    /// Conditional insert, never overwrites.
    fn insert_mention(&self, user_id: usize, music_id: usize, mentioned: bool)
        -> Result<InsertOutcome>;

    fn get_rating(&self, user_id: usize, music_id: usize) -> Result<Option<u8>>;

    /// Conditional insert, never overwrites.
    fn insert_rating(&self, user_id: usize, music_id: usize, rating: u8) -> Result<InsertOutcome>;

    /// Overwrites an existing rating. Fails if there is none.
    fn update_rating(&self, user_id: usize, music_id: usize, rating: u8) -> Result<()>;

    /// Ids of the catalog entries in `view` for `user_id`, ordered by id.
    fn list_music_by_view(&self, user_id: usize, view: View) -> Result<Vec<usize>>;

    /// Appends one click on the listen link. Anonymous clicks carry no user.
    fn record_listen_click(&self, user_id: Option<usize>, music_id: usize) -> Result<()>;

    fn count_listen_clicks(&self, music_id: usize) -> Result<u64>;

    fn aggregate_counts(&self, music_id: usize) -> Result<AggregateCounts> {
        Ok(AggregateCounts {
            not_heard_before_count: self.count_not_heard_before(music_id)?,
            heard_not_rated_count: self.count_heard_not_rated(music_id)?,
            rating_count: self.count_ratings(music_id)?,
            rating_sum_total: self.sum_ratings(music_id)?,
        })
    }
}
