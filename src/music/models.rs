use serde::{Deserialize, Serialize};

/// A moderated catalog entry. Immutable once stored.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Music {
    pub id: usize,
    pub title: String,
    pub album: String,
    pub artist: String,
    pub listen_link: Option<String>,
}

/// Fields of a submission that passed moderation, before it gets an id.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct NewMusic {
    pub title: String,
    pub album: String,
    pub artist: String,
    #[serde(default)]
    pub listen_link: Option<String>,
}
