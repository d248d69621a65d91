use super::scoring::weighted_score;
use super::RankingError;
use crate::interaction::{InteractionStore, View};
use crate::music::normalize::normalize_title_query;
use crate::music::{Music, MusicStore};
use futures::future::join_all;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ScoredMusic {
    pub music: Music,
    pub weighted_score: f64,
}

/// What a list request resolves to.
#[derive(Clone, Debug, PartialEq)]
pub enum RankedList {
    Items(Vec<ScoredMusic>),
    /// Nothing survived a non-empty search query.
    NoMatch,
    /// Nothing to show and no query was given.
    Empty,
}

/// Scores every item and sorts by score, highest first.
///
/// Aggregate reads run concurrently, one blocking task per item. An item whose
/// read fails is kept with score 0. Items with equal scores keep their input
/// order.
pub async fn rank<S>(store: Arc<S>, items: Vec<Music>) -> Vec<ScoredMusic>
where
    S: InteractionStore + ?Sized + 'static,
{
    let tasks = items.iter().map(|music| {
        let store = store.clone();
        let music_id = music.id;
        tokio::task::spawn_blocking(move || store.aggregate_counts(music_id))
    });
    let results = join_all(tasks).await;

    let mut scored = items
        .into_iter()
        .zip(results)
        .map(|(music, result)| {
            let weighted_score = match result {
                Ok(Ok(counts)) => weighted_score(&counts),
                Ok(Err(err)) => {
                    warn!(
                        "Failed to fetch aggregate counts for music {}: {}",
                        music.id, err
                    );
                    0.0
                }
                Err(err) => {
                    warn!(
                        "Aggregate fetch task for music {} did not complete: {}",
                        music.id, err
                    );
                    0.0
                }
            };
            ScoredMusic {
                music,
                weighted_score,
            }
        })
        .collect::<Vec<_>>();

    sort_by_score(&mut scored);
    scored
}

/// Stable, descending.
pub fn sort_by_score(items: &mut [ScoredMusic]) {
    items.sort_by(|a, b| b.weighted_score.total_cmp(&a.weighted_score));
}

/// Narrows `items` to the user's personalized subset, keeping their order.
/// Any view other than [`View::All`] needs a user.
pub fn filter_by_view<S>(
    store: &S,
    items: Vec<ScoredMusic>,
    view: View,
    user_id: Option<usize>,
) -> Result<Vec<ScoredMusic>, RankingError>
where
    S: InteractionStore + ?Sized,
{
    if view == View::All {
        return Ok(items);
    }
    let user_id = user_id.ok_or(RankingError::AuthenticationRequired(view))?;

    let in_view: HashSet<usize> = store
        .list_music_by_view(user_id, view)?
        .into_iter()
        .collect();

    Ok(items
        .into_iter()
        .filter(|item| in_view.contains(&item.music.id))
        .collect())
}

/// Keeps items whose title starts with the title cased query, ignoring case.
/// An empty query keeps everything. Whitespace is a query like any other.
pub fn filter_by_search(items: Vec<ScoredMusic>, query: &str) -> Vec<ScoredMusic> {
    if query.is_empty() {
        return items;
    }
    let prefix = normalize_title_query(query).to_lowercase();
    items
        .into_iter()
        .filter(|item| item.music.title.to_lowercase().starts_with(&prefix))
        .collect()
}

/// Full list pass: fetch, score, sort, view filter, search filter.
pub async fn ranked_music<S>(
    store: Arc<S>,
    view: View,
    user_id: Option<usize>,
    query: &str,
) -> Result<RankedList, RankingError>
where
    S: MusicStore + InteractionStore + ?Sized + 'static,
{
    if view.requires_user() && user_id.is_none() {
        return Err(RankingError::AuthenticationRequired(view));
    }

    let start = Instant::now();
    let items = store.list_all_music()?;
    let item_count = items.len();

    let ranked = rank(store.clone(), items).await;
    let in_view = filter_by_view(store.as_ref(), ranked, view, user_id)?;
    let matching = filter_by_search(in_view, query);

    debug!(
        "Ranked {} items, {} shown for view {:?} and query '{}' in {}ms",
        item_count,
        matching.len(),
        view,
        query,
        start.elapsed().as_millis()
    );

    Ok(if !matching.is_empty() {
        RankedList::Items(matching)
    } else if query.is_empty() {
        RankedList::Empty
    } else {
        RankedList::NoMatch
    })
}
