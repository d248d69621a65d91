use super::session::Session;
use super::state::{GuardedStore, ServerState};
use crate::interaction::{self, InteractionError, View};
use crate::music::normalize::slug_to_title;
use crate::music::share::SharePayload;
use crate::ranking::{self, RankedList, RankingError, ScoredMusic};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::error;

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
struct ListMusicQuery {
    view: View,
    q: String,
}

#[derive(Serialize)]
#[serde(rename_all = "snake_case")]
enum ListOutcome {
    Items,
    NoMatch,
    Empty,
}

#[derive(Serialize)]
struct ListMusicResponse {
    outcome: ListOutcome,
    items: Vec<ScoredMusic>,
}

impl From<RankedList> for ListMusicResponse {
    fn from(list: RankedList) -> Self {
        match list {
            RankedList::Items(items) => ListMusicResponse {
                outcome: ListOutcome::Items,
                items,
            },
            RankedList::NoMatch => ListMusicResponse {
                outcome: ListOutcome::NoMatch,
                items: vec![],
            },
            RankedList::Empty => ListMusicResponse {
                outcome: ListOutcome::Empty,
                items: vec![],
            },
        }
    }
}

#[derive(Serialize)]
struct MusicScoreResponse {
    music_id: usize,
    #[serde(flatten)]
    counts: interaction::AggregateCounts,
    weighted_score: f64,
    listen_click_count: u64,
}

#[derive(Serialize)]
struct ListenResponse {
    listen_link: String,
}

#[derive(Deserialize, Debug)]
struct MentionBody {
    pub mentioned: bool,
}

#[derive(Deserialize, Debug)]
struct RatingBody {
    pub rating: serde_json::Number,
}

fn internal_error(context: &str, err: impl std::fmt::Display) -> Response {
    error!("{}: {}", context, err);
    (StatusCode::INTERNAL_SERVER_ERROR, format!("{}", err)).into_response()
}

fn interaction_error_response(err: InteractionError) -> Response {
    let status = match &err {
        InteractionError::AlreadyAnswered { .. } | InteractionError::RatingConflict { .. } => {
            StatusCode::CONFLICT
        }
        InteractionError::InvalidRating(_) => StatusCode::BAD_REQUEST,
        InteractionError::NoListenLink(_) => StatusCode::UNPROCESSABLE_ENTITY,
        InteractionError::UnknownMusic(_) => StatusCode::NOT_FOUND,
        InteractionError::Store(e) => return internal_error("Interaction store failure", e),
    };
    (status, err.to_string()).into_response()
}

/// JSON numbers that are whole values count as integers, `7.0` included.
fn rating_as_integer(number: &serde_json::Number) -> Option<i64> {
    number.as_i64().or_else(|| {
        number
            .as_f64()
            .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
            .map(|f| f as i64)
    })
}

/// Per-user reads answer 404 for unknown music, the same way writes do.
fn ensure_music_exists(store: &GuardedStore, id: usize) -> Result<(), Response> {
    match store.get_music(id) {
        Ok(Some(_)) => Ok(()),
        Ok(None) => Err(StatusCode::NOT_FOUND.into_response()),
        Err(err) => Err(internal_error("Failed to get music", err)),
    }
}

async fn list_music(
    session: Option<Session>,
    State(store): State<GuardedStore>,
    Query(query): Query<ListMusicQuery>,
) -> Response {
    let user_id = session.map(|s| s.user_id);
    match ranking::ranked_music(store, query.view, user_id, &query.q).await {
        Ok(list) => Json(ListMusicResponse::from(list)).into_response(),
        Err(err @ RankingError::AuthenticationRequired(_)) => {
            (StatusCode::FORBIDDEN, err.to_string()).into_response()
        }
        Err(RankingError::Store(err)) => internal_error("Failed to rank music", err),
    }
}

async fn get_music(State(store): State<GuardedStore>, Path(id): Path<usize>) -> Response {
    match store.get_music(id) {
        Ok(Some(music)) => Json(music).into_response(),
        Ok(None) => StatusCode::NOT_FOUND.into_response(),
        Err(err) => internal_error("Failed to get music", err),
    }
}

async fn get_music_by_slug(
    State(store): State<GuardedStore>,
    Path(slug): Path<String>,
) -> Response {
    match store.get_music_by_title(&slug_to_title(&slug)) {
        Ok(Some(music)) => Json(music).into_response(),
        Ok(None) => StatusCode::NOT_FOUND.into_response(),
        Err(err) => internal_error("Failed to get music by slug", err),
    }
}

async fn get_music_score(State(store): State<GuardedStore>, Path(id): Path<usize>) -> Response {
    if let Err(response) = ensure_music_exists(&store, id) {
        return response;
    }
    let counts = match store.aggregate_counts(id) {
        Ok(counts) => counts,
        Err(err) => return internal_error("Failed to fetch aggregate counts", err),
    };
    match store.count_listen_clicks(id) {
        Ok(listen_click_count) => Json(MusicScoreResponse {
            music_id: id,
            counts,
            weighted_score: ranking::weighted_score(&counts),
            listen_click_count,
        })
        .into_response(),
        Err(err) => internal_error("Failed to count listen clicks", err),
    }
}

async fn get_music_share(State(state): State<ServerState>, Path(id): Path<usize>) -> Response {
    match state.store.get_music(id) {
        Ok(Some(music)) => {
            Json(SharePayload::for_music(&music, &state.config.share_base_url)).into_response()
        }
        Ok(None) => StatusCode::NOT_FOUND.into_response(),
        Err(err) => internal_error("Failed to get music", err),
    }
}

async fn get_mention(
    session: Session,
    State(store): State<GuardedStore>,
    Path(id): Path<usize>,
) -> Response {
    if let Err(response) = ensure_music_exists(&store, id) {
        return response;
    }
    match interaction::has_mentioned(store.as_ref(), session.user_id, id) {
        Ok(state) => Json(state).into_response(),
        Err(err) => interaction_error_response(err),
    }
}

async fn post_mention(
    session: Session,
    State(store): State<GuardedStore>,
    Path(id): Path<usize>,
    Json(body): Json<MentionBody>,
) -> Response {
    match interaction::record_mention(store.as_ref(), session.user_id, id, body.mentioned) {
        Ok(()) => StatusCode::CREATED.into_response(),
        Err(err) => interaction_error_response(err),
    }
}

async fn get_rating(
    session: Session,
    State(store): State<GuardedStore>,
    Path(id): Path<usize>,
) -> Response {
    if let Err(response) = ensure_music_exists(&store, id) {
        return response;
    }
    match interaction::get_rating(store.as_ref(), session.user_id, id) {
        Ok(state) => Json(state).into_response(),
        Err(err) => interaction_error_response(err),
    }
}

async fn post_rating(
    session: Session,
    State(store): State<GuardedStore>,
    Path(id): Path<usize>,
    Json(body): Json<RatingBody>,
) -> Response {
    let Some(rating) = rating_as_integer(&body.rating) else {
        return interaction_error_response(InteractionError::InvalidRating(
            body.rating.to_string(),
        ));
    };
    match interaction::submit_rating(store.as_ref(), session.user_id, id, rating) {
        Ok(outcome) => {
            let status = match outcome.kind {
                interaction::RatingKind::Created => StatusCode::CREATED,
                interaction::RatingKind::Edited => StatusCode::OK,
            };
            (status, Json(outcome)).into_response()
        }
        Err(err) => interaction_error_response(err),
    }
}

async fn post_listen(
    session: Option<Session>,
    State(store): State<GuardedStore>,
    Path(id): Path<usize>,
) -> Response {
    let user_id = session.map(|s| s.user_id);
    match interaction::record_listen_click(store.as_ref(), user_id, id) {
        Ok(listen_link) => {
            (StatusCode::CREATED, Json(ListenResponse { listen_link })).into_response()
        }
        Err(err) => interaction_error_response(err),
    }
}

pub fn make_music_routes(state: ServerState) -> Router {
    Router::new()
        .route("/", get(list_music))
        .route("/by-slug/{slug}", get(get_music_by_slug))
        .route("/{id}", get(get_music))
        .route("/{id}/score", get(get_music_score))
        .route("/{id}/share", get(get_music_share))
        .route("/{id}/mention", get(get_mention).post(post_mention))
        .route("/{id}/rating", get(get_rating).post(post_rating))
        .route("/{id}/listen", post(post_listen))
        .with_state(state)
}
