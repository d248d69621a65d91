use anyhow::{Context, Result};
use std::time::Duration;

use axum::{extract::State, middleware, response::IntoResponse, routing::get, Json, Router};
use serde::Serialize;
use tower_http::services::ServeDir;
use tracing::info;

use super::music_routes::make_music_routes;
use super::session::Session;
use super::state::{GuardedStore, ServerState};
use super::{log_requests, ServerConfig};

#[derive(Serialize)]
struct ServerStats {
    pub uptime: String,
    pub hash: String,
    pub user_id: Option<usize>,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

async fn home(session: Option<Session>, State(state): State<ServerState>) -> impl IntoResponse {
    let stats = ServerStats {
        uptime: format_uptime(state.start_time.elapsed()),
        hash: state.hash.clone(),
        user_id: session.map(|s| s.user_id),
    };
    Json(stats)
}

pub fn make_app(config: ServerConfig, store: GuardedStore) -> Router {
    let state = ServerState::new(config.clone(), store);

    let home_router: Router = Router::new()
        .route("/", get(home))
        .with_state(state.clone());

    let mut app: Router = home_router.nest("/v1/music", make_music_routes(state.clone()));

    if let Some(frontend_path) = config.frontend_dir_path {
        let static_files_service =
            ServeDir::new(frontend_path).append_index_html_on_directories(true);
        app = app.fallback_service(static_files_service);
    }

    app.layer(middleware::from_fn_with_state(state, log_requests))
}

pub async fn run_server(config: ServerConfig, store: GuardedStore) -> Result<()> {
    let port = config.port;
    let app = make_app(config, store);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port))
        .await
        .with_context(|| format!("Failed to bind port {}", port))?;
    info!("Ready to serve at port {}!", port);

    Ok(axum::serve(listener, app).await?)
}
