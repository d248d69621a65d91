//! HTTP client for end-to-end tests
//!
//! This module provides a high-level HTTP client that wraps reqwest
//! and provides methods for all music-server endpoints.
//!
//! When API routes or request formats change, update only this file.

use super::constants::*;
use super::server::TestServer;
use reqwest::{RequestBuilder, Response};
use serde_json::json;
use std::time::Duration;

/// HTTP test client, optionally carrying a session token
pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    /// The base URL of the test server
    pub base_url: String,
    token: Option<String>,
}

impl TestClient {
    fn new(base_url: String, token: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self {
            client,
            base_url,
            token,
        }
    }

    /// Creates a client without a session
    pub fn anonymous(base_url: String) -> Self {
        Self::new(base_url, None)
    }

    /// Creates a client carrying the test user's session token
    pub fn authenticated(server: &TestServer) -> Self {
        Self::new(server.base_url.clone(), Some(server.token.0.clone()))
    }

    /// Creates a client carrying an arbitrary session token
    pub fn with_token(base_url: String, token: &str) -> Self {
        Self::new(base_url, Some(token.to_string()))
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.with_session(self.client.get(format!("{}{}", self.base_url, path)))
    }

    fn post(&self, path: &str) -> RequestBuilder {
        self.with_session(self.client.post(format!("{}{}", self.base_url, path)))
    }

    fn with_session(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => builder.header("Authorization", token),
            None => builder,
        }
    }

    // ========================================================================
    // Home
    // ========================================================================

    /// GET /
    pub async fn home(&self) -> Response {
        self.get("/").send().await.expect("Home request failed")
    }

    // ========================================================================
    // Music
    // ========================================================================

    /// GET /v1/music with optional view and search query
    pub async fn list_music(&self, view: Option<&str>, query: Option<&str>) -> Response {
        let mut params = vec![];
        if let Some(view) = view {
            params.push(("view", view));
        }
        if let Some(query) = query {
            params.push(("q", query));
        }
        self.get("/v1/music")
            .query(&params)
            .send()
            .await
            .expect("List music request failed")
    }

    /// GET /v1/music/{id}
    pub async fn get_music(&self, id: usize) -> Response {
        self.get(&format!("/v1/music/{}", id))
            .send()
            .await
            .expect("Get music request failed")
    }

    /// GET /v1/music/by-slug/{slug}
    pub async fn get_music_by_slug(&self, slug: &str) -> Response {
        self.get(&format!("/v1/music/by-slug/{}", slug))
            .send()
            .await
            .expect("Get music by slug request failed")
    }

    /// GET /v1/music/{id}/score
    pub async fn get_score(&self, id: usize) -> Response {
        self.get(&format!("/v1/music/{}/score", id))
            .send()
            .await
            .expect("Get score request failed")
    }

    /// GET /v1/music/{id}/share
    pub async fn get_share(&self, id: usize) -> Response {
        self.get(&format!("/v1/music/{}/share", id))
            .send()
            .await
            .expect("Get share request failed")
    }

    // ========================================================================
    // Interactions
    // ========================================================================

    /// GET /v1/music/{id}/mention
    pub async fn get_mention(&self, id: usize) -> Response {
        self.get(&format!("/v1/music/{}/mention", id))
            .send()
            .await
            .expect("Get mention request failed")
    }

    /// POST /v1/music/{id}/mention
    pub async fn post_mention(&self, id: usize, mentioned: bool) -> Response {
        self.post(&format!("/v1/music/{}/mention", id))
            .json(&json!({ "mentioned": mentioned }))
            .send()
            .await
            .expect("Post mention request failed")
    }

    /// GET /v1/music/{id}/rating
    pub async fn get_rating(&self, id: usize) -> Response {
        self.get(&format!("/v1/music/{}/rating", id))
            .send()
            .await
            .expect("Get rating request failed")
    }

    /// POST /v1/music/{id}/rating with any JSON value as rating
    pub async fn post_rating(&self, id: usize, rating: serde_json::Value) -> Response {
        self.post(&format!("/v1/music/{}/rating", id))
            .json(&json!({ "rating": rating }))
            .send()
            .await
            .expect("Post rating request failed")
    }

    /// POST /v1/music/{id}/listen
    pub async fn post_listen(&self, id: usize) -> Response {
        self.post(&format!("/v1/music/{}/listen", id))
            .send()
            .await
            .expect("Post listen request failed")
    }
}
