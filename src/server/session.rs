use super::state::ServerState;
use crate::user::AuthTokenValue;

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::IntoResponse,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use tracing::{debug, error};

/// An authenticated caller, resolved from the session token.
#[derive(Debug)]
pub struct Session {
    pub user_id: usize,
}

pub const COOKIE_SESSION_TOKEN_KEY: &str = "session_token";
pub const HEADER_SESSION_TOKEN_KEY: &str = "Authorization";

pub enum SessionExtractionError {
    AccessDenied,
    InternalError,
}

impl IntoResponse for SessionExtractionError {
    fn into_response(self) -> axum::response::Response {
        match self {
            SessionExtractionError::AccessDenied => StatusCode::FORBIDDEN.into_response(),
            SessionExtractionError::InternalError => {
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

async fn extract_session_token_from_cookies(
    parts: &mut Parts,
    ctx: &ServerState,
) -> Option<String> {
    CookieJar::from_request_parts(parts, ctx)
        .await
        .ok()?
        .get(COOKIE_SESSION_TOKEN_KEY)
        .map(Cookie::value)
        .map(|s| s.to_string())
}

const BEARER_PREFIX: &str = "Bearer ";

/// Takes the header value as the token, with or without a `Bearer ` scheme.
fn token_from_header_value(value: &str) -> &str {
    let value = value.trim();
    value.strip_prefix(BEARER_PREFIX).unwrap_or(value).trim()
}

fn extract_session_token_from_headers(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get(HEADER_SESSION_TOKEN_KEY)
        .map(|v| String::from_utf8_lossy(v.as_bytes()))
        .map(|v| token_from_header_value(&v).to_string())
}

async fn extract_session_from_request_parts(
    parts: &mut Parts,
    ctx: &ServerState,
) -> Result<Option<Session>, SessionExtractionError> {
    let token = match extract_session_token_from_cookies(parts, ctx)
        .await
        .or_else(|| extract_session_token_from_headers(parts))
    {
        None => {
            debug!("No token in cookies nor headers.");
            return Ok(None);
        }
        Some(x) => x,
    };

    match ctx.store.get_user_id_for_token(&AuthTokenValue(token)) {
        Ok(Some(user_id)) => {
            debug!("Found auth token for user_id={}", user_id);
            Ok(Some(Session { user_id }))
        }
        Ok(None) => {
            debug!("Auth token not found in database");
            Ok(None)
        }
        Err(e) => {
            error!("Failed to get auth token from database: {}", e);
            Err(SessionExtractionError::InternalError)
        }
    }
}

impl FromRequestParts<ServerState> for Session {
    type Rejection = SessionExtractionError;

    async fn from_request_parts(
        parts: &mut Parts,
        ctx: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        extract_session_from_request_parts(parts, ctx)
            .await?
            .ok_or(SessionExtractionError::AccessDenied)
    }
}

impl axum::extract::OptionalFromRequestParts<ServerState> for Session {
    type Rejection = SessionExtractionError;

    async fn from_request_parts(
        parts: &mut Parts,
        ctx: &ServerState,
    ) -> Result<Option<Self>, Self::Rejection> {
        extract_session_from_request_parts(parts, ctx).await
    }
}
