//! Graph session extractor
//!
//! The user access token lives in the browser. Each request hands it over
//! explicitly and handlers receive it as a `GraphSession`, never from
//! shared state.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{HeaderMap, request::Parts},
};
use base64::{Engine as _, engine::general_purpose};
use sha2::{Digest, Sha256};

use crate::error::AppError;

/// User access token for the duration of one request
#[derive(Clone, PartialEq, Eq)]
pub struct GraphSession {
    access_token: String,
}

impl GraphSession {
    /// Blank tokens count as absent
    pub fn new(access_token: impl Into<String>) -> Option<Self> {
        let access_token = access_token.into();
        if access_token.trim().is_empty() {
            None
        } else {
            Some(Self { access_token })
        }
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// Stable key for per-session state that must not hold the token itself
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(self.access_token.as_bytes());
        general_purpose::URL_SAFE_NO_PAD.encode(digest)
    }
}

impl std::fmt::Debug for GraphSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphSession")
            .field("access_token", &"<redacted>")
            .finish()
    }
}

fn token_from_query(query: Option<&str>) -> Option<String> {
    url::form_urlencoded::parse(query?.as_bytes())
        .find(|(key, _)| key == "access_token")
        .map(|(_, value)| value.into_owned())
}

fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(ToOwned::to_owned)
}

/// `access_token` query parameter first, then `Authorization: Bearer`
fn session_from_parts(parts: &Parts) -> Option<GraphSession> {
    token_from_query(parts.uri.query())
        .and_then(GraphSession::new)
        .or_else(|| token_from_headers(&parts.headers).and_then(GraphSession::new))
}

/// Extractor for the caller's Graph session
///
/// # Usage
/// ```ignore
/// async fn handler(session: GraphSession) -> impl IntoResponse {
///     session.access_token().len().to_string()
/// }
/// ```
#[async_trait]
impl<S> FromRequestParts<S> for GraphSession
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        session_from_parts(parts).ok_or(AppError::MissingParameter("Missing access token"))
    }
}

/// Optional session extractor
///
/// For handlers that report a missing token with their own message.
#[derive(Debug, Clone)]
pub struct MaybeGraphSession(pub Option<GraphSession>);

#[async_trait]
impl<S> FromRequestParts<S> for MaybeGraphSession
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeGraphSession(session_from_parts(parts)))
    }
}
