//! Instagram OAuth flow
//!
//! Implements the OAuth 2.0 authorization code flow against Facebook Login:
//! consent redirect, callback, code exchange, then handoff to the frontend.

use axum::{
    Json, Router,
    extract::{Query, State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};
use serde::{Deserialize, Serialize};

use super::state::{issue_state, verify_state};
use crate::AppState;
use crate::config::HandoffMode;
use crate::error::AppError;
use crate::graph::{self, TokenResponse};
use crate::metrics::OAUTH_EXCHANGES_TOTAL;

/// Cookie binding the consent redirect to its callback
pub const OAUTH_STATE_COOKIE: &str = "oauth_state";

const OAUTH_STATE_COOKIE_PATH: &str = "/auth";

/// Create authentication router
///
/// Routes:
/// - GET /auth/instagram - Redirect to the consent dialog
/// - GET /auth/instagram/callback - OAuth callback
/// - POST /auth/session - Redeem a handoff code
/// - POST /auth/logout - Clear OAuth cookies
pub fn auth_router() -> Router<AppState> {
    Router::new()
        .route("/auth/instagram", get(instagram_redirect))
        .route("/auth/instagram/callback", get(instagram_callback))
        .route("/auth/session", post(redeem_session))
        .route("/auth/logout", post(logout))
}

/// 302 with a Location header
fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}

fn url_with_params(base: &str, params: &[(&str, &str)]) -> Result<String, AppError> {
    url::Url::parse_with_params(base, params)
        .map(String::from)
        .map_err(|e| AppError::Config(format!("invalid URL {base}: {e}")))
}

fn build_state_cookie(value: String, secure: bool) -> Cookie<'static> {
    Cookie::build((OAUTH_STATE_COOKIE, value))
        .path(OAUTH_STATE_COOKIE_PATH)
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .build()
}

fn clear_state_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::build((OAUTH_STATE_COOKIE, ""))
        .path(OAUTH_STATE_COOKIE_PATH)
        .http_only(true)
        .build();
    cookie.make_removal();
    cookie
}

// =============================================================================
// Consent redirect
// =============================================================================

/// GET /auth/instagram
///
/// # Steps
/// 1. Issue a signed state and store it in a cookie
/// 2. Redirect to the consent dialog with client_id, redirect_uri, scope,
///    response_type=code and state
async fn instagram_redirect(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<impl IntoResponse, AppError> {
    let auth = &state.config.auth;

    let oauth_state = issue_state(&auth.state_secret, auth.state_ttl_seconds)?;
    let location = url_with_params(
        &state.config.graph.dialog_endpoint(),
        &[
            ("client_id", auth.client_id.as_str()),
            ("redirect_uri", auth.redirect_uri.as_str()),
            ("scope", auth.scopes.as_str()),
            ("response_type", "code"),
            ("state", oauth_state.as_str()),
        ],
    )?;

    let secure = auth.redirect_uri.starts_with("https://");
    tracing::debug!("Redirecting to consent dialog");

    Ok((jar.add(build_state_cookie(oauth_state, secure)), found(&location)))
}

// =============================================================================
// Callback
// =============================================================================

/// Query parameters of the provider callback
#[derive(Debug, Deserialize)]
struct CallbackQuery {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
    error_reason: Option<String>,
}

/// GET /auth/instagram/callback
///
/// # Steps
/// 1. Provider error -> the flow must be restarted
/// 2. Require `code` (no exchange without it)
/// 3. Verify `state` against the cookie and its signature
/// 4. Exchange code for an access token
/// 5. Redirect to the feed with a handoff code (or the token, legacy)
async fn instagram_callback(
    State(state): State<AppState>,
    Query(query): Query<CallbackQuery>,
    jar: CookieJar,
) -> Result<impl IntoResponse, AppError> {
    if let Some(error) = query.error {
        tracing::warn!(%error, reason = ?query.error_reason, "Authorization not granted");
        return Err(AppError::AuthorizationDenied(error));
    }

    let code = query
        .code
        .filter(|code| !code.trim().is_empty())
        .ok_or(AppError::MissingParameter("Missing authorization code"))?;

    verify_callback_state(&state, query.state.as_deref(), &jar)?;

    let access_token = exchange_code(&state, &code).await?;

    let feed = state.config.frontend.feed_url();
    let location = match state.config.auth.handoff {
        HandoffMode::Code => {
            let handoff = state.handoff.issue(access_token).await;
            url_with_params(&feed, &[("code", handoff.as_str())])?
        }
        HandoffMode::Token => url_with_params(&feed, &[("token", access_token.as_str())])?,
    };

    tracing::info!("Login completed");
    Ok((jar.remove(clear_state_cookie()), found(&location)))
}

fn verify_callback_state(
    state: &AppState,
    returned: Option<&str>,
    jar: &CookieJar,
) -> Result<(), AppError> {
    let returned = returned.ok_or(AppError::InvalidState)?;
    let expected = jar
        .get(OAUTH_STATE_COOKIE)
        .map(|cookie| cookie.value())
        .ok_or(AppError::InvalidState)?;

    if returned != expected {
        return Err(AppError::InvalidState);
    }

    verify_state(returned, &state.config.auth.state_secret)?;
    Ok(())
}

/// Exchange an authorization code at the token endpoint
async fn exchange_code(state: &AppState, code: &str) -> Result<String, AppError> {
    let auth = &state.config.auth;

    let result: Result<TokenResponse, _> = graph::get_as(
        state.graph.as_ref(),
        "oauth/access_token",
        &[
            ("client_id", auth.client_id.as_str()),
            ("client_secret", auth.client_secret.as_str()),
            ("redirect_uri", auth.redirect_uri.as_str()),
            ("code", code),
        ],
    )
    .await;

    match result {
        Ok(token) => {
            OAUTH_EXCHANGES_TOTAL.with_label_values(&["success"]).inc();
            Ok(token.access_token)
        }
        Err(source) => {
            OAUTH_EXCHANGES_TOTAL.with_label_values(&["failure"]).inc();
            Err(AppError::OAuthExchange(source))
        }
    }
}

// =============================================================================
// Handoff redemption
// =============================================================================

#[derive(Debug, Deserialize)]
struct RedeemRequest {
    code: Option<String>,
}

#[derive(Debug, Serialize)]
struct RedeemResponse {
    access_token: String,
}

/// POST /auth/session
///
/// Trades a one-time handoff code for the access token.
async fn redeem_session(
    State(state): State<AppState>,
    body: Result<Json<RedeemRequest>, JsonRejection>,
) -> Result<Json<RedeemResponse>, AppError> {
    let code = body
        .ok()
        .and_then(|Json(req)| req.code)
        .filter(|code| !code.is_empty())
        .ok_or(AppError::MissingParameter("Missing login code"))?;

    let access_token = state
        .handoff
        .redeem(&code)
        .await
        .ok_or(AppError::InvalidHandoff)?;

    Ok(Json(RedeemResponse { access_token }))
}

// =============================================================================
// Logout
// =============================================================================

/// POST /auth/logout
///
/// The access token only lives in the browser; this clears what the server
/// set during login.
async fn logout(jar: CookieJar) -> impl IntoResponse {
    (jar.remove(clear_state_cookie()), StatusCode::NO_CONTENT)
}
