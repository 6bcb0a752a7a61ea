//! Instagram data endpoints
//!
//! Each request resolves the business account from scratch and re-fetches
//! everything it shows. Nothing is cached between requests except the
//! unconfirmed reply ledger.

use axum::{
    Json, Router,
    extract::{Path, Query, State, rejection::JsonRejection},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::auth::{GraphSession, MaybeGraphSession};
use crate::error::{AppError, UpstreamContext};
use crate::graph::MediaItem;
use crate::metrics::HTTP_REQUESTS_TOTAL;
use crate::service::{
    self, DashboardStats, PageSelection, PendingReply, ProfileView, instagram,
};

/// Create the data API router, nested under `/api`
///
/// Routes:
/// - GET /media
/// - GET /dashboard
/// - GET /comments/:media_id
/// - POST /comments/reply
pub fn instagram_router() -> Router<AppState> {
    Router::new()
        .route("/media", get(list_media))
        .route("/dashboard", get(dashboard))
        .route("/comments/reply", post(reply_to_comment))
        .route("/comments/:media_id", get(list_comments))
}

fn record_success(endpoint: &str) {
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[endpoint, "200"])
        .inc();
}

/// Optional explicit Page choice; defaults to the first listed Page
#[derive(Debug, Default, Deserialize)]
pub struct AccountQuery {
    pub page_id: Option<String>,
}

impl AccountQuery {
    fn selection(&self) -> PageSelection {
        PageSelection::from_query(self.page_id.as_deref())
    }
}

// =============================================================================
// Media
// =============================================================================

#[derive(Debug, Serialize)]
pub struct MediaResponse {
    pub data: Vec<MediaItem>,
}

/// GET /api/media
pub async fn list_media(
    State(state): State<AppState>,
    session: GraphSession,
    Query(query): Query<AccountQuery>,
) -> Result<Json<MediaResponse>, AppError> {
    const FAILURE: &str = "Failed to fetch Instagram media";

    let graph = state.graph.as_ref();
    let account = service::resolve_account(graph, session.access_token(), &query.selection())
        .await
        .or_upstream(FAILURE)?;

    let data = instagram::fetch_media(graph, &account.ig_user_id, session.access_token())
        .await
        .or_upstream(FAILURE)?;

    record_success("/api/media");
    Ok(Json(MediaResponse { data }))
}

// =============================================================================
// Dashboard
// =============================================================================

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub profile: ProfileView,
    pub stats: DashboardStats,
}

/// GET /api/dashboard
///
/// # Steps
/// 1. Resolve the business account
/// 2. Fetch profile, then media
/// 3. Aggregate
pub async fn dashboard(
    State(state): State<AppState>,
    session: GraphSession,
    Query(query): Query<AccountQuery>,
) -> Result<Json<DashboardResponse>, AppError> {
    const FAILURE: &str = "Failed to load dashboard data";

    let graph = state.graph.as_ref();
    let token = session.access_token();

    let account = service::resolve_account(graph, token, &query.selection())
        .await
        .or_upstream(FAILURE)?;
    let profile = instagram::fetch_profile(graph, &account.ig_user_id, token)
        .await
        .or_upstream(FAILURE)?;
    let media = instagram::fetch_media(graph, &account.ig_user_id, token)
        .await
        .or_upstream(FAILURE)?;

    let stats = service::aggregate(&profile, &media);

    record_success("/api/dashboard");
    Ok(Json(DashboardResponse {
        profile: ProfileView::from(&profile),
        stats,
    }))
}

// =============================================================================
// Comments
// =============================================================================

/// GET /api/comments/:media_id
///
/// Returns the provider's payload untouched, plus `pending_replies` when
/// replies this session created have not shown up upstream yet.
pub async fn list_comments(
    State(state): State<AppState>,
    Path(media_id): Path<String>,
    MaybeGraphSession(session): MaybeGraphSession,
    Query(query): Query<AccountQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    const FAILURE: &str = "Failed to fetch comments";

    let session = session
        .filter(|_| !media_id.trim().is_empty())
        .ok_or(AppError::MissingParameter("Missing media ID or access token"))?;

    let graph = state.graph.as_ref();
    let account = service::resolve_account(graph, session.access_token(), &query.selection())
        .await
        .or_upstream(FAILURE)?;

    let mut payload = instagram::fetch_comments(graph, &media_id, &account.page_access_token)
        .await
        .or_upstream(FAILURE)?;

    let pending = state
        .replies
        .reconcile_thread(&session.fingerprint(), &payload)
        .await;
    if !pending.is_empty() {
        if let Some(object) = payload.as_object_mut() {
            let pending =
                serde_json::to_value(&pending).map_err(|e| AppError::Internal(e.into()))?;
            object.insert("pending_replies".to_string(), pending);
        }
    }

    record_success("/api/comments/:media_id");
    Ok(Json(payload))
}

// =============================================================================
// Reply
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct ReplyRequest {
    pub access_token: Option<String>,
    #[serde(rename = "commentId")]
    pub comment_id: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ReplyResponse {
    pub success: bool,
    pub data: serde_json::Value,
    /// Local record of the new reply, unconfirmed until seen upstream
    pub reply: Option<PendingReply>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// POST /api/comments/reply
pub async fn reply_to_comment(
    State(state): State<AppState>,
    MaybeGraphSession(header_session): MaybeGraphSession,
    body: Result<Json<ReplyRequest>, JsonRejection>,
) -> Result<Json<ReplyResponse>, AppError> {
    const MISSING: AppError = AppError::MissingParameter("Missing required fields");

    let Ok(Json(req)) = body else {
        return Err(MISSING);
    };

    let session = non_blank(req.access_token)
        .and_then(GraphSession::new)
        .or(header_session);
    let (Some(session), Some(comment_id), Some(message)) =
        (session, non_blank(req.comment_id), non_blank(req.message))
    else {
        return Err(MISSING);
    };

    let data = instagram::reply_to_comment(
        state.graph.as_ref(),
        session.access_token(),
        &comment_id,
        &message,
    )
    .await
    .or_upstream("Failed to reply to comment")?;

    let reply = PendingReply::from_created(&data, &comment_id, &message);
    if let Some(reply) = &reply {
        state
            .replies
            .record(&session.fingerprint(), reply.clone())
            .await;
    }

    record_success("/api/comments/reply");
    Ok(Json(ReplyResponse {
        success: true,
        data,
        reply,
    }))
}
