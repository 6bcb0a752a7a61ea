//! EchoGram - a thin Instagram business dashboard backend
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      API Layer (Axum)                        │
//! │  - OAuth login, callback and token handoff                  │
//! │  - Media, dashboard, comments and reply endpoints           │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Service Layer                            │
//! │  - Account resolution (Page -> business account)            │
//! │  - Dashboard aggregation                                    │
//! │  - Unconfirmed reply ledger                                 │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   Graph API Client (reqwest)                 │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - `api`: HTTP handlers
//! - `auth`: OAuth flow, signed state, handoff, session extractor
//! - `service`: Resolution, fetching and aggregation
//! - `graph`: Graph API client and response models
//! - `config`: Configuration management
//! - `error`: Error types
//! - `metrics`: Prometheus instruments

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod graph;
pub mod metrics;
pub mod service;

use std::sync::Arc;
use std::time::Duration;

/// Application state shared across all handlers
///
/// Holds no per-user data: the access token arrives with every request.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<config::AppConfig>,

    /// Upstream Graph API
    pub graph: Arc<dyn graph::GraphApi>,

    /// One-time login codes awaiting redemption
    pub handoff: Arc<auth::HandoffStore>,

    /// Replies created here but not yet seen upstream
    pub replies: Arc<service::ReplyLedger>,
}

impl AppState {
    /// Initialize application state with the reqwest Graph API client
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be built
    pub fn new(config: config::AppConfig) -> Result<Self, error::AppError> {
        let graph = graph::GraphClient::new(&config.graph)?;
        tracing::info!(api_root = %config.graph.api_root(), "Graph API client initialized");
        Ok(Self::with_graph(config, Arc::new(graph)))
    }

    /// Initialize application state around any `GraphApi`
    pub fn with_graph(config: config::AppConfig, graph: Arc<dyn graph::GraphApi>) -> Self {
        let handoff = auth::HandoffStore::new(Duration::from_secs(config.auth.handoff_ttl_seconds));

        Self {
            config: Arc::new(config),
            graph,
            handoff: Arc::new(handoff),
            replies: Arc::new(service::ReplyLedger::default()),
        }
    }
}

/// Build the Axum router with all routes.
///
/// This is shared by the binary and integration tests to keep route
/// composition consistent across environments.
pub fn build_router(state: AppState) -> axum::Router {
    use axum::Router;
    use tower_http::{compression::CompressionLayer, trace::TraceLayer};

    let cors_layer = build_cors_layer(&state.config.frontend);
    let metrics_enabled = state.config.metrics.enabled;

    let mut router = Router::new()
        .route("/", axum::routing::get(banner))
        .route("/health", axum::routing::get(health_check))
        .merge(auth::auth_router())
        .nest("/api", api::instagram_router())
        .with_state(state);

    if metrics_enabled {
        router = router.merge(api::metrics_router());
    }

    router
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
}

/// Credentialed CORS for the configured frontend and the dev origin only
fn build_cors_layer(frontend: &config::FrontendConfig) -> tower_http::cors::CorsLayer {
    use axum::http::{HeaderValue, Method, header};
    use tower_http::cors::CorsLayer;

    let origins: Vec<HeaderValue> = frontend
        .allowed_origins()
        .into_iter()
        .filter_map(|origin| match HeaderValue::from_str(&origin) {
            Ok(value) => Some(value),
            Err(error) => {
                tracing::error!(%error, %origin, "Ignoring unparsable CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}

async fn banner() -> &'static str {
    "EchoGram backend is running!"
}

async fn health_check() -> &'static str {
    "OK"
}
