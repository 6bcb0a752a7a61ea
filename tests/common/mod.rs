//! Common test utilities for E2E tests
//!
//! Starts the real router on an ephemeral port, pointed at a stub Graph API
//! that is also served by axum on an ephemeral port.

#![allow(dead_code)]

use axum::{
    Json, Router,
    extract::{Path, RawQuery, State},
    http::{Method, StatusCode},
    routing::{get, post},
};
use echogram::{AppState, config};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

pub const USER_TOKEN: &str = "user-token";
pub const PAGE_TOKEN: &str = "page-token";
pub const PAGE_ID: &str = "page-1";
pub const IG_USER_ID: &str = "ig-1";
pub const FRONTEND_URL: &str = "https://echogram.example.com";

/// Request seen by the stub Graph API
#[derive(Debug, Clone)]
pub struct GraphHit {
    pub method: Method,
    pub path: String,
    pub query: HashMap<String, String>,
}

/// Canned responses keyed by endpoint name, plus a log of every hit
#[derive(Clone, Default)]
pub struct StubGraph {
    responses: Arc<Mutex<HashMap<&'static str, (u16, Value)>>>,
    hits: Arc<Mutex<Vec<GraphHit>>>,
}

impl StubGraph {
    /// One Page with a linked business account and some media
    pub fn linked() -> Self {
        let stub = Self::default();
        stub.set(
            "pages",
            200,
            json!({"data": [{"id": PAGE_ID, "access_token": PAGE_TOKEN, "name": "Echo Page"}]}),
        );
        stub.set(
            "link",
            200,
            json!({"id": PAGE_ID, "instagram_business_account": {"id": IG_USER_ID}}),
        );
        stub.set(
            "profile",
            200,
            json!({
                "username": "echo",
                "biography": "hello",
                "profile_picture_url": "https://cdn.example.com/me.jpg",
                "followers_count": 100,
                "follows_count": 7,
                "id": IG_USER_ID
            }),
        );
        stub.set(
            "media",
            200,
            json!({"data": [
                {"id": "m1", "media_type": "IMAGE", "media_url": "https://cdn.example.com/1.jpg",
                 "like_count": 10, "comments_count": 2, "timestamp": "2024-05-01T10:00:00+0000"},
                {"id": "m2", "media_type": "VIDEO", "media_url": "https://cdn.example.com/2.mp4",
                 "thumbnail_url": "https://cdn.example.com/2.jpg",
                 "like_count": 50, "comments_count": 5, "timestamp": "2024-05-02T10:00:00+0000"},
                {"id": "m3", "media_type": "IMAGE", "media_url": "https://cdn.example.com/3.jpg",
                 "like_count": 1, "comments_count": 1, "timestamp": "2024-05-03T10:00:00+0000"}
            ]}),
        );
        stub.set(
            "comments",
            200,
            json!({"data": [
                {"id": "c1", "text": "love it", "timestamp": "2024-05-01T11:00:00+0000",
                 "like_count": 2, "replies": {"data": [{"id": "r1", "text": "thanks", "timestamp": "2024-05-01T12:00:00+0000"}]}},
                {"id": "c2", "text": "nice", "timestamp": "2024-05-01T13:00:00+0000", "like_count": 0}
            ]}),
        );
        stub.set("replies", 200, json!({"id": "r-new"}));
        stub.set(
            "token",
            200,
            json!({"access_token": USER_TOKEN, "token_type": "bearer", "expires_in": 5183944}),
        );
        stub
    }

    pub fn set(&self, endpoint: &'static str, status: u16, body: Value) {
        self.responses
            .lock()
            .unwrap()
            .insert(endpoint, (status, body));
    }

    pub fn hits(&self) -> Vec<GraphHit> {
        self.hits.lock().unwrap().clone()
    }

    pub fn hits_to(&self, path: &str) -> Vec<GraphHit> {
        self.hits()
            .into_iter()
            .filter(|hit| hit.path == path)
            .collect()
    }

    fn respond(
        &self,
        endpoint: &'static str,
        method: Method,
        path: String,
        query: Option<String>,
    ) -> (StatusCode, Json<Value>) {
        let query = query
            .map(|q| {
                url::form_urlencoded::parse(q.as_bytes())
                    .into_owned()
                    .collect()
            })
            .unwrap_or_default();
        self.hits.lock().unwrap().push(GraphHit {
            method,
            path,
            query,
        });

        let (status, body) = self
            .responses
            .lock()
            .unwrap()
            .get(endpoint)
            .cloned()
            .unwrap_or((404, json!({"error": {"message": "not stubbed"}})));
        (StatusCode::from_u16(status).unwrap(), Json(body))
    }

    fn router(self) -> Router {
        Router::new()
            .route(
                "/v19.0/me/accounts",
                get(|State(stub): State<StubGraph>, RawQuery(q): RawQuery| async move {
                    stub.respond("pages", Method::GET, "/me/accounts".into(), q)
                }),
            )
            .route(
                "/v19.0/oauth/access_token",
                get(|State(stub): State<StubGraph>, RawQuery(q): RawQuery| async move {
                    stub.respond("token", Method::GET, "/oauth/access_token".into(), q)
                }),
            )
            .route(
                "/v19.0/:node",
                get(
                    |State(stub): State<StubGraph>,
                     Path(node): Path<String>,
                     RawQuery(q): RawQuery| async move {
                        let endpoint = match q.as_deref() {
                            Some(q) if q.contains("fields=instagram_business_account") => "link",
                            _ => "profile",
                        };
                        stub.respond(endpoint, Method::GET, format!("/{node}"), q)
                    },
                ),
            )
            .route(
                "/v19.0/:node/media",
                get(
                    |State(stub): State<StubGraph>,
                     Path(node): Path<String>,
                     RawQuery(q): RawQuery| async move {
                        stub.respond("media", Method::GET, format!("/{node}/media"), q)
                    },
                ),
            )
            .route(
                "/v19.0/:node/comments",
                get(
                    |State(stub): State<StubGraph>,
                     Path(node): Path<String>,
                     RawQuery(q): RawQuery| async move {
                        stub.respond("comments", Method::GET, format!("/{node}/comments"), q)
                    },
                ),
            )
            .route(
                "/v19.0/:node/replies",
                post(
                    |State(stub): State<StubGraph>,
                     Path(node): Path<String>,
                     RawQuery(q): RawQuery| async move {
                        stub.respond("replies", Method::POST, format!("/{node}/replies"), q)
                    },
                ),
            )
            .with_state(self)
    }
}

async fn serve(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

/// Test configuration pointing at `graph_url`
pub fn test_config(graph_url: &str) -> config::AppConfig {
    config::AppConfig {
        server: config::ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0, // Let OS assign port
        },
        graph: config::GraphConfig {
            base_url: graph_url.to_string(),
            dialog_url: "https://www.facebook.com".to_string(),
            api_version: "v19.0".to_string(),
            timeout_seconds: 10,
            user_agent: "EchoGram/test".to_string(),
        },
        auth: config::AuthConfig {
            client_id: "test-client-id".to_string(),
            client_secret: "test-client-secret".to_string(),
            redirect_uri: "http://localhost:5000/auth/instagram/callback".to_string(),
            scopes: "instagram_basic,instagram_manage_comments,pages_show_list".to_string(),
            state_secret: "test-state-secret-32-bytes-long!!".to_string(),
            state_ttl_seconds: 600,
            handoff: config::HandoffMode::Code,
            handoff_ttl_seconds: 60,
        },
        frontend: config::FrontendConfig {
            url: FRONTEND_URL.to_string(),
            dev_origin: "http://localhost:5173".to_string(),
        },
        logging: config::LoggingConfig {
            level: "info".to_string(),
            format: "pretty".to_string(),
        },
        metrics: config::MetricsConfig { enabled: true },
    }
}

/// Test server instance
pub struct TestServer {
    pub addr: String,
    pub state: AppState,
    pub graph: StubGraph,
    pub client: reqwest::Client,
}

impl TestServer {
    /// Server over a Page with a linked business account
    pub async fn new() -> Self {
        Self::with_graph(StubGraph::linked(), |_| {}).await
    }

    /// Server over a custom stub, with config adjustments
    pub async fn with_graph(graph: StubGraph, configure: impl FnOnce(&mut config::AppConfig)) -> Self {
        echogram::metrics::init_metrics();

        let graph_url = serve(graph.clone().router()).await;
        let mut config = test_config(&graph_url);
        configure(&mut config);

        let state = AppState::new(config).unwrap();
        let addr = serve(echogram::build_router(state.clone())).await;

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .unwrap();

        Self {
            addr,
            state,
            graph,
            client,
        }
    }

    /// Get base URL for API requests
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.addr, path)
    }
}

/// Client that surfaces redirects instead of following them
pub fn no_redirect_client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .timeout(std::time::Duration::from_secs(10))
        .build()
        .expect("failed to build no-redirect client")
}
