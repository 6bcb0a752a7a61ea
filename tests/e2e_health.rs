//! E2E tests for health check, CORS and metrics

mod common;

use common::{FRONTEND_URL, TestServer};

#[tokio::test]
async fn test_health_check() {
    let server = TestServer::new().await;

    let response = server
        .client
        .get(server.url("/health"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn test_root_banner() {
    let server = TestServer::new().await;

    let response = server.client.get(server.url("/")).send().await.unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(
        response.text().await.unwrap(),
        "EchoGram backend is running!"
    );
}

#[tokio::test]
async fn test_404_for_unknown_routes() {
    let server = TestServer::new().await;

    let response = server
        .client
        .get(server.url("/unknown/route"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn test_cors_allows_frontend_with_credentials() {
    let server = TestServer::new().await;

    for origin in [FRONTEND_URL, "http://localhost:5173"] {
        let response = server
            .client
            .get(server.url("/health"))
            .header("Origin", origin)
            .send()
            .await
            .unwrap();

        let headers = response.headers();
        assert_eq!(
            headers
                .get("access-control-allow-origin")
                .and_then(|v| v.to_str().ok()),
            Some(origin)
        );
        assert_eq!(
            headers
                .get("access-control-allow-credentials")
                .and_then(|v| v.to_str().ok()),
            Some("true")
        );
    }
}

#[tokio::test]
async fn test_cors_rejects_other_origins() {
    let server = TestServer::new().await;

    let response = server
        .client
        .get(server.url("/health"))
        .header("Origin", "https://evil.example.net")
        .send()
        .await
        .unwrap();

    assert!(
        !response
            .headers()
            .contains_key("access-control-allow-origin")
    );
}

#[tokio::test]
async fn test_cors_preflight_for_reply() {
    let server = TestServer::new().await;

    let response = server
        .client
        .request(reqwest::Method::OPTIONS, server.url("/api/comments/reply"))
        .header("Origin", FRONTEND_URL)
        .header("Access-Control-Request-Method", "POST")
        .header("Access-Control-Request-Headers", "content-type")
        .send()
        .await
        .unwrap();

    assert!(response.status().is_success());
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some(FRONTEND_URL)
    );
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let server = TestServer::new().await;

    // Generate at least one Graph API request
    server
        .client
        .get(server.url("/api/media?access_token=user-token"))
        .send()
        .await
        .unwrap();

    let response = server
        .client
        .get(server.url("/metrics"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body = response.text().await.unwrap();
    assert!(body.contains("echogram_graph_requests_total"));
}

#[tokio::test]
async fn test_metrics_can_be_disabled() {
    let server = TestServer::with_graph(common::StubGraph::linked(), |config| {
        config.metrics.enabled = false;
    })
    .await;

    let response = server
        .client
        .get(server.url("/metrics"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 404);
}
