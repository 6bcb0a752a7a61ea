//! reqwest-backed Graph API client

use axum::async_trait;
use std::time::Duration;

use super::{GraphApi, GraphError};
use crate::config::GraphConfig;
use crate::error::AppError;
use crate::metrics::{GRAPH_REQUEST_DURATION_SECONDS, GRAPH_REQUESTS_TOTAL};

/// Graph API client
///
/// Holds a pooled `reqwest::Client` and the versioned API root.
pub struct GraphClient {
    http: reqwest::Client,
    api_root: String,
}

impl GraphClient {
    /// Build a client from configuration
    ///
    /// # Errors
    /// Returns error if the TLS backend cannot be initialized
    pub fn new(config: &GraphConfig) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| AppError::Internal(e.into()))?;

        Ok(Self {
            http,
            api_root: config.api_root(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.api_root, path.trim_start_matches('/'))
    }

    async fn send(
        &self,
        method: &'static str,
        path: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<serde_json::Value, GraphError> {
        let timer = GRAPH_REQUEST_DURATION_SECONDS
            .with_label_values(&[method])
            .start_timer();
        let result = request.send().await;
        let elapsed = timer.stop_and_record();

        let response = match result {
            Ok(response) => response,
            Err(error) => {
                GRAPH_REQUESTS_TOTAL
                    .with_label_values(&[method, "transport_error"])
                    .inc();
                let error = error.without_url();
                tracing::debug!(method, path, %error, "Graph API request failed");
                return Err(GraphError::Transport(error));
            }
        };

        let status = response.status();
        GRAPH_REQUESTS_TOTAL
            .with_label_values(&[method, status.as_str()])
            .inc();
        tracing::debug!(
            method,
            path,
            status = status.as_u16(),
            elapsed_ms = (elapsed * 1000.0) as u64,
            "Graph API request"
        );

        // The URL carries tokens and the client secret in its query string
        let body = response
            .bytes()
            .await
            .map_err(|error| GraphError::Transport(error.without_url()))?;

        if !status.is_success() {
            let payload = serde_json::from_slice(&body).unwrap_or_else(|_| {
                serde_json::Value::String(String::from_utf8_lossy(&body).into_owned())
            });
            return Err(GraphError::Status {
                status: status.as_u16(),
                payload,
            });
        }

        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl GraphApi for GraphClient {
    async fn get(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<serde_json::Value, GraphError> {
        let request = self.http.get(self.url(path)).query(params);
        self.send("GET", path, request).await
    }

    async fn post(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<serde_json::Value, GraphError> {
        let request = self.http.post(self.url(path)).query(params);
        self.send("POST", path, request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joins_root_and_path() {
        let client = GraphClient::new(&crate::config::test_config().graph).unwrap();
        assert_eq!(
            client.url("/me/accounts"),
            "https://graph.facebook.com/v19.0/me/accounts"
        );
        assert_eq!(
            client.url("123/comments"),
            "https://graph.facebook.com/v19.0/123/comments"
        );
    }

    #[tokio::test]
    async fn transport_error_does_not_expose_query() {
        let mut config = crate::config::test_config().graph;
        config.base_url = "http://127.0.0.1:1".to_string();
        let client = GraphClient::new(&config).unwrap();

        let err = client
            .get(
                "oauth/access_token",
                &[("client_secret", "SUPER-SECRET"), ("code", "auth-code-123")],
            )
            .await
            .unwrap_err();

        assert!(matches!(err, GraphError::Transport(_)));
        let rendered = format!("{err} {err:?}");
        assert!(!rendered.contains("SUPER-SECRET"));
        assert!(!rendered.contains("auth-code-123"));
    }
}
