//! Graph API access
//!
//! Every entity this service touches is owned upstream. This module is the
//! only place that talks to the provider; the rest of the crate goes through
//! the [`GraphApi`] trait so handlers and the resolution pipeline can be
//! exercised against a substitute.

mod client;
pub mod models;

use axum::async_trait;
use serde::de::DeserializeOwned;
use thiserror::Error;

pub use client::GraphClient;
pub use models::*;

/// Failure of a single Graph API call
#[derive(Debug, Error)]
pub enum GraphError {
    /// Network failure; the request URL is stripped before wrapping
    #[error("Graph API transport error: {0}")]
    Transport(#[source] reqwest::Error),

    /// Non-2xx response; `payload` is the provider's error body
    #[error("Graph API returned status {status}")]
    Status {
        status: u16,
        payload: serde_json::Value,
    },

    /// 2xx response whose body did not have the expected shape
    #[error("Unexpected Graph API response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl GraphError {
    /// Provider-returned error body, when there is one
    pub fn payload(&self) -> Option<&serde_json::Value> {
        match self {
            GraphError::Status { payload, .. } => Some(payload),
            _ => None,
        }
    }
}

/// One request, one response. No retries or batching.
#[async_trait]
pub trait GraphApi: Send + Sync {
    /// GET `<api root>/<path>` with `params` as the query string
    async fn get(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<serde_json::Value, GraphError>;

    /// POST `<api root>/<path>` with `params` as the query string and no body
    async fn post(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<serde_json::Value, GraphError>;
}

/// GET and decode into a typed projection
pub async fn get_as<T: DeserializeOwned>(
    graph: &dyn GraphApi,
    path: &str,
    params: &[(&str, &str)],
) -> Result<T, GraphError> {
    let value = graph.get(path, params).await?;
    Ok(serde_json::from_value(value)?)
}

/// Percent-encode a caller-supplied node id for use as a path segment
pub fn node_path(id: &str, edge: Option<&str>) -> String {
    let node = urlencoding::encode(id);
    match edge {
        Some(edge) => format!("{node}/{edge}"),
        None => node.into_owned(),
    }
}
