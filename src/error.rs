//! Error types for EchoGram
//!
//! All handler errors are converted to `AppError`, which implements
//! `IntoResponse`. Upstream detail is logged here and never returned
//! to the caller: the response body only carries a fixed message.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::graph::GraphError;
use crate::service::account::ResolveError;

/// Application-wide error type
#[derive(Debug, Error)]
pub enum AppError {
    /// A required request parameter is absent (400)
    #[error("{0}")]
    MissingParameter(&'static str),

    /// The token holder manages no Facebook Page (404)
    #[error("No Facebook Pages found.")]
    NoPageFound,

    /// The selected Page has no Instagram business account (404)
    #[error("No IG business account linked.")]
    NoLinkedAccount,

    /// Graph API call failed (500)
    #[error("{message}: {source}")]
    Upstream {
        message: &'static str,
        #[source]
        source: GraphError,
    },

    /// Authorization code could not be exchanged (500)
    #[error("Failed to get access token: {0}")]
    OAuthExchange(#[source] GraphError),

    /// Provider returned an error instead of a code (400)
    #[error("Authorization was not granted: {0}")]
    AuthorizationDenied(String),

    /// OAuth state missing, forged or expired (401)
    #[error("Invalid OAuth state")]
    InvalidState,

    /// Login handoff code unknown, reused or expired (401)
    #[error("Invalid or expired login code")]
    InvalidHandoff,

    /// Configuration error (500)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal server error (500)
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl AppError {
    /// HTTP status, client-facing message and metric label
    fn parts(&self) -> (StatusCode, String, &'static str) {
        match self {
            AppError::MissingParameter(msg) => {
                (StatusCode::BAD_REQUEST, msg.to_string(), "missing_parameter")
            }
            AppError::NoPageFound => (StatusCode::NOT_FOUND, self.to_string(), "no_page"),
            AppError::NoLinkedAccount => {
                (StatusCode::NOT_FOUND, self.to_string(), "no_linked_account")
            }
            AppError::Upstream { message, .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                message.to_string(),
                "upstream",
            ),
            AppError::OAuthExchange(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to get access token".to_string(),
                "oauth_exchange",
            ),
            AppError::AuthorizationDenied(_) => (
                StatusCode::BAD_REQUEST,
                "Authorization was not granted".to_string(),
                "authorization_denied",
            ),
            AppError::InvalidState => (StatusCode::UNAUTHORIZED, self.to_string(), "invalid_state"),
            AppError::InvalidHandoff => {
                (StatusCode::UNAUTHORIZED, self.to_string(), "invalid_handoff")
            }
            AppError::Config(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
                "config",
            ),
            AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
                "internal",
            ),
        }
    }

    /// HTTP status this error renders with
    pub fn status(&self) -> StatusCode {
        self.parts().0
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        use axum::Json;

        let (status, error_message, error_type) = self.parts();

        match &self {
            AppError::Upstream { message, source } => {
                tracing::error!(
                    error = %source,
                    payload = ?source.payload(),
                    "{}",
                    message
                );
            }
            AppError::OAuthExchange(source) => {
                tracing::error!(
                    error = %source,
                    payload = ?source.payload(),
                    "Error getting access token"
                );
            }
            AppError::Config(_) | AppError::Internal(_) => {
                tracing::error!(error = %self, "Request failed");
            }
            _ => tracing::debug!(error = %self, status = status.as_u16(), "Request rejected"),
        }

        crate::metrics::ERRORS_TOTAL
            .with_label_values(&[error_type])
            .inc();

        let body = Json(serde_json::json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

/// Attach an endpoint's fixed failure message to upstream errors
pub trait UpstreamContext<T> {
    fn or_upstream(self, message: &'static str) -> Result<T>;
}

impl<T> UpstreamContext<T> for std::result::Result<T, GraphError> {
    fn or_upstream(self, message: &'static str) -> Result<T> {
        self.map_err(|source| AppError::Upstream { message, source })
    }
}

impl<T> UpstreamContext<T> for std::result::Result<T, ResolveError> {
    fn or_upstream(self, message: &'static str) -> Result<T> {
        self.map_err(|err| match err {
            ResolveError::NoPageFound => AppError::NoPageFound,
            ResolveError::NoLinkedAccount => AppError::NoLinkedAccount,
            ResolveError::Graph(source) => AppError::Upstream { message, source },
        })
    }
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;
