//! Configuration management
//!
//! Loads configuration from:
//! 1. Default values
//! 2. Configuration files (config/default.toml, config/local.toml)
//! 3. Environment variables (override)

use serde::Deserialize;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub graph: GraphConfig,
    pub auth: AuthConfig,
    pub frontend: FrontendConfig,
    pub logging: LoggingConfig,
    pub metrics: MetricsConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0")
    pub host: String,
    /// Port number (e.g., 5000)
    pub port: u16,
}

/// Upstream Graph API endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct GraphConfig {
    /// API host, e.g. "https://graph.facebook.com"
    pub base_url: String,
    /// Consent dialog host, e.g. "https://www.facebook.com"
    pub dialog_url: String,
    /// Versioned path segment, e.g. "v19.0"
    pub api_version: String,
    /// Transport timeout in seconds
    pub timeout_seconds: u64,
    pub user_agent: String,
}

impl GraphConfig {
    /// Versioned API root, e.g. "https://graph.facebook.com/v19.0"
    pub fn api_root(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.api_version
        )
    }

    /// Consent dialog URL without query string
    pub fn dialog_endpoint(&self) -> String {
        format!(
            "{}/{}/dialog/oauth",
            self.dialog_url.trim_end_matches('/'),
            self.api_version
        )
    }
}

/// How the access token reaches the browser after the OAuth callback
#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum HandoffMode {
    /// Redirect carries a one-time code, redeemed via POST /auth/session
    #[default]
    Code,
    /// Redirect carries the bearer token itself
    Token,
}

/// OAuth client configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    pub client_id: String,
    pub client_secret: String,
    /// Must match the redirect URI registered with the provider
    pub redirect_uri: String,
    /// Comma-separated permission scopes
    pub scopes: String,
    /// HMAC key for signed OAuth state (32+ bytes)
    pub state_secret: String,
    pub state_ttl_seconds: i64,
    #[serde(default)]
    pub handoff: HandoffMode,
    pub handoff_ttl_seconds: u64,
}

/// Browser application the API serves
#[derive(Debug, Clone, Deserialize)]
pub struct FrontendConfig {
    /// Production origin, e.g. "https://echogram.example.com"
    pub url: String,
    /// Local development origin
    pub dev_origin: String,
}

impl FrontendConfig {
    /// Feed view the OAuth callback lands on
    pub fn feed_url(&self) -> String {
        format!("{}/feed", self.url.trim_end_matches('/'))
    }

    /// Origins allowed to call the API with credentials
    ///
    /// Only scheme, host and port are kept: a browser's `Origin` header never
    /// carries a path.
    pub fn allowed_origins(&self) -> Vec<String> {
        let mut origins: Vec<String> = Vec::new();
        for raw in [&self.url, &self.dev_origin] {
            let Some(origin) = origin_of(raw) else {
                continue;
            };
            if !origins.contains(&origin) {
                origins.push(origin);
            }
        }
        origins
    }
}

fn origin_of(raw: &str) -> Option<String> {
    let origin = url::Url::parse(raw.trim()).ok()?.origin();
    origin.is_tuple().then(|| origin.ascii_serialization())
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    pub level: String,
    /// Log format: "pretty" or "json"
    pub format: String,
}

/// Metrics configuration
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    pub enabled: bool,
}

impl AppConfig {
    /// Load configuration from file and environment
    ///
    /// # Loading Order
    /// 1. Default values
    /// 2. config/default.toml (if exists)
    /// 3. config/local.toml (if exists)
    /// 4. Environment variables (ECHOGRAM__*)
    ///
    /// # Errors
    /// Returns error if configuration is invalid
    pub fn load() -> Result<Self, crate::error::AppError> {
        use config::{Config, Environment, File};

        let config = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 5000)?
            .set_default("graph.base_url", "https://graph.facebook.com")?
            .set_default("graph.dialog_url", "https://www.facebook.com")?
            .set_default("graph.api_version", "v19.0")?
            .set_default("graph.timeout_seconds", 30)?
            .set_default("graph.user_agent", "EchoGram/0.1.0")?
            .set_default(
                "auth.scopes",
                "instagram_basic,instagram_manage_comments,pages_show_list",
            )?
            .set_default("auth.state_ttl_seconds", 600)?
            .set_default("auth.handoff", "code")?
            .set_default("auth.handoff_ttl_seconds", 60)?
            .set_default("frontend.dev_origin", "http://localhost:5173")?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?
            .set_default("metrics.enabled", true)?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(
                Environment::with_prefix("ECHOGRAM")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| crate::error::AppError::Config(e.to_string()))?;

        let app_config: Self = config
            .try_deserialize()
            .map_err(|e| crate::error::AppError::Config(e.to_string()))?;
        app_config.validate()?;
        Ok(app_config)
    }

    pub fn validate(&self) -> Result<(), crate::error::AppError> {
        use crate::error::AppError;

        const MIN_STATE_SECRET_BYTES: usize = 32;

        if self.auth.state_secret.len() < MIN_STATE_SECRET_BYTES {
            return Err(AppError::Config(format!(
                "auth.state_secret must be at least {} bytes",
                MIN_STATE_SECRET_BYTES
            )));
        }

        if self.auth.state_ttl_seconds <= 0 {
            return Err(AppError::Config(
                "auth.state_ttl_seconds must be greater than 0".to_string(),
            ));
        }

        if self.auth.handoff_ttl_seconds == 0 {
            return Err(AppError::Config(
                "auth.handoff_ttl_seconds must be greater than 0".to_string(),
            ));
        }

        if self.auth.client_id.trim().is_empty() {
            return Err(AppError::Config("auth.client_id must be set".to_string()));
        }

        url::Url::parse(&self.auth.redirect_uri).map_err(|e| {
            AppError::Config(format!("auth.redirect_uri is not a valid URL: {e}"))
        })?;
        url::Url::parse(&self.frontend.url)
            .map_err(|e| AppError::Config(format!("frontend.url is not a valid URL: {e}")))?;

        if self.auth.handoff == HandoffMode::Token {
            tracing::warn!(
                "auth.handoff=token places the access token in the redirect URL and browser history"
            );
        }

        Ok(())
    }
}

#[cfg(test)]
pub(crate) fn test_config() -> AppConfig {
    AppConfig {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        graph: GraphConfig {
            base_url: "https://graph.facebook.com".to_string(),
            dialog_url: "https://www.facebook.com".to_string(),
            api_version: "v19.0".to_string(),
            timeout_seconds: 30,
            user_agent: "EchoGram/test".to_string(),
        },
        auth: AuthConfig {
            client_id: "test-client-id".to_string(),
            client_secret: "test-client-secret".to_string(),
            redirect_uri: "http://localhost:5000/auth/instagram/callback".to_string(),
            scopes: "instagram_basic,instagram_manage_comments,pages_show_list".to_string(),
            state_secret: "x".repeat(32),
            state_ttl_seconds: 600,
            handoff: HandoffMode::Code,
            handoff_ttl_seconds: 60,
        },
        frontend: FrontendConfig {
            url: "https://echogram.example.com".to_string(),
            dev_origin: "http://localhost:5173".to_string(),
        },
        logging: LoggingConfig {
            level: "info".to_string(),
            format: "pretty".to_string(),
        },
        metrics: MetricsConfig { enabled: true },
    }
}
