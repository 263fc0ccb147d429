//! Security middleware: CORS, request body limits and response headers.

use std::time::Duration;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::Method;
use axum::http::header::{self, HeaderValue};
#[cfg(any(test, feature = "config"))]
use clap::Args;
use serde::{Deserialize, Serialize};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::set_header::SetResponseHeaderLayer;

/// Extension trait for `axum::`[`Router`] to apply security middleware.
pub trait RouterSecurityExt<S> {
    /// Layers CORS, body size limits and `nosniff` with the given config.
    fn with_security(self, config: &SecurityConfig) -> Self;

    /// Layers security middleware with permissive CORS and default limits.
    fn with_default_security(self) -> Self;
}

impl<S> RouterSecurityExt<S> for Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_security(self, config: &SecurityConfig) -> Self {
        let cors = &config.cors;
        let cors_layer = CorsLayer::new()
            .allow_origin(cors.allow_origin())
            .allow_methods([Method::GET, Method::POST, Method::DELETE])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
            .expose_headers([header::CONTENT_DISPOSITION])
            .allow_credentials(cors.allows_credentials())
            .max_age(cors.max_age());

        self.layer(DefaultBodyLimit::max(config.max_body_size))
            .layer(RequestBodyLimitLayer::new(config.max_body_size))
            .layer(cors_layer)
            .layer(SetResponseHeaderLayer::overriding(
                header::X_CONTENT_TYPE_OPTIONS,
                HeaderValue::from_static("nosniff"),
            ))
    }

    fn with_default_security(self) -> Self {
        self.with_security(&SecurityConfig::default())
    }
}

/// Request limits and CORS policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(any(test, feature = "config"), derive(Args))]
#[must_use = "config does nothing unless you use it"]
pub struct SecurityConfig {
    #[cfg_attr(any(test, feature = "config"), command(flatten))]
    #[serde(default)]
    pub cors: CorsConfig,

    /// Largest accepted request body in bytes, uploads included.
    #[cfg_attr(
        any(test, feature = "config"),
        arg(long, env = "MAX_BODY_SIZE", default_value_t = SecurityConfig::DEFAULT_MAX_BODY_SIZE)
    )]
    #[serde(default = "SecurityConfig::default_max_body_size")]
    pub max_body_size: usize,
}

impl SecurityConfig {
    pub const DEFAULT_MAX_BODY_SIZE: usize = 100 * 1024 * 1024;

    fn default_max_body_size() -> usize {
        Self::DEFAULT_MAX_BODY_SIZE
    }
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            cors: CorsConfig::default(),
            max_body_size: Self::DEFAULT_MAX_BODY_SIZE,
        }
    }
}

/// CORS (Cross-Origin Resource Sharing) configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(any(test, feature = "config"), derive(Args))]
#[must_use = "config does nothing unless you use it"]
pub struct CorsConfig {
    /// List of allowed CORS origins.
    ///
    /// If empty, every origin is allowed and credentials are not.
    #[cfg_attr(
        any(test, feature = "config"),
        arg(long, env = "CORS_ORIGINS", value_delimiter = ',')
    )]
    #[serde(default)]
    pub allowed_origins: Vec<String>,

    /// Maximum age for CORS preflight requests in seconds.
    #[cfg_attr(
        any(test, feature = "config"),
        arg(long, env = "CORS_MAX_AGE", default_value = "3600")
    )]
    pub max_age_seconds: u64,

    /// Whether to allow credentials for the listed origins.
    #[cfg_attr(
        any(test, feature = "config"),
        arg(long, env = "CORS_ALLOW_CREDENTIALS", default_value = "false")
    )]
    pub allow_credentials: bool,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: Vec::new(),
            max_age_seconds: 3600,
            allow_credentials: false,
        }
    }
}

impl CorsConfig {
    /// Returns the CORS max age as a Duration.
    pub fn max_age(&self) -> Duration {
        Duration::from_secs(self.max_age_seconds)
    }

    /// Converts configured origins to header values, skipping invalid ones.
    pub fn to_header_values(&self) -> Vec<HeaderValue> {
        self.allowed_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect()
    }

    fn allow_origin(&self) -> AllowOrigin {
        if self.allowed_origins.is_empty() {
            AllowOrigin::any()
        } else {
            AllowOrigin::list(self.to_header_values())
        }
    }

    // A wildcard origin cannot be combined with credentials.
    fn allows_credentials(&self) -> bool {
        self.allow_credentials && !self.allowed_origins.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum::routing::{get, post};
    use axum_test::TestServer;

    use super::*;

    #[test]
    fn empty_origins_never_allow_credentials() {
        let cors = CorsConfig {
            allow_credentials: true,
            ..CorsConfig::default()
        };
        assert!(!cors.allows_credentials());

        let listed = CorsConfig {
            allowed_origins: vec!["https://app.example.com".to_owned(), "\n".to_owned()],
            ..cors
        };
        assert!(listed.allows_credentials());
        assert_eq!(listed.to_header_values().len(), 1);
    }

    #[tokio::test]
    async fn responses_carry_security_headers() {
        let app = Router::new()
            .route("/", get(|| async { "ok" }))
            .with_default_security();
        let server = TestServer::new(app).unwrap();

        let response = server
            .get("/")
            .add_header("origin", "https://anywhere.example")
            .await;
        response.assert_status_ok();
        assert_eq!(response.header("x-content-type-options"), "nosniff");
        assert_eq!(response.header("access-control-allow-origin"), "*");
    }

    #[tokio::test]
    async fn oversized_bodies_are_rejected() {
        let config = SecurityConfig {
            max_body_size: 16,
            ..SecurityConfig::default()
        };
        let app = Router::new()
            .route("/", post(|body: String| async move { body }))
            .with_security(&config);
        let server = TestServer::new(app).unwrap();

        let response = server.post("/").text("x".repeat(64)).await;
        response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
    }
}
