//! Middleware configuration for the HTTP server.
//!
//! Groups the CORS, body limit and recovery settings re-exported from
//! `filegate-server`. All of them accept CLI arguments or environment
//! variables.
//!
//! # Example
//!
//! ```bash
//! # Configure CORS origins and request timeout
//! filegate --allowed-origins "https://example.com" --request-timeout 60
//! ```

use anyhow::{Result as AnyhowResult, anyhow};
use clap::Args;
use filegate_server::middleware::{RecoveryConfig, SecurityConfig};
use serde::{Deserialize, Serialize};

use crate::TRACING_TARGET_CONFIG;

/// Middleware configuration combining security and recovery settings.
#[derive(Debug, Clone, Args, Serialize, Deserialize)]
pub struct MiddlewareConfig {
    /// CORS policy and request body limits.
    #[clap(flatten)]
    pub security: SecurityConfig,

    /// Request timeout and panic recovery.
    #[clap(flatten)]
    pub recovery: RecoveryConfig,
}

impl MiddlewareConfig {
    /// Rejects a zero or excessive request timeout and an empty body limit.
    pub fn validate(&self) -> AnyhowResult<()> {
        if self.recovery.request_timeout == 0 || self.recovery.request_timeout > 300 {
            return Err(anyhow!(
                "Request timeout {} seconds is invalid. Must be between 1 and 300 seconds.",
                self.recovery.request_timeout
            ));
        }

        if self.security.max_body_size == 0 {
            return Err(anyhow!("Maximum body size must be greater than 0"));
        }

        Ok(())
    }

    /// Logs middleware configuration at info level.
    pub fn log(&self) {
        let cors = &self.security.cors;
        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            origins = ?cors.allowed_origins,
            credentials = cors.allow_credentials,
            max_age_secs = cors.max_age_seconds,
            "CORS configuration"
        );

        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            max_body_size = self.security.max_body_size,
            request_timeout_secs = self.recovery.request_timeout,
            "Request limits"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> MiddlewareConfig {
        MiddlewareConfig {
            security: SecurityConfig::default(),
            recovery: RecoveryConfig::default(),
        }
    }

    #[test]
    fn defaults_are_valid() {
        assert!(config().validate().is_ok());
    }

    #[test]
    fn reject_invalid_limits() {
        let mut config = config();
        config.recovery = RecoveryConfig::with_timeout_secs(0);
        assert!(config.validate().is_err());

        config.recovery = RecoveryConfig::with_timeout_secs(30);
        config.security.max_body_size = 0;
        assert!(config.validate().is_err());
    }
}
