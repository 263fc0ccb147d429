//! Middleware for `axum::Router` and HTTP request processing.
//!
//! - Authentication of private routes
//! - Recovery from panics, timeouts and middleware errors
//! - Observability (request ids, tracing spans, redacted headers)
//! - Security (CORS, body limits, response headers)
//!
//! ```rust,no_run
//! use axum::Router;
//! use filegate_server::middleware::{
//!     RecoveryConfig, RouterObservabilityExt, RouterRecoveryExt, RouterSecurityExt, SecurityConfig,
//! };
//!
//! let app: Router = Router::new()
//!     .with_security(&SecurityConfig::default())
//!     .with_observability()
//!     .with_recovery(&RecoveryConfig::default());
//! ```

mod auth;
mod observability;
mod recovery;
mod security;

pub use auth::require_authentication;
pub use observability::RouterObservabilityExt;
pub use recovery::{RecoveryConfig, RouterRecoveryExt};
pub use security::{CorsConfig, RouterSecurityExt, SecurityConfig};
