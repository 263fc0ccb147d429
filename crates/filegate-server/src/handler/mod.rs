//! All `axum::`[`Router`]s with related `axum::`[`Handler`]s.
//!
//! # Usage Example
//!
//! ```rust,no_run
//! use filegate_server::handler::routes;
//! use filegate_server::middleware::{RouterRecoveryExt, RouterSecurityExt};
//! use filegate_server::service::{ServiceConfig, ServiceState};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = ServiceConfig::default();
//! let state = ServiceState::from_config(&config).await?;
//!
//! let router: axum::Router = routes(state.clone())
//!     .with_default_security()
//!     .with_default_recovery()
//!     .with_state(state);
//! # Ok(())
//! # }
//! ```
//!
//! [`Router`]: axum::routing::Router
//! [`Handler`]: axum::handler::Handler

mod accounts;
mod documents;
mod error;
mod files;
mod monitors;
pub mod request;
pub mod response;

use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::response::{IntoResponse, Response};

pub use crate::handler::error::{Error, ErrorKind, Result};
use crate::middleware::require_authentication;
use crate::service::ServiceState;

#[inline]
async fn handler() -> Response {
    ErrorKind::NotFound.into_response()
}

/// Returns a [`Router`] with all routes that require a bearer token.
fn private_routes() -> Router<ServiceState> {
    Router::new()
        .merge(files::routes())
        .merge(accounts::routes())
}

/// Returns a [`Router`] with all public routes.
fn public_routes() -> Router<ServiceState> {
    Router::new()
        .merge(documents::routes())
        .merge(monitors::routes())
}

/// Returns a [`Router`] with all routes.
///
/// Private routes are guarded by [`require_authentication`]; unknown paths
/// answer with a JSON `404`.
pub fn routes(state: ServiceState) -> Router<ServiceState> {
    let require_authentication = from_fn_with_state(state, require_authentication);

    // Private routes with authentication middleware
    let private_router = private_routes().route_layer(require_authentication);

    // Public routes without authentication
    let public_router = public_routes();

    Router::new()
        .merge(private_router)
        .merge(public_router)
        .fallback(handler)
}

#[cfg(test)]
pub(crate) mod test {
    use std::collections::HashSet;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use async_trait::async_trait;
    use axum::http::Method;
    use axum_test::TestServer;
    use filegate_object::client::ObjectStoreClient;
    use filegate_object::types::KeyPrefix;
    use object_store::memory::InMemory;
    use object_store::path::Path;
    use object_store::signer::Signer;
    use url::Url;

    use super::routes;
    use crate::service::testing::{token, verifier};
    use crate::service::{
        AccountDirectory, AccountService, DocumentFetcher, IdentityService, ServiceState,
    };

    /// Signs links as `https://bucket.example.com/<path>?X-Amz-Expires=<secs>`.
    #[derive(Debug)]
    pub struct FakeSigner;

    #[async_trait]
    impl Signer for FakeSigner {
        async fn signed_url(
            &self,
            _method: Method,
            path: &Path,
            expires_in: Duration,
        ) -> object_store::Result<Url> {
            let raw = format!(
                "https://bucket.example.com/{path}?X-Amz-Expires={}",
                expires_in.as_secs()
            );
            Ok(Url::parse(&raw).unwrap())
        }
    }

    /// Account directory holding a fixed set of users.
    #[derive(Default)]
    pub struct FakeDirectory {
        users: Mutex<HashSet<String>>,
    }

    impl FakeDirectory {
        pub fn with_users(users: &[&str]) -> Self {
            let users = users.iter().map(|u| (*u).to_owned()).collect();
            Self {
                users: Mutex::new(users),
            }
        }
    }

    #[async_trait]
    impl AccountDirectory for FakeDirectory {
        async fn delete_account(&self, user_id: &str) -> crate::Result<()> {
            if self.users.lock().unwrap().remove(user_id) {
                Ok(())
            } else {
                Err(crate::Error::not_found("User not found"))
            }
        }
    }

    /// Returns state over an in-memory bucket that can presign links.
    pub fn create_test_state() -> ServiceState {
        let objects = ObjectStoreClient::with_signer(
            Arc::new(InMemory::new()),
            Arc::new(FakeSigner),
            KeyPrefix::default(),
        );

        ServiceState::new(
            objects,
            IdentityService::new(verifier()),
            AccountService::new(FakeDirectory::with_users(&["user-1"])),
            DocumentFetcher::new(
                DocumentFetcher::DEFAULT_TIMEOUT,
                DocumentFetcher::DEFAULT_MAX_SIZE,
            )
            .unwrap(),
        )
    }

    /// Returns a new [`TestServer`] serving all routes over `state`.
    pub fn create_test_server_with_state(state: ServiceState) -> anyhow::Result<TestServer> {
        let app = routes(state.clone()).with_state(state);
        let server = TestServer::new(app)?;
        Ok(server)
    }

    /// Returns a new [`TestServer`] with the default test state.
    pub fn create_test_server() -> anyhow::Result<(TestServer, ServiceState)> {
        let state = create_test_state();
        let server = create_test_server_with_state(state.clone())?;
        Ok((server, state))
    }

    /// `Authorization` header value carrying a valid token for `subject`.
    pub fn bearer(subject: &str) -> String {
        format!("Bearer {}", token(subject))
    }

    #[tokio::test]
    async fn handlers() -> anyhow::Result<()> {
        let (server, _) = create_test_server()?;
        assert!(server.is_running());
        Ok(())
    }

    #[tokio::test]
    async fn unknown_routes_are_json_not_found() -> anyhow::Result<()> {
        let (server, _) = create_test_server()?;

        let response = server.get("/nowhere").expect_failure().await;
        response.assert_status_not_found();
        let body: serde_json::Value = response.json();
        assert_eq!(body["error"], "not_found");
        Ok(())
    }
}
