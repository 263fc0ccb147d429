//! Identity token verification.
//!
//! Handlers never see a verifier directly: the authentication middleware
//! asks the [`IdentityService`] in state to turn a bearer credential into a
//! [`Principal`] and rejects the request otherwise.

mod jwks;
mod jwt;

#[cfg(test)]
pub(crate) mod testing;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use jiff::Timestamp;
use serde::Serialize;

pub use self::jwks::JwksKeys;
pub use self::jwt::{JwtVerifier, KeySource};
use crate::Result;

/// The authenticated caller of a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    subject: String,
    email: Option<String>,
    issued_at: Timestamp,
    expires_at: Timestamp,
}

impl Principal {
    /// Creates a principal for `subject`.
    pub fn new(
        subject: impl Into<String>,
        email: Option<String>,
        issued_at: Timestamp,
        expires_at: Timestamp,
    ) -> Self {
        Self {
            subject: subject.into(),
            email,
            issued_at,
            expires_at,
        }
    }

    /// Stable user identifier issued by the identity provider.
    #[inline]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    #[inline]
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    #[inline]
    pub fn issued_at(&self) -> Timestamp {
        self.issued_at
    }

    #[inline]
    pub fn expires_at(&self) -> Timestamp {
        self.expires_at
    }
}

/// Turns an opaque bearer credential into a [`Principal`].
///
/// Rejected credentials are [`ErrorKind::Auth`] errors. Failures to reach
/// the key material are reported as [`ErrorKind::External`] so they surface
/// as server errors rather than as a 401.
///
/// [`ErrorKind::Auth`]: crate::ErrorKind::Auth
/// [`ErrorKind::External`]: crate::ErrorKind::External
#[async_trait]
pub trait IdentityVerifier: Send + Sync + 'static {
    async fn verify(&self, credential: &str) -> Result<Principal>;
}

/// Shared handle to the configured [`IdentityVerifier`].
#[derive(Clone)]
pub struct IdentityService {
    verifier: Arc<dyn IdentityVerifier>,
}

impl IdentityService {
    /// Wraps a verifier for injection into the application state.
    pub fn new(verifier: impl IdentityVerifier) -> Self {
        Self {
            verifier: Arc::new(verifier),
        }
    }

    /// Verifies `credential` with the wrapped verifier.
    #[inline]
    pub async fn verify(&self, credential: &str) -> Result<Principal> {
        self.verifier.verify(credential).await
    }
}

impl fmt::Debug for IdentityService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityService").finish_non_exhaustive()
    }
}
