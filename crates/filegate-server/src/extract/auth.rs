//! Bearer credential extraction and verification.

use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use axum_extra::TypedHeader;
use axum_extra::headers::Authorization;
use axum_extra::headers::authorization::Bearer;
use axum_extra::typed_header::TypedHeaderRejectionReason;
use derive_more::{Deref, Into};

use crate::TRACING_TARGET_AUTHENTICATION;
use crate::handler::{Error, ErrorKind, Result};
use crate::service::{IdentityService, Principal};

/// Raw bearer credential from the `Authorization` header.
///
/// Only checks that the header is present and well formed. Use
/// [`AuthState`] for a verified caller.
#[must_use]
#[derive(Debug, Clone, Deref, Into)]
pub struct AuthHeader(String);

impl AuthHeader {
    /// Returns the credential without the `Bearer` scheme.
    #[inline]
    pub fn token(&self) -> &str {
        &self.0
    }
}

impl<S> FromRequestParts<S> for AuthHeader
where
    S: Sync + Send,
{
    type Rejection = Error<'static>;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        type AuthBearerHeader = TypedHeader<Authorization<Bearer>>;

        match AuthBearerHeader::from_request_parts(parts, state).await {
            Ok(TypedHeader(header)) => Ok(Self(header.token().to_owned())),
            Err(rejection) => {
                let error = match rejection.reason() {
                    TypedHeaderRejectionReason::Missing => ErrorKind::MissingAuthToken.into_error(),
                    _ => ErrorKind::MalformedAuthToken.into_error(),
                };

                tracing::debug!(
                    target: TRACING_TARGET_AUTHENTICATION,
                    reason = %rejection,
                    "Request without a usable bearer token"
                );
                Err(error)
            }
        }
    }
}

/// The verified caller of the current request.
///
/// Verification runs once per request; later extractions reuse the result
/// stored in the request extensions.
#[must_use]
#[derive(Debug, Clone, Deref, Into)]
pub struct AuthState(pub Principal);

impl AuthState {
    #[inline]
    pub fn into_principal(self) -> Principal {
        self.0
    }
}

impl<S> FromRequestParts<S> for AuthState
where
    S: Sync + Send,
    IdentityService: FromRef<S>,
{
    type Rejection = Error<'static>;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(auth_state) = parts.extensions.get::<Self>() {
            return Ok(auth_state.clone());
        }

        let header = AuthHeader::from_request_parts(parts, state).await?;
        let identity = IdentityService::from_ref(state);

        let principal = identity.verify(header.token()).await?;
        tracing::debug!(
            target: TRACING_TARGET_AUTHENTICATION,
            subject = principal.subject(),
            "Request authenticated"
        );

        let auth_state = Self(principal);
        parts.extensions.insert(auth_state.clone());
        Ok(auth_state)
    }
}
