//! ID token verification with [`jsonwebtoken`].

use std::fmt;
use std::path::Path;

use async_trait::async_trait;
use jiff::Timestamp;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, decode_header};
use serde::Deserialize;

use super::{IdentityVerifier, JwksKeys, Principal};
use crate::utility::tracing_targets::TRACING_TARGET_IDENTITY as TRACING_TARGET;
use crate::{Error, Result};

/// Where token signing keys come from.
pub enum KeySource {
    /// A single key used for every token.
    Static(DecodingKey),
    /// A remote key set selected by the token's `kid` header.
    Jwks(JwksKeys),
}

impl KeySource {
    /// Loads an RSA public key from a PEM file.
    pub async fn from_rsa_pem_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let pem = tokio::fs::read(path).await.map_err(|e| {
            Error::config(format!("cannot read public key {}", path.display())).with_source(e)
        })?;

        let key = DecodingKey::from_rsa_pem(&pem).map_err(|e| {
            Error::config(format!("invalid public key {}", path.display())).with_source(e)
        })?;

        tracing::info!(
            target: TRACING_TARGET,
            path = %path.display(),
            "Identity public key loaded"
        );

        Ok(Self::Static(key))
    }

    /// A shared secret, for HMAC-signed tokens.
    pub fn secret(secret: &[u8]) -> Self {
        Self::Static(DecodingKey::from_secret(secret))
    }

    async fn key_for(&self, token: &str) -> Result<DecodingKey> {
        match self {
            Self::Static(key) => Ok(key.clone()),
            Self::Jwks(keys) => {
                let header = decode_header(token)
                    .map_err(|e| Error::auth("malformed token header").with_source(e))?;
                let kid = header
                    .kid
                    .ok_or_else(|| Error::auth("token header has no key id"))?;
                keys.key(&kid).await
            }
        }
    }
}

impl fmt::Debug for KeySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(_) => f.write_str("Static"),
            Self::Jwks(keys) => f.debug_tuple("Jwks").field(keys).finish(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct IdTokenClaims {
    sub: String,
    iat: i64,
    exp: i64,
    #[serde(default)]
    email: Option<String>,
}

/// Verifies identity-provider ID tokens issued for one project.
///
/// A token is accepted when its signature checks out against the
/// [`KeySource`], it is not expired, `iss` is
/// `https://securetoken.google.com/<project>`, `aud` is the project id and
/// `sub` is non-empty.
#[derive(Debug)]
pub struct JwtVerifier {
    project_id: String,
    keys: KeySource,
    validation: Validation,
}

impl JwtVerifier {
    /// Issuer prefix of every accepted token.
    pub const ISSUER_PREFIX: &str = "https://securetoken.google.com/";

    /// Creates an RS256 verifier for `project_id`.
    pub fn new(project_id: impl Into<String>, keys: KeySource) -> Self {
        let project_id = project_id.into();
        let validation = Self::validation(&project_id, Algorithm::RS256);
        Self {
            project_id,
            keys,
            validation,
        }
    }

    /// Accepts tokens signed with `algorithm` instead of RS256.
    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.validation = Self::validation(&self.project_id, algorithm);
        self
    }

    #[inline]
    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    fn validation(project_id: &str, algorithm: Algorithm) -> Validation {
        let mut validation = Validation::new(algorithm);
        validation.set_issuer(&[format!("{}{}", Self::ISSUER_PREFIX, project_id)]);
        validation.set_audience(&[project_id]);
        validation.set_required_spec_claims(&["exp", "iat", "sub", "iss", "aud"]);
        validation
    }
}

#[async_trait]
impl IdentityVerifier for JwtVerifier {
    async fn verify(&self, credential: &str) -> Result<Principal> {
        let key = self.keys.key_for(credential).await?;

        let data = decode::<IdTokenClaims>(credential, &key, &self.validation).map_err(|e| {
            tracing::debug!(target: TRACING_TARGET, error = %e, "Token rejected");
            Error::auth("invalid identity token").with_source(e)
        })?;

        let claims = data.claims;
        if claims.sub.is_empty() {
            return Err(Error::auth("token subject is empty"));
        }

        let issued_at = Timestamp::from_second(claims.iat)
            .map_err(|e| Error::auth("token issued-at is out of range").with_source(e))?;
        let expires_at = Timestamp::from_second(claims.exp)
            .map_err(|e| Error::auth("token expiry is out of range").with_source(e))?;

        Ok(Principal::new(claims.sub, claims.email, issued_at, expires_at))
    }
}
