//! OAuth2 access tokens minted from a service-account key.

use std::fmt;
use std::path::Path;
use std::time::{Duration, Instant};

use jiff::Timestamp;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use url::Url;

use crate::utility::tracing_targets::TRACING_TARGET_IDENTITY as TRACING_TARGET;
use crate::{Error, Result};

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// The fields of a downloaded service-account key file that token minting
/// needs.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default = "ServiceAccountKey::default_token_uri")]
    pub token_uri: String,
}

impl ServiceAccountKey {
    pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

    fn default_token_uri() -> String {
        Self::DEFAULT_TOKEN_URI.to_owned()
    }

    /// Reads a JSON key file.
    pub async fn from_file(path: &Path) -> Result<Self> {
        let raw = tokio::fs::read(path).await.map_err(|e| {
            Error::config(format!(
                "cannot read service account key '{}'",
                path.display()
            ))
            .with_source(e)
        })?;

        serde_json::from_slice(&raw)
            .map_err(|e| Error::config("invalid service account key file").with_source(e))
    }
}

impl fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key_id", &self.private_key_id)
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}

#[derive(Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

struct CachedToken {
    value: String,
    refresh_at: Instant,
}

/// Access tokens for one service account.
///
/// A token is minted with the JWT-bearer grant on first use and reused
/// until [`REFRESH_MARGIN`] before it expires. Concurrent callers share a
/// single refresh.
///
/// [`REFRESH_MARGIN`]: ServiceAccountTokens::REFRESH_MARGIN
pub struct ServiceAccountTokens {
    client: reqwest::Client,
    client_email: String,
    key_id: Option<String>,
    signing_key: EncodingKey,
    token_uri: Url,
    scope: String,
    cache: Mutex<Option<CachedToken>>,
}

impl ServiceAccountTokens {
    /// Scopes needed for account administration.
    pub const IDENTITY_SCOPES: &str = "https://www.googleapis.com/auth/identitytoolkit \
                                       https://www.googleapis.com/auth/cloud-platform";

    pub const REFRESH_MARGIN: Duration = Duration::from_secs(60);

    const ASSERTION_LIFETIME_SECS: i64 = 60 * 60;

    pub fn new(
        client: reqwest::Client,
        key: &ServiceAccountKey,
        scope: impl Into<String>,
    ) -> Result<Self> {
        let signing_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .map_err(|e| Error::config("invalid service account private key").with_source(e))?;
        let token_uri = Url::parse(&key.token_uri).map_err(|e| {
            Error::config(format!("invalid token uri '{}'", key.token_uri)).with_source(e)
        })?;

        Ok(Self {
            client,
            client_email: key.client_email.clone(),
            key_id: key.private_key_id.clone(),
            signing_key,
            token_uri,
            scope: scope.into(),
            cache: Mutex::new(None),
        })
    }

    /// Returns a usable access token, minting a new one when needed.
    pub async fn access_token(&self) -> Result<String> {
        let mut cache = self.cache.lock().await;

        if let Some(cached) = cache.as_ref()
            && Instant::now() < cached.refresh_at
        {
            return Ok(cached.value.clone());
        }

        let minted = self.mint().await?;
        let value = minted.value.clone();
        *cache = Some(minted);
        Ok(value)
    }

    /// Drops the cached token so the next call mints a new one.
    pub async fn invalidate(&self) {
        *self.cache.lock().await = None;
    }

    async fn mint(&self) -> Result<CachedToken> {
        let requested_at = Instant::now();
        let iat = Timestamp::now().as_second();
        let claims = AssertionClaims {
            iss: &self.client_email,
            scope: &self.scope,
            aud: self.token_uri.as_str(),
            iat,
            exp: iat + Self::ASSERTION_LIFETIME_SECS,
        };

        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.key_id.clone();
        let assertion = jsonwebtoken::encode(&header, &claims, &self.signing_key)
            .map_err(|e| Error::internal("oauth", "cannot sign token assertion").with_source(e))?;

        let response = self
            .client
            .post(self.token_uri.clone())
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(|e| Error::external("oauth", "token request failed").with_source(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::external(
                "oauth",
                format!("token request rejected ({status})"),
            ));
        }

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| Error::external("oauth", "invalid token response").with_source(e))?;

        tracing::debug!(
            target: TRACING_TARGET,
            client_email = %self.client_email,
            expires_in = body.expires_in,
            "Access token minted"
        );

        let lifetime = Duration::from_secs(body.expires_in).saturating_sub(Self::REFRESH_MARGIN);
        Ok(CachedToken {
            value: body.access_token,
            refresh_at: requested_at + lifetime,
        })
    }
}

impl fmt::Debug for ServiceAccountTokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountTokens")
            .field("client_email", &self.client_email)
            .field("token_uri", &self.token_uri.as_str())
            .finish_non_exhaustive()
    }
}
