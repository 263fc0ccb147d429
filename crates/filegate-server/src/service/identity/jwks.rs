//! Cached remote JSON Web Key Set.

use std::fmt;
use std::time::{Duration, Instant};

use jsonwebtoken::DecodingKey;
use jsonwebtoken::jwk::{Jwk, JwkSet};
use tokio::sync::RwLock;
use url::Url;

use crate::utility::tracing_targets::TRACING_TARGET_IDENTITY as TRACING_TARGET;
use crate::{Error, Result};

struct CachedKeys {
    set: JwkSet,
    fetched_at: Instant,
}

/// Signing keys published at a JWKS endpoint.
///
/// The set is fetched lazily and kept for `ttl`. A token naming an unknown
/// `kid` triggers a refresh, at most once per `min_refresh`, so rotated keys
/// are picked up without letting random key ids hammer the endpoint.
pub struct JwksKeys {
    client: reqwest::Client,
    url: Url,
    ttl: Duration,
    min_refresh: Duration,
    cache: RwLock<Option<CachedKeys>>,
}

impl JwksKeys {
    /// Public keys of the Google secure token service.
    pub const GOOGLE_SECURETOKEN: &str =
        "https://www.googleapis.com/service_accounts/v1/jwk/securetoken@system.gserviceaccount.com";

    pub const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60);
    pub const DEFAULT_MIN_REFRESH: Duration = Duration::from_secs(30);

    /// Creates an empty cache for the key set at `url`.
    pub fn new(client: reqwest::Client, url: Url) -> Self {
        Self {
            client,
            url,
            ttl: Self::DEFAULT_TTL,
            min_refresh: Self::DEFAULT_MIN_REFRESH,
            cache: RwLock::new(None),
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_min_refresh(mut self, min_refresh: Duration) -> Self {
        self.min_refresh = min_refresh;
        self
    }

    /// Returns the decoding key for `kid`, refreshing the set when needed.
    pub async fn key(&self, kid: &str) -> Result<DecodingKey> {
        {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.as_ref() {
                let age = cached.fetched_at.elapsed();
                if age < self.ttl
                    && let Some(jwk) = cached.set.find(kid)
                {
                    return decoding_key(jwk);
                }
                if age < self.min_refresh {
                    return Err(unknown_key(kid));
                }
            }
        }

        let mut cache = self.cache.write().await;

        // Another request may have refreshed the set while this one waited.
        if let Some(cached) = cache.as_ref()
            && cached.fetched_at.elapsed() < self.min_refresh
        {
            return match cached.set.find(kid) {
                Some(jwk) => decoding_key(jwk),
                None => Err(unknown_key(kid)),
            };
        }

        let set = self.fetch().await?;
        let key = set.find(kid).map(decoding_key);
        *cache = Some(CachedKeys {
            set,
            fetched_at: Instant::now(),
        });

        key.unwrap_or_else(|| Err(unknown_key(kid)))
    }

    async fn fetch(&self) -> Result<JwkSet> {
        let response = self
            .client
            .get(self.url.clone())
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| Error::external("jwks", "failed to fetch signing keys").with_source(e))?;

        let set: JwkSet = response
            .json()
            .await
            .map_err(|e| Error::external("jwks", "invalid signing key set").with_source(e))?;

        tracing::debug!(
            target: TRACING_TARGET,
            url = %self.url,
            keys = set.keys.len(),
            "Signing keys refreshed"
        );

        Ok(set)
    }
}

impl fmt::Debug for JwksKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwksKeys")
            .field("url", &self.url.as_str())
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

fn decoding_key(jwk: &Jwk) -> Result<DecodingKey> {
    DecodingKey::from_jwk(jwk).map_err(|e| Error::auth("unusable signing key").with_source(e))
}

fn unknown_key(kid: &str) -> Error {
    Error::auth(format!("unknown signing key '{kid}'"))
}
