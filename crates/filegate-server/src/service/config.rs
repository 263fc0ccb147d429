//! Service configuration: storage, links, archives, identity and documents.

use std::path::PathBuf;
use std::time::Duration;

#[cfg(any(test, feature = "config"))]
use clap::{Args, ValueEnum};
use filegate_object::client::ObjectStoreClient;
use filegate_object::providers::{Client, MemoryProvider, S3Credentials, S3Provider};
use filegate_object::types::KeyPrefix;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::service::{
    AccountService, ArchiveOptions, DocumentFetcher, IdentityService, IdentityToolkitDirectory,
    JwksKeys, JwtVerifier, KeySource, ServiceAccountKey, ServiceAccountTokens,
};
use crate::{Error, Result};

/// Default values for configuration options.
mod defaults {
    pub const S3_REGION: &str = "us-east-1";
    pub const KEY_PREFIX: &str = "uploads/";
    pub const LINK_EXPIRY_SECS: u64 = 60;
    pub const ARCHIVE_FETCH_TIMEOUT_SECS: u64 = 30;
    pub const IDENTITY_JWKS_URL: &str =
        "https://www.googleapis.com/service_accounts/v1/jwk/securetoken@system.gserviceaccount.com";
    pub const IDENTITY_ADMIN_ENDPOINT: &str = "https://identitytoolkit.googleapis.com/v1";
    pub const DOCUMENT_FETCH_TIMEOUT_SECS: u64 = 30;
    pub const DOCUMENT_MAX_SIZE: u64 = 100 * 1024 * 1024;
}

/// Backend holding the bucket.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(any(test, feature = "config"), derive(ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Process-local store; links cannot be presigned.
    Memory,
    /// S3 or an S3-compatible service.
    #[default]
    S3,
}

/// App [`state`] configuration.
///
/// [`state`]: crate::service::ServiceState
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(any(test, feature = "config"), derive(Args))]
#[must_use = "config does nothing unless you use it"]
pub struct ServiceConfig {
    /// Object storage backend.
    #[cfg_attr(
        any(test, feature = "config"),
        arg(long, env = "STORAGE_BACKEND", value_enum, default_value = "s3")
    )]
    #[serde(default)]
    pub storage_backend: StorageBackend,

    /// Bucket holding every uploaded file.
    #[cfg_attr(any(test, feature = "config"), arg(long, env = "S3_BUCKET_NAME"))]
    #[serde(default)]
    pub s3_bucket: Option<String>,

    /// Bucket region.
    #[cfg_attr(
        any(test, feature = "config"),
        arg(long, env = "AWS_REGION", default_value = defaults::S3_REGION)
    )]
    #[serde(default = "ServiceConfig::default_s3_region")]
    pub s3_region: String,

    /// Endpoint of an S3-compatible service (e.g. `http://localhost:9000`).
    #[cfg_attr(any(test, feature = "config"), arg(long, env = "S3_ENDPOINT"))]
    #[serde(default)]
    pub s3_endpoint: Option<String>,

    /// Static access key id; the environment chain is used when unset.
    #[cfg_attr(any(test, feature = "config"), arg(long, env = "AWS_ACCESS_KEY_ID"))]
    #[serde(default)]
    pub s3_access_key_id: Option<String>,

    #[cfg_attr(
        any(test, feature = "config"),
        arg(long, env = "AWS_SECRET_ACCESS_KEY", hide_env_values = true)
    )]
    #[serde(default)]
    pub s3_secret_access_key: Option<String>,

    #[cfg_attr(
        any(test, feature = "config"),
        arg(long, env = "AWS_SESSION_TOKEN", hide_env_values = true)
    )]
    #[serde(default)]
    pub s3_session_token: Option<String>,

    /// Namespace prepended to every file key.
    #[cfg_attr(
        any(test, feature = "config"),
        arg(long, env = "STORAGE_KEY_PREFIX", default_value = defaults::KEY_PREFIX)
    )]
    #[serde(default = "ServiceConfig::default_key_prefix")]
    pub key_prefix: String,

    /// Lifetime of presigned download links in seconds.
    #[cfg_attr(
        any(test, feature = "config"),
        arg(long, env = "LINK_EXPIRY_SECS", default_value_t = defaults::LINK_EXPIRY_SECS)
    )]
    #[serde(default = "ServiceConfig::default_link_expiry_secs")]
    pub link_expiry_secs: u64,

    /// Timeout for opening, and for each read from, an archive entry.
    #[cfg_attr(
        any(test, feature = "config"),
        arg(
            long,
            env = "ARCHIVE_FETCH_TIMEOUT_SECS",
            default_value_t = defaults::ARCHIVE_FETCH_TIMEOUT_SECS
        )
    )]
    #[serde(default = "ServiceConfig::default_archive_fetch_timeout_secs")]
    pub archive_fetch_timeout_secs: u64,

    /// Identity project whose ID tokens are accepted.
    #[cfg_attr(
        any(test, feature = "config"),
        arg(long, env = "IDENTITY_PROJECT_ID", default_value = "")
    )]
    #[serde(default)]
    pub identity_project_id: String,

    /// Key set used to verify ID tokens.
    #[cfg_attr(
        any(test, feature = "config"),
        arg(long, env = "IDENTITY_JWKS_URL", default_value = defaults::IDENTITY_JWKS_URL)
    )]
    #[serde(default = "ServiceConfig::default_identity_jwks_url")]
    pub identity_jwks_url: String,

    /// PEM public key used instead of the key set when set.
    #[cfg_attr(any(test, feature = "config"), arg(long, env = "IDENTITY_PUBLIC_KEY_PEM"))]
    #[serde(default)]
    pub identity_public_key: Option<PathBuf>,

    /// Service-account key file used to mint account administration tokens;
    /// deletion is disabled without it.
    #[cfg_attr(
        any(test, feature = "config"),
        arg(long, env = "IDENTITY_SERVICE_ACCOUNT_KEY")
    )]
    #[serde(default)]
    pub identity_service_account: Option<PathBuf>,

    /// Account administration API root.
    #[cfg_attr(
        any(test, feature = "config"),
        arg(
            long,
            env = "IDENTITY_ADMIN_ENDPOINT",
            default_value = defaults::IDENTITY_ADMIN_ENDPOINT
        )
    )]
    #[serde(default = "ServiceConfig::default_identity_admin_endpoint")]
    pub identity_admin_endpoint: String,

    /// Timeout for downloading an edited document.
    #[cfg_attr(
        any(test, feature = "config"),
        arg(
            long,
            env = "DOCUMENT_FETCH_TIMEOUT_SECS",
            default_value_t = defaults::DOCUMENT_FETCH_TIMEOUT_SECS
        )
    )]
    #[serde(default = "ServiceConfig::default_document_fetch_timeout_secs")]
    pub document_fetch_timeout_secs: u64,

    /// Largest edited document accepted, in bytes.
    #[cfg_attr(
        any(test, feature = "config"),
        arg(long, env = "DOCUMENT_MAX_SIZE", default_value_t = defaults::DOCUMENT_MAX_SIZE)
    )]
    #[serde(default = "ServiceConfig::default_document_max_size")]
    pub document_max_size: u64,
}

impl ServiceConfig {
    fn default_s3_region() -> String {
        defaults::S3_REGION.to_owned()
    }

    fn default_key_prefix() -> String {
        defaults::KEY_PREFIX.to_owned()
    }

    fn default_link_expiry_secs() -> u64 {
        defaults::LINK_EXPIRY_SECS
    }

    fn default_archive_fetch_timeout_secs() -> u64 {
        defaults::ARCHIVE_FETCH_TIMEOUT_SECS
    }

    fn default_identity_jwks_url() -> String {
        defaults::IDENTITY_JWKS_URL.to_owned()
    }

    fn default_identity_admin_endpoint() -> String {
        defaults::IDENTITY_ADMIN_ENDPOINT.to_owned()
    }

    fn default_document_fetch_timeout_secs() -> u64 {
        defaults::DOCUMENT_FETCH_TIMEOUT_SECS
    }

    fn default_document_max_size() -> u64 {
        defaults::DOCUMENT_MAX_SIZE
    }

    /// Validates all configuration values.
    ///
    /// # Errors
    ///
    /// Returns a [`Config`] error when:
    /// - the S3 backend is selected without a bucket
    /// - the identity project id is empty
    /// - a timeout or the link expiry is zero
    /// - a configured URL does not parse
    ///
    /// [`Config`]: crate::ErrorKind::Config
    pub fn validate(&self) -> Result<()> {
        if self.storage_backend == StorageBackend::S3
            && self.s3_bucket.as_deref().is_none_or(str::is_empty)
        {
            return Err(Error::config("S3 bucket name is required for the s3 backend"));
        }

        if self.identity_project_id.is_empty() {
            return Err(Error::config("Identity project id cannot be empty"));
        }

        if self.link_expiry_secs == 0 {
            return Err(Error::config("Link expiry must be at least 1 second"));
        }

        // SigV4 presigned URLs are capped at seven days.
        if self.link_expiry_secs > 7 * 24 * 60 * 60 {
            return Err(Error::config("Link expiry cannot exceed 7 days"));
        }

        if self.archive_fetch_timeout_secs == 0 || self.document_fetch_timeout_secs == 0 {
            return Err(Error::config("Fetch timeouts must be at least 1 second"));
        }

        if self.document_max_size == 0 {
            return Err(Error::config("Document size limit must be greater than 0"));
        }

        parse_url("identity key set", &self.identity_jwks_url)?;
        parse_url("identity admin endpoint", &self.identity_admin_endpoint)?;

        Ok(())
    }

    /// Builds the namespaced object store client for the selected backend.
    pub async fn connect_object_store(&self) -> Result<ObjectStoreClient> {
        let prefix = KeyPrefix::new(self.key_prefix.clone());

        let client = match self.storage_backend {
            StorageBackend::Memory => {
                tracing::warn!("Using the in-memory object store; files are not persisted");
                MemoryProvider::connect(&(), prefix).await?.into()
            }
            StorageBackend::S3 => {
                let creds = S3Credentials {
                    bucket: self.s3_bucket.clone().unwrap_or_default(),
                    region: self.s3_region.clone(),
                    endpoint: self.s3_endpoint.clone(),
                    access_key_id: self.s3_access_key_id.clone(),
                    secret_access_key: self.s3_secret_access_key.clone(),
                    session_token: self.s3_session_token.clone(),
                };
                let client: ObjectStoreClient = S3Provider::connect(&creds, prefix).await?.into();
                client.verify_reachable().await?;
                client
            }
        };

        Ok(client)
    }

    /// Canonical lifetime of every presigned link.
    #[inline]
    pub fn link_expiry(&self) -> Duration {
        Duration::from_secs(self.link_expiry_secs)
    }

    #[inline]
    pub fn archive_options(&self) -> ArchiveOptions {
        ArchiveOptions {
            fetch_timeout: Duration::from_secs(self.archive_fetch_timeout_secs),
        }
    }

    /// Loads the ID token verifier: a static PEM key when configured,
    /// otherwise the remote key set.
    pub async fn load_identity(&self, client: &reqwest::Client) -> Result<IdentityService> {
        let keys = match &self.identity_public_key {
            Some(path) => KeySource::from_rsa_pem_file(path).await?,
            None => {
                let url = parse_url("identity key set", &self.identity_jwks_url)?;
                KeySource::Jwks(JwksKeys::new(client.clone(), url))
            }
        };

        Ok(IdentityService::new(JwtVerifier::new(
            self.identity_project_id.clone(),
            keys,
        )))
    }

    /// Builds account administration, minting its access tokens from the
    /// service-account key when one is configured.
    pub async fn account_service(&self, client: &reqwest::Client) -> Result<AccountService> {
        let endpoint = parse_url("identity admin endpoint", &self.identity_admin_endpoint)?;
        let tokens = match &self.identity_service_account {
            Some(path) => {
                let key = ServiceAccountKey::from_file(path).await?;
                Some(ServiceAccountTokens::new(
                    client.clone(),
                    &key,
                    ServiceAccountTokens::IDENTITY_SCOPES,
                )?)
            }
            None => {
                tracing::warn!("No service account key configured; user deletion is disabled");
                None
            }
        };

        Ok(AccountService::new(IdentityToolkitDirectory::new(
            client.clone(),
            endpoint,
            self.identity_project_id.clone(),
            tokens,
        )))
    }

    pub fn document_fetcher(&self) -> Result<DocumentFetcher> {
        DocumentFetcher::new(
            Duration::from_secs(self.document_fetch_timeout_secs),
            self.document_max_size,
        )
    }
}

fn parse_url(what: &str, value: &str) -> Result<Url> {
    Url::parse(value).map_err(|e| Error::config(format!("Invalid {what} url '{value}'")).with_source(e))
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            storage_backend: StorageBackend::default(),
            s3_bucket: None,
            s3_region: Self::default_s3_region(),
            s3_endpoint: None,
            s3_access_key_id: None,
            s3_secret_access_key: None,
            s3_session_token: None,
            key_prefix: Self::default_key_prefix(),
            link_expiry_secs: defaults::LINK_EXPIRY_SECS,
            archive_fetch_timeout_secs: defaults::ARCHIVE_FETCH_TIMEOUT_SECS,
            identity_project_id: String::new(),
            identity_jwks_url: Self::default_identity_jwks_url(),
            identity_public_key: None,
            identity_service_account: None,
            identity_admin_endpoint: Self::default_identity_admin_endpoint(),
            document_fetch_timeout_secs: defaults::DOCUMENT_FETCH_TIMEOUT_SECS,
            document_max_size: defaults::DOCUMENT_MAX_SIZE,
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;
    use crate::ErrorKind;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        service: ServiceConfig,
    }

    fn valid() -> ServiceConfig {
        ServiceConfig {
            s3_bucket: Some("files".to_owned()),
            identity_project_id: "filegate-test".to_owned(),
            ..ServiceConfig::default()
        }
    }

    #[test]
    fn defaults_match_the_documented_values() {
        let config = ServiceConfig::default();
        assert_eq!(config.link_expiry(), Duration::from_secs(60));
        assert_eq!(config.archive_options(), ArchiveOptions::default());
        assert_eq!(config.key_prefix, "uploads/");
        assert_eq!(config.document_max_size, 100 * 1024 * 1024);
    }

    #[test]
    fn valid_config_passes() {
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn s3_requires_a_bucket() {
        let config = ServiceConfig {
            s3_bucket: None,
            ..valid()
        };
        assert_eq!(config.validate().unwrap_err().kind(), ErrorKind::Config);

        let memory = ServiceConfig {
            storage_backend: StorageBackend::Memory,
            ..config
        };
        assert!(memory.validate().is_ok());
    }

    #[test]
    fn rejects_out_of_range_values() {
        let timeout = ServiceConfig {
            archive_fetch_timeout_secs: 0,
            ..valid()
        };
        assert!(timeout.validate().is_err());

        let expiry = ServiceConfig {
            link_expiry_secs: 0,
            ..valid()
        };
        assert!(expiry.validate().is_err());

        let project = ServiceConfig {
            identity_project_id: String::new(),
            ..valid()
        };
        assert!(project.validate().is_err());

        let url = ServiceConfig {
            identity_jwks_url: "not a url".to_owned(),
            ..valid()
        };
        assert!(url.validate().is_err());
    }

    #[tokio::test]
    async fn missing_service_account_key_is_a_config_error() {
        let config = ServiceConfig {
            identity_service_account: Some(PathBuf::from("/nonexistent/service-account.json")),
            ..valid()
        };
        let err = config
            .account_service(&reqwest::Client::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn parses_from_the_command_line() {
        let cli = TestCli::parse_from([
            "filegate",
            "--storage-backend",
            "memory",
            "--identity-project-id",
            "demo",
            "--link-expiry-secs",
            "120",
        ]);
        assert_eq!(cli.service.storage_backend, StorageBackend::Memory);
        assert_eq!(cli.service.link_expiry(), Duration::from_secs(120));
        assert_eq!(cli.service.archive_fetch_timeout_secs, 30);
        assert!(cli.service.validate().is_ok());
    }

    #[tokio::test]
    async fn memory_backend_connects_without_network() {
        let config = ServiceConfig {
            storage_backend: StorageBackend::Memory,
            key_prefix: "tenant/".to_owned(),
            ..valid()
        };
        let client = config.connect_object_store().await.unwrap();
        assert_eq!(client.prefix().as_str(), "tenant/");
        assert!(!client.can_presign());
    }
}
