//! S3-compatible provider using [`object_store::aws::AmazonS3Builder`].
//!
//! Works with AWS S3, MinIO, and any S3-compatible service. The built store
//! doubles as the presigning [`Signer`](object_store::signer::Signer).

use std::sync::Arc;

use derive_more::{Deref, Into};
use object_store::aws::AmazonS3Builder;
use serde::{Deserialize, Serialize};

use super::Client;
use crate::client::ObjectStoreClient;
use crate::types::{Error, KeyPrefix, Result};

/// Typed credentials for the S3-compatible provider.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct S3Credentials {
    /// S3 bucket name.
    pub bucket: String,
    /// AWS region (defaults to `us-east-1`).
    #[serde(default = "default_region")]
    pub region: String,
    /// Endpoint URL (e.g. `http://localhost:9000` for MinIO).
    /// Required for non-AWS S3-compatible services.
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Access key ID for static credentials.
    #[serde(default)]
    pub access_key_id: Option<String>,
    /// Secret access key for static credentials.
    #[serde(default)]
    pub secret_access_key: Option<String>,
    /// Session token for temporary credentials.
    #[serde(default)]
    pub session_token: Option<String>,
}

fn default_region() -> String {
    "us-east-1".to_string()
}

impl S3Credentials {
    /// Credentials for `bucket` in the default region, resolved from the
    /// environment for everything else.
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            region: default_region(),
            ..Self::default()
        }
    }

    fn builder(&self) -> AmazonS3Builder {
        let mut builder = AmazonS3Builder::from_env()
            .with_bucket_name(&self.bucket)
            .with_region(&self.region);

        if let Some(endpoint) = &self.endpoint {
            builder = builder.with_endpoint(endpoint);
            if endpoint.starts_with("http://") {
                builder = builder.with_allow_http(true);
            }
        }

        if let Some(access_key) = &self.access_key_id {
            builder = builder.with_access_key_id(access_key);
        }

        if let Some(secret_key) = &self.secret_access_key {
            builder = builder.with_secret_access_key(secret_key);
        }

        if let Some(token) = &self.session_token {
            builder = builder.with_token(token);
        }

        builder
    }
}

/// S3-backed object storage client.
#[derive(Debug, Clone, Deref, Into)]
pub struct S3Provider(ObjectStoreClient);

impl Client for S3Provider {
    type Credentials = S3Credentials;

    const ID: &str = "s3";

    async fn connect(creds: &Self::Credentials, prefix: KeyPrefix) -> Result<Self> {
        if creds.bucket.is_empty() {
            return Err(Error::new(
                crate::ErrorKind::InvalidKey,
                Self::ID,
                "bucket name is required",
            ));
        }

        let store = creds
            .builder()
            .build()
            .map_err(|e| Error::unavailable(Self::ID, &e).with_source(e))?;

        let store = Arc::new(store);
        let client = ObjectStoreClient::with_signer(store.clone(), store, prefix);
        tracing::debug!(
            bucket = %creds.bucket,
            region = %creds.region,
            "s3 object store configured"
        );
        Ok(Self(client))
    }
}
