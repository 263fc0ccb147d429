//! Provider trait for creating connected object-store clients.

use std::future::Future;

use serde::de::DeserializeOwned;

use crate::types::{KeyPrefix, Result};

/// Factory for a connected, namespaced object-store client.
///
/// Implementations validate their credentials and build the backend for a
/// specific provider (e.g. S3, in-memory).
pub trait Client: Sized + Send + Sync + 'static {
    /// Strongly-typed credentials for this provider.
    type Credentials: DeserializeOwned + Send;

    /// Unique identifier (e.g. "s3", "memory").
    const ID: &str;

    /// Create a connected client whose keys live under `prefix`.
    fn connect(
        creds: &Self::Credentials,
        prefix: KeyPrefix,
    ) -> impl Future<Output = Result<Self>> + Send;
}
