//! In-process provider backed by [`object_store::memory::InMemory`].
//!
//! Used for local development and tests. It cannot mint presigned links.

use derive_more::{Deref, Into};
use object_store::memory::InMemory;

use super::Client;
use crate::client::ObjectStoreClient;
use crate::types::{KeyPrefix, Result};

/// In-memory object storage client.
#[derive(Debug, Clone, Deref, Into)]
pub struct MemoryProvider(ObjectStoreClient);

impl MemoryProvider {
    /// Creates an empty store.
    pub fn new(prefix: KeyPrefix) -> Self {
        Self(ObjectStoreClient::new(InMemory::new(), prefix))
    }
}

impl Client for MemoryProvider {
    type Credentials = ();

    const ID: &str = "memory";

    async fn connect(_creds: &Self::Credentials, prefix: KeyPrefix) -> Result<Self> {
        Ok(Self::new(prefix))
    }
}
