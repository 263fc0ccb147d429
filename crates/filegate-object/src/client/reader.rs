//! Read seam used by consumers that only need to open object bodies.

use async_trait::async_trait;

use super::ObjectBody;
use crate::types::Result;

/// Opens object bodies by caller key.
///
/// [`ObjectStoreClient`](super::ObjectStoreClient) is the production
/// implementation; consumers hold `Arc<dyn ObjectReader>` so tests can
/// substitute instrumented sources.
#[async_trait]
pub trait ObjectReader: Send + Sync {
    /// Open `key` for streaming. Fails before any body byte is produced
    /// when the object is missing or unreadable.
    async fn open(&self, key: &str) -> Result<ObjectBody>;
}
