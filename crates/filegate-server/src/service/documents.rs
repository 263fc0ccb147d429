//! Downloads of edited documents announced by editor callbacks.

use std::time::Duration;

use bytes::{Bytes, BytesMut};
use url::Url;

use crate::utility::tracing_targets::TRACING_TARGET_DOCUMENTS as TRACING_TARGET;
use crate::{Error, Result};

/// Fetches a document from an editor-provided URL.
///
/// Only `http` and `https` URLs are followed. The whole download is bounded
/// by a timeout and by `max_size` bytes.
#[derive(Debug, Clone)]
pub struct DocumentFetcher {
    client: reqwest::Client,
    max_size: u64,
}

impl DocumentFetcher {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
    pub const DEFAULT_MAX_SIZE: u64 = 100 * 1024 * 1024;

    /// Creates a fetcher with its own HTTP client.
    pub fn new(timeout: Duration, max_size: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::config("cannot build document http client").with_source(e))?;

        Ok(Self { client, max_size })
    }

    /// Downloads the document at `url`.
    #[tracing::instrument(target = "filegate_server::documents", skip(self))]
    pub async fn fetch(&self, url: &str) -> Result<Bytes> {
        let url = Url::parse(url)
            .map_err(|e| Error::malformed_request("invalid document url").with_source(e))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::malformed_request("document url must be http(s)"));
        }

        let mut response = self.client.get(url).send().await.map_err(|e| {
            Error::external("document", "Failed to download file").with_source(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            let reason = status.canonical_reason().unwrap_or(status.as_str());
            return Err(Error::external(
                "document",
                format!("Failed to download file: {reason}"),
            ));
        }

        if response.content_length().is_some_and(|len| len > self.max_size) {
            return Err(self.too_large());
        }

        let mut body = BytesMut::new();
        while let Some(chunk) = response.chunk().await.map_err(|e| {
            Error::external("document", "Failed to download file").with_source(e)
        })? {
            if (body.len() + chunk.len()) as u64 > self.max_size {
                return Err(self.too_large());
            }
            body.extend_from_slice(&chunk);
        }

        tracing::debug!(target: TRACING_TARGET, bytes = body.len(), "Document downloaded");
        Ok(body.freeze())
    }

    fn too_large(&self) -> Error {
        Error::external(
            "document",
            format!("document exceeds {} bytes", self.max_size),
        )
    }
}
