//! Namespaced object-store client backed by [`object_store::ObjectStore`].
//!
//! [`ObjectStoreClient`] is a thin, cloneable wrapper around
//! `Arc<dyn ObjectStore>` plus an optional [`Signer`]. Every caller key is
//! qualified with the configured [`KeyPrefix`] before it reaches the store.
//! Every public method is instrumented with [`tracing`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures::TryStreamExt;
use object_store::signer::Signer;
use object_store::{Attribute, GetOptions, ObjectMeta, ObjectStore, PutOptions, PutPayload};
use url::Url;

use crate::types::{Error, ErrorKind, KeyPrefix, Result};

mod get_output;
mod put_output;
mod reader;

pub use get_output::{ByteStream, GetOutput, ObjectBody};
pub use put_output::PutOutput;
pub use reader::ObjectReader;

const LABEL: &str = "object-store";

/// Cloneable handle to any [`ObjectStore`] backend.
///
/// All methods accept caller keys (without the namespace prefix).
#[derive(Clone, Debug)]
pub struct ObjectStoreClient {
    store: Arc<dyn ObjectStore>,
    signer: Option<Arc<dyn Signer>>,
    prefix: KeyPrefix,
}

impl ObjectStoreClient {
    /// Wrap a concrete [`ObjectStore`] implementation without presigning support.
    pub fn new(store: impl ObjectStore, prefix: KeyPrefix) -> Self {
        Self {
            store: Arc::new(store),
            signer: None,
            prefix,
        }
    }

    /// Wrap a store together with the signer used for presigned links.
    pub fn with_signer(
        store: Arc<dyn ObjectStore>,
        signer: Arc<dyn Signer>,
        prefix: KeyPrefix,
    ) -> Self {
        Self {
            store,
            signer: Some(signer),
            prefix,
        }
    }

    /// Returns the namespace prefix.
    pub fn prefix(&self) -> &KeyPrefix {
        &self.prefix
    }

    /// Whether [`presign_get`](Self::presign_get) can succeed.
    pub fn can_presign(&self) -> bool {
        self.signer.is_some()
    }

    /// Verify that the backing store is reachable.
    ///
    /// A not-found HEAD on the health-check key counts as success.
    #[tracing::instrument(name = "object.verify", skip(self))]
    pub async fn verify_reachable(&self) -> Result<()> {
        let path = self.prefix.path(".filegate-health");
        match self.store.head(&path).await {
            Ok(_) => Ok(()),
            Err(object_store::Error::NotFound { .. }) => Ok(()),
            Err(e) => Err(from_object_store(e)),
        }
    }

    /// Open a streaming read of the object stored at `key`.
    #[tracing::instrument(name = "object.get_stream", skip(self))]
    pub async fn get_stream(&self, key: &str) -> Result<ObjectBody> {
        let path = self.prefix.path(key);
        let result = self.store.get(&path).await.map_err(from_object_store)?;
        let size = result.meta.size;
        let stream = result.into_stream().map_err(from_object_store);
        Ok(ObjectBody::new(size, Box::pin(stream)))
    }

    /// Retrieve the raw bytes, content-type, and metadata stored at `key`.
    #[tracing::instrument(name = "object.get", skip(self))]
    pub async fn get(&self, key: &str) -> Result<GetOutput> {
        let path = self.prefix.path(key);
        let result = self.store.get(&path).await.map_err(from_object_store)?;
        let meta = result.meta.clone();
        let content_type = content_type_of(&result.attributes);
        let data = result.bytes().await.map_err(from_object_store)?;
        Ok(GetOutput {
            data,
            content_type,
            meta,
        })
    }

    /// Returns the content-type recorded for `key`, without downloading the body.
    #[tracing::instrument(name = "object.content_type", skip(self))]
    pub async fn content_type(&self, key: &str) -> Result<Option<String>> {
        let path = self.prefix.path(key);
        let options = GetOptions {
            head: true,
            ..GetOptions::default()
        };
        let result = self
            .store
            .get_opts(&path, options)
            .await
            .map_err(from_object_store)?;
        Ok(content_type_of(&result.attributes))
    }

    /// Upload `data` to `key`, overwriting any existing object.
    #[tracing::instrument(name = "object.put", skip(self, data), fields(size = data.len()))]
    pub async fn put(
        &self,
        key: &str,
        data: Bytes,
        content_type: Option<&str>,
    ) -> Result<PutOutput> {
        let path = self.prefix.path(key);
        let payload = PutPayload::from(data);
        let mut opts = PutOptions::default();
        if let Some(ct) = content_type {
            opts.attributes
                .insert(Attribute::ContentType, ct.to_owned().into());
        }
        let result = self
            .store
            .put_opts(&path, payload, opts)
            .await
            .map_err(from_object_store)?;
        Ok(result.into())
    }

    /// Get object metadata without downloading the body.
    #[tracing::instrument(name = "object.head", skip(self))]
    pub async fn head(&self, key: &str) -> Result<ObjectMeta> {
        let path = self.prefix.path(key);
        self.store.head(&path).await.map_err(from_object_store)
    }

    /// Delete the object at `key`.
    ///
    /// Fails with [`ErrorKind::NotFound`] when nothing is stored under `key`,
    /// including when it was already deleted.
    #[tracing::instrument(name = "object.delete", skip(self))]
    pub async fn delete(&self, key: &str) -> Result<()> {
        let path = self.prefix.path(key);
        self.store.head(&path).await.map_err(from_object_store)?;
        self.store.delete(&path).await.map_err(from_object_store)
    }

    /// Mint a presigned GET link for `key`, valid for `expires_in`.
    #[tracing::instrument(name = "object.presign_get", skip(self), fields(expires_secs = expires_in.as_secs()))]
    pub async fn presign_get(&self, key: &str, expires_in: Duration) -> Result<Url> {
        let Some(signer) = self.signer.as_ref() else {
            return Err(Error::not_supported(
                LABEL,
                "backend does not support presigned links",
            ));
        };

        let path = self.prefix.path(key);
        signer
            .signed_url(reqwest::Method::GET, &path, expires_in)
            .await
            .map_err(from_object_store)
    }
}

#[async_trait]
impl ObjectReader for ObjectStoreClient {
    async fn open(&self, key: &str) -> Result<ObjectBody> {
        self.get_stream(key).await
    }
}

fn content_type_of(attributes: &object_store::Attributes) -> Option<String> {
    attributes
        .get(&Attribute::ContentType)
        .map(|v| v.as_ref().to_owned())
}

/// Convert an [`object_store::Error`] into a classified crate [`Error`].
fn from_object_store(err: object_store::Error) -> Error {
    let kind = match &err {
        object_store::Error::NotFound { .. } => ErrorKind::NotFound,
        object_store::Error::PermissionDenied { .. }
        | object_store::Error::Unauthenticated { .. } => ErrorKind::AccessDenied,
        object_store::Error::NotSupported { .. } | object_store::Error::NotImplemented => {
            ErrorKind::NotSupported
        }
        object_store::Error::AlreadyExists { .. }
        | object_store::Error::Precondition { .. }
        | object_store::Error::NotModified { .. } => ErrorKind::Conflict,
        object_store::Error::InvalidPath { .. } => ErrorKind::InvalidKey,
        _ => ErrorKind::Unavailable,
    };
    Error::new(kind, LABEL, &err).with_source(err)
}

#[cfg(test)]
mod tests {
    use futures::StreamExt;
    use object_store::memory::InMemory;
    use object_store::path::Path;

    use super::*;

    fn test_client() -> ObjectStoreClient {
        ObjectStoreClient::new(InMemory::new(), KeyPrefix::default())
    }

    #[derive(Debug)]
    struct FixedSigner;

    #[async_trait]
    impl Signer for FixedSigner {
        async fn signed_url(
            &self,
            _method: reqwest::Method,
            path: &Path,
            expires_in: Duration,
        ) -> object_store::Result<Url> {
            let raw = format!(
                "https://bucket.example.com/{path}?X-Amz-Expires={}",
                expires_in.as_secs()
            );
            Ok(Url::parse(&raw).expect("valid url"))
        }
    }

    #[tokio::test]
    async fn put_and_get() {
        let client = test_client();
        let data = Bytes::from("hello world");
        client
            .put("test.txt", data.clone(), Some("text/plain"))
            .await
            .unwrap();

        let result = client.get("test.txt").await.unwrap();
        assert_eq!(result.data, data);
        assert_eq!(result.content_type.as_deref(), Some("text/plain"));
    }

    #[tokio::test]
    async fn keys_are_namespaced() {
        let client = test_client();
        client.put("a.txt", Bytes::from("abc"), None).await.unwrap();

        let meta = client.head("a.txt").await.unwrap();
        assert_eq!(meta.location, Path::from("uploads/a.txt"));
        assert_eq!(meta.size, 3);
    }

    #[tokio::test]
    async fn get_stream_yields_content() {
        let client = test_client();
        client
            .put("stream.bin", Bytes::from("streamed"), None)
            .await
            .unwrap();

        let body = client.get_stream("stream.bin").await.unwrap();
        assert_eq!(body.size(), 8);

        let chunks: Vec<Bytes> = body.into_stream().map(|c| c.unwrap()).collect().await;
        assert_eq!(chunks.concat(), b"streamed".to_vec());
    }

    #[tokio::test]
    async fn get_stream_not_found() {
        let client = test_client();
        let err = client.get_stream("missing").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn content_type_lookup() {
        let client = test_client();
        client
            .put("doc.docx", Bytes::from("x"), Some("application/msword"))
            .await
            .unwrap();
        client.put("raw.bin", Bytes::from("x"), None).await.unwrap();

        let ct = client.content_type("doc.docx").await.unwrap();
        assert_eq!(ct.as_deref(), Some("application/msword"));
        assert_eq!(client.content_type("raw.bin").await.unwrap(), None);
    }

    #[tokio::test]
    async fn delete_twice_is_not_found() {
        let client = test_client();
        client.put("del.bin", Bytes::from("x"), None).await.unwrap();
        client.delete("del.bin").await.unwrap();

        let err = client.delete("del.bin").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(client.get("del.bin").await.is_err());
    }

    #[tokio::test]
    async fn presign_requires_signer() {
        let client = test_client();
        assert!(!client.can_presign());

        let err = client
            .presign_get("a.txt", Duration::from_secs(60))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotSupported);
    }

    #[tokio::test]
    async fn presign_uses_qualified_key() {
        let store: Arc<dyn ObjectStore> = Arc::new(InMemory::new());
        let client = ObjectStoreClient::with_signer(store, Arc::new(FixedSigner), KeyPrefix::default());

        let url = client
            .presign_get("a.txt", Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(url.path(), "/uploads/a.txt");
        assert_eq!(url.query(), Some("X-Amz-Expires=60"));
    }

    #[tokio::test]
    async fn reader_opens_stream() {
        let client = test_client();
        client.put("r.txt", Bytes::from("read"), None).await.unwrap();

        let reader: &dyn ObjectReader = &client;
        let body = reader.open("r.txt").await.unwrap();
        assert_eq!(body.size(), 4);
    }

    #[tokio::test]
    async fn verify_reachable() {
        let client = test_client();
        client.verify_reachable().await.unwrap();
    }
}
