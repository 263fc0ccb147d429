//! Result types for reads through [`ObjectStoreClient`](super::ObjectStoreClient).

use std::fmt;

use bytes::Bytes;
use futures::stream::BoxStream;
use object_store::ObjectMeta;

use crate::types::Error;

/// Boxed stream of body chunks.
pub type ByteStream = BoxStream<'static, Result<Bytes, Error>>;

/// Result of a successful [`ObjectStoreClient::get`](super::ObjectStoreClient::get) call.
#[derive(Debug)]
pub struct GetOutput {
    /// Raw bytes of the retrieved object.
    pub data: Bytes,
    /// MIME content-type, if the backend recorded one.
    pub content_type: Option<String>,
    /// Object metadata (size, etag, last_modified, location).
    pub meta: ObjectMeta,
}

/// An opened object whose body has not been read yet.
///
/// The body is pulled lazily; dropping the value releases the underlying
/// connection.
pub struct ObjectBody {
    size: u64,
    stream: ByteStream,
}

impl ObjectBody {
    /// Creates a body from its declared size and chunk stream.
    pub fn new(size: u64, stream: ByteStream) -> Self {
        Self { size, stream }
    }

    /// Size reported by the store when the object was opened.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Consumes the body and returns the chunk stream.
    pub fn into_stream(self) -> ByteStream {
        self.stream
    }
}

impl fmt::Debug for ObjectBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectBody")
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}
