//! Convenience re-exports.

pub use crate::client::{ByteStream, GetOutput, ObjectBody, ObjectReader, ObjectStoreClient, PutOutput};
pub use crate::providers::{Client, MemoryProvider, S3Credentials, S3Provider};
pub use crate::types::{Error, ErrorKind, KeyPrefix, Result};
