//! Namespace prefix applied to every caller-supplied key.

use std::borrow::Cow;

use derive_more::Display;
use object_store::path::Path;
use serde::{Deserialize, Serialize};

/// Fixed namespace segment prepended to object keys before they reach the store.
///
/// Prefixing is a plain string concatenation. Keys are not validated here;
/// the store decides what it accepts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyPrefix(Cow<'static, str>);

impl KeyPrefix {
    /// Prefix used by the gateway unless configured otherwise.
    pub const UPLOADS: Self = Self(Cow::Borrowed("uploads/"));

    /// Creates a prefix from any string.
    pub fn new(prefix: impl Into<Cow<'static, str>>) -> Self {
        Self(prefix.into())
    }

    /// Returns the prefix.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the fully qualified key as stored in the bucket.
    pub fn qualify(&self, key: &str) -> String {
        format!("{}{}", self.0, key)
    }

    /// Returns the store [`Path`] for a caller key.
    pub fn path(&self, key: &str) -> Path {
        Path::from(self.qualify(key))
    }
}

impl Default for KeyPrefix {
    fn default() -> Self {
        Self::UPLOADS
    }
}
