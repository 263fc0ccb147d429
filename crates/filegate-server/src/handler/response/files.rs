use serde::{Deserialize, Serialize};
use url::Url;

/// A time-limited link to read one stored object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadLink {
    /// Presigned GET URL.
    pub url: Url,
}

impl From<Url> for DownloadLink {
    fn from(url: Url) -> Self {
        Self { url }
    }
}
