//! Archive assembly errors.

use async_zip::error::ZipError;

/// Failure while assembling an archive.
///
/// Entry failures carry the zero-based index and key of the entry that
/// stopped the archive; no later entry was fetched.
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    /// The request named no entries.
    #[error("archive request contains no files")]
    Empty,

    /// The object behind an entry could not be opened.
    #[error("failed to open entry {index} ({key}): {source}")]
    Open {
        index: usize,
        key: String,
        #[source]
        source: filegate_object::Error,
    },

    /// Reading an entry failed after it was opened.
    #[error("failed to read entry {index} ({key}): {source}")]
    Read {
        index: usize,
        key: String,
        #[source]
        source: filegate_object::Error,
    },

    /// The store did not answer within the per-entry timeout.
    #[error("timed out fetching entry {index} ({key})")]
    Timeout { index: usize, key: String },

    /// The zip writer rejected an entry or failed to finalize.
    #[error("zip writer failed: {0}")]
    Write(#[from] ZipError),

    /// Writing compressed data failed.
    #[error("archive i/o failed: {0}")]
    Io(#[from] std::io::Error),
}

impl ArchiveError {
    /// Key of the failing entry, for entry-level failures.
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::Open { key, .. } | Self::Read { key, .. } | Self::Timeout { key, .. } => {
                Some(key)
            }
            _ => None,
        }
    }

    /// Whether the failure means the entry's object does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::Open { source, .. } if source.kind() == filegate_object::ErrorKind::NotFound
        )
    }
}
