//! Streaming zip archives of stored objects.
//!
//! [`ArchiveService::assemble`] turns an [`ArchiveRequest`] into an
//! [`ArchiveStream`]: entries are read one after another, in request order,
//! and compressed as the consumer pulls. The first entry is opened before
//! the stream is returned so a missing first object becomes an ordinary
//! error. Any later failure ends the stream with an [`ArchiveError`] and the
//! archive is left truncated.

mod assembler;
mod error;
mod request;
mod sink;

#[cfg(test)]
pub(crate) mod testing;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use filegate_object::client::ObjectReader;

pub use self::assembler::ArchiveStream;
use self::assembler::Assembler;
pub use self::error::ArchiveError;
pub use self::request::{ArchiveEntry, ArchiveRequest};

/// Fetch settings for archive assembly.
///
/// Entries are always deflated at the writer's default level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveOptions {
    /// Upper bound for opening an entry and for each read from it.
    pub fetch_timeout: Duration,
}

impl ArchiveOptions {
    pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);
}

impl Default for ArchiveOptions {
    fn default() -> Self {
        Self {
            fetch_timeout: Self::DEFAULT_FETCH_TIMEOUT,
        }
    }
}

/// Builds archive streams over an [`ObjectReader`].
#[derive(Clone)]
pub struct ArchiveService {
    reader: Arc<dyn ObjectReader>,
    options: ArchiveOptions,
}

impl ArchiveService {
    /// Creates a service reading entries through `reader`.
    pub fn new(reader: Arc<dyn ObjectReader>, options: ArchiveOptions) -> Self {
        Self { reader, options }
    }

    /// Returns the assembly settings.
    pub fn options(&self) -> &ArchiveOptions {
        &self.options
    }

    /// Starts assembling `request`.
    ///
    /// Fails without producing any output when the first entry cannot be
    /// opened.
    #[tracing::instrument(skip_all, fields(entries = request.len()))]
    pub async fn assemble(&self, request: ArchiveRequest) -> Result<ArchiveStream, ArchiveError> {
        let entries = request.into_entries();
        let assembler = Assembler::new(self.reader.clone(), self.options);

        let first = match entries.first() {
            Some(entry) => assembler.open(0, entry).await?,
            None => return Err(ArchiveError::Empty),
        };

        Ok(ArchiveStream::new(assembler, first, entries))
    }
}

impl fmt::Debug for ArchiveService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArchiveService")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
