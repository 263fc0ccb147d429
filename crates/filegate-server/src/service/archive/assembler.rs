//! Pull-driven zip assembly.
//!
//! One future writes every entry into a bounded [`ChunkSink`] and
//! [`ArchiveStream`] drives that future only while its consumer polls. When
//! the sink is full the writer stops and the stream hands the buffered bytes
//! downstream, so nothing is fetched ahead of demand. Any failure ends the
//! writer; the stream reports it once after the bytes already produced.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use async_zip::base::write::ZipFileWriter;
use async_zip::{Compression, ZipEntryBuilder};
use bytes::Bytes;
use filegate_object::client::{ObjectBody, ObjectReader};
use futures::future::BoxFuture;
use futures::io::AsyncWriteExt;
use futures::stream::{Stream, StreamExt};
use tokio::time::timeout;

use super::sink::ChunkSink;
use super::{ArchiveEntry, ArchiveError, ArchiveOptions};
use crate::TRACING_TARGET_ARCHIVE;

pub(crate) struct Assembler {
    reader: Arc<dyn ObjectReader>,
    options: ArchiveOptions,
    sink: ChunkSink,
}

impl Assembler {
    pub fn new(reader: Arc<dyn ObjectReader>, options: ArchiveOptions) -> Self {
        Self {
            reader,
            options,
            sink: ChunkSink::default(),
        }
    }

    /// Opens the object behind `entry`, bounded by the fetch timeout.
    pub async fn open(&self, index: usize, entry: &ArchiveEntry) -> Result<ObjectBody, ArchiveError> {
        let key = || entry.key().to_owned();

        match timeout(self.options.fetch_timeout, self.reader.open(entry.key())).await {
            Ok(Ok(body)) => {
                tracing::debug!(
                    target: TRACING_TARGET_ARCHIVE,
                    index,
                    key = entry.key(),
                    name = entry.name(),
                    size = body.size(),
                    "archive entry opened"
                );
                Ok(body)
            }
            Ok(Err(source)) => Err(ArchiveError::Open {
                index,
                key: key(),
                source,
            }),
            Err(_) => Err(ArchiveError::Timeout { index, key: key() }),
        }
    }

    /// Writes every entry in order, then the central directory.
    ///
    /// `first` is the already opened body of `entries[0]`.
    async fn write(self, first: ObjectBody, entries: Vec<ArchiveEntry>) -> Result<(), ArchiveError> {
        let mut zip = ZipFileWriter::new(self.sink.clone());
        let mut first = Some(first);

        for (index, entry) in entries.iter().enumerate() {
            let body = match first.take() {
                Some(body) => body,
                None => self.open(index, entry).await?,
            };
            self.write_entry(&mut zip, index, entry, body).await?;
        }

        zip.close().await?;
        Ok(())
    }

    async fn write_entry(
        &self,
        zip: &mut ZipFileWriter<ChunkSink>,
        index: usize,
        entry: &ArchiveEntry,
        body: ObjectBody,
    ) -> Result<(), ArchiveError> {
        let builder = ZipEntryBuilder::new(entry.name().into(), Compression::Deflate);
        let mut writer = zip.write_entry_stream(builder).await?;
        let mut chunks = body.into_stream();
        let mut read = 0u64;

        loop {
            let chunk = match timeout(self.options.fetch_timeout, chunks.next()).await {
                Ok(Some(Ok(chunk))) => chunk,
                Ok(None) => break,
                Ok(Some(Err(source))) => {
                    return Err(ArchiveError::Read {
                        index,
                        key: entry.key().to_owned(),
                        source,
                    });
                }
                Err(_) => {
                    return Err(ArchiveError::Timeout {
                        index,
                        key: entry.key().to_owned(),
                    });
                }
            };

            read += chunk.len() as u64;
            writer.write_all(&chunk).await?;
        }

        writer.close().await?;
        tracing::debug!(
            target: TRACING_TARGET_ARCHIVE,
            index,
            key = entry.key(),
            bytes = read,
            "archive entry completed"
        );
        Ok(())
    }
}

/// Lazy, finite stream of compressed archive bytes.
///
/// Yields an error at most once, after which it ends. Dropping it releases
/// the entry being read and the zip writer.
#[must_use = "streams do nothing unless polled"]
pub struct ArchiveStream {
    writer: Option<BoxFuture<'static, Result<(), ArchiveError>>>,
    sink: ChunkSink,
    failure: Option<ArchiveError>,
    entries: usize,
    written: u64,
}

impl ArchiveStream {
    pub(crate) fn new(assembler: Assembler, first: ObjectBody, entries: Vec<ArchiveEntry>) -> Self {
        let sink = assembler.sink.clone();
        let count = entries.len();

        Self {
            writer: Some(Box::pin(assembler.write(first, entries))),
            sink,
            failure: None,
            entries: count,
            written: 0,
        }
    }

    fn finish(&mut self, result: Result<(), ArchiveError>) {
        self.writer = None;
        match result {
            Ok(()) => tracing::info!(
                target: TRACING_TARGET_ARCHIVE,
                entries = self.entries,
                bytes = self.written,
                "archive completed"
            ),
            Err(err) => {
                tracing::warn!(
                    target: TRACING_TARGET_ARCHIVE,
                    error = %err,
                    bytes = self.written,
                    "archive aborted"
                );
                self.failure = Some(err);
            }
        }
    }
}

impl Stream for ArchiveStream {
    type Item = Result<Bytes, ArchiveError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = &mut *self;

        if let Some(writer) = this.writer.as_mut()
            && let Poll::Ready(result) = writer.as_mut().poll(cx)
        {
            this.finish(result);
        }

        if let Some(chunk) = this.sink.take() {
            this.written += chunk.len() as u64;
            return Poll::Ready(Some(Ok(chunk)));
        }

        if let Some(err) = this.failure.take() {
            return Poll::Ready(Some(Err(err)));
        }

        if this.writer.is_none() {
            Poll::Ready(None)
        } else {
            Poll::Pending
        }
    }
}
