//! Bounded output buffer between the zip writer and the archive stream.

use std::io;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard};
use std::task::{Context, Poll, Waker};

use bytes::{Bytes, BytesMut};
use futures::io::AsyncWrite;

#[derive(Debug, Default)]
struct Buffer {
    data: BytesMut,
    waker: Option<Waker>,
}

/// Buffer the zip writer writes into and the archive stream drains.
///
/// Once `capacity` bytes are waiting, writes return `Pending` until the
/// next [`ChunkSink::take`], so the writer never runs further ahead of the
/// consumer than one buffer.
#[derive(Debug, Clone)]
pub(crate) struct ChunkSink {
    shared: Arc<Mutex<Buffer>>,
    capacity: usize,
}

impl ChunkSink {
    pub const DEFAULT_CAPACITY: usize = 32 * 1024;

    pub fn new(capacity: usize) -> Self {
        Self {
            shared: Arc::default(),
            capacity: capacity.max(1),
        }
    }

    fn lock(&self) -> io::Result<MutexGuard<'_, Buffer>> {
        self.shared
            .lock()
            .map_err(|_| io::Error::other("archive sink lock poisoned"))
    }

    /// Takes everything written since the previous call, if anything.
    pub fn take(&self) -> Option<Bytes> {
        let mut buffer = self.lock().ok()?;
        if buffer.data.is_empty() {
            return None;
        }

        let output = buffer.data.split().freeze();
        if let Some(waker) = buffer.waker.take() {
            waker.wake();
        }
        Some(output)
    }
}

impl Default for ChunkSink {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

impl AsyncWrite for ChunkSink {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        let mut buffer = self.lock()?;
        let room = self.capacity.saturating_sub(buffer.data.len());
        if room == 0 {
            buffer.waker = Some(cx.waker().clone());
            return Poll::Pending;
        }

        let accepted = room.min(buf.len());
        buffer.data.extend_from_slice(&buf[..accepted]);
        Poll::Ready(Ok(accepted))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_close(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}

#[cfg(test)]
mod tests {
    use futures::FutureExt;
    use futures::io::AsyncWriteExt;

    use super::*;

    #[test]
    fn take_drains() {
        let sink = ChunkSink::default();
        let mut writer = sink.clone();
        assert!(sink.take().is_none());

        writer.write_all(b"abc").now_or_never().unwrap().unwrap();
        writer.write_all(b"def").now_or_never().unwrap().unwrap();
        assert_eq!(sink.take().unwrap(), Bytes::from_static(b"abcdef"));
        assert!(sink.take().is_none());
    }

    #[test]
    fn full_buffer_holds_the_writer_back() {
        let sink = ChunkSink::new(4);
        let mut writer = sink.clone();

        let mut write = writer.write_all(b"abcdefgh");
        assert!((&mut write).now_or_never().is_none());
        assert_eq!(sink.take().unwrap(), Bytes::from_static(b"abcd"));

        write.now_or_never().unwrap().unwrap();
        assert_eq!(sink.take().unwrap(), Bytes::from_static(b"efgh"));
    }
}
