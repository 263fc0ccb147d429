//! Instrumented [`ObjectReader`] for tests.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use async_zip::base::read::mem::ZipFileReader;
use bytes::Bytes;
use filegate_object::client::{ObjectBody, ObjectReader};
use futures::StreamExt;

enum FakeObject {
    Chunks(Vec<Bytes>),
    Failing(Vec<Bytes>),
    Stalled,
}

struct ReleaseGuard(Arc<AtomicUsize>);

impl Drop for ReleaseGuard {
    fn drop(&mut self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

/// Serves canned objects and counts opens, chunk pulls and released bodies.
#[derive(Default)]
pub(crate) struct FakeReader {
    objects: HashMap<String, FakeObject>,
    opens: AtomicUsize,
    pulls: Arc<AtomicUsize>,
    released: Arc<AtomicUsize>,
}

impl FakeReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_object(mut self, key: &str, chunks: Vec<Bytes>) -> Self {
        self.objects.insert(key.to_owned(), FakeObject::Chunks(chunks));
        self
    }

    /// An object that yields `chunks` and then a read error.
    pub fn with_failing(mut self, key: &str, chunks: Vec<Bytes>) -> Self {
        self.objects.insert(key.to_owned(), FakeObject::Failing(chunks));
        self
    }

    /// An object that opens but never yields a chunk.
    pub fn with_stalled(mut self, key: &str) -> Self {
        self.objects.insert(key.to_owned(), FakeObject::Stalled);
        self
    }

    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    pub fn pulls(&self) -> usize {
        self.pulls.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ObjectReader for FakeReader {
    async fn open(&self, key: &str) -> filegate_object::Result<ObjectBody> {
        self.opens.fetch_add(1, Ordering::SeqCst);

        match self.objects.get(key) {
            None => Err(filegate_object::Error::not_found("fake", key)),
            Some(FakeObject::Chunks(chunks)) => {
                let size = chunks.iter().map(|c| c.len() as u64).sum();
                let pulls = self.pulls.clone();
                let guard = ReleaseGuard(self.released.clone());
                let stream = futures::stream::iter(chunks.clone()).map(move |chunk| {
                    let _held = &guard;
                    pulls.fetch_add(1, Ordering::SeqCst);
                    Ok(chunk)
                });
                Ok(ObjectBody::new(size, stream.boxed()))
            }
            Some(FakeObject::Failing(chunks)) => {
                let size = chunks.iter().map(|c| c.len() as u64).sum();
                let mut items: Vec<filegate_object::Result<Bytes>> =
                    chunks.iter().cloned().map(Ok).collect();
                items.push(Err(filegate_object::Error::unavailable("fake", "connection reset")));

                let pulls = self.pulls.clone();
                let guard = ReleaseGuard(self.released.clone());
                let stream = futures::stream::iter(items).map(move |item| {
                    let _held = &guard;
                    pulls.fetch_add(1, Ordering::SeqCst);
                    item
                });
                Ok(ObjectBody::new(size, stream.boxed()))
            }
            Some(FakeObject::Stalled) => {
                let guard = ReleaseGuard(self.released.clone());
                let stream = futures::stream::pending().map(move |chunk: Bytes| {
                    let _held = &guard;
                    Ok(chunk)
                });
                Ok(ObjectBody::new(0, stream.boxed()))
            }
        }
    }
}

/// Reads back every entry of `archive` as `(name, content)`, in order.
pub(crate) async fn read_archive(archive: Vec<u8>) -> Vec<(String, Vec<u8>)> {
    let reader = ZipFileReader::new(archive).await.unwrap();

    let mut entries = Vec::new();
    for index in 0..reader.file().entries().len() {
        let mut entry = reader.reader_with_entry(index).await.unwrap();
        let name = entry.entry().filename().as_str().unwrap().to_owned();
        let mut content = Vec::new();
        entry.read_to_end_checked(&mut content).await.unwrap();
        entries.push((name, content));
    }
    entries
}

/// Deterministic incompressible bytes.
pub(crate) fn noise(len: usize, seed: u64) -> Vec<u8> {
    let mut state = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
    (0..len)
        .map(|_| {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            (state >> 33) as u8
        })
        .collect()
}
