use std::io;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{PoisonError, RwLock};

use desk_types::Document;

use crate::error::{StoreError, StoreResult};
use crate::traits::DocumentBackend;

const LOCATION: &str = "memory";

/// In-memory document backend.
///
/// Intended for tests and embedding. Reads and writes can be made to fail on
/// demand so callers can exercise their storage-error paths.
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    persisted: RwLock<Option<Document>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
}

impl InMemoryBackend {
    /// Create a backend with nothing persisted.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a backend that already holds `document`.
    pub fn with_document(document: Document) -> Self {
        Self {
            persisted: RwLock::new(Some(document)),
            ..Self::default()
        }
    }

    /// Make subsequent reads fail (or succeed again).
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent writes fail (or succeed again).
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Copy of the currently persisted document.
    pub fn persisted(&self) -> Option<Document> {
        self.persisted
            .read()
            .map(|doc| doc.clone())
            .unwrap_or_else(|e| e.into_inner().clone())
    }
}

impl DocumentBackend for InMemoryBackend {
    fn read(&self) -> StoreResult<Option<Document>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::unavailable(
                LOCATION,
                io::Error::other("reads disabled"),
            ));
        }
        let doc = self.persisted.read().unwrap_or_else(PoisonError::into_inner);
        Ok(doc.clone())
    }

    fn write(&self, document: &Document) -> StoreResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::unavailable(
                LOCATION,
                io::Error::other("writes disabled"),
            ));
        }
        let mut doc = self.persisted.write().unwrap_or_else(PoisonError::into_inner);
        *doc = Some(document.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn location(&self) -> String {
        LOCATION.to_string()
    }
}
