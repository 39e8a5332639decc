use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use desk_types::Document;
use tracing::{debug, info, warn};

use crate::error::{StoreError, StoreResult};
use crate::json_file::JsonFileBackend;
use crate::memory::InMemoryBackend;
use crate::traits::DocumentBackend;

/// Holds the resident document and serializes access to it.
///
/// One `Store` is constructed per process and shared (`Arc<Store>`) by every
/// component that reads or mutates Desk state. The resident copy is loaded
/// lazily from the backend on first access.
///
/// Mutations go through [`Store::write`], which holds the write lock across
/// load-if-needed, the mutation itself, and the flush. The mutation runs on a
/// working copy; the resident document is only replaced once the flush
/// succeeded, so a failed flush leaves the resident copy untouched. For the
/// same reason a panic inside a mutation cannot leave the resident copy
/// half-written, and a poisoned lock is simply taken over.
pub struct Store {
    backend: Arc<dyn DocumentBackend>,
    resident: RwLock<Option<Document>>,
}

impl Store {
    pub fn new(backend: Arc<dyn DocumentBackend>) -> Self {
        Self {
            backend,
            resident: RwLock::new(None),
        }
    }

    /// Store backed by a JSON file at `path`.
    pub fn json_file(path: impl Into<PathBuf>) -> Self {
        Self::new(Arc::new(JsonFileBackend::new(path)))
    }

    /// Store with nothing persisted.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryBackend::new()))
    }

    /// Location of the backing medium.
    pub fn location(&self) -> String {
        self.backend.location()
    }

    /// Returns `true` once the document has been loaded.
    pub fn is_resident(&self) -> bool {
        self.read_guard().is_some()
    }

    /// Return a copy of the resident document, loading it on first access.
    ///
    /// A backend with nothing persisted yields an empty document, which is
    /// written back immediately. Any other read failure is an error and
    /// leaves nothing resident.
    pub fn load(&self) -> StoreResult<Document> {
        self.read(Document::clone)
    }

    /// Persist the resident document as it stands.
    ///
    /// A no-op when nothing has been loaded yet.
    pub fn flush(&self) -> StoreResult<()> {
        let guard = self.read_guard();
        match guard.as_ref() {
            Some(doc) => self.persist(doc),
            None => Ok(()),
        }
    }

    /// Run `f` against a consistent snapshot of the document.
    ///
    /// Readers share the lock with each other and exclude writers.
    pub fn read<T>(&self, f: impl FnOnce(&Document) -> T) -> StoreResult<T> {
        {
            let guard = self.read_guard();
            if let Some(doc) = guard.as_ref() {
                return Ok(f(doc));
            }
        }

        // First access: take the write lock to load, then read under it.
        let mut guard = self.write_guard();
        let doc = self.ensure_loaded(&mut guard)?;
        Ok(f(doc))
    }

    /// Apply a mutation and flush it.
    ///
    /// `f` receives a working copy of the document. If `f` fails, nothing is
    /// flushed and the resident document is unchanged. If `f` succeeds the
    /// working copy is flushed exactly once; only after the flush succeeded
    /// does it become the resident document.
    pub fn write<T, E>(&self, f: impl FnOnce(&mut Document) -> Result<T, E>) -> Result<T, E>
    where
        E: From<StoreError>,
    {
        let mut guard = self.write_guard();
        let mut working = self.ensure_loaded(&mut guard)?.clone();

        let value = f(&mut working)?;

        self.persist(&working)?;
        *guard = Some(working);
        Ok(value)
    }

    /// Drop the resident copy so the next access reloads from the backend.
    pub fn evict(&self) -> StoreResult<()> {
        let mut guard = self.write_guard();
        *guard = None;
        Ok(())
    }

    fn ensure_loaded<'a>(
        &self,
        guard: &'a mut RwLockWriteGuard<'_, Option<Document>>,
    ) -> StoreResult<&'a mut Document> {
        if guard.is_none() {
            let doc = match self.backend.read()? {
                Some(doc) => {
                    debug!(
                        location = %self.backend.location(),
                        tickets = doc.tickets.len(),
                        statuses = doc.statuses.len(),
                        categories = doc.categories.len(),
                        "document loaded"
                    );
                    doc
                }
                None => {
                    let doc = Document::new();
                    info!(location = %self.backend.location(), "no document found; starting empty");
                    if let Err(e) = self.persist(&doc) {
                        warn!(error = %e, "could not write initial document");
                    }
                    doc
                }
            };
            **guard = Some(doc);
        }
        Ok(guard.get_or_insert_with(Document::new))
    }

    fn read_guard(&self) -> RwLockReadGuard<'_, Option<Document>> {
        self.resident.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_guard(&self) -> RwLockWriteGuard<'_, Option<Document>> {
        self.resident.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn persist(&self, doc: &Document) -> StoreResult<()> {
        self.backend.write(doc)?;
        debug!(
            location = %self.backend.location(),
            tickets = doc.tickets.len(),
            "document flushed"
        );
        Ok(())
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("location", &self.backend.location())
            .field("resident", &self.is_resident())
            .finish()
    }
}
