//! CRUD over one lookup table (statuses or categories).

use std::sync::Arc;

use desk_store::Store;
use desk_types::{LookupEntry, LookupKind, LookupPatch};
use tracing::debug;

use crate::error::{DeskError, DeskResult, NotFound};
use crate::integrity;

/// Operations on the lookup table of a single [`LookupKind`].
///
/// Updates and deletions go through the integrity cascades so tickets never
/// keep a key that no longer exists.
#[derive(Clone, Debug)]
pub struct Lookups {
    kind: LookupKind,
    store: Arc<Store>,
}

impl Lookups {
    pub fn new(kind: LookupKind, store: Arc<Store>) -> Self {
        Self { kind, store }
    }

    pub fn kind(&self) -> LookupKind {
        self.kind
    }

    /// All entries in stored order.
    pub fn list(&self) -> DeskResult<Vec<LookupEntry>> {
        Ok(self.store.read(|doc| doc.lookups(self.kind).to_vec())?)
    }

    pub fn get(&self, key: &str) -> DeskResult<LookupEntry> {
        self.store
            .read(|doc| doc.lookup(self.kind, key).cloned())?
            .ok_or_else(|| self.not_found(key).into())
    }

    /// Add an entry under a freshly generated key.
    pub fn create(&self, label: &str) -> DeskResult<LookupEntry> {
        let entry = LookupEntry::with_generated_key(label);
        self.store.write(|doc| {
            doc.lookups_mut(self.kind).push(entry.clone());
            Ok::<_, DeskError>(())
        })?;
        debug!(kind = %self.kind, key = %entry.key, "lookup created");
        Ok(entry)
    }

    /// Apply a sparse edit. A new key cascades onto referencing tickets.
    pub fn update(&self, key: &str, patch: LookupPatch) -> DeskResult<LookupEntry> {
        self.store.write(|doc| {
            let current = doc
                .lookup(self.kind, key)
                .cloned()
                .ok_or_else(|| self.not_found(key))?;
            let new_key = patch.key.unwrap_or(current.key);
            let new_label = patch.label.unwrap_or(current.label);
            integrity::rename_in(doc, self.kind, key, &new_key, &new_label)
        })
    }

    /// Remove an entry; referencing tickets are reset to `null`.
    pub fn delete(&self, key: &str) -> DeskResult<LookupEntry> {
        self.store
            .write(|doc| integrity::delete_in(doc, self.kind, key))
    }

    fn not_found(&self, key: &str) -> NotFound {
        NotFound::Lookup {
            kind: self.kind,
            key: key.to_string(),
        }
    }
}
