//! Referential-integrity cascades between tickets and lookup tables.
//!
//! Tickets refer to statuses and categories by key. When a lookup entry is
//! renamed the new key is written onto every ticket that held the old one;
//! when an entry is deleted those tickets are reset to `null`. Each cascade
//! is one scan over the ticket collection, performed inside the store's
//! write lock, so no reader ever sees a half-rewritten document.
//!
//! The status and category axes are independent: an operation on one kind
//! never reads or writes the other kind's collection or ticket field.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use desk_store::Store;
use desk_types::{Document, LookupEntry, LookupKind, TicketId};
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{DeskResult, NotFound};

/// Applies lookup renames and deletions together with their ticket cascades.
#[derive(Clone, Debug)]
pub struct IntegrityEngine {
    store: Arc<Store>,
}

impl IntegrityEngine {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    /// Replace an entry's key and label, re-pointing referencing tickets.
    pub fn rename_key(
        &self,
        kind: LookupKind,
        old_key: &str,
        new_key: &str,
        new_label: &str,
    ) -> DeskResult<LookupEntry> {
        self.store
            .write(|doc| rename_in(doc, kind, old_key, new_key, new_label))
    }

    /// Remove an entry, resetting referencing tickets to `null`.
    pub fn delete(&self, kind: LookupKind, key: &str) -> DeskResult<LookupEntry> {
        self.store.write(|doc| delete_in(doc, kind, key))
    }

    pub fn rename_status_key(
        &self,
        old_key: &str,
        new_key: &str,
        new_label: &str,
    ) -> DeskResult<LookupEntry> {
        self.rename_key(LookupKind::Status, old_key, new_key, new_label)
    }

    pub fn delete_status(&self, key: &str) -> DeskResult<LookupEntry> {
        self.delete(LookupKind::Status, key)
    }

    pub fn rename_category_key(
        &self,
        old_key: &str,
        new_key: &str,
        new_label: &str,
    ) -> DeskResult<LookupEntry> {
        self.rename_key(LookupKind::Category, old_key, new_key, new_label)
    }

    pub fn delete_category(&self, key: &str) -> DeskResult<LookupEntry> {
        self.delete(LookupKind::Category, key)
    }

    /// Inspect the current document for integrity violations.
    pub fn check(&self) -> DeskResult<IntegrityReport> {
        Ok(self.store.read(check)?)
    }
}

/// Rename within an already-locked document. See [`IntegrityEngine::rename_key`].
///
/// A `new_key` that collides with another entry of the same kind is not
/// rejected; the collision is logged and reported by [`check`].
pub fn rename_in(
    doc: &mut Document,
    kind: LookupKind,
    old_key: &str,
    new_key: &str,
    new_label: &str,
) -> DeskResult<LookupEntry> {
    let index = doc
        .lookups(kind)
        .iter()
        .position(|e| e.key == old_key)
        .ok_or_else(|| NotFound::Lookup {
            kind,
            key: old_key.to_string(),
        })?;

    if new_key != old_key && doc.has_lookup(kind, new_key) {
        warn!(
            %kind,
            old_key,
            new_key,
            "renamed key collides with an existing entry; deleting one of them keeps \
             references until the last entry with that key is gone"
        );
    }

    let entry = &mut doc.lookups_mut(kind)[index];
    entry.key = new_key.to_string();
    entry.label = new_label.to_string();
    let updated = entry.clone();

    let rewritten = if new_key == old_key {
        0
    } else {
        cascade(doc, kind, old_key, Some(new_key))
    };
    debug!(%kind, old_key, new_key, rewritten, "lookup renamed");
    Ok(updated)
}

/// Delete within an already-locked document. See [`IntegrityEngine::delete`].
///
/// Only the first entry with `key` is removed. Tickets are reset to `null`
/// only when no entry with that key remains, which can happen after a
/// colliding rename.
pub fn delete_in(doc: &mut Document, kind: LookupKind, key: &str) -> DeskResult<LookupEntry> {
    let entries = doc.lookups_mut(kind);
    let index = entries
        .iter()
        .position(|e| e.key == key)
        .ok_or_else(|| NotFound::Lookup {
            kind,
            key: key.to_string(),
        })?;
    let removed = entries.remove(index);

    let rewritten = if doc.has_lookup(kind, key) {
        warn!(%kind, key, "deleted one of several entries sharing a key; tickets keep it");
        0
    } else {
        cascade(doc, kind, key, None)
    };
    debug!(%kind, key, rewritten, "lookup deleted");
    Ok(removed)
}

/// Point every ticket referencing `from` at `to`. Returns the number of
/// tickets rewritten.
fn cascade(doc: &mut Document, kind: LookupKind, from: &str, to: Option<&str>) -> usize {
    let mut rewritten = 0;
    for ticket in &mut doc.tickets {
        let reference = ticket.reference_mut(kind);
        if reference.as_deref() == Some(from) {
            *reference = to.map(str::to_string);
            rewritten += 1;
        }
    }
    rewritten
}

/// A single integrity problem found by [`check`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "violation", rename_all = "snake_case")]
pub enum Violation {
    /// A ticket references a key missing from its lookup table.
    DanglingReference {
        ticket_id: TicketId,
        kind: LookupKind,
        key: String,
    },
    /// Two lookup entries of the same kind share a key.
    DuplicateKey { kind: LookupKind, key: String },
    /// Two tickets share an id.
    DuplicateTicketId { ticket_id: TicketId },
    /// Two comments on one ticket share an id.
    DuplicateCommentId {
        ticket_id: TicketId,
        comment_id: String,
    },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DanglingReference {
                ticket_id,
                kind,
                key,
            } => write!(f, "ticket {ticket_id} references unknown {kind} {key}"),
            Self::DuplicateKey { kind, key } => write!(f, "duplicate {kind} key {key}"),
            Self::DuplicateTicketId { ticket_id } => write!(f, "duplicate ticket id {ticket_id}"),
            Self::DuplicateCommentId {
                ticket_id,
                comment_id,
            } => write!(f, "ticket {ticket_id} has duplicate comment id {comment_id}"),
        }
    }
}

/// Result of [`check`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct IntegrityReport {
    pub violations: Vec<Violation>,
}

impl IntegrityReport {
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Scan a document for every integrity violation.
pub fn check(doc: &Document) -> IntegrityReport {
    let mut violations = Vec::new();

    for kind in LookupKind::ALL {
        let mut seen = HashSet::new();
        for entry in doc.lookups(kind) {
            if !seen.insert(entry.key.as_str()) {
                violations.push(Violation::DuplicateKey {
                    kind,
                    key: entry.key.clone(),
                });
            }
        }
    }

    let mut ticket_ids = HashSet::new();
    for ticket in &doc.tickets {
        if !ticket_ids.insert(ticket.id) {
            violations.push(Violation::DuplicateTicketId {
                ticket_id: ticket.id,
            });
        }

        for kind in LookupKind::ALL {
            if let Some(key) = ticket.reference(kind) {
                if !doc.has_lookup(kind, key) {
                    violations.push(Violation::DanglingReference {
                        ticket_id: ticket.id,
                        kind,
                        key: key.to_string(),
                    });
                }
            }
        }

        let mut comment_ids = HashSet::new();
        for comment in &ticket.comments {
            if !comment_ids.insert(comment.id.as_str()) {
                violations.push(Violation::DuplicateCommentId {
                    ticket_id: ticket.id,
                    comment_id: comment.id.clone(),
                });
            }
        }
    }

    IntegrityReport { violations }
}
