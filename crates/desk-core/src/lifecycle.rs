//! Ticket lifecycle: id assignment, timestamps, edits, comments, ordering.

use std::collections::HashSet;
use std::sync::Arc;

use desk_store::Store;
use desk_types::{
    generate_key, Clock, Comment, Document, LookupKind, Ticket, TicketFields, TicketId,
    TicketPatch,
};
use tracing::debug;

use crate::error::{DeskError, DeskResult, NotFound, ValidationError};

/// Creates, edits, and reads tickets.
///
/// Ids are `1 + max(existing ids)` at creation time. `createdAt` comes from
/// the injected [`Clock`] and, like the id, is never changed afterwards.
#[derive(Clone)]
pub struct TicketLifecycle {
    store: Arc<Store>,
    clock: Arc<dyn Clock>,
}

impl TicketLifecycle {
    pub fn new(store: Arc<Store>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Create a ticket from a complete field set.
    ///
    /// All of `user`, `title`, `description`, `priority`, `status`, and
    /// `category` must be present; `status` and `category` may be `null`.
    pub fn create(&self, fields: TicketFields) -> DeskResult<Ticket> {
        let missing = fields.missing_fields();
        if !missing.is_empty() {
            return Err(ValidationError::MissingFields(missing).into());
        }

        let ticket = self.store.write(|doc| -> DeskResult<Ticket> {
            validate_references(doc, |kind| fields.reference(kind))?;

            let id = doc
                .next_ticket_id()
                .ok_or(ValidationError::TicketIdsExhausted)?;
            let ticket = fields
                .into_ticket(id, self.clock.now())
                .map_err(ValidationError::MissingFields)?;
            doc.tickets.push(ticket.clone());
            Ok(ticket)
        })?;

        debug!(id = ticket.id, "ticket created");
        Ok(ticket)
    }

    /// Shallow-merge `patch` onto an existing ticket.
    pub fn update(&self, id: TicketId, patch: TicketPatch) -> DeskResult<Ticket> {
        self.store.write(|doc| {
            if !doc.tickets.iter().any(|t| t.id == id) {
                return Err(NotFound::Ticket(id).into());
            }
            validate_references(doc, |kind| patch.reference(kind))?;
            if let Some(comments) = &patch.comments {
                validate_comment_ids(comments)?;
            }

            let ticket = doc.ticket_mut(id).ok_or(NotFound::Ticket(id))?;
            ticket.apply(patch);
            debug!(id, "ticket updated");
            Ok(ticket.clone())
        })
    }

    /// Remove a ticket and its comments. Returns the removed ticket.
    pub fn delete(&self, id: TicketId) -> DeskResult<Ticket> {
        self.store.write(|doc| {
            let index = doc
                .tickets
                .iter()
                .position(|t| t.id == id)
                .ok_or(NotFound::Ticket(id))?;
            debug!(id, "ticket deleted");
            Ok(doc.tickets.remove(index))
        })
    }

    /// All tickets, most recently created first. Ties keep insertion order.
    pub fn list_all(&self) -> DeskResult<Vec<Ticket>> {
        let mut tickets = self.store.read(|doc| doc.tickets.clone())?;
        tickets.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(tickets)
    }

    /// One ticket with its comments ordered most recent first.
    pub fn get_one(&self, id: TicketId) -> DeskResult<Ticket> {
        let mut ticket = self
            .store
            .read(|doc| doc.ticket(id).cloned())?
            .ok_or(NotFound::Ticket(id))?;
        ticket.sort_comments_newest_first();
        Ok(ticket)
    }

    /// Append a comment with a generated id and the current time.
    pub fn add_comment(&self, id: TicketId, author: &str, content: &str) -> DeskResult<Comment> {
        let comment = Comment {
            id: generate_key(),
            author: author.to_string(),
            content: content.to_string(),
            created_at: self.clock.now(),
        };
        self.store.write(|doc| {
            let ticket = doc.ticket_mut(id).ok_or(NotFound::Ticket(id))?;
            ticket.comments.push(comment.clone());
            Ok::<_, DeskError>(())
        })?;
        debug!(id, comment = %comment.id, "comment added");
        Ok(comment)
    }

    /// Remove one comment. Returns the removed comment.
    pub fn delete_comment(&self, id: TicketId, comment_id: &str) -> DeskResult<Comment> {
        self.store.write(|doc| {
            let ticket = doc.ticket_mut(id).ok_or(NotFound::Ticket(id))?;
            let index = ticket
                .comments
                .iter()
                .position(|c| c.id == comment_id)
                .ok_or_else(|| NotFound::Comment {
                    ticket_id: id,
                    comment_id: comment_id.to_string(),
                })?;
            debug!(id, comment = comment_id, "comment deleted");
            Ok(ticket.comments.remove(index))
        })
    }
}

impl std::fmt::Debug for TicketLifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TicketLifecycle")
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

/// Every key a ticket write refers to must exist in its lookup table.
fn validate_references<'a>(
    doc: &Document,
    reference: impl Fn(LookupKind) -> Option<&'a str>,
) -> Result<(), ValidationError> {
    for kind in LookupKind::ALL {
        if let Some(key) = reference(kind) {
            if !doc.has_lookup(kind, key) {
                return Err(ValidationError::UnknownReference {
                    kind,
                    key: key.to_string(),
                });
            }
        }
    }
    Ok(())
}

fn validate_comment_ids(comments: &[Comment]) -> Result<(), ValidationError> {
    let mut seen = HashSet::new();
    for comment in comments {
        if !seen.insert(comment.id.as_str()) {
            return Err(ValidationError::DuplicateCommentId(comment.id.clone()));
        }
    }
    Ok(())
}
