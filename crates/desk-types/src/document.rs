use serde::{Deserialize, Serialize};

use crate::lookup::{LookupEntry, LookupKind};
use crate::ticket::{Ticket, TicketId};

/// The full persisted state: tickets plus both lookup tables.
///
/// Serialized as a single JSON object with exactly the keys `tickets`,
/// `statuses`, and `categories`. Missing collections load as empty.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub tickets: Vec<Ticket>,
    #[serde(default)]
    pub statuses: Vec<LookupEntry>,
    #[serde(default)]
    pub categories: Vec<LookupEntry>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookups(&self, kind: LookupKind) -> &[LookupEntry] {
        match kind {
            LookupKind::Status => &self.statuses,
            LookupKind::Category => &self.categories,
        }
    }

    pub fn lookups_mut(&mut self, kind: LookupKind) -> &mut Vec<LookupEntry> {
        match kind {
            LookupKind::Status => &mut self.statuses,
            LookupKind::Category => &mut self.categories,
        }
    }

    pub fn lookup(&self, kind: LookupKind, key: &str) -> Option<&LookupEntry> {
        self.lookups(kind).iter().find(|e| e.key == key)
    }

    pub fn has_lookup(&self, kind: LookupKind, key: &str) -> bool {
        self.lookup(kind, key).is_some()
    }

    pub fn ticket(&self, id: TicketId) -> Option<&Ticket> {
        self.tickets.iter().find(|t| t.id == id)
    }

    pub fn ticket_mut(&mut self, id: TicketId) -> Option<&mut Ticket> {
        self.tickets.iter_mut().find(|t| t.id == id)
    }

    /// `1 + max(existing ids)`, or `1` for an empty collection.
    ///
    /// Recomputed from the current contents on every call, so deleting the
    /// highest ticket frees its id for reuse. `None` once the highest id is
    /// `TicketId::MAX`.
    pub fn next_ticket_id(&self) -> Option<TicketId> {
        self.tickets.iter().map(|t| t.id).max().unwrap_or(0).checked_add(1)
    }
}
