use std::path::PathBuf;
use std::sync::Arc;

use desk_store::Store;
use desk_types::{Clock, LookupKind, SystemClock};
use tracing::{info, warn};

use crate::error::DeskResult;
use crate::integrity::{IntegrityEngine, IntegrityReport};
use crate::lifecycle::TicketLifecycle;
use crate::lookups::Lookups;

/// One Desk instance: a shared store plus the components operating on it.
///
/// Every component holds the same `Arc<Store>`, so they observe one resident
/// document and their writes are serialized by its lock.
#[derive(Clone, Debug)]
pub struct Desk {
    store: Arc<Store>,
    tickets: TicketLifecycle,
    statuses: Lookups,
    categories: Lookups,
    integrity: IntegrityEngine,
}

impl Desk {
    pub fn new(store: Arc<Store>, clock: Arc<dyn Clock>) -> Self {
        Self {
            tickets: TicketLifecycle::new(store.clone(), clock),
            statuses: Lookups::new(LookupKind::Status, store.clone()),
            categories: Lookups::new(LookupKind::Category, store.clone()),
            integrity: IntegrityEngine::new(store.clone()),
            store,
        }
    }

    /// Desk over `store` using the wall clock.
    pub fn with_store(store: Store) -> Self {
        Self::new(Arc::new(store), Arc::new(SystemClock))
    }

    /// Open the JSON document at `path` and load it eagerly.
    ///
    /// A missing file is bootstrapped. Integrity violations found in an
    /// existing file are logged, not rejected.
    pub fn open(path: impl Into<PathBuf>) -> DeskResult<Self> {
        let desk = Self::with_store(Store::json_file(path));
        let report = desk.check()?;
        if report.is_clean() {
            info!(location = %desk.store.location(), "desk opened");
        } else {
            for violation in &report.violations {
                warn!(%violation, "integrity violation in stored document");
            }
        }
        Ok(desk)
    }

    pub fn tickets(&self) -> &TicketLifecycle {
        &self.tickets
    }

    pub fn lookups(&self, kind: LookupKind) -> &Lookups {
        match kind {
            LookupKind::Status => &self.statuses,
            LookupKind::Category => &self.categories,
        }
    }

    pub fn statuses(&self) -> &Lookups {
        &self.statuses
    }

    pub fn categories(&self) -> &Lookups {
        &self.categories
    }

    pub fn integrity(&self) -> &IntegrityEngine {
        &self.integrity
    }

    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }

    /// Scan the current document for integrity violations.
    pub fn check(&self) -> DeskResult<IntegrityReport> {
        self.integrity.check()
    }
}
