//! Core operations for Desk, a small ticket tracker.
//!
//! - [`TicketLifecycle`] assigns ids and timestamps, merges edits, and
//!   orders tickets and comments for reading.
//! - [`Lookups`] manages the status and category tables.
//! - [`IntegrityEngine`] cascades key renames and deletions onto tickets so
//!   no ticket keeps a dangling reference.
//! - [`Desk`] wires all of them to one shared [`desk_store::Store`].

pub mod desk;
pub mod error;
pub mod integrity;
pub mod lifecycle;
pub mod lookups;

pub use desk::Desk;
pub use error::{DeskError, DeskResult, ErrorKind, NotFound, ValidationError};
pub use integrity::{IntegrityEngine, IntegrityReport, Violation};
pub use lifecycle::TicketLifecycle;
pub use lookups::Lookups;
