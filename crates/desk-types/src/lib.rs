//! Data model for Desk.
//!
//! This crate holds the records persisted in the Desk data file and the
//! sparse field sets used to create and edit them. Every other Desk crate
//! depends on `desk-types`.
//!
//! # Key Types
//!
//! - [`Ticket`]: a support ticket with its comment thread
//! - [`Comment`]: a single comment on a ticket
//! - [`LookupEntry`]: a status or category, identified by an opaque key
//! - [`LookupKind`]: which lookup table (status or category) is meant
//! - [`Document`]: the three collections persisted together
//! - [`TicketFields`] / [`TicketPatch`] / [`LookupPatch`]: sparse inputs
//! - [`Clock`]: injectable time source for `createdAt` stamps

pub mod clock;
pub mod document;
pub mod lookup;
pub mod ticket;

pub use clock::{Clock, ManualClock, SystemClock};
pub use document::Document;
pub use lookup::{generate_key, LookupEntry, LookupKind, LookupPatch};
pub use ticket::{Comment, Priority, Ticket, TicketFields, TicketId, TicketPatch};

/// Deserialize a field that distinguishes "absent" from "explicitly null".
///
/// Used together with `#[serde(default)]`: a missing field stays `None`,
/// `null` becomes `Some(None)`, and a value becomes `Some(Some(v))`.
pub(crate) fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: serde::Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    <Option<T> as serde::Deserialize>::deserialize(deserializer).map(Some)
}
