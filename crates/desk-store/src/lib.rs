//! Document storage for Desk.
//!
//! All Desk state lives in one [`Document`](desk_types::Document): tickets,
//! statuses, and categories. This crate keeps a resident copy of that
//! document in memory and writes the whole thing back after every change.
//!
//! # Backends
//!
//! All backends implement the [`DocumentBackend`] trait:
//!
//! - [`JsonFileBackend`] -- a single pretty-printed JSON file, replaced atomically
//! - [`InMemoryBackend`] -- no persistence, for tests and embedding
//!
//! # Design Rules
//!
//! 1. The document is read from the backend once, on first access.
//! 2. A missing backing file bootstraps an empty document.
//! 3. Every mutation runs inside the write lock: load-if-needed, mutate, flush.
//! 4. A mutation only becomes resident after its flush succeeded.
//! 5. Readers share the lock and never observe a half-applied mutation.
//! 6. All I/O errors are propagated, never silently ignored.

pub mod error;
pub mod json_file;
pub mod memory;
pub mod store;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use json_file::JsonFileBackend;
pub use memory::InMemoryBackend;
pub use store::Store;
pub use traits::DocumentBackend;
