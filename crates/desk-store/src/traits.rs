use desk_types::Document;

use crate::error::StoreResult;

/// Persistence medium for the Desk document.
///
/// Implementations read and write the whole document at once; there is no
/// partial update. Implementations must be thread-safe, but callers (the
/// [`Store`](crate::Store)) already serialize all writes.
pub trait DocumentBackend: Send + Sync {
    /// Read the persisted document.
    ///
    /// Returns `Ok(None)` if nothing has been persisted yet.
    /// Returns `Err` if the medium exists but cannot be read or decoded.
    fn read(&self) -> StoreResult<Option<Document>>;

    /// Replace the persisted document.
    ///
    /// On error the persisted state is unspecified; the caller must retry or
    /// surface the failure.
    fn write(&self, document: &Document) -> StoreResult<()>;

    /// Human-readable location, used in logs and error messages.
    fn location(&self) -> String;
}
