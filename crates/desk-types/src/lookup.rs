//! Lookup tables referenced by tickets: statuses and categories.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A status or category.
///
/// The `key` is the identity tickets refer to; the `label` is what users see.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LookupEntry {
    pub key: String,
    pub label: String,
}

impl LookupEntry {
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
        }
    }

    /// Create an entry with a freshly generated key.
    pub fn with_generated_key(label: impl Into<String>) -> Self {
        Self::new(generate_key(), label)
    }
}

/// Which lookup table an operation targets.
///
/// Each kind owns one collection in the [`Document`](crate::Document) and one
/// reference field on [`Ticket`](crate::Ticket). Operations on one kind never
/// touch the other.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LookupKind {
    Status,
    Category,
}

impl LookupKind {
    pub const ALL: [LookupKind; 2] = [LookupKind::Status, LookupKind::Category];

    /// Name of the referencing field on a ticket.
    pub fn field_name(self) -> &'static str {
        match self {
            Self::Status => "status",
            Self::Category => "category",
        }
    }

    /// Name of the collection in the persisted document.
    pub fn collection_name(self) -> &'static str {
        match self {
            Self::Status => "statuses",
            Self::Category => "categories",
        }
    }
}

impl fmt::Display for LookupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field_name())
    }
}

/// Sparse edit of a lookup entry. Unset fields keep their current value.
///
/// Setting `key` renames the entry and cascades the new key onto every
/// ticket that referenced the old one.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl LookupPatch {
    pub fn label(label: impl Into<String>) -> Self {
        Self {
            key: None,
            label: Some(label.into()),
        }
    }

    pub fn rekey(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
            label: Some(label.into()),
        }
    }
}

/// Generate an opaque key for a lookup entry or comment.
///
/// UUID v7 in its 32-character hyphen-less form.
pub fn generate_key() -> String {
    uuid::Uuid::now_v7().simple().to_string()
}
