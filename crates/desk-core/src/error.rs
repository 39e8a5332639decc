use desk_store::StoreError;
use desk_types::{LookupKind, TicketId};
use thiserror::Error;

/// A referenced ticket, lookup entry, or comment does not exist.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum NotFound {
    #[error("ticket not found: {0}")]
    Ticket(TicketId),

    #[error("{kind} not found: {key}")]
    Lookup { kind: LookupKind, key: String },

    #[error("comment {comment_id} not found on ticket {ticket_id}")]
    Comment {
        ticket_id: TicketId,
        comment_id: String,
    },
}

/// Input rejected before any state was touched.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("unknown {kind} key: {key}")]
    UnknownReference { kind: LookupKind, key: String },

    #[error("duplicate comment id: {0}")]
    DuplicateCommentId(String),

    #[error("no ticket id left after {}", TicketId::MAX)]
    TicketIdsExhausted,
}

/// Errors surfaced by Desk operations.
#[derive(Debug, Error)]
pub enum DeskError {
    #[error(transparent)]
    NotFound(#[from] NotFound),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Storage(#[from] StoreError),
}

/// Coarse classification used by transport layers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Validation,
    StorageUnavailable,
}

impl DeskError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Validation(_) => ErrorKind::Validation,
            Self::Storage(_) => ErrorKind::StorageUnavailable,
        }
    }
}

pub type DeskResult<T> = Result<T, DeskError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_message_lists_every_field() {
        let err = DeskError::from(ValidationError::MissingFields(vec!["user", "title"]));
        assert_eq!(err.to_string(), "missing required fields: user, title");
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn not_found_messages() {
        let err = DeskError::from(NotFound::Lookup {
            kind: LookupKind::Category,
            key: "abc".into(),
        });
        assert_eq!(err.to_string(), "category not found: abc");
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn storage_errors_classify_as_unavailable() {
        let err = DeskError::from(StoreError::Unavailable {
            location: "db.json".into(),
            source: std::io::Error::other("disk gone"),
        });
        assert_eq!(err.kind(), ErrorKind::StorageUnavailable);
    }
}
