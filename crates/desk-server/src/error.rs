use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use desk_core::{DeskError, ErrorKind};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Desk(#[from] DeskError),

    #[error("invalid request: {0}")]
    BadRequest(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type ServerResult<T> = Result<T, ServerError>;

impl ServerError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Desk(e) => match e.kind() {
                ErrorKind::NotFound => StatusCode::NOT_FOUND,
                ErrorKind::Validation => StatusCode::BAD_REQUEST,
                ErrorKind::StorageUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            },
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Config(_) | Self::Io(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::warn!(error = %self, %status, "request failed");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use desk_core::{NotFound, ValidationError};
    use desk_store::StoreError;

    #[test]
    fn status_mapping() {
        let not_found = ServerError::from(DeskError::from(NotFound::Ticket(3)));
        assert_eq!(not_found.status_code(), StatusCode::NOT_FOUND);

        let invalid = ServerError::from(DeskError::from(ValidationError::MissingFields(vec![
            "title",
        ])));
        assert_eq!(invalid.status_code(), StatusCode::BAD_REQUEST);

        let storage = ServerError::from(DeskError::from(StoreError::Unavailable {
            location: "db.json".into(),
            source: std::io::Error::other("disk gone"),
        }));
        assert_eq!(storage.status_code(), StatusCode::SERVICE_UNAVAILABLE);

        assert_eq!(
            ServerError::Internal("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn message_passes_through_core_error() {
        let err = ServerError::from(DeskError::from(NotFound::Ticket(3)));
        assert_eq!(err.to_string(), "ticket not found: 3");
    }
}
