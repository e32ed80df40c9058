//! Errors surfaced by the API collaborators and state containers.

use reqwest::StatusCode;
use serde_json::Value;
use shared::models::FieldErrors;
use thiserror::Error;

use crate::storage::StorageError;

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

const MAX_MESSAGE_LEN: usize = 200;

/// Everything a client operation can fail with.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The server rejected the supplied credentials.
    #[error("authentication failed: {message}")]
    Authentication { message: String },

    /// The server rejected the payload; messages are keyed by field.
    #[error("validation failed: {0}")]
    Validation(FieldErrors),

    /// The stored session is no longer accepted and could not be refreshed.
    #[error("session expired; log in again")]
    SessionExpired,

    /// Any other API or network failure.
    #[error(transparent)]
    Collaborator(#[from] CollaboratorError),

    /// Durable client storage could not be read or written.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Failures talking to the remote API that carry no client-side meaning.
#[derive(Debug, Error)]
pub enum CollaboratorError {
    #[error("API request failed with {status}: {message}")]
    Status { status: StatusCode, message: String },

    #[error("API request could not be completed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected API response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl From<reqwest::Error> for ClientError {
    fn from(error: reqwest::Error) -> Self {
        Self::Collaborator(CollaboratorError::Transport(error))
    }
}

impl ClientError {
    /// Classify a non-success response.
    ///
    /// A 400 carrying field messages becomes [`ClientError::Validation`], a
    /// 401 becomes [`ClientError::SessionExpired`], and everything else is a
    /// [`CollaboratorError::Status`] with the server's `detail` when present.
    #[must_use]
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let parsed: Option<Value> = serde_json::from_str(body).ok();
        if status == StatusCode::BAD_REQUEST {
            if let Some(fields) = parsed.as_ref().and_then(FieldErrors::from_value) {
                return Self::Validation(fields);
            }
        }
        if status == StatusCode::UNAUTHORIZED {
            return Self::SessionExpired;
        }
        Self::Collaborator(CollaboratorError::Status {
            status,
            message: response_message(status, parsed.as_ref(), body),
        })
    }

    /// HTTP status behind the error, when there was one.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Authentication { .. } | Self::SessionExpired => Some(StatusCode::UNAUTHORIZED),
            Self::Validation(_) => Some(StatusCode::BAD_REQUEST),
            Self::Collaborator(CollaboratorError::Status { status, .. }) => Some(*status),
            Self::Collaborator(CollaboratorError::Transport(err)) => err.status(),
            Self::Collaborator(CollaboratorError::Decode(_)) | Self::Storage(_) => None,
        }
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }

    #[must_use]
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            Self::Validation(fields) => Some(fields),
            _ => None,
        }
    }
}

/// Best human-readable message for an error response.
pub(crate) fn response_message(status: StatusCode, parsed: Option<&Value>, body: &str) -> String {
    if let Some(detail) = parsed
        .and_then(|value| value.get("detail"))
        .and_then(Value::as_str)
    {
        return detail.to_string();
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return status
            .canonical_reason()
            .unwrap_or("no details")
            .to_string();
    }
    if trimmed.len() > MAX_MESSAGE_LEN {
        let cut = (0..=MAX_MESSAGE_LEN)
            .rev()
            .find(|&index| trimmed.is_char_boundary(index))
            .unwrap_or(0);
        format!("{}…", &trimmed[..cut])
    } else {
        trimmed.to_string()
    }
}
