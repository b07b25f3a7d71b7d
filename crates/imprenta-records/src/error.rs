//! Error types for the records layer.

use imprenta_session::SessionError;

/// Errors that can occur while loading or changing records.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    /// The draft failed form validation. Nothing was sent.
    #[error("invalid {kind}: {reason}")]
    Invalid { kind: &'static str, reason: String },

    /// The record is not in the local list.
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: String },

    /// The backend call failed. `Unauthorized` here means the session has
    /// already been logged out.
    #[error(transparent)]
    Session(#[from] SessionError),
}

impl RecordError {
    /// `true` when the failure ended the session.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Session(SessionError::Unauthorized))
    }
}
