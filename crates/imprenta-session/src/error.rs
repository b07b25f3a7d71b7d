//! Error types for the session layer.

use imprenta_protocol::ProtocolError;
use imprenta_transport::TransportError;

use crate::DecodeFailure;

/// Errors that can occur while acquiring, restoring or using a session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The credential exchange rejected the email/password pair.
    /// The message comes from the backend and is meant for the user.
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    /// The exchange issued a token whose payload could not be decoded.
    /// The session is forced to `Unauthenticated` when this happens.
    #[error("token could not be decoded: {0}")]
    TokenDecode(#[from] DecodeFailure),

    /// A protected request was rejected with 401. The session has
    /// already been torn down by the time the caller sees this.
    #[error("session rejected by the server")]
    Unauthorized,

    /// A protected request was attempted without a session.
    #[error("not logged in")]
    NotAuthenticated,

    /// The backend answered with a non-2xx status other than 401.
    #[error("request failed ({status}): {message}")]
    Api { status: u16, message: String },

    /// The request never completed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A body could not be encoded or decoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The persisted token could not be read or written.
    #[error("token storage failed: {0}")]
    Storage(String),
}
