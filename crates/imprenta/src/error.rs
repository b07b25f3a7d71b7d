//! Unified error type for the Imprenta client.

use imprenta_protocol::ProtocolError;
use imprenta_records::RecordError;
use imprenta_session::SessionError;
use imprenta_transport::TransportError;

/// The configuration could not be assembled.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The API URL was set but empty.
    #[error("API URL must not be empty")]
    EmptyApiUrl,

    /// An environment variable held something other than UTF-8.
    #[error("{0} is not valid unicode")]
    NotUnicode(String),
}

/// Top-level error that wraps all crate-specific errors.
///
/// When using the `imprenta` facade you deal with this single error type
/// instead of importing errors from each sub-crate. The `#[from]`
/// attribute on each variant lets `?` convert sub-crate errors.
#[derive(Debug, thiserror::Error)]
pub enum ImprentaError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A transport-level error (connect, send, receive).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, invalid message).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A session-level error (rejected login, undecodable token, 401).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A record-level error (validation, missing record).
    #[error(transparent)]
    Record(#[from] RecordError),
}
