/// Boxed source error carried by transport failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur in the transport layer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The HTTP client could not be constructed.
    #[error("transport setup failed: {0}")]
    Setup(#[source] BoxError),

    /// The request never reached the server (DNS, refused, TLS...).
    #[error("send failed: {0}")]
    SendFailed(#[source] BoxError),

    /// The server answered but the body could not be read.
    #[error("receive failed: {0}")]
    ReceiveFailed(#[source] BoxError),

    /// The request exceeded the client timeout.
    #[error("request timed out")]
    TimedOut,
}
