//! Error types for the Connect Four client.

use thiserror::Error;

/// Errors that can occur when using the Connect Four client.
#[derive(Debug, Error)]
pub enum GameClientError {
    /// Failed to send a message through the transport.
    #[error("transport send error: {0}")]
    TransportSend(String),

    /// Failed to receive a message from the transport.
    #[error("transport receive error: {0}")]
    TransportReceive(String),

    /// The transport connection was closed.
    #[error("transport connection closed")]
    TransportClosed,

    /// Failed to serialize or deserialize a protocol message.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The server sent an event whose `type` tag this client does not know.
    ///
    /// Holds the offending tag, or `<missing>` when the payload had none.
    #[error("unsupported event type: {0}")]
    UnsupportedEvent(String),

    /// A page URL could not be parsed.
    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Attempted an operation that requires an active session, but the session has ended.
    #[error("not connected to server")]
    NotConnected,

    /// An operation timed out.
    #[error("operation timed out")]
    Timeout,

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl GameClientError {
    /// Returns `true` for errors caused by the server breaking the wire protocol.
    ///
    /// Both an unknown `type` tag and an unparsable payload count; the session
    /// reports either as a fault and skips the frame.
    pub fn is_protocol_fault(&self) -> bool {
        matches!(self, Self::UnsupportedEvent(_) | Self::Serialization(_))
    }
}

/// A specialized [`Result`] type for Connect Four client operations.
pub type Result<T> = std::result::Result<T, GameClientError>;
