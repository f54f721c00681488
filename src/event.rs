//! Session lifecycle events.

/// Lifecycle events emitted by the background session.
///
/// Game events themselves are rendered through the [`Board`](crate::Board);
/// this channel only reports how the connection is doing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    /// The session started; always the first event.
    Connected,
    /// The server sent a frame that could not be handled.
    ///
    /// Nothing is rendered for that frame and the session keeps running.
    Fault {
        /// Description of the offending frame.
        error: String,
    },
    /// The session ended; always the last event.
    Disconnected {
        /// Why the session ended. `None` when the server closed cleanly.
        reason: Option<String>,
    },
}
