//! Transport abstraction for the Connect Four protocol.
//!
//! The [`Transport`] trait defines a bidirectional text message channel between
//! the client and the game server. Every message is one complete JSON object,
//! so implementations must handle framing internally (WebSocket frames,
//! length-prefixed TCP, in-process channels).
//!
//! # Connection Setup
//!
//! Connection setup is intentionally NOT part of this trait. Construct a
//! connected transport externally, then pass it to `GameClient::start`.
//!
//! # Implementing a Custom Transport
//!
//! ```rust,no_run
//! use async_trait::async_trait;
//! use connect_four_client::error::GameClientError;
//! use connect_four_client::transport::{CloseCode, Transport};
//!
//! struct MyTransport { /* ... */ }
//!
//! #[async_trait]
//! impl Transport for MyTransport {
//!     async fn send(&mut self, message: String) -> Result<(), GameClientError> {
//!         // Send the JSON text message over your transport
//!         todo!()
//!     }
//!
//!     async fn recv(&mut self) -> Option<Result<String, GameClientError>> {
//!         // Receive the next JSON text message
//!         // Return None when the connection is closed cleanly
//!         todo!()
//!     }
//!
//!     async fn close(&mut self, code: CloseCode) -> Result<(), GameClientError> {
//!         // Shut down the connection, reporting `code` to the peer if possible
//!         todo!()
//!     }
//! }
//! ```

use std::fmt;

use async_trait::async_trait;

use crate::error::GameClientError;

/// WebSocket-style close status code reported when the client ends a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CloseCode(u16);

impl CloseCode {
    /// Normal closure; sent once the game has been won.
    pub const NORMAL: Self = Self(1000);

    /// The client is going away, like a browser leaving the page.
    pub const GOING_AWAY: Self = Self(1001);

    /// The raw status code.
    pub const fn as_u16(self) -> u16 {
        self.0
    }
}

impl fmt::Display for CloseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A bidirectional text message transport for the Connect Four protocol.
///
/// Each call to [`send`](Transport::send) transmits one complete JSON message.
/// Each call to [`recv`](Transport::recv) returns one complete JSON message.
///
/// # Object Safety
///
/// This trait is object-safe, so `Box<dyn Transport>` works for dynamic dispatch.
///
/// # Cancel Safety
///
/// The [`recv`](Transport::recv) method **MUST** be cancel-safe because it is used
/// inside `tokio::select!`. If `recv` is cancelled before completion, calling it
/// again must not lose data.
#[async_trait]
pub trait Transport: Send + 'static {
    /// Send a JSON text message to the server.
    ///
    /// # Errors
    ///
    /// Returns [`GameClientError::TransportSend`] if the message could not be sent.
    async fn send(&mut self, message: String) -> Result<(), GameClientError>;

    /// Receive the next JSON text message from the server.
    ///
    /// Returns:
    /// - `Some(Ok(text))`: a complete message was received
    /// - `Some(Err(e))`: a transport error occurred
    /// - `None`: the connection was closed cleanly by the server
    ///
    /// # Cancel Safety
    ///
    /// This method **MUST** be cancel-safe (see [trait documentation](Transport)).
    async fn recv(&mut self) -> Option<Result<String, GameClientError>>;

    /// Close the connection, reporting `code` to the server.
    ///
    /// # Errors
    ///
    /// Returns an error if the close handshake fails. Implementations should
    /// still release resources in that case.
    async fn close(&mut self, code: CloseCode) -> Result<(), GameClientError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Box<T> {
    async fn send(&mut self, message: String) -> Result<(), GameClientError> {
        (**self).send(message).await
    }

    async fn recv(&mut self) -> Option<Result<String, GameClientError>> {
        (**self).recv().await
    }

    async fn close(&mut self, code: CloseCode) -> Result<(), GameClientError> {
        (**self).close(code).await
    }
}
