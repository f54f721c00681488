//! WebSocket transport built on `tokio-tungstenite`.
//!
//! Both `ws://` and `wss://` URLs are accepted; TLS is negotiated through
//! [`MaybeTlsStream`](tokio_tungstenite::MaybeTlsStream).
//!
//! Only available with the `transport-websocket` feature (on by default).
//!
//! # Example
//!
//! ```rust,no_run
//! # async fn example() -> Result<(), connect_four_client::GameClientError> {
//! use connect_four_client::{CloseCode, Transport, WebSocketTransport};
//!
//! let mut transport = WebSocketTransport::connect("ws://localhost:5000/ws").await?;
//! transport.send(r#"{"type":"init"}"#.to_string()).await?;
//!
//! if let Some(Ok(frame)) = transport.recv().await {
//!     println!("server said: {frame}");
//! }
//!
//! transport.close(CloseCode::NORMAL).await?;
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode as WsCloseCode;
use tokio_tungstenite::tungstenite::protocol::{CloseFrame, Message};
use tokio_tungstenite::tungstenite::Utf8Bytes;

use crate::error::GameClientError;
use crate::transport::{CloseCode, Transport};

/// The underlying WebSocket stream, exposed for [`WebSocketTransport::from_stream`].
pub type WsStream =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

/// A [`Transport`] over a WebSocket connection.
///
/// Each JSON message travels in one text frame. Binary frames from the server
/// are skipped; pings are answered by tungstenite itself.
///
/// # Cancel Safety
///
/// [`recv`](Transport::recv) is cancel-safe: dropping its future before it
/// completes does not lose a frame.
#[derive(Debug)]
pub struct WebSocketTransport {
    stream: WsStream,
    closed: bool,
}

impl WebSocketTransport {
    /// Connect to the game server at `url`.
    ///
    /// # Errors
    ///
    /// Returns [`GameClientError::Io`] if the URL is invalid or the handshake
    /// fails. I/O error kinds are preserved; anything else maps to
    /// [`ErrorKind::Other`](std::io::ErrorKind::Other).
    pub async fn connect(url: &str) -> Result<Self, GameClientError> {
        tracing::debug!(url = %url, "connecting to game server");

        let (stream, _response) = tokio_tungstenite::connect_async(url).await.map_err(|e| {
            let kind = match &e {
                tokio_tungstenite::tungstenite::Error::Io(io) => io.kind(),
                _ => std::io::ErrorKind::Other,
            };
            GameClientError::Io(std::io::Error::new(kind, e))
        })?;

        tracing::info!(url = %url, "connected to game server");
        Ok(Self::from_stream(stream))
    }

    /// Wrap an already-established WebSocket stream, e.g. one opened with
    /// custom TLS or headers.
    pub fn from_stream(stream: WsStream) -> Self {
        Self {
            stream,
            closed: false,
        }
    }

    /// Like [`connect`](Self::connect), but gives up after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`GameClientError::Timeout`] if the deadline elapses, or any
    /// error [`connect`](Self::connect) may return.
    pub async fn connect_with_timeout(
        url: &str,
        timeout: std::time::Duration,
    ) -> Result<Self, GameClientError> {
        tokio::time::timeout(timeout, Self::connect(url))
            .await
            .map_err(|_| GameClientError::Timeout)?
    }
}

#[async_trait]
impl Transport for WebSocketTransport {
    async fn send(&mut self, message: String) -> Result<(), GameClientError> {
        if self.closed {
            return Err(GameClientError::TransportClosed);
        }
        self.stream
            .send(Message::Text(message.into()))
            .await
            .map_err(|e| GameClientError::TransportSend(e.to_string()))
    }

    async fn recv(&mut self) -> Option<Result<String, GameClientError>> {
        loop {
            let msg = match self.stream.next().await? {
                Ok(msg) => msg,
                Err(e) => return Some(Err(GameClientError::TransportReceive(e.to_string()))),
            };

            match msg {
                Message::Text(text) => return Some(Ok(text.to_string())),
                Message::Close(frame) => {
                    tracing::debug!(?frame, "server closed the connection");
                    return None;
                }
                Message::Binary(_) => {
                    tracing::warn!("skipping unexpected binary frame");
                }
                Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => {}
            }
        }
    }

    async fn close(&mut self, code: CloseCode) -> Result<(), GameClientError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        tracing::debug!(%code, "closing WebSocket connection");
        let frame = CloseFrame {
            code: WsCloseCode::from(code.as_u16()),
            reason: Utf8Bytes::from_static(""),
        };
        self.stream
            .close(Some(frame))
            .await
            .map_err(|e| GameClientError::TransportSend(e.to_string()))
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::indexing_slicing
)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    #[test]
    fn websocket_transport_is_send_and_debug() {
        fn assert_bounds<T: Send + std::fmt::Debug>() {}
        assert_bounds::<WebSocketTransport>();
    }

    #[tokio::test]
    async fn connect_fails_with_invalid_url() {
        let err = WebSocketTransport::connect("not-a-valid-url")
            .await
            .unwrap_err();
        assert!(matches!(err, GameClientError::Io(_)));
    }

    #[tokio::test]
    async fn connect_fails_with_unreachable_host() {
        let err = WebSocketTransport::connect("ws://127.0.0.1:1")
            .await
            .unwrap_err();
        assert!(matches!(err, GameClientError::Io(_)));
    }

    /// Start a one-shot game server running `handler` on the accepted
    /// connection and return the URL to connect to.
    async fn start_mock_server<F, Fut>(handler: F) -> String
    where
        F: FnOnce(tokio_tungstenite::WebSocketStream<tokio::net::TcpStream>) -> Fut
            + Send
            + 'static,
        Fut: std::future::Future<Output = ()> + Send,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (tcp, _) = listener.accept().await.unwrap();
            let ws = tokio_tungstenite::accept_async(tcp).await.unwrap();
            handler(ws).await;
        });

        format!("ws://{addr}/ws")
    }

    #[tokio::test]
    async fn recv_yields_text_frames_in_order() {
        let url = start_mock_server(|mut ws| async move {
            ws.send(Message::Text(
                r#"{"type":"play","player":"red","column":3,"row":0}"#.into(),
            ))
            .await
            .unwrap();
            ws.send(Message::Text(r#"{"type":"win","player":"red"}"#.into()))
                .await
                .unwrap();
            ws.close(None).await.unwrap();
        })
        .await;

        let mut transport = WebSocketTransport::connect(&url).await.unwrap();
        let first = transport.recv().await.unwrap().unwrap();
        assert!(first.contains(r#""type":"play""#));
        let second = transport.recv().await.unwrap().unwrap();
        assert_eq!(second, r#"{"type":"win","player":"red"}"#);
        assert!(transport.recv().await.is_none());
    }

    #[tokio::test]
    async fn recv_skips_binary_frames() {
        let url = start_mock_server(|mut ws| async move {
            ws.send(Message::Binary(vec![0xDE, 0xAD].into()))
                .await
                .unwrap();
            ws.send(Message::Text(r#"{"type":"error","message":"x"}"#.into()))
                .await
                .unwrap();
            ws.close(None).await.unwrap();
        })
        .await;

        let mut transport = WebSocketTransport::connect(&url).await.unwrap();
        let frame = transport.recv().await.unwrap().unwrap();
        assert_eq!(frame, r#"{"type":"error","message":"x"}"#);
    }

    #[tokio::test]
    async fn close_reports_code_to_server() {
        let (code_tx, code_rx) = oneshot::channel();
        let url = start_mock_server(|mut ws| async move {
            while let Some(Ok(msg)) = ws.next().await {
                if let Message::Close(frame) = msg {
                    let _ = code_tx.send(frame.map(|f| u16::from(f.code)));
                    break;
                }
            }
        })
        .await;

        let mut transport = WebSocketTransport::connect(&url).await.unwrap();
        transport.close(CloseCode::NORMAL).await.unwrap();
        assert_eq!(code_rx.await.unwrap(), Some(1000));
    }

    #[tokio::test]
    async fn send_after_close_returns_transport_closed() {
        let url =
            start_mock_server(|mut ws| async move { while let Some(Ok(_)) = ws.next().await {} })
                .await;

        let mut transport = WebSocketTransport::connect(&url).await.unwrap();
        transport.close(CloseCode::NORMAL).await.unwrap();
        // A second close is a no-op.
        transport.close(CloseCode::NORMAL).await.unwrap();

        let err = transport
            .send(r#"{"type":"play","column":0}"#.to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, GameClientError::TransportClosed));
    }

    #[tokio::test]
    async fn send_reaches_server() {
        let url = start_mock_server(|mut ws| async move {
            // Echo the first frame back.
            if let Some(Ok(Message::Text(text))) = ws.next().await {
                ws.send(Message::Text(text)).await.unwrap();
            }
            ws.close(None).await.unwrap();
        })
        .await;

        let mut transport = WebSocketTransport::connect(&url).await.unwrap();
        transport
            .send(r#"{"type":"init","watch":"xyz789"}"#.to_string())
            .await
            .unwrap();
        let echoed = transport.recv().await.unwrap().unwrap();
        assert_eq!(echoed, r#"{"type":"init","watch":"xyz789"}"#);
    }

    #[tokio::test]
    async fn connect_with_timeout_times_out() {
        // TEST-NET-1 is non-routable, so the connect never completes.
        let err = WebSocketTransport::connect_with_timeout(
            "ws://192.0.2.1:1",
            std::time::Duration::from_millis(50),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, GameClientError::Timeout));
    }
}
