//! # Custom Transport Demo
//!
//! Implements the [`Transport`] trait with an in-process loopback channel and
//! drives a short scripted game against it. Useful as a template for
//! testing without a real server or for plugging in another I/O layer.
//!
//! ## Running
//!
//! ```sh
//! cargo run --example custom_transport
//! ```

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use connect_four_client::protocol::{ClientMessage, ServerMessage};
use connect_four_client::{
    ClickTarget, ClientEvent, CloseCode, GameClient, GameClientError, GameConfig, TextBoard,
    Transport,
};
use tokio::sync::mpsc;

// ─────────────────────────────────────────────────────────────────────
// Loopback transport
// ─────────────────────────────────────────────────────────────────────

/// Client half of the loopback; handed to `GameClient::start`.
pub struct LoopbackTransport {
    tx: mpsc::UnboundedSender<String>,
    rx: mpsc::UnboundedReceiver<String>,
}

/// Server half of the loopback; reads what the client sent and replies.
pub struct LoopbackServer {
    pub rx: mpsc::UnboundedReceiver<String>,
    pub tx: mpsc::UnboundedSender<String>,
}

fn loopback_pair() -> (LoopbackTransport, LoopbackServer) {
    let (client_tx, server_rx) = mpsc::unbounded_channel();
    let (server_tx, client_rx) = mpsc::unbounded_channel();
    (
        LoopbackTransport {
            tx: client_tx,
            rx: client_rx,
        },
        LoopbackServer {
            rx: server_rx,
            tx: server_tx,
        },
    )
}

#[async_trait]
impl Transport for LoopbackTransport {
    async fn send(&mut self, message: String) -> Result<(), GameClientError> {
        self.tx
            .send(message)
            .map_err(|e| GameClientError::TransportSend(e.to_string()))
    }

    /// Cancel-safe because `UnboundedReceiver::recv` is.
    async fn recv(&mut self) -> Option<Result<String, GameClientError>> {
        self.rx.recv().await.map(Ok)
    }

    async fn close(&mut self, code: CloseCode) -> Result<(), GameClientError> {
        tracing::info!(%code, "client closed the loopback");
        self.rx.close();
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────
// Scripted server
// ─────────────────────────────────────────────────────────────────────

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Answers `init` with invite tokens, then drops a red piece for every `play`.
/// The fourth piece wins.
async fn run_server(mut server: LoopbackServer) -> Result<(), BoxError> {
    let reply = |msg: ServerMessage| -> Result<(), BoxError> {
        server.tx.send(serde_json::to_string(&msg)?)?;
        Ok(())
    };

    let mut heights = [0u32; 7];
    let mut placed = 0;
    while let Some(frame) = server.rx.recv().await {
        tracing::info!("server received: {frame}");
        match serde_json::from_str::<ClientMessage>(&frame)? {
            ClientMessage::Init { .. } => reply(ServerMessage::Init {
                join: "demo-join".into(),
                watch: "demo-watch".into(),
            })?,
            ClientMessage::Play { column } => {
                let slot = match (u32::try_from(column), usize::try_from(column)) {
                    (Ok(col), Ok(idx)) => heights.get_mut(idx).map(|h| (col, h)),
                    _ => None,
                };
                let Some((column, height)) = slot else {
                    reply(ServerMessage::Error {
                        message: "Illegal column.".into(),
                    })?;
                    continue;
                };
                reply(ServerMessage::Play {
                    player: "red".into(),
                    column,
                    row: *height,
                })?;
                *height += 1;
                placed += 1;
                if placed == 4 {
                    reply(ServerMessage::Win {
                        player: "red".into(),
                    })?;
                }
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let (transport, server) = loopback_pair();
    let server_task = tokio::spawn(run_server(server));

    let board = Arc::new(TextBoard::new());
    let (mut client, mut event_rx) =
        GameClient::start(transport, GameConfig::default(), Arc::clone(&board));

    // Two clicks off the board, then four in the bottom row.
    client.click(&ClickTarget::column("9"))?;
    client.click(&ClickTarget::column("-1"))?;
    for column in ["0", "1", "2", "3"] {
        client.click(&ClickTarget::column(column))?;
    }

    while let Some(event) = event_rx.recv().await {
        tracing::info!("event: {event:?}");
        if let ClientEvent::Disconnected { .. } = event {
            break;
        }
    }

    // Wait out the message delay so the winner announcement lands.
    tokio::time::sleep(Duration::from_millis(100)).await;
    client.shutdown().await;
    if let Err(e) = server_task.await? {
        tracing::warn!("server stopped: {e}");
    }

    println!("{}", board.render());
    for message in board.messages() {
        println!("{message}");
    }
    if let Some(links) = board.invite_links() {
        println!("join: {}  watch: {}", links.join_href, links.watch_href);
    }
    Ok(())
}
