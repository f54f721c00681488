//! # Terminal Game Demo
//!
//! Plays Connect Four against a running game server from the terminal:
//!
//! 1. Connect to the server via WebSocket
//! 2. Announce the role taken from `CONNECT_FOUR_QUERY`
//! 3. Type a column number (0-6) and press Enter to drop a piece
//! 4. The board is redrawn after every move; the session ends on a win
//!
//! ## Running
//!
//! ```sh
//! # Start a game server on localhost:5000, then:
//! cargo run --example terminal_game
//!
//! # Join or watch a game created elsewhere:
//! CONNECT_FOUR_QUERY='?join=<token>' cargo run --example terminal_game
//! CONNECT_FOUR_QUERY='?watch=<token>' cargo run --example terminal_game
//!
//! # Override the server URL:
//! CONNECT_FOUR_URL=ws://my-server:5000/ws cargo run --example terminal_game
//! ```

use std::sync::Arc;

use connect_four_client::{
    Board, ClickTarget, ClientEvent, GameClient, GameConfig, InviteLinks, TextBoard,
    WebSocketTransport, DEFAULT_URL,
};
use tokio::io::{AsyncBufReadExt, BufReader};

/// Prints a [`TextBoard`] to stdout whenever it changes.
struct TerminalBoard {
    grid: TextBoard,
}

impl Board for TerminalBoard {
    fn play_move(&self, player: &str, column: u32, row: u32) {
        self.grid.play_move(player, column, row);
        println!("\n{player} played column {column}\n{}", self.grid.render());
    }

    fn set_invite_links(&self, links: &InviteLinks) {
        self.grid.set_invite_links(links);
        println!("Invite a second player with {}", links.join_href);
        println!("Invite spectators with {}", links.watch_href);
    }

    fn show_message(&self, message: &str) {
        self.grid.show_message(message);
        println!("*** {message} ***");
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // ── Logging ─────────────────────────────────────────────────────
    // Set `RUST_LOG=debug` for verbose output.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // ── Configuration ───────────────────────────────────────────────
    let url = std::env::var("CONNECT_FOUR_URL").unwrap_or_else(|_| DEFAULT_URL.to_string());
    let query = std::env::var("CONNECT_FOUR_QUERY").unwrap_or_default();
    let config = GameConfig::from_query(&query);
    tracing::info!(role = ?config.role, "connecting to {url}");

    // ── Connect ─────────────────────────────────────────────────────
    let transport = WebSocketTransport::connect(&url).await?;
    let board = Arc::new(TerminalBoard {
        grid: TextBoard::new(),
    });
    println!("{}", board.grid.render());

    let (mut client, mut event_rx) = GameClient::start(transport, config, board);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    // ── Event loop ──────────────────────────────────────────────────
    loop {
        tokio::select! {
            event = event_rx.recv() => {
                match event {
                    Some(ClientEvent::Connected) => tracing::info!("connected"),
                    Some(ClientEvent::Fault { error }) => tracing::error!("server broke the protocol: {error}"),
                    Some(ClientEvent::Disconnected { reason }) => {
                        tracing::info!("disconnected: {}", reason.as_deref().unwrap_or("closed by server"));
                        break;
                    }
                    None => break,
                }
            }

            line = lines.next_line() => {
                let Some(line) = line? else {
                    tracing::info!("stdin closed, leaving the game");
                    break;
                };
                if !client.click(&ClickTarget::column(line.trim()))? {
                    tracing::warn!("nothing sent for {line:?}");
                }
            }

            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Ctrl+C received, shutting down");
                break;
            }
        }
    }

    // Let a pending winner announcement print before exiting.
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    client.shutdown().await;
    Ok(())
}
