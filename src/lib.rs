//! # Connect Four Client
//!
//! Transport-agnostic Rust client for a WebSocket Connect Four game server.
//!
//! The client announces its [`Role`] (start a game, join one, or watch one),
//! relays board clicks as `play` requests, and renders the events the server
//! pushes back through a [`Board`]. The server is the only authority on the
//! rules; this crate never validates a move.
//!
//! ## Features
//!
//! - **Transport-agnostic**: implement the [`Transport`] trait for any backend
//! - **WebSocket built-in**: default `transport-websocket` feature provides `WebSocketTransport`
//! - **Strict protocol**: unknown event types stop the session instead of being ignored
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! # async fn example() -> Result<(), connect_four_client::GameClientError> {
//! use std::sync::Arc;
//! use connect_four_client::{
//!     ClickTarget, ClientEvent, GameClient, GameConfig, TextBoard, WebSocketTransport,
//! };
//!
//! let transport = WebSocketTransport::connect(connect_four_client::DEFAULT_URL).await?;
//! let board = Arc::new(TextBoard::new());
//! let (client, mut events) =
//!     GameClient::start(transport, GameConfig::from_query("?join=abc123"), Arc::clone(&board));
//!
//! client.click(&ClickTarget::column("3"))?;
//! while let Some(event) = events.recv().await {
//!     if let ClientEvent::Disconnected { .. } = event {
//!         break;
//!     }
//! }
//! println!("{}", board.render());
//! # Ok(())
//! # }
//! ```

pub mod board;
pub mod client;
pub mod dispatch;
pub mod error;
pub mod event;
pub mod protocol;
pub mod relay;
pub mod role;
pub mod transport;
pub mod transports;

// Re-export primary types for ergonomic imports.
pub use board::{Board, InviteLinks, TextBoard};
pub use client::{GameClient, GameConfig, DEFAULT_URL};
pub use dispatch::{decode, Directive, Dispatcher};
pub use error::GameClientError;
pub use event::ClientEvent;
pub use protocol::{ClientMessage, ServerMessage};
pub use relay::{relay_click, ClickTarget};
pub use role::Role;
pub use transport::{CloseCode, Transport};

#[cfg(feature = "transport-websocket")]
pub use transports::WebSocketTransport;
