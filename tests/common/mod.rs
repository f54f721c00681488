#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::indexing_slicing,
    dead_code
)]
//! Shared test utilities for Connect Four client integration tests.
//!
//! Provides a scripted [`MockTransport`], a [`RecordingBoard`] that logs
//! every render call, and helpers for building server event JSON.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex as StdMutex};

use async_trait::async_trait;
use connect_four_client::protocol::ServerMessage;
use connect_four_client::{Board, CloseCode, GameClientError, InviteLinks, Transport};

// ── MockTransport ───────────────────────────────────────────────────

/// Scripted transport for integration testing.
///
/// Scripted server frames are consumed in order by `recv()`. Once the script
/// runs out, `recv()` hangs so the session stays alive until shutdown.
pub struct MockTransport {
    incoming: VecDeque<Option<Result<String, GameClientError>>>,
    /// Recorded outgoing frames from the client.
    pub sent: Arc<StdMutex<Vec<String>>>,
    /// Every code `close()` was called with.
    pub closes: Arc<StdMutex<Vec<CloseCode>>>,
}

/// Shared handles for inspecting what the client did with a [`MockTransport`].
#[derive(Clone)]
pub struct TransportLog {
    pub sent: Arc<StdMutex<Vec<String>>>,
    pub closes: Arc<StdMutex<Vec<CloseCode>>>,
}

impl TransportLog {
    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }

    pub fn closes(&self) -> Vec<CloseCode> {
        self.closes.lock().unwrap().clone()
    }
}

impl MockTransport {
    /// Create a transport that delivers `incoming` in order.
    pub fn new(incoming: Vec<Option<Result<String, GameClientError>>>) -> (Self, TransportLog) {
        let sent = Arc::new(StdMutex::new(Vec::new()));
        let closes = Arc::new(StdMutex::new(Vec::new()));
        let transport = Self {
            incoming: VecDeque::from(incoming),
            sent: Arc::clone(&sent),
            closes: Arc::clone(&closes),
        };
        (transport, TransportLog { sent, closes })
    }

    /// Create a transport that delivers each frame as a successful receive.
    pub fn with_frames(frames: &[String]) -> (Self, TransportLog) {
        Self::new(frames.iter().map(|f| Some(Ok(f.clone()))).collect())
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&mut self, message: String) -> Result<(), GameClientError> {
        self.sent.lock().unwrap().push(message);
        Ok(())
    }

    async fn recv(&mut self) -> Option<Result<String, GameClientError>> {
        if let Some(item) = self.incoming.pop_front() {
            item
        } else {
            std::future::pending().await
        }
    }

    async fn close(&mut self, code: CloseCode) -> Result<(), GameClientError> {
        self.closes.lock().unwrap().push(code);
        Ok(())
    }
}

// ── RecordingBoard ──────────────────────────────────────────────────

/// One call made on a [`RecordingBoard`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardCall {
    PlayMove {
        player: String,
        column: u32,
        row: u32,
    },
    InviteLinks(InviteLinks),
    Message(String),
}

/// A [`Board`] that records every call in order.
#[derive(Debug, Default)]
pub struct RecordingBoard {
    calls: StdMutex<Vec<BoardCall>>,
}

impl RecordingBoard {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> Vec<BoardCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl Board for RecordingBoard {
    fn play_move(&self, player: &str, column: u32, row: u32) {
        self.calls.lock().unwrap().push(BoardCall::PlayMove {
            player: player.into(),
            column,
            row,
        });
    }

    fn set_invite_links(&self, links: &InviteLinks) {
        self.calls
            .lock()
            .unwrap()
            .push(BoardCall::InviteLinks(links.clone()));
    }

    fn show_message(&self, message: &str) {
        self.calls
            .lock()
            .unwrap()
            .push(BoardCall::Message(message.into()));
    }
}

// ── JSON helper functions ───────────────────────────────────────────

fn to_json(msg: &ServerMessage) -> String {
    serde_json::to_string(msg).expect("server message serialization")
}

/// Returns the JSON for a server `init` event.
pub fn init_json(join: &str, watch: &str) -> String {
    to_json(&ServerMessage::Init {
        join: join.into(),
        watch: watch.into(),
    })
}

/// Returns the JSON for a server `play` event.
pub fn play_json(player: &str, column: u32, row: u32) -> String {
    to_json(&ServerMessage::Play {
        player: player.into(),
        column,
        row,
    })
}

/// Returns the JSON for a server `win` event.
pub fn win_json(player: &str) -> String {
    to_json(&ServerMessage::Win {
        player: player.into(),
    })
}

/// Returns the JSON for a server `error` event.
pub fn error_json(message: &str) -> String {
    to_json(&ServerMessage::Error {
        message: message.into(),
    })
}
