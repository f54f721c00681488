//! Inbound event dispatch.
//!
//! Each frame from the server is decoded into a [`ServerMessage`] and routed
//! to exactly one handler:
//!
//! | Event   | Effect                                               |
//! |---------|------------------------------------------------------|
//! | `init`  | point the invite links at `?join=…` / `?watch=…`     |
//! | `play`  | draw the piece                                       |
//! | `win`   | announce the winner, then close with code 1000       |
//! | `error` | show the server's message; the game goes on          |
//!
//! Any other `type` tag is a protocol fault. Decoding happens before any
//! handler runs, so a faulty frame never leaves a partial render behind.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::debug;

use crate::board::{Board, InviteLinks};
use crate::error::{GameClientError, Result};
use crate::protocol::ServerMessage;
use crate::transport::CloseCode;

/// Default delay before a message is shown, leaving the board time to repaint.
pub const DEFAULT_MESSAGE_DELAY: Duration = Duration::from_millis(50);

/// What the session should do after an event has been handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    /// Keep listening.
    Continue,
    /// Close the connection with the given code and stop.
    Close(CloseCode),
}

/// Decode one text frame from the server.
///
/// # Errors
///
/// - [`GameClientError::UnsupportedEvent`] if the `type` tag is missing or
///   not one of [`ServerMessage::KINDS`].
/// - [`GameClientError::Serialization`] if the frame is not JSON or a known
///   event is missing a field.
pub fn decode(frame: &str) -> Result<ServerMessage> {
    let value: Value = serde_json::from_str(frame)?;
    match value.get("type") {
        Some(Value::String(kind)) if ServerMessage::KINDS.contains(&kind.as_str()) => {
            Ok(serde_json::from_value(value)?)
        }
        Some(Value::String(kind)) => Err(GameClientError::UnsupportedEvent(kind.clone())),
        Some(other) => Err(GameClientError::UnsupportedEvent(other.to_string())),
        None => Err(GameClientError::UnsupportedEvent("<missing>".into())),
    }
}

/// Routes server events to a [`Board`].
///
/// Messages are shown after [`message_delay`](Dispatcher::with_message_delay)
/// on a spawned task, so dispatching needs a tokio runtime unless the delay is
/// zero, in which case they are shown immediately.
pub struct Dispatcher<B: ?Sized> {
    board: Arc<B>,
    message_delay: Duration,
}

impl<B: Board + ?Sized> Dispatcher<B> {
    /// Create a dispatcher drawing on `board` with the default message delay.
    pub fn new(board: Arc<B>) -> Self {
        Self {
            board,
            message_delay: DEFAULT_MESSAGE_DELAY,
        }
    }

    /// Set the delay before messages are shown.
    #[must_use]
    pub fn with_message_delay(mut self, delay: Duration) -> Self {
        self.message_delay = delay;
        self
    }

    /// Decode a raw frame and dispatch it.
    ///
    /// # Errors
    ///
    /// Returns the [`decode`] error without touching the board.
    pub fn handle_frame(&self, frame: &str) -> Result<Directive> {
        let message = decode(frame)?;
        Ok(self.dispatch(message))
    }

    /// Apply one decoded event to the board.
    pub fn dispatch(&self, message: ServerMessage) -> Directive {
        debug!(kind = message.kind(), "dispatching server event");
        match message {
            ServerMessage::Init { join, watch } => {
                self.board.set_invite_links(&InviteLinks::new(&join, &watch));
                Directive::Continue
            }
            ServerMessage::Play {
                player,
                column,
                row,
            } => {
                self.board.play_move(&player, column, row);
                Directive::Continue
            }
            ServerMessage::Win { player } => {
                self.show_message(format!("Player {player} wins!"));
                Directive::Close(CloseCode::NORMAL)
            }
            ServerMessage::Error { message } => {
                self.show_message(message);
                Directive::Continue
            }
        }
    }

    fn show_message(&self, message: String) {
        if self.message_delay.is_zero() {
            self.board.show_message(&message);
            return;
        }
        let board = Arc::clone(&self.board);
        let delay = self.message_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            board.show_message(&message);
        });
    }
}

impl<B: ?Sized> std::fmt::Debug for Dispatcher<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("message_delay", &self.message_delay)
            .finish_non_exhaustive()
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
    use std::sync::Mutex;

    #[derive(Debug, PartialEq, Eq)]
    enum Call {
        Move(String, u32, u32),
        Links(InviteLinks),
        Message(String),
    }

    #[derive(Default)]
    struct RecordingBoard {
        calls: Mutex<Vec<Call>>,
    }

    impl RecordingBoard {
        fn calls(&self) -> Vec<Call> {
            std::mem::take(&mut *self.calls.lock().unwrap())
        }
    }

    impl Board for RecordingBoard {
        fn play_move(&self, player: &str, column: u32, row: u32) {
            self.calls
                .lock()
                .unwrap()
                .push(Call::Move(player.into(), column, row));
        }

        fn set_invite_links(&self, links: &InviteLinks) {
            self.calls.lock().unwrap().push(Call::Links(links.clone()));
        }

        fn show_message(&self, message: &str) {
            self.calls.lock().unwrap().push(Call::Message(message.into()));
        }
    }

    fn immediate() -> (Arc<RecordingBoard>, Dispatcher<RecordingBoard>) {
        let board = Arc::new(RecordingBoard::default());
        let dispatcher = Dispatcher::new(Arc::clone(&board)).with_message_delay(Duration::ZERO);
        (board, dispatcher)
    }

    #[test]
    fn init_sets_only_invite_links() {
        let (board, dispatcher) = immediate();
        let directive = dispatcher
            .handle_frame(r#"{"type":"init","join":"j1","watch":"w1"}"#)
            .unwrap();
        assert_eq!(directive, Directive::Continue);
        assert_eq!(
            board.calls(),
            vec![Call::Links(InviteLinks {
                join_href: "?join=j1".into(),
                watch_href: "?watch=w1".into(),
            })]
        );
    }

    #[test]
    fn play_forwards_coordinates() {
        let (board, dispatcher) = immediate();
        let directive = dispatcher
            .handle_frame(r#"{"type":"play","player":"yellow","column":2,"row":1}"#)
            .unwrap();
        assert_eq!(directive, Directive::Continue);
        assert_eq!(board.calls(), vec![Call::Move("yellow".into(), 2, 1)]);
    }

    #[test]
    fn win_announces_and_closes_normally() {
        let (board, dispatcher) = immediate();
        let directive = dispatcher
            .handle_frame(r#"{"type":"win","player":"red"}"#)
            .unwrap();
        assert_eq!(directive, Directive::Close(CloseCode::NORMAL));
        assert_eq!(board.calls(), vec![Call::Message("Player red wins!".into())]);
    }

    #[test]
    fn error_shows_message_and_continues() {
        let (board, dispatcher) = immediate();
        let directive = dispatcher
            .handle_frame(r#"{"type":"error","message":"This slot is full."}"#)
            .unwrap();
        assert_eq!(directive, Directive::Continue);
        assert_eq!(
            board.calls(),
            vec![Call::Message("This slot is full.".into())]
        );
    }

    #[test]
    fn unknown_type_faults_without_rendering() {
        let (board, dispatcher) = immediate();
        let err = dispatcher
            .handle_frame(r#"{"type":"resign","player":"red"}"#)
            .unwrap_err();
        assert!(matches!(err, GameClientError::UnsupportedEvent(ref k) if k == "resign"));
        assert!(board.calls().is_empty());
    }

    #[test]
    fn missing_or_non_string_type_faults() {
        let err = decode(r#"{"player":"red"}"#).unwrap_err();
        assert!(matches!(err, GameClientError::UnsupportedEvent(ref k) if k == "<missing>"));

        let err = decode(r#"{"type":7}"#).unwrap_err();
        assert!(matches!(err, GameClientError::UnsupportedEvent(ref k) if k == "7"));
    }

    #[test]
    fn malformed_frames_are_serialization_faults() {
        let (board, dispatcher) = immediate();
        for frame in ["not json", r#"{"type":"play","player":"red"}"#, "[1,2]"] {
            let err = dispatcher.handle_frame(frame).unwrap_err();
            assert!(err.is_protocol_fault(), "{frame}: {err}");
        }
        assert!(board.calls().is_empty());
    }

    #[test]
    fn extra_fields_are_tolerated() {
        let msg = decode(r#"{"type":"win","player":"red","extra":true}"#).unwrap();
        assert_eq!(
            msg,
            ServerMessage::Win {
                player: "red".into()
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn messages_are_deferred() {
        let board = Arc::new(RecordingBoard::default());
        let dispatcher = Dispatcher::new(Arc::clone(&board));

        let directive = dispatcher.dispatch(ServerMessage::Error {
            message: "Not your turn.".into(),
        });
        assert_eq!(directive, Directive::Continue);
        assert!(board.calls().is_empty());

        tokio::time::sleep(DEFAULT_MESSAGE_DELAY * 2).await;
        assert_eq!(board.calls(), vec![Call::Message("Not your turn.".into())]);
    }
}
