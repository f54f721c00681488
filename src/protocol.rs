//! Wire protocol types for the Connect Four game server.
//!
//! Every message in either direction is a flat JSON object carrying a `type`
//! tag plus the fields of its variant:
//!
//! ```text
//! client → server   {"type":"init"}            {"type":"init","join":"<token>"}
//!                   {"type":"init","watch":"<token>"}
//!                   {"type":"play","column":3}
//! server → client   {"type":"init","join":"<token>","watch":"<token>"}
//!                   {"type":"play","player":"red","column":3,"row":0}
//!                   {"type":"win","player":"red"}
//!                   {"type":"error","message":"This slot is full."}
//! ```

use serde::{Deserialize, Serialize};

// ── Type aliases ────────────────────────────────────────────────────

/// Identifier the server uses for a player, e.g. `"red"` or `"yellow"`.
pub type PlayerId = String;

/// Opaque token naming a game, handed out by the server in its `init` event.
pub type GameToken = String;

// ── Client → Server ─────────────────────────────────────────────────

/// Messages the client sends to the game server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClientMessage {
    /// Role announcement, sent once per connection.
    ///
    /// Neither field set means "start a new game".
    Init {
        /// Join the game identified by this token as the second player.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        join: Option<GameToken>,
        /// Spectate the game identified by this token.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        watch: Option<GameToken>,
    },
    /// Drop a piece into a column (0-based).
    Play {
        /// Target column. Sent as clicked; the server rejects columns off
        /// the board.
        column: i64,
    },
}

impl ClientMessage {
    /// Short name of the variant, matching its wire `type` tag.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Init { .. } => "init",
            Self::Play { .. } => "play",
        }
    }
}

// ── Server → Client ─────────────────────────────────────────────────

/// Events the game server pushes to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ServerMessage {
    /// A new game was created; carries the tokens for the invite links.
    Init {
        /// Token a second player uses to join.
        join: GameToken,
        /// Token spectators use to watch.
        watch: GameToken,
    },
    /// A piece was placed.
    Play {
        /// Owner of the piece.
        player: PlayerId,
        /// Column the piece landed in.
        column: u32,
        /// Row the piece landed in; row 0 is the bottom.
        row: u32,
    },
    /// The game is over.
    Win {
        /// The winning player.
        player: PlayerId,
    },
    /// The server rejected something, typically an illegal move.
    Error {
        /// Human-readable explanation.
        message: String,
    },
}

impl ServerMessage {
    /// Every `type` tag the client understands.
    pub const KINDS: [&'static str; 4] = ["init", "play", "win", "error"];

    /// Short name of the variant, matching its wire `type` tag.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Init { .. } => "init",
            Self::Play { .. } => "play",
            Self::Win { .. } => "win",
            Self::Error { .. } => "error",
        }
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

    #[test]
    fn kinds_cover_every_variant() {
        let samples = [
            ServerMessage::Init {
                join: "j".into(),
                watch: "w".into(),
            },
            ServerMessage::Play {
                player: "red".into(),
                column: 0,
                row: 0,
            },
            ServerMessage::Win {
                player: "red".into(),
            },
            ServerMessage::Error {
                message: "nope".into(),
            },
        ];
        for (msg, kind) in samples.iter().zip(ServerMessage::KINDS) {
            assert_eq!(msg.kind(), kind);
            let json = serde_json::to_value(msg).unwrap();
            assert_eq!(json["type"], kind);
        }
    }

    #[test]
    fn client_kind_matches_tag() {
        let play = ClientMessage::Play { column: 1 };
        assert_eq!(play.kind(), "play");
        assert_eq!(serde_json::to_value(&play).unwrap()["type"], "play");
    }
}
